// Copyright @yucwang 2026

use crate::core::interaction::{ScatterEvent, ScatterType};
use crate::core::rng::RandomStream;
use crate::core::scene::{Scene, SceneObject};
use crate::emitters::area::Light;
use crate::integrators::raymarching::sample_volume;
use crate::math::constants::FLOAT_MAX;
use crate::math::ray::Ray3f;

/// Nearest light hit. With `respect_visibility`, lights hidden from the
/// camera are skipped.
pub fn intersect_lights(lights: &[Light], ray: &Ray3f, respect_visibility: bool) -> ScatterEvent {
    let mut nearest = ScatterEvent::invalid(ScatterType::Light);
    let mut t_min = FLOAT_MAX;
    let wo = -ray.dir();

    for (index, light) in lights.iter().enumerate() {
        if respect_visibility && !light.is_visible() {
            continue;
        }
        if let Some(hit) = light.ray_intersection(ray) {
            if hit.t < t_min {
                t_min = hit.t;
                nearest = ScatterEvent::light(hit.t, hit.p, hit.n, wo, light.le(&hit.n, &wo), index);
            }
        }
    }
    nearest
}

pub fn intersect_objects(objects: &[SceneObject], ray: &Ray3f) -> ScatterEvent {
    let mut nearest = ScatterEvent::invalid(ScatterType::Object);
    let mut t_min = FLOAT_MAX;
    let wo = -ray.dir();

    for (index, object) in objects.iter().enumerate() {
        if let Some(hit) = object.shape.ray_intersection(ray) {
            if hit.t < t_min {
                t_min = hit.t;
                nearest = ScatterEvent::object(hit.t, hit.p, hit.n, wo, object.reflectance, index);
            }
        }
    }
    nearest
}

/// True when any opaque object blocks `ray`.
pub fn objects_occlude(objects: &[SceneObject], ray: &Ray3f) -> bool {
    objects.iter().any(|object| object.shape.ray_intersection_t(ray))
}

/// Reduces candidates to the one with the smallest valid `t`. Candidates
/// earlier in the slice win ties. With no valid candidate the result is an
/// invalid volume event.
pub fn nearest_event(candidates: &[ScatterEvent]) -> ScatterEvent {
    let mut nearest = ScatterEvent::invalid(ScatterType::Volume);
    let mut t_min = FLOAT_MAX;

    for candidate in candidates {
        if candidate.valid && candidate.t < t_min {
            t_min = candidate.t;
            nearest = *candidate;
        }
    }
    nearest
}

/// The scene's visibility query: volume, light and object candidates,
/// evaluated in that order against the same ray.
pub fn sample_ray<R: RandomStream>(scene: &Scene, ray: &Ray3f, rng: &mut R) -> ScatterEvent {
    let volume = match &scene.volume {
        Some(volume) => sample_volume(volume, ray, rng),
        None => ScatterEvent::invalid(ScatterType::Volume),
    };
    let light = intersect_lights(&scene.lights, ray, true);
    let object = intersect_objects(&scene.objects, ray);

    nearest_event(&[volume, light, object])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::constants::{Float, Vector3f};
    use crate::math::spectrum::ColorXYZ;

    fn at(kind: ScatterType, t: Float) -> ScatterEvent {
        let p = Vector3f::new(0.0, 0.0, t);
        match kind {
            ScatterType::Volume => ScatterEvent::volume(t, p, -Vector3f::z(), ColorXYZ::splat(1.0)),
            ScatterType::Light => ScatterEvent::light(t, p, -Vector3f::z(), -Vector3f::z(), ColorXYZ::splat(1.0), 0),
            ScatterType::Object => ScatterEvent::object(t, p, -Vector3f::z(), -Vector3f::z(), ColorXYZ::splat(0.5), 0),
        }
    }

    #[test]
    fn test_nearest_event_picks_smallest_t() {
        let events = [at(ScatterType::Volume, 7.0), at(ScatterType::Light, 3.0), at(ScatterType::Object, 5.0)];
        let nearest = nearest_event(&events);
        assert_eq!(nearest.kind, ScatterType::Light);
        assert!(events.iter().filter(|e| e.valid).all(|e| nearest.t <= e.t));
    }

    #[test]
    fn test_nearest_event_ties_follow_candidate_order() {
        let nearest = nearest_event(&[at(ScatterType::Volume, 2.0), at(ScatterType::Light, 2.0), at(ScatterType::Object, 2.0)]);
        assert_eq!(nearest.kind, ScatterType::Volume);

        let nearest = nearest_event(&[ScatterEvent::invalid(ScatterType::Volume),
                                      at(ScatterType::Light, 2.0),
                                      at(ScatterType::Object, 2.0)]);
        assert_eq!(nearest.kind, ScatterType::Light);
    }

    #[test]
    fn test_nearest_event_ignores_invalid_candidates() {
        let mut hidden = at(ScatterType::Volume, 0.5);
        hidden.valid = false;
        let nearest = nearest_event(&[hidden, ScatterEvent::invalid(ScatterType::Light), at(ScatterType::Object, 9.0)]);
        assert_eq!(nearest.kind, ScatterType::Object);
        assert_eq!(nearest.t, 9.0);

        let none = nearest_event(&[ScatterEvent::invalid(ScatterType::Volume),
                                   ScatterEvent::invalid(ScatterType::Light),
                                   ScatterEvent::invalid(ScatterType::Object)]);
        assert!(!none.valid);
        assert_eq!(none.kind, ScatterType::Volume);
    }
}
