// Copyright @yucwang 2026

use crate::core::interaction::{ScatterEvent, ScatterType};
use crate::core::medium::VolumeMedium;
use crate::core::rng::RandomStream;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;

/// Exponentially distributed optical depth, `-ln(1 - xi)`.
fn sample_optical_depth<R: RandomStream>(rng: &mut R) -> Float {
    -(1.0 - rng.next_f32()).max(Float::MIN_POSITIVE).ln()
}

/// Marches the part of `ray` inside the volume box with a jittered start,
/// accumulating `sigma_t * step`. Returns the ray parameter where the
/// accumulated optical depth first reaches a sampled free path.
fn march<R: RandomStream>(volume: &VolumeMedium, ray: &Ray3f, step: Float, rng: &mut R) -> Option<Float> {
    let (t0, t1) = volume.bounds().ray_intersect_range(ray)?;
    if step <= 0.0 {
        return None;
    }

    let target = sample_optical_depth(rng);
    let jitter = rng.next_f32();
    let no_steps = ((t1 - t0) / step).ceil().max(0.0) as u64;
    let mut depth = 0.0;

    // Positions come from the step index so the march always terminates,
    // even where `step` is below the float spacing at `t`.
    for i in 0..no_steps {
        let t = t0 + (i as Float + jitter) * step;
        if t > t1 {
            break;
        }
        depth += volume.sigma_t(&ray.at(t)) * step;
        if depth >= target {
            return Some(t);
        }
    }
    None
}

/// Medium candidate for the nearest-event query.
pub fn sample_volume<R: RandomStream>(volume: &VolumeMedium, ray: &Ray3f, rng: &mut R) -> ScatterEvent {
    match march(volume, ray, volume.step_size(), rng) {
        Some(t) => {
            let p = ray.at(t);
            ScatterEvent::volume(t, p, -ray.dir(), volume.albedo(&p))
        }
        None => ScatterEvent::invalid(ScatterType::Volume),
    }
}

/// Shadow test through the medium with the coarser shadow step. True when
/// the ray scatters before reaching its end.
pub fn free_path<R: RandomStream>(volume: &VolumeMedium, ray: &Ray3f, rng: &mut R) -> bool {
    march(volume, ray, volume.shadow_step_size(), rng).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::buffer::BufferSource;
    use crate::core::rng::LcgRng;
    use crate::core::texture::{FilterMode, Texture3D};
    use crate::math::aabb::AABB;
    use crate::math::constants::{Vector3f, Vector3i};

    fn slab(value: f32, density_scale: Float) -> VolumeMedium {
        let mut grid = Texture3D::new_host("slab", FilterMode::Linear);
        grid.set(BufferSource::Host(&[value; 8]), Vector3i::new(2, 2, 2)).unwrap();
        VolumeMedium::new(grid, AABB::new(Vector3f::new(-1.0, -1.0, 4.0), Vector3f::new(1.0, 1.0, 6.0)))
            .with_density_scale(density_scale)
            .with_step_sizes(0.01, 0.02)
    }

    #[test]
    fn test_dense_volume_scatters_near_entry() {
        let volume = slab(1.0, 1000.0);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::z(), Some(0.0), Some(100.0));
        let mut rng = LcgRng::new(1);
        for _ in 0..32 {
            let event = sample_volume(&volume, &ray, &mut rng);
            assert!(event.valid);
            assert_eq!(event.kind, ScatterType::Volume);
            assert!(event.t >= 4.0 && event.t < 4.2);
            assert!((event.wo + Vector3f::z()).norm() < 1e-6);
        }
    }

    #[test]
    fn test_empty_volume_never_scatters() {
        let volume = slab(0.0, 1000.0);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::z(), Some(0.0), Some(100.0));
        let mut rng = LcgRng::new(2);
        assert!(!sample_volume(&volume, &ray, &mut rng).valid);
        assert!(!free_path(&volume, &ray, &mut rng));
    }

    #[test]
    fn test_far_thin_volume_terminates() {
        let mut grid = Texture3D::new_host("far", FilterMode::Linear);
        grid.set(BufferSource::Host(&[0.0f32; 8]), Vector3i::new(2, 2, 2)).unwrap();
        let bounds = AABB::new(Vector3f::new(-0.005, -0.005, 5000.0), Vector3f::new(0.005, 0.005, 5000.01));
        let volume = VolumeMedium::new(grid, bounds);
        assert!(volume.step_size() < 2e-4);

        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::z(), Some(0.0), Some(1e4));
        let mut rng = LcgRng::new(6);
        assert!(!sample_volume(&volume, &ray, &mut rng).valid);
        assert!(!free_path(&volume, &ray, &mut rng));

        let mut dense = Texture3D::new_host("far_dense", FilterMode::Linear);
        dense.set(BufferSource::Host(&[1.0f32; 8]), Vector3i::new(2, 2, 2)).unwrap();
        let volume = VolumeMedium::new(dense, bounds).with_density_scale(1e6);
        let event = sample_volume(&volume, &ray, &mut rng);
        assert!(event.valid);
        assert!(event.t >= 4999.99 && event.t <= 5000.02);
    }

    #[test]
    fn test_ray_missing_box_is_invalid() {
        let volume = slab(1.0, 1000.0);
        let ray = Ray3f::new(Vector3f::new(5.0, 0.0, 0.0), Vector3f::z(), Some(0.0), Some(100.0));
        let mut rng = LcgRng::new(3);
        assert!(!sample_volume(&volume, &ray, &mut rng).valid);

        // A shadow ray ending before the box is unoccluded.
        let short = Ray3f::new(Vector3f::zeros(), Vector3f::z(), Some(0.0), Some(3.0));
        assert!(!free_path(&volume, &short, &mut rng));
    }
}
