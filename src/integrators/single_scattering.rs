// Copyright @yucwang 2026

use crate::core::camera::Camera;
use crate::core::interaction::{ScatterEvent, ScatterType};
use crate::core::rng::{PixelRng, RandomStream};
use crate::core::scene::Scene;
use crate::integrators::intersector::{objects_occlude, sample_ray};
use crate::integrators::raymarching::free_path;
use crate::math::constants::{EPSILON, Float, INV_FOUR_PI, INV_PI};
use crate::math::ray::Ray3f;
use crate::math::spectrum::{clamp, ColorRGB, ColorRGBA, ColorXYZ};
use crate::sensors::perspective::{sample_camera, CameraSample};

/// Everything one pixel evaluation produced, kept for debugging tools.
#[derive(Debug, Clone, Copy)]
pub struct PixelEstimate {
    pub ray: Ray3f,
    pub event: ScatterEvent,
    pub radiance: ColorXYZ,
    pub color: ColorRGBA,
}

/// Direct light arriving at `event` from one light, through a single area
/// sample on it.
pub fn estimate_direct_light<R: RandomStream>(scene: &Scene,
                                              light_index: usize,
                                              event: &ScatterEvent,
                                              rng: &mut R) -> ColorXYZ {
    let light = match scene.lights.get(light_index) {
        Some(light) => light,
        None => return ColorXYZ::black(),
    };

    let sample = light.sample_position(&rng.next_2d());
    let to_light = sample.p - event.p;
    let dist = to_light.norm();
    if dist <= EPSILON || sample.pdf <= 0.0 {
        return ColorXYZ::black();
    }
    let wi = to_light / dist;

    let le = light.le(&sample.n, &-wi);
    if le.is_black() {
        return ColorXYZ::black();
    }

    let cos_light = sample.n.dot(&wi).abs();
    if cos_light <= 0.0 {
        return ColorXYZ::black();
    }
    let pdf = sample.pdf * dist * dist / cos_light;

    let (f, origin) = match event.kind {
        ScatterType::Volume => (event.albedo * INV_FOUR_PI, event.p),
        ScatterType::Object => {
            // Shade the side facing the viewer.
            let n = if event.n.dot(&event.wo) < 0.0 { -event.n } else { event.n };
            let cos_surface = n.dot(&wi);
            if cos_surface <= 0.0 {
                return ColorXYZ::black();
            }
            (event.albedo * (INV_PI * cos_surface), event.p + n * EPSILON)
        }
        ScatterType::Light => return ColorXYZ::black(),
    };
    if f.is_black() {
        return ColorXYZ::black();
    }

    let shadow_dist = (sample.p - origin).norm();
    let shadow_ray = Ray3f::new(origin, wi, Some(EPSILON), Some(shadow_dist - EPSILON));
    if objects_occlude(&scene.objects, &shadow_ray) {
        return ColorXYZ::black();
    }
    if let Some(volume) = &scene.volume {
        if free_path(volume, &shadow_ray, rng) {
            return ColorXYZ::black();
        }
    }

    f * le / pdf
}

/// One-light estimate: picks a light uniformly and divides by the selection
/// probability.
pub fn uniform_sample_one_light<R: RandomStream>(scene: &Scene, event: &ScatterEvent, rng: &mut R) -> ColorXYZ {
    let no_lights = scene.lights.len();
    if no_lights == 0 {
        return ColorXYZ::black();
    }

    let index = ((rng.next_f32() * no_lights as Float).floor() as usize).min(no_lights - 1);
    estimate_direct_light(scene, index, event, rng) * no_lights as Float
}

/// Outgoing radiance at a valid event, dispatched by kind.
pub fn scattered_radiance<R: RandomStream>(scene: &Scene, event: &ScatterEvent, rng: &mut R) -> ColorXYZ {
    if !event.valid {
        return ColorXYZ::black();
    }
    match event.kind {
        ScatterType::Light => event.le,
        ScatterType::Volume | ScatterType::Object => uniform_sample_one_light(scene, event, rng),
    }
}

/// Exposure curve per channel, then XYZ to display RGB. Alpha marks
/// coverage.
pub fn tone_map(inv_exposure: Float, radiance: &ColorXYZ, valid: bool) -> ColorRGBA {
    if !valid {
        return ColorRGBA::transparent();
    }

    let mut xyz = ColorXYZ::black();
    for c in 0..3 {
        xyz[c] = clamp(1.0 - (-inv_exposure * radiance[c]).exp(), 0.0, 1.0);
    }
    let mut rgb = ColorRGB::from_xyz(&xyz);
    rgb.clamp(0.0, 1.0);
    ColorRGBA::from_rgb(rgb, 1.0)
}

pub fn estimate_pixel<R: RandomStream>(scene: &Scene, camera: &Camera, x: usize, y: usize, rng: &mut R) -> PixelEstimate {
    let camera_sample = CameraSample::draw(rng);
    let ray = sample_camera(camera, x, y, &camera_sample);
    let event = sample_ray(scene, &ray, rng);
    let radiance = scattered_radiance(scene, &event, rng);
    let color = tone_map(camera.inv_exposure, &radiance, event.valid);

    PixelEstimate { ray, event, radiance, color }
}

/// Per-pixel kernel. The two seeds are this pixel's persistent random state
/// and are advanced in place.
pub fn single_scattering(scene: &Scene, x: usize, y: usize, seed0: &mut u32, seed1: &mut u32) -> ColorRGBA {
    let mut rng = PixelRng::new(seed0, seed1);
    estimate_pixel(scene, &scene.camera, x, y, &mut rng).color
}
