// Copyright @yucwang 2026

use crate::core::camera::{ApertureShape, Camera};
use crate::core::rng::RandomStream;
use crate::math::constants::{Float, Vector2f};
use crate::math::ray::Ray3f;
use crate::math::warp::{sample_polygon_aperture, sample_uniform_disk_concentric};

/// Film and lens jitter for one primary ray, both in `[0, 1)^2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSample {
    pub film_uv: Vector2f,
    pub lens_uv: Vector2f,
}

impl CameraSample {
    pub fn new(film_uv: Vector2f, lens_uv: Vector2f) -> Self {
        Self { film_uv, lens_uv }
    }

    pub fn draw<R: RandomStream>(rng: &mut R) -> Self {
        let film_uv = rng.next_2d();
        let lens_uv = rng.next_2d();
        Self { film_uv, lens_uv }
    }
}

/// Offset on the lens plane in camera right/up units, scaled by the
/// aperture size.
fn sample_lens(camera: &Camera, lens_uv: &Vector2f) -> Vector2f {
    let unit = match camera.aperture_shape {
        ApertureShape::Circular => sample_uniform_disk_concentric(lens_uv),
        ApertureShape::Polygon => {
            sample_polygon_aperture(lens_uv, camera.no_aperture_blades, camera.aperture_angle)
        }
    };
    unit * camera.aperture_size
}

/// Primary ray through pixel `(x, y)`, with thin-lens depth of field when
/// the aperture is open.
pub fn sample_camera(camera: &Camera, x: usize, y: usize, sample: &CameraSample) -> Ray3f {
    let film_w = camera.film_size.x.max(1) as Float;
    let film_h = camera.film_size.y.max(1) as Float;

    let screen_x = camera.screen[0][0]
        + camera.inv_screen.x * (x as Float + sample.film_uv.x / film_w);
    let screen_y = camera.screen[1][0]
        + camera.inv_screen.y * (y as Float + sample.film_uv.y / film_h);

    let mut origin = camera.pos;
    let mut dir = (camera.n + camera.u * screen_x - camera.v * screen_y).normalize();

    if camera.aperture_size != 0.0 {
        let lens = sample_lens(camera, &sample.lens_uv);
        let li = camera.u * lens.x + camera.v * lens.y;
        origin += li;
        dir = dir * camera.focal_distance - li;
    }

    Ray3f::new(origin, dir, Some(camera.clip_near), Some(camera.clip_far))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::LcgRng;
    use crate::math::constants::Vector3f;

    fn camera() -> Camera {
        Camera::look_at(Vector3f::new(1.0, 2.0, -5.0), Vector3f::new(1.0, 2.0, 0.0), Vector3f::y(), 40.0, 32, 32)
            .with_clip(0.5, 100.0)
    }

    #[test]
    fn test_pinhole_origin_is_camera_position() {
        let cam = camera();
        let mut rng = LcgRng::new(3);
        for y in (0..32).step_by(7) {
            for x in (0..32).step_by(5) {
                let cs = CameraSample::draw(&mut rng);
                let ray = sample_camera(&cam, x, y, &cs);
                assert_eq!(ray.origin(), cam.pos);
                assert!((ray.dir().norm() - 1.0).abs() < 1e-5);
                assert_eq!(ray.min_t, 0.5);
                assert_eq!(ray.max_t, 100.0);
            }
        }
    }

    #[test]
    fn test_screen_orientation() {
        let cam = camera();
        let cs = CameraSample::new(Vector2f::zeros(), Vector2f::zeros());
        let top_left = sample_camera(&cam, 0, 0, &cs);
        assert!(top_left.dir().dot(&cam.v) > 0.0);
        assert!(top_left.dir().dot(&cam.u) < 0.0);

        let center = sample_camera(&cam, 16, 16, &cs);
        assert!((center.dir() - cam.n).norm() < 1e-5);
    }

    #[test]
    fn test_thin_lens_focuses_on_focal_plane() {
        let cam = camera().with_aperture(0.2, ApertureShape::Circular, 0, 0.0).with_focal_distance(5.0);
        let pinhole = sample_camera(&camera(), 10, 20, &CameraSample::new(Vector2f::new(0.3, 0.7), Vector2f::zeros()));
        let focus = pinhole.at(5.0);

        let mut rng = LcgRng::new(11);
        for _ in 0..16 {
            let cs = CameraSample::new(Vector2f::new(0.3, 0.7), rng.next_2d());
            let ray = sample_camera(&cam, 10, 20, &cs);
            let offset = ray.origin() - cam.pos;
            assert!(offset.norm() <= 0.2 + 1e-5);
            assert!(offset.dot(&cam.n).abs() < 1e-5);

            // Every lens ray passes through the same in-focus point.
            let to_focus = (focus - ray.origin()).normalize();
            assert!((to_focus - ray.dir()).norm() < 1e-4);
        }
    }

    #[test]
    fn test_polygon_aperture_stays_within_radius() {
        let cam = camera().with_aperture(0.5, ApertureShape::Polygon, 6, 0.3).with_focal_distance(5.0);
        let mut rng = LcgRng::new(5);
        for _ in 0..64 {
            let cs = CameraSample::draw(&mut rng);
            let ray = sample_camera(&cam, 4, 4, &cs);
            assert!((ray.origin() - cam.pos).norm() <= 0.5 + 1e-5);
        }
    }
}
