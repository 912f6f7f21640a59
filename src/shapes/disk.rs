// Copyright @yucwang 2026

use crate::core::shape::{local_ray, Shape, ShapeHit, ShapeSample};
use crate::math::aabb::AABB;
use crate::math::constants::{EPSILON, Float, PI, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;
use crate::math::warp::sample_uniform_ring;

/// Unit disk in the local z = 0 plane, facing +z. A positive inner radius
/// turns it into a ring.
pub struct Disk {
    to_world: Transform,
    inner_radius: Float,
    normal: Vector3f,
    area: Float,
    inv_area: Float,
}

impl Disk {
    pub fn new(to_world: Transform, inner_radius: Float) -> Self {
        let inner_radius = inner_radius.max(0.0).min(1.0);
        let dx = to_world.apply_vector(Vector3f::x());
        let dy = to_world.apply_vector(Vector3f::y());
        let cross = dx.cross(&dy);
        let area = PI * (1.0 - inner_radius * inner_radius) * cross.norm();
        let inv_area = if area > 0.0 { 1.0 / area } else { 0.0 };
        let normal = if cross.norm() > 0.0 { cross.normalize() } else { Vector3f::z() };

        Self { to_world, inner_radius, normal, area, inv_area }
    }

    pub fn inner_radius(&self) -> Float {
        self.inner_radius
    }
}

impl Shape for Disk {
    fn bounding_box(&self) -> AABB {
        let mut bbox = AABB::default();
        for (x, y) in [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)] {
            let p = self.to_world.apply_point(Vector3f::new(x, y, 0.0));
            bbox.expand_by_point(&p);
        }
        bbox
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit> {
        let (o, d) = local_ray(&self.to_world, ray);
        if d.z.abs() < EPSILON * EPSILON {
            return None;
        }

        let t = -o.z / d.z;
        if !ray.test_segment(t) {
            return None;
        }
        let p_local = o + d * t;
        let r2 = p_local.x * p_local.x + p_local.y * p_local.y;
        if r2 > 1.0 || r2 < self.inner_radius * self.inner_radius {
            return None;
        }

        Some(ShapeHit { t, p: ray.at(t), n: self.normal })
    }

    fn sample(&self, u: &Vector2f) -> ShapeSample {
        let q = sample_uniform_ring(u, self.inner_radius);
        ShapeSample {
            p: self.to_world.apply_point(Vector3f::new(q.x, q.y, 0.0)),
            n: self.normal,
            pdf: self.inv_area,
        }
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_rejects_hole() {
        let ring = Disk::new(Transform::default(), 0.5);
        assert!((ring.surface_area() - 0.75 * PI).abs() < 1e-5);

        let center = Ray3f::new(Vector3f::new(0.0, 0.0, -1.0), Vector3f::z(), None, None);
        assert!(ring.ray_intersection(&center).is_none());

        let edge = Ray3f::new(Vector3f::new(0.75, 0.0, -1.0), Vector3f::z(), None, None);
        let hit = ring.ray_intersection(&edge).expect("ray should hit the ring");
        assert!((hit.t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ring_samples_lie_on_ring() {
        let ring = Disk::new(Transform::scale(Vector3f::new(2.0, 2.0, 1.0)), 0.25);
        for i in 0..8 {
            for j in 0..8 {
                let u = Vector2f::new(i as Float / 8.0, j as Float / 8.0);
                let s = ring.sample(&u);
                let r = (s.p.x * s.p.x + s.p.y * s.p.y).sqrt();
                assert!(r >= 0.5 - 1e-4 && r <= 2.0 + 1e-4);
                assert!((s.pdf * ring.surface_area() - 1.0).abs() < 1e-4);
            }
        }
    }
}
