// Copyright @yucwang 2026

use crate::core::shape::{Shape, ShapeHit, ShapeSample};
use crate::math::aabb::AABB;
use crate::math::constants::{Float, FOUR_PI, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_sphere;

pub struct Sphere {
    center: Vector3f,
    radius: Float,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { center, radius: radius.abs() }
    }

    pub fn center(&self) -> Vector3f {
        self.center
    }

    pub fn radius(&self) -> Float {
        self.radius
    }
}

impl Shape for Sphere {
    fn bounding_box(&self) -> AABB {
        let r = Vector3f::repeat(self.radius);
        AABB::new(self.center - r, self.center + r)
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit> {
        let oc = ray.origin() - self.center;
        let d = ray.dir();
        let b = oc.dot(&d);
        let c = oc.norm_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }

        let sq = disc.sqrt();
        let t = [-b - sq, -b + sq].into_iter().find(|t| ray.test_segment(*t))?;
        let p = ray.at(t);
        Some(ShapeHit { t, p, n: (p - self.center) / self.radius })
    }

    fn sample(&self, u: &Vector2f) -> ShapeSample {
        let n = sample_uniform_sphere(u);
        let area = self.surface_area();
        ShapeSample {
            p: self.center + n * self.radius,
            n,
            pdf: if area > 0.0 { 1.0 / area } else { 0.0 },
        }
    }

    fn surface_area(&self) -> Float {
        FOUR_PI * self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_hits_near_side_first() {
        let sphere = Sphere::new(Vector3f::new(0.0, 0.0, 10.0), 2.0);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::z(), None, None);
        let hit = sphere.ray_intersection(&ray).expect("ray should hit");
        assert!((hit.t - 8.0).abs() < 1e-4);
        assert!((hit.n + Vector3f::z()).norm() < 1e-5);

        // Starting inside, only the far side is in range.
        let inside = Ray3f::new(Vector3f::new(0.0, 0.0, 10.0), Vector3f::z(), None, None);
        let hit = sphere.ray_intersection(&inside).expect("ray should exit");
        assert!((hit.t - 2.0).abs() < 1e-4);
    }
}
