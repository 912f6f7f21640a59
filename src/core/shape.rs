// Copyright @yucwang 2023

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeHit {
    pub t: Float,
    pub p: Vector3f,
    pub n: Vector3f,
}

/// An area sample on a shape. `pdf` is with respect to surface area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeSample {
    pub p: Vector3f,
    pub n: Vector3f,
    pub pdf: Float,
}

pub trait Shape: Send + Sync {
    fn bounding_box(&self) -> AABB;
    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit>;
    fn sample(&self, u: &Vector2f) -> ShapeSample;
    fn surface_area(&self) -> Float;

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.ray_intersection(ray).is_some()
    }
}

/// Maps a world ray into the shape's local frame without renormalizing the
/// direction, so ray parameters agree in both frames.
pub(crate) fn local_ray(to_world: &Transform, ray: &Ray3f) -> (Vector3f, Vector3f) {
    (to_world.inv_apply_point(ray.origin()), to_world.inv_apply_vector(ray.dir()))
}
