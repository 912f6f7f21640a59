// Copyright 2020 @TwoCookingMice

use nalgebra as na;

use super::constants::{ Float, Vector3f, Matrix4f };
use super::ray::Ray3f;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity(),
               inv_matrix: Matrix4f::identity() }
    }
}

impl Transform {
    pub fn new(matrix: Matrix4f) -> Self {
        Self { matrix,
               inv_matrix: matrix.try_inverse().unwrap_or_else(Matrix4f::identity) }
    }

    pub fn translate(v: Vector3f) -> Self {
        Self::new(Matrix4f::new_translation(&v))
    }

    pub fn scale(s: Vector3f) -> Self {
        Self::new(Matrix4f::new_nonuniform_scaling(&s))
    }

    pub fn rotate(axis: Vector3f, angle_deg: Float) -> Self {
        if axis.norm() <= 0.0 {
            return Self::default();
        }
        let axis = na::Unit::new_normalize(axis);
        Self::new(Matrix4f::from_axis_angle(&axis, angle_deg.to_radians()))
    }

    /// Places the local frame at `origin` with its +z axis facing `target`.
    pub fn look_at(origin: Vector3f, target: Vector3f, up: Vector3f) -> Self {
        let dir = (target - origin).normalize();
        let mut left = up.normalize().cross(&dir);
        if left.norm() <= 1e-6 {
            let alt = if dir.x.abs() < 0.9 { Vector3f::x() } else { Vector3f::y() };
            left = alt.cross(&dir);
        }
        let left = left.normalize();
        let new_up = dir.cross(&left);

        let matrix = Matrix4f::new(
            left.x, new_up.x, dir.x, origin.x,
            left.y, new_up.y, dir.y, origin.y,
            left.z, new_up.z, dir.z, origin.z,
            0.0,    0.0,      0.0,   1.0,
        );
        Self::new(matrix)
    }

    /// Returns `self * other`: `other` is applied first.
    pub fn compose(&self, other: &Transform) -> Self {
        Self { matrix: self.matrix * other.matrix,
               inv_matrix: other.inv_matrix * self.inv_matrix }
    }

    pub fn matrix(&self) -> &Matrix4f {
        &self.matrix
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        transform_point(&self.matrix, p)
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        (self.matrix * v.push(0.0)).xyz()
    }

    // Normals transform with the inverse transpose.
    pub fn apply_normal(&self, n: Vector3f) -> Vector3f {
        (self.inv_matrix.transpose() * n.push(0.0)).xyz()
    }

    pub fn apply_ray(&self, ray: &Ray3f) -> Ray3f {
        Ray3f::new(self.apply_point(ray.origin()), self.apply_vector(ray.dir()),
                   Some(ray.min_t), Some(ray.max_t))
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        transform_point(&self.inv_matrix, p)
    }

    pub fn inv_apply_vector(&self, v: Vector3f) -> Vector3f {
        (self.inv_matrix * v.push(0.0)).xyz()
    }

    pub fn inv_apply_ray(&self, ray: &Ray3f) -> Ray3f {
        Ray3f::new(self.inv_apply_point(ray.origin()), self.inv_apply_vector(ray.dir()),
                   Some(ray.min_t), Some(ray.max_t))
    }
}

fn transform_point(m: &Matrix4f, p: Vector3f) -> Vector3f {
    let h = m * p.push(1.0);
    if h.w != 0.0 && h.w != 1.0 {
        Vector3f::new(h.x / h.w, h.y / h.w, h.z / h.w)
    } else {
        h.xyz()
    }
}
