// Copyright @yucwang 2026

use crate::core::shape::{local_ray, Shape, ShapeHit, ShapeSample};
use crate::math::aabb::AABB;
use crate::math::constants::{EPSILON, Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// The cube `[-1, 1]^3` in local space.
pub struct Cube {
    to_world: Transform,
    face_areas: [Float; 6],
    area: Float,
    inv_area: Float,
}

impl Cube {
    pub fn new(to_world: Transform) -> Self {
        let dx = to_world.apply_vector(Vector3f::new(2.0, 0.0, 0.0));
        let dy = to_world.apply_vector(Vector3f::new(0.0, 2.0, 0.0));
        let dz = to_world.apply_vector(Vector3f::new(0.0, 0.0, 2.0));
        let area_xy = dx.cross(&dy).norm();
        let area_xz = dx.cross(&dz).norm();
        let area_yz = dy.cross(&dz).norm();
        let face_areas = [area_xy, area_xy, area_xz, area_xz, area_yz, area_yz];
        let area = 2.0 * (area_xy + area_xz + area_yz);
        let inv_area = if area > 0.0 { 1.0 / area } else { 0.0 };
        Self { to_world, face_areas, area, inv_area }
    }

    /// Returns the nearest in-range slab crossing and its local normal.
    fn intersect_local(&self, ray: &Ray3f) -> Option<(Float, Vector3f)> {
        let (o, d) = local_ray(&self.to_world, ray);

        let mut t_near = -Float::INFINITY;
        let mut t_far = Float::INFINITY;
        for axis in 0..3 {
            if d[axis].abs() < EPSILON * EPSILON {
                if o[axis] < -1.0 || o[axis] > 1.0 {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d[axis];
            let mut t0 = (-1.0 - o[axis]) * inv;
            let mut t1 = (1.0 - o[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_far < t_near {
                return None;
            }
        }

        let t = [t_near, t_far].into_iter().find(|t| ray.test_segment(*t))?;
        Some((t, cube_normal(o + d * t)))
    }

    fn sample_face(face: usize, a: Float, b: Float) -> (Vector3f, Vector3f) {
        match face {
            0 => (Vector3f::new(a, b, 1.0), Vector3f::z()),
            1 => (Vector3f::new(a, b, -1.0), -Vector3f::z()),
            2 => (Vector3f::new(a, 1.0, b), Vector3f::y()),
            3 => (Vector3f::new(a, -1.0, b), -Vector3f::y()),
            4 => (Vector3f::new(1.0, a, b), Vector3f::x()),
            _ => (Vector3f::new(-1.0, a, b), -Vector3f::x()),
        }
    }
}

impl Shape for Cube {
    fn bounding_box(&self) -> AABB {
        let mut bbox = AABB::default();
        for i in 0..8 {
            let corner = Vector3f::new(
                if i & 1 == 0 { -1.0 } else { 1.0 },
                if i & 2 == 0 { -1.0 } else { 1.0 },
                if i & 4 == 0 { -1.0 } else { 1.0 },
            );
            let p = self.to_world.apply_point(corner);
            bbox.expand_by_point(&p);
        }
        bbox
    }

    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit> {
        let (t, n_local) = self.intersect_local(ray)?;
        let n = self.to_world.apply_normal(n_local).normalize();
        Some(ShapeHit { t, p: ray.at(t), n })
    }

    fn sample(&self, u: &Vector2f) -> ShapeSample {
        if self.area <= 0.0 {
            return ShapeSample { p: self.to_world.apply_point(Vector3f::zeros()), n: Vector3f::z(), pdf: 0.0 };
        }

        // Pick a face proportionally to its area, then reuse the remainder.
        let target = u.x * self.area;
        let mut accum: Float = 0.0;
        let mut face = 5;
        for (i, face_area) in self.face_areas.iter().enumerate() {
            accum += *face_area;
            if target <= accum {
                face = i;
                break;
            }
        }
        let prev = accum - self.face_areas[face];
        let local_u = if self.face_areas[face] > 0.0 {
            ((target - prev) / self.face_areas[face]).max(0.0).min(1.0)
        } else {
            0.5
        };

        let (p_local, n_local) = Self::sample_face(face, 2.0 * local_u - 1.0, 2.0 * u.y - 1.0);
        ShapeSample {
            p: self.to_world.apply_point(p_local),
            n: self.to_world.apply_normal(n_local).normalize(),
            pdf: self.inv_area,
        }
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}

fn cube_normal(p: Vector3f) -> Vector3f {
    let ax = p.x.abs();
    let ay = p.y.abs();
    let az = p.z.abs();
    if ax >= ay && ax >= az {
        Vector3f::new(p.x.signum(), 0.0, 0.0)
    } else if ay >= az {
        Vector3f::new(0.0, p.y.signum(), 0.0)
    } else {
        Vector3f::new(0.0, 0.0, p.z.signum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_cube_intersection() {
        let cube = Cube::new(Transform::scale(Vector3f::new(2.0, 1.0, 1.0)));
        assert!((cube.surface_area() - 40.0).abs() < 1e-3);

        let ray = Ray3f::new(Vector3f::new(-10.0, 0.0, 0.0), Vector3f::x(), None, None);
        let hit = cube.ray_intersection(&ray).expect("ray should hit");
        assert!((hit.t - 8.0).abs() < 1e-4);
        assert!((hit.n + Vector3f::x()).norm() < 1e-5);

        let bbox = cube.bounding_box();
        assert!((bbox.diagonal() - Vector3f::new(4.0, 2.0, 2.0)).norm() < 1e-5);
    }

    #[test]
    fn test_cube_samples_on_surface() {
        let cube = Cube::new(Transform::default());
        let s = cube.sample(&Vector2f::new(0.99, 0.3));
        let on_face = (0..3).any(|i| (s.p[i].abs() - 1.0).abs() < 1e-5);
        assert!(on_face);
        assert!((s.pdf - 1.0 / 24.0).abs() < 1e-6);
    }
}
