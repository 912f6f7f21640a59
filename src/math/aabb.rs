// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f, FLOAT_MIN, FLOAT_MAX };
use super::ray::{ Ray3f };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AABB {
    pub p_min: Vector3f,
    pub p_max: Vector3f
}

impl Default for AABB {
    fn default() -> Self {
        Self { p_min: Vector3f::new(FLOAT_MAX, FLOAT_MAX, FLOAT_MAX),
               p_max: Vector3f::new(FLOAT_MIN, FLOAT_MIN, FLOAT_MIN) }
    }
}

impl AABB {
    pub fn new(p_min: Vector3f, p_max: Vector3f) -> Self {
        Self { p_min: p_min.inf(&p_max), p_max: p_max.sup(&p_min) }
    }

    pub fn is_valid(&self) -> bool {
        (0..3).all(|idx| self.p_min[idx] <= self.p_max[idx])
    }

    pub fn center(&self) -> Vector3f {
        0.5f32 * self.p_min + 0.5f32 * self.p_max
    }

    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    pub fn contains(&self, p: &Vector3f) -> bool {
        (0..3).all(|idx| p[idx] >= self.p_min[idx] && p[idx] <= self.p_max[idx])
    }

    pub fn expand_by_point(&mut self, p: &Vector3f) {
        self.p_min = self.p_min.inf(p);
        self.p_max = self.p_max.sup(p);
    }

    pub fn expand_by_aabb(&mut self, other: &AABB) {
        self.p_min = self.p_min.inf(&other.p_min);
        self.p_max = self.p_max.sup(&other.p_max);
    }

    /// Maps a point inside the box to `[0, 1]^3`.
    pub fn to_unit(&self, p: &Vector3f) -> Vector3f {
        let diag = self.diagonal();
        Vector3f::new(
            if diag.x > 0.0 { (p.x - self.p_min.x) / diag.x } else { 0.0 },
            if diag.y > 0.0 { (p.y - self.p_min.y) / diag.y } else { 0.0 },
            if diag.z > 0.0 { (p.z - self.p_min.z) / diag.z } else { 0.0 },
        )
    }

    /// Slab test clipped to the ray interval. Returns the entry and exit
    /// parameters of the overlap, if any.
    pub fn ray_intersect_range(&self, ray: &Ray3f) -> Option<(Float, Float)> {
        if !self.is_valid() {
            return None;
        }

        let o = ray.origin();
        let d = ray.dir();
        let mut t_min = ray.min_t;
        let mut t_max = ray.max_t;

        for idx in 0..3 {
            let dir = d[idx];
            if dir.abs() < 1e-8 {
                if o[idx] < self.p_min[idx] || o[idx] > self.p_max[idx] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / dir;
            let mut t0 = (self.p_min[idx] - o[idx]) * inv;
            let mut t1 = (self.p_max[idx] - o[idx]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return None;
            }
        }

        Some((t_min, t_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_ray_range() {
        let bbox = AABB::new(Vector3f::new(1.0, 1.0, 1.0), Vector3f::new(-1.0, -1.0, -1.0));
        assert_eq!(bbox.p_min, Vector3f::new(-1.0, -1.0, -1.0));

        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let (t0, t1) = bbox.ray_intersect_range(&ray).expect("ray should hit the box");
        assert!((t0 - 4.0).abs() < 1e-5);
        assert!((t1 - 6.0).abs() < 1e-5);

        let short = Ray3f::new(Vector3f::new(0.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0), None, Some(3.0));
        assert!(bbox.ray_intersect_range(&short).is_none());

        let miss = Ray3f::new(Vector3f::new(2.0, 0.0, -5.0), Vector3f::new(0.0, 0.0, 1.0), None, None);
        assert!(bbox.ray_intersect_range(&miss).is_none());
    }

    #[test]
    fn test_aabb_default_is_empty() {
        let mut bbox = AABB::default();
        assert!(!bbox.is_valid());
        bbox.expand_by_point(&Vector3f::new(1.0, 2.0, 3.0));
        assert!(bbox.is_valid());
        assert!(bbox.contains(&Vector3f::new(1.0, 2.0, 3.0)));
        assert_eq!(bbox.center(), Vector3f::new(1.0, 2.0, 3.0));
    }
}
