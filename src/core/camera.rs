// Copyright @yucwang 2026

use crate::core::error::{RenderError, Result};
use crate::math::constants::{Float, Vector2f, Vector2i, Vector3f, FLOAT_MAX};

use std::convert::TryFrom;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApertureShape {
    Circular,
    Polygon,
}

impl TryFrom<u32> for ApertureShape {
    type Error = RenderError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(ApertureShape::Circular),
            1 => Ok(ApertureShape::Polygon),
            other => Err(RenderError::UnsupportedApertureShape(other.to_string())),
        }
    }
}

impl FromStr for ApertureShape {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circular" | "0" => Ok(ApertureShape::Circular),
            "polygon" | "1" => Ok(ApertureShape::Polygon),
            _ => Err(RenderError::UnsupportedApertureShape(s.to_string())),
        }
    }
}

/// Camera parameters consumed read-only by ray generation and tone mapping.
///
/// `n`, `u` and `v` are the forward, right and up axes. `screen` holds the
/// `[min, max]` screen window per axis and `inv_screen` its extent per pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub pos: Vector3f,
    pub target: Vector3f,
    pub n: Vector3f,
    pub u: Vector3f,
    pub v: Vector3f,
    pub fov: Float,
    pub film_size: Vector2i,
    pub screen: [[Float; 2]; 2],
    pub inv_screen: Vector2f,
    pub clip_near: Float,
    pub clip_far: Float,
    pub aperture_size: Float,
    pub aperture_shape: ApertureShape,
    pub no_aperture_blades: u32,
    pub aperture_angle: Float,
    pub focal_distance: Float,
    pub inv_exposure: Float,
}

impl Camera {
    pub fn look_at(pos: Vector3f,
                   target: Vector3f,
                   up: Vector3f,
                   fov_deg: Float,
                   film_width: i32,
                   film_height: i32) -> Self {
        let mut camera = Self {
            pos,
            target,
            n: Vector3f::z(),
            u: Vector3f::x(),
            v: Vector3f::y(),
            fov: fov_deg,
            film_size: Vector2i::new(film_width, film_height),
            screen: [[0.0; 2]; 2],
            inv_screen: Vector2f::zeros(),
            clip_near: 0.0,
            clip_far: FLOAT_MAX,
            aperture_size: 0.0,
            aperture_shape: ApertureShape::Circular,
            no_aperture_blades: 6,
            aperture_angle: 0.0,
            focal_distance: (target - pos).norm(),
            inv_exposure: 1.0,
        };
        camera.update(up);
        camera
    }

    /// Recomputes the frame axes and screen window.
    fn update(&mut self, up: Vector3f) {
        self.n = (self.target - self.pos).normalize();
        let mut right = self.n.cross(&up);
        if right.norm() <= 1e-6 {
            let alt = if self.n.x.abs() < 0.9 { Vector3f::x() } else { Vector3f::y() };
            right = self.n.cross(&alt);
        }
        self.u = right.normalize();
        self.v = self.u.cross(&self.n).normalize();

        let width = self.film_size.x.max(1) as Float;
        let height = self.film_size.y.max(1) as Float;
        let aspect = width / height;
        let scale = (0.5 * self.fov.to_radians()).tan();

        self.screen = [[-scale * aspect, scale * aspect], [-scale, scale]];
        self.inv_screen = Vector2f::new(
            (self.screen[0][1] - self.screen[0][0]) / width,
            (self.screen[1][1] - self.screen[1][0]) / height,
        );
    }

    pub fn with_aperture(mut self, size: Float, shape: ApertureShape, blades: u32, angle: Float) -> Self {
        self.aperture_size = size;
        self.aperture_shape = shape;
        self.no_aperture_blades = blades;
        self.aperture_angle = angle;
        self
    }

    pub fn with_focal_distance(mut self, focal_distance: Float) -> Self {
        self.focal_distance = focal_distance;
        self
    }

    pub fn with_exposure(mut self, exposure: Float) -> Self {
        self.inv_exposure = if exposure > 0.0 { 1.0 / exposure } else { 0.0 };
        self
    }

    pub fn with_clip(mut self, near: Float, far: Float) -> Self {
        self.clip_near = near;
        self.clip_far = far;
        self
    }

    pub fn width(&self) -> usize {
        self.film_size.x.max(0) as usize
    }

    pub fn height(&self) -> usize {
        self.film_size.y.max(0) as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.film_size.x <= 0 || self.film_size.y <= 0 {
            return Err(RenderError::InvalidCamera(format!(
                "film size must be positive, got {} x {}", self.film_size.x, self.film_size.y)));
        }
        if !(self.aperture_size >= 0.0) {
            return Err(RenderError::InvalidCamera(format!(
                "aperture size must be non-negative, got {}", self.aperture_size)));
        }
        if !(self.clip_near <= self.clip_far) {
            return Err(RenderError::InvalidCamera(format!(
                "near clip {} exceeds far clip {}", self.clip_near, self.clip_far)));
        }
        if self.aperture_size > 0.0 {
            if self.aperture_shape == ApertureShape::Polygon && self.no_aperture_blades < 3 {
                return Err(RenderError::InvalidCamera(format!(
                    "polygon aperture needs at least 3 blades, got {}", self.no_aperture_blades)));
            }
            if !(self.focal_distance > 0.0) {
                return Err(RenderError::InvalidCamera(format!(
                    "focal distance must be positive, got {}", self.focal_distance)));
            }
        }
        if !self.inv_exposure.is_finite() || self.inv_exposure < 0.0 {
            return Err(RenderError::InvalidCamera(format!(
                "inverse exposure must be finite and non-negative, got {}", self.inv_exposure)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::look_at(Vector3f::new(0.0, 0.0, -5.0), Vector3f::zeros(), Vector3f::y(), 45.0, 64, 32)
    }

    #[test]
    fn test_look_at_frame() {
        let cam = camera();
        assert!((cam.n - Vector3f::z()).norm() < 1e-6);
        assert!((cam.v - Vector3f::y()).norm() < 1e-6);
        assert!(cam.u.dot(&cam.n).abs() < 1e-6);
        assert!((cam.focal_distance - 5.0).abs() < 1e-6);

        let scale = (22.5f32).to_radians().tan();
        assert!((cam.screen[1][1] - scale).abs() < 1e-6);
        assert!((cam.screen[0][1] - 2.0 * scale).abs() < 1e-6);
        assert!((cam.inv_screen.x - 4.0 * scale / 64.0).abs() < 1e-6);
        assert!((cam.inv_screen.y - 2.0 * scale / 32.0).abs() < 1e-6);
        assert!(cam.validate().is_ok());
    }

    #[test]
    fn test_aperture_shape_parsing() {
        assert_eq!("Polygon".parse::<ApertureShape>().unwrap(), ApertureShape::Polygon);
        assert_eq!(ApertureShape::try_from(0u32).unwrap(), ApertureShape::Circular);
        assert!(matches!(ApertureShape::try_from(7u32), Err(RenderError::UnsupportedApertureShape(_))));
        assert!("hexagon".parse::<ApertureShape>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_configuration() {
        let mut cam = camera();
        cam.film_size = Vector2i::new(0, 10);
        assert!(cam.validate().is_err());

        let cam = camera().with_aperture(0.1, ApertureShape::Polygon, 2, 0.0);
        assert!(cam.validate().is_err());

        let cam = camera().with_aperture(0.1, ApertureShape::Circular, 0, 0.0).with_focal_distance(0.0);
        assert!(cam.validate().is_err());

        let cam = camera().with_clip(10.0, 1.0);
        assert!(cam.validate().is_err());

        // A closed aperture ignores blade count and focal distance.
        let cam = camera().with_aperture(0.0, ApertureShape::Polygon, 0, 0.0).with_focal_distance(0.0);
        assert!(cam.validate().is_ok());
    }
}
