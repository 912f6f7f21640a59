// Copyright @yucwang 2026

use crate::core::error::{RenderError, Result};
use crate::core::texture::Texture3D;
use crate::core::transfer_function::TransferFunction1D;
use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::spectrum::ColorXYZ;

/// Heterogeneous medium driven by a scalar intensity grid.
///
/// Extinction is `density_scale * opacity(intensity)`. The grid spans
/// `bounds` in world space.
pub struct VolumeMedium {
    intensity: Texture3D<f32>,
    bounds: AABB,
    density_scale: Float,
    step_size: Float,
    shadow_step_size: Float,
    opacity: TransferFunction1D<Float>,
    diffuse: TransferFunction1D<ColorXYZ>,
}

impl VolumeMedium {
    pub fn new(intensity: Texture3D<f32>, bounds: AABB) -> Self {
        let diagonal = if bounds.is_valid() { bounds.diagonal().max() } else { 1.0 };
        let step_size = (diagonal / 256.0).max(1e-4);
        Self {
            intensity,
            bounds,
            density_scale: 1.0,
            step_size,
            shadow_step_size: 2.0 * step_size,
            opacity: TransferFunction1D::ramp(0.0, 1.0),
            diffuse: TransferFunction1D::constant(ColorXYZ::splat(1.0)),
        }
    }

    pub fn with_density_scale(mut self, density_scale: Float) -> Self {
        self.density_scale = density_scale;
        self
    }

    pub fn with_step_sizes(mut self, step_size: Float, shadow_step_size: Float) -> Self {
        self.step_size = step_size;
        self.shadow_step_size = shadow_step_size;
        self
    }

    pub fn with_opacity(mut self, opacity: TransferFunction1D<Float>) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_diffuse(mut self, diffuse: TransferFunction1D<ColorXYZ>) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    pub fn intensity_texture(&self) -> &Texture3D<f32> {
        &self.intensity
    }

    pub fn intensity_texture_mut(&mut self) -> &mut Texture3D<f32> {
        &mut self.intensity
    }

    pub fn density_scale(&self) -> Float {
        self.density_scale
    }

    pub fn step_size(&self) -> Float {
        self.step_size
    }

    pub fn shadow_step_size(&self) -> Float {
        self.shadow_step_size
    }

    /// Raw grid value at a world position, zero outside the bounds.
    pub fn intensity(&self, p: &Vector3f) -> Float {
        if !self.bounds.contains(p) {
            return 0.0;
        }
        self.intensity.sample(&self.bounds.to_unit(p))
    }

    pub fn sigma_t(&self, p: &Vector3f) -> Float {
        (self.density_scale * self.opacity.eval(self.intensity(p))).max(0.0)
    }

    pub fn albedo(&self, p: &Vector3f) -> ColorXYZ {
        self.diffuse.eval(self.intensity(p))
    }

    /// Checks the configuration and binds the grid's sampler. Called between
    /// frames only.
    pub fn prepare(&mut self) -> Result<()> {
        if !self.bounds.is_valid() || self.bounds.diagonal().min() <= 0.0 {
            return Err(RenderError::InvalidVolume(format!(
                "degenerate bounds {:?} .. {:?}", self.bounds.p_min, self.bounds.p_max)));
        }
        if !(self.density_scale >= 0.0) || !self.density_scale.is_finite() {
            return Err(RenderError::InvalidVolume(format!(
                "density scale must be finite and non-negative, got {}", self.density_scale)));
        }
        if !(self.step_size > 0.0) || !(self.shadow_step_size > 0.0) {
            return Err(RenderError::InvalidVolume(format!(
                "step sizes must be positive, got {} and {}", self.step_size, self.shadow_step_size)));
        }
        if self.intensity.no_elements() == 0 {
            log::warn!("Volume '{}' has an empty intensity grid", self.intensity.name());
        }
        if self.intensity.take_dirty() {
            log::debug!("Volume '{}' grid changed since last frame", self.intensity.name());
        }

        self.intensity.sampler();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::buffer::BufferSource;
    use crate::core::texture::FilterMode;
    use crate::math::constants::Vector3i;

    fn medium() -> VolumeMedium {
        let mut grid = Texture3D::new_host("density", FilterMode::Nearest);
        grid.set(BufferSource::Host(&[0.5f32; 8]), Vector3i::new(2, 2, 2)).unwrap();
        VolumeMedium::new(grid, AABB::new(Vector3f::zeros(), Vector3f::repeat(1.0)))
            .with_density_scale(4.0)
    }

    #[test]
    fn test_sigma_t_uses_opacity_and_scale() {
        let m = medium();
        assert!((m.sigma_t(&Vector3f::repeat(0.5)) - 2.0).abs() < 1e-5);
        assert_eq!(m.sigma_t(&Vector3f::repeat(2.0)), 0.0);
        assert!((m.albedo(&Vector3f::repeat(0.5))[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_prepare_rejects_bad_steps() {
        let mut m = medium().with_step_sizes(0.0, 0.1);
        assert!(matches!(m.prepare(), Err(RenderError::InvalidVolume(_))));

        let mut m = medium();
        assert!(m.prepare().is_ok());
        assert!(!m.intensity_texture().is_dirty());
    }
}
