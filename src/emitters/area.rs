// Copyright @yucwang 2026

use crate::core::shape::{Shape, ShapeHit, ShapeSample};
use crate::math::constants::{Float, PI, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::spectrum::ColorXYZ;

use std::str::FromStr;
use std::sync::Arc;

/// How the configured emission of a light is to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionUnit {
    Radiance,
    Irradiance,
    Power,
}

impl FromStr for EmissionUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "radiance" => Ok(EmissionUnit::Radiance),
            "irradiance" => Ok(EmissionUnit::Irradiance),
            "power" | "flux" => Ok(EmissionUnit::Power),
            other => Err(format!("unknown emission unit '{}'", other)),
        }
    }
}

/// Diffuse area light.
pub struct Light {
    shape: Arc<dyn Shape>,
    emission: ColorXYZ,
    multiplier: Float,
    unit: EmissionUnit,
    one_sided: bool,
    visible: bool,
    radiance: ColorXYZ,
}

impl Light {
    pub fn new(shape: Arc<dyn Shape>, emission: ColorXYZ) -> Self {
        let mut light = Self {
            shape,
            emission,
            multiplier: 1.0,
            unit: EmissionUnit::Radiance,
            one_sided: false,
            visible: true,
            radiance: ColorXYZ::black(),
        };
        light.update_radiance();
        light
    }

    pub fn with_multiplier(mut self, multiplier: Float) -> Self {
        self.multiplier = multiplier;
        self.update_radiance();
        self
    }

    pub fn with_unit(mut self, unit: EmissionUnit) -> Self {
        self.unit = unit;
        self.update_radiance();
        self
    }

    pub fn with_one_sided(mut self, one_sided: bool) -> Self {
        self.one_sided = one_sided;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    fn update_radiance(&mut self) {
        let scale = match self.unit {
            EmissionUnit::Radiance => 1.0,
            EmissionUnit::Irradiance => PI,
            EmissionUnit::Power => PI * self.shape.surface_area(),
        };
        self.radiance = if scale > 0.0 {
            self.emission * (self.multiplier / scale)
        } else {
            ColorXYZ::black()
        };
    }

    pub fn shape(&self) -> &Arc<dyn Shape> {
        &self.shape
    }

    pub fn radiance(&self) -> ColorXYZ {
        self.radiance
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_one_sided(&self) -> bool {
        self.one_sided
    }

    /// Emitted radiance leaving the surface with normal `n` towards `wo`.
    pub fn le(&self, n: &Vector3f, wo: &Vector3f) -> ColorXYZ {
        if self.one_sided && n.dot(wo) <= 0.0 {
            ColorXYZ::black()
        } else {
            self.radiance
        }
    }

    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeHit> {
        self.shape.ray_intersection(ray)
    }

    pub fn sample_position(&self, u: &Vector2f) -> ShapeSample {
        self.shape.sample(u)
    }
}
