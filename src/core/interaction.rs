// Copyright @yucwang 2023

use crate::math::constants::{Float, Vector3f, FLOAT_MAX};
use crate::math::spectrum::ColorXYZ;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScatterType {
    Volume,
    Light,
    Object,
}

/// The outcome of one candidate query along a ray.
///
/// `t` is only meaningful when `valid` is set. `albedo` is the shading
/// payload: diffuse albedo for volume events, Lambertian reflectance for
/// object events. `le` is the emitted radiance of a light event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterEvent {
    pub kind: ScatterType,
    pub valid: bool,
    pub t: Float,
    pub p: Vector3f,
    pub n: Vector3f,
    pub wo: Vector3f,
    pub le: ColorXYZ,
    pub albedo: ColorXYZ,
    pub index: usize,
}

impl ScatterEvent {
    pub fn invalid(kind: ScatterType) -> Self {
        Self {
            kind,
            valid: false,
            t: FLOAT_MAX,
            p: Vector3f::zeros(),
            n: Vector3f::zeros(),
            wo: Vector3f::zeros(),
            le: ColorXYZ::black(),
            albedo: ColorXYZ::black(),
            index: 0,
        }
    }

    pub fn volume(t: Float, p: Vector3f, wo: Vector3f, albedo: ColorXYZ) -> Self {
        Self { valid: true, t, p, wo, albedo, ..Self::invalid(ScatterType::Volume) }
    }

    pub fn light(t: Float, p: Vector3f, n: Vector3f, wo: Vector3f, le: ColorXYZ, index: usize) -> Self {
        Self { valid: true, t, p, n, wo, le, index, ..Self::invalid(ScatterType::Light) }
    }

    pub fn object(t: Float, p: Vector3f, n: Vector3f, wo: Vector3f, reflectance: ColorXYZ, index: usize) -> Self {
        Self { valid: true, t, p, n, wo, albedo: reflectance, index, ..Self::invalid(ScatterType::Object) }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

impl Default for ScatterEvent {
    fn default() -> Self {
        Self::invalid(ScatterType::Volume)
    }
}
