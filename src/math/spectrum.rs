// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f};

use bytemuck::{Pod, Zeroable};
use std::ops;

/// Linear radiance in CIE XYZ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorXYZ {
    xyz: Vector3f
}

impl Default for ColorXYZ {
    fn default() -> Self {
        Self { xyz: Vector3f::zeros() }
    }
}

impl ColorXYZ {
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Self { xyz: Vector3f::new(x, y, z) }
    }

    pub fn black() -> Self {
        Self::default()
    }

    pub fn splat(v: Float) -> Self {
        Self::new(v, v, v)
    }

    /// Linear sRGB (D65) to XYZ.
    pub fn from_rgb(r: Float, g: Float, b: Float) -> Self {
        Self::new(
            0.412453 * r + 0.357580 * g + 0.180423 * b,
            0.212671 * r + 0.715160 * g + 0.072169 * b,
            0.019334 * r + 0.119193 * g + 0.950227 * b,
        )
    }

    pub fn is_black(&self) -> bool {
        self.xyz.iter().all(|v| *v == 0.0)
    }

    pub fn max_component(&self) -> Float {
        self.xyz.max()
    }

    pub fn as_vector(&self) -> Vector3f {
        self.xyz
    }
}

impl ops::Index<usize> for ColorXYZ {
    type Output = Float;

    fn index(&self, idx: usize) -> &Float {
        &self.xyz[idx]
    }
}

impl ops::IndexMut<usize> for ColorXYZ {
    fn index_mut(&mut self, idx: usize) -> &mut Float {
        &mut self.xyz[idx]
    }
}

impl ops::Add for ColorXYZ {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { xyz: self.xyz + rhs.xyz }
    }
}

impl ops::AddAssign for ColorXYZ {
    fn add_assign(&mut self, rhs: Self) {
        self.xyz += rhs.xyz;
    }
}

impl ops::Mul for ColorXYZ {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self { xyz: self.xyz.component_mul(&rhs.xyz) }
    }
}

impl ops::Mul<Float> for ColorXYZ {
    type Output = Self;

    fn mul(self, rhs: Float) -> Self {
        Self { xyz: self.xyz * rhs }
    }
}

impl ops::Div<Float> for ColorXYZ {
    type Output = Self;

    fn div(self, rhs: Float) -> Self {
        Self { xyz: self.xyz / rhs }
    }
}

/// Display color in linear sRGB.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorRGB {
    pub r: Float,
    pub g: Float,
    pub b: Float,
}

impl ColorRGB {
    pub fn new(r: Float, g: Float, b: Float) -> Self {
        Self { r, g, b }
    }

    pub fn from_xyz(xyz: &ColorXYZ) -> Self {
        Self::new(
            3.240479 * xyz[0] - 1.537150 * xyz[1] - 0.498535 * xyz[2],
            -0.969256 * xyz[0] + 1.875991 * xyz[1] + 0.041556 * xyz[2],
            0.055648 * xyz[0] - 0.204043 * xyz[1] + 1.057311 * xyz[2],
        )
    }

    pub fn clamp(&mut self, lo: Float, hi: Float) {
        self.r = clamp(self.r, lo, hi);
        self.g = clamp(self.g, lo, hi);
        self.b = clamp(self.b, lo, hi);
    }
}

/// One output sample: display RGB plus a coverage mask in `a`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ColorRGBA {
    pub r: Float,
    pub g: Float,
    pub b: Float,
    pub a: Float,
}

impl ColorRGBA {
    pub fn new(r: Float, g: Float, b: Float, a: Float) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb(rgb: ColorRGB, a: Float) -> Self {
        Self::new(rgb.r, rgb.g, rgb.b, a)
    }

    pub fn transparent() -> Self {
        Self::default()
    }

    pub fn lerp(&self, other: &ColorRGBA, t: Float) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}

/// Clamp that maps NaN to `lo`.
pub fn clamp(v: Float, lo: Float, hi: Float) -> Float {
    v.max(lo).min(hi)
}
