// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector2f};

/// A source of uniform samples in `[0, 1)`.
pub trait RandomStream {
    fn next_f32(&mut self) -> Float;

    fn next_2d(&mut self) -> Vector2f {
        let x = self.next_f32();
        let y = self.next_f32();
        Vector2f::new(x, y)
    }
}

pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    /// Non-zero value, suitable for seeding a multiply-with-carry generator.
    pub fn next_seed(&mut self) -> u32 {
        loop {
            let v = self.next_u32();
            if v != 0 {
                return v;
            }
        }
    }
}

impl RandomStream for LcgRng {
    fn next_f32(&mut self) -> Float {
        // 24 bits so the result stays strictly below one.
        (self.next_u32() >> 8) as Float * (1.0 / 16_777_216.0)
    }
}

/// Marsaglia multiply-with-carry generator over a pixel's two persistent
/// seeds. Each draw writes the seeds back, so the next frame continues the
/// sequence where this one stopped.
pub struct PixelRng<'a> {
    seed0: &'a mut u32,
    seed1: &'a mut u32,
}

impl<'a> PixelRng<'a> {
    pub fn new(seed0: &'a mut u32, seed1: &'a mut u32) -> Self {
        Self { seed0, seed1 }
    }
}

impl RandomStream for PixelRng<'_> {
    fn next_f32(&mut self) -> Float {
        *self.seed0 = 36969u32
            .wrapping_mul(*self.seed0 & 65535)
            .wrapping_add(*self.seed0 >> 16);
        *self.seed1 = 18000u32
            .wrapping_mul(*self.seed1 & 65535)
            .wrapping_add(*self.seed1 >> 16);

        let ires = (*self.seed0 << 16).wrapping_add(*self.seed1);

        // Mantissa bits into [2, 4), then mapped to [0, 1).
        let bits = (ires & 0x007f_ffff) | 0x4000_0000;
        (f32::from_bits(bits) - 2.0) / 2.0
    }
}
