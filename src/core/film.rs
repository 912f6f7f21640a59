// Copyright @yucwang 2026

use crate::core::buffer::Buffer;
use crate::core::error::Result;
use crate::core::rng::LcgRng;
use crate::math::constants::Float;
use crate::math::spectrum::ColorRGBA;

/// Per-pixel state that persists across frames: the two random seeds, the
/// latest frame estimate and the running mean over all frames.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    seed: u64,
    seeds1: Buffer<u32>,
    seeds2: Buffer<u32>,
    estimate_frame: Buffer<ColorRGBA>,
    estimate_running: Buffer<ColorRGBA>,
    no_iterations: u32,
}

impl FrameBuffer {
    pub fn new(seed: u64) -> Self {
        Self {
            width: 0,
            height: 0,
            seed,
            seeds1: Buffer::new_host("Random seeds 1"),
            seeds2: Buffer::new_host("Random seeds 2"),
            estimate_frame: Buffer::new_host("Frame estimate"),
            estimate_running: Buffer::new_host("Running estimate"),
            no_iterations: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn no_pixels(&self) -> usize {
        self.width * self.height
    }

    pub fn no_iterations(&self) -> u32 {
        self.no_iterations
    }

    /// Reallocates for a new film size and reseeds every pixel. Same size is
    /// a no-op.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        if width == self.width && height == self.height {
            return Ok(());
        }

        let n = width * height;
        self.seeds1.resize(n)?;
        self.seeds2.resize(n)?;
        self.estimate_frame.resize(n)?;
        self.estimate_running.resize(n)?;
        self.width = width;
        self.height = height;
        self.reseed();
        self.no_iterations = 0;

        log::debug!("Frame buffer resized to {} x {}", width, height);
        Ok(())
    }

    fn reseed(&mut self) {
        let mut rng = LcgRng::new(self.seed);
        for s in self.seeds1.view_mut() {
            *s = rng.next_seed();
        }
        for s in self.seeds2.view_mut() {
            *s = rng.next_seed();
        }
        self.seeds1.set_dirty(true);
        self.seeds2.set_dirty(true);
    }

    /// Clears the running estimate, keeping the seeds so the next frames
    /// remain decorrelated from earlier ones.
    pub fn restart(&mut self) {
        self.estimate_running.reset();
        self.no_iterations = 0;
    }

    /// Disjoint per-pixel views for one frame: `(seeds1, seeds2, output)`.
    pub fn frame_views(&mut self) -> (&mut [u32], &mut [u32], &mut [ColorRGBA]) {
        (self.seeds1.view_mut(), self.seeds2.view_mut(), self.estimate_frame.view_mut())
    }

    /// Folds the latest frame into the running mean.
    pub fn accumulate(&mut self) {
        self.no_iterations += 1;
        let weight = 1.0 / self.no_iterations as Float;

        let frame = self.estimate_frame.view();
        let running = self.estimate_running.view_mut();
        for (acc, sample) in running.iter_mut().zip(frame.iter()) {
            *acc = acc.lerp(sample, weight);
        }

        self.estimate_frame.set_dirty(true);
        self.estimate_running.set_dirty(true);
        self.seeds1.set_dirty(true);
        self.seeds2.set_dirty(true);
    }

    pub fn frame_estimate(&self) -> &[ColorRGBA] {
        self.estimate_frame.view()
    }

    pub fn running_estimate(&self) -> &[ColorRGBA] {
        self.estimate_running.view()
    }

    pub fn running_buffer(&self) -> &Buffer<ColorRGBA> {
        &self.estimate_running
    }

    pub fn seeds(&self) -> (&[u32], &[u32]) {
        (self.seeds1.view(), self.seeds2.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_seeds_are_non_zero() {
        let mut fb = FrameBuffer::new(42);
        fb.resize(4, 3).unwrap();
        assert_eq!(fb.no_pixels(), 12);
        let (s1, s2) = fb.seeds();
        assert_eq!(s1.len(), 12);
        assert!(s1.iter().chain(s2.iter()).all(|s| *s != 0));
    }

    #[test]
    fn test_accumulate_is_running_mean() {
        let mut fb = FrameBuffer::new(1);
        fb.resize(2, 1).unwrap();

        for value in [1.0, 0.0, 0.5] {
            let (_, _, out) = fb.frame_views();
            for px in out.iter_mut() {
                *px = ColorRGBA::new(value, value, value, 1.0);
            }
            fb.accumulate();
        }

        assert_eq!(fb.no_iterations(), 3);
        for px in fb.running_estimate() {
            assert!((px.r - 0.5).abs() < 1e-6);
            assert!((px.a - 1.0).abs() < 1e-6);
        }

        fb.restart();
        assert_eq!(fb.no_iterations(), 0);
        assert!(fb.running_estimate().iter().all(|px| px.r == 0.0));
    }
}
