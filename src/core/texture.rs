// Copyright @yucwang 2026

use crate::core::accelerator::Accelerator;
use crate::core::buffer::{Buffer, BufferSource, Element, MemoryType};
use crate::core::error::Result;
use crate::math::constants::{Float, Vector3f, Vector3i};

use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    Mirror,
    Clamp,
}

/// Accelerator-side sampling state, created on first use and dropped when the
/// texture's layout or sampling modes change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureSampler {
    pub filter_mode: FilterMode,
    pub wrap_mode: WrapMode,
    pub resolution: Vector3i,
}

/// Number of elements addressed by `resolution`. Any non-positive extent
/// makes the texture empty.
pub fn element_count(resolution: &Vector3i) -> usize {
    if resolution.iter().any(|v| *v <= 0) {
        return 0;
    }
    resolution.iter().fold(1usize, |acc, v| acc.saturating_mul(*v as usize))
}

pub struct Texture3D<T: Element> {
    buffer: Buffer<T>,
    resolution: Vector3i,
    filter_mode: FilterMode,
    wrap_mode: WrapMode,
    sampler: Option<TextureSampler>,
}

impl<T: Element> Texture3D<T> {
    pub fn new_host(name: &str, filter_mode: FilterMode) -> Self {
        Self::from_buffer(Buffer::new_host(name), filter_mode)
    }

    pub fn new_device(name: &str, device: &Arc<Accelerator>, filter_mode: FilterMode) -> Self {
        Self::from_buffer(Buffer::new_device(name, device), filter_mode)
    }

    fn from_buffer(buffer: Buffer<T>, filter_mode: FilterMode) -> Self {
        Self {
            buffer,
            resolution: Vector3i::zeros(),
            filter_mode,
            wrap_mode: WrapMode::Clamp,
            sampler: None,
        }
    }

    pub fn name(&self) -> &str {
        self.buffer.name()
    }

    pub fn resolution(&self) -> Vector3i {
        self.resolution
    }

    pub fn no_elements(&self) -> usize {
        self.buffer.no_elements()
    }

    pub fn no_bytes(&self) -> usize {
        self.buffer.no_bytes()
    }

    pub fn memory_type(&self) -> MemoryType {
        self.buffer.memory_type()
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer.is_dirty()
    }

    pub fn take_dirty(&self) -> bool {
        self.buffer.take_dirty()
    }

    pub fn buffer(&self) -> &Buffer<T> {
        &self.buffer
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.wrap_mode
    }

    pub fn set_filter_mode(&mut self, filter_mode: FilterMode) {
        if self.filter_mode != filter_mode {
            self.filter_mode = filter_mode;
            self.sampler = None;
        }
    }

    pub fn set_wrap_mode(&mut self, wrap_mode: WrapMode) {
        if self.wrap_mode != wrap_mode {
            self.wrap_mode = wrap_mode;
            self.sampler = None;
        }
    }

    pub fn resize(&mut self, resolution: Vector3i) -> Result<()> {
        if self.resolution == resolution {
            return Ok(());
        }

        self.free();
        self.resolution = resolution;

        log::debug!("{}: resolution = [{} x {} x {}]", self.name(),
                    resolution.x, resolution.y, resolution.z);

        if let Err(err) = self.buffer.reallocate(element_count(&resolution)) {
            // Nothing is owned after a failed allocation.
            self.resolution = Vector3i::zeros();
            return Err(err);
        }
        Ok(())
    }

    pub fn set(&mut self, source: BufferSource<'_, T>, resolution: Vector3i) -> Result<()> {
        self.resize(resolution)?;
        self.buffer.copy_in(source)
    }

    pub fn reset(&mut self) {
        self.buffer.reset();
    }

    pub fn free(&mut self) {
        if self.sampler.take().is_some() {
            log::debug!("{}: released sampler", self.name());
        }
        if self.resolution != Vector3i::zeros() {
            self.resolution = Vector3i::zeros();
            self.buffer.set_dirty(true);
        }
        self.buffer.free();
    }

    /// Deferred sync from `other`, see `Buffer::assign_from`.
    pub fn assign_from(&mut self, other: &Texture3D<T>) -> Result<()> {
        if other.is_dirty() {
            self.set(other.buffer.source(), other.resolution)?;
            other.buffer.set_dirty(false);
        }

        self.buffer.set_name(&format!("Copy of {}", other.name()));
        Ok(())
    }

    /// Lazily creates the accelerator sampler. Host textures and empty
    /// textures have none.
    pub fn sampler(&mut self) -> Option<&TextureSampler> {
        if self.memory_type() != MemoryType::Device || self.no_elements() == 0 {
            return None;
        }

        if self.sampler.is_none() {
            log::debug!("{}: created sampler ({:?}, {:?})", self.name(), self.filter_mode, self.wrap_mode);
            self.sampler = Some(TextureSampler {
                filter_mode: self.filter_mode,
                wrap_mode: self.wrap_mode,
                resolution: self.resolution,
            });
        }
        self.sampler.as_ref()
    }

    pub fn has_sampler(&self) -> bool {
        self.sampler.is_some()
    }

    pub fn read_back(&self) -> Vec<T> {
        self.buffer.read_back()
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        let xres = self.resolution.x as usize;
        let yres = self.resolution.y as usize;
        (z * yres + y) * xres + x
    }

    /// Kernel-side texel fetch, x varies fastest.
    pub fn texel(&self, x: usize, y: usize, z: usize) -> T {
        self.buffer.view()[self.index(x, y, z)]
    }
}

impl<T: Element + Into<Float>> Texture3D<T> {
    /// Filtered lookup at normalized coordinates `uvw`. Device textures use
    /// the bound sampler's state; host textures use their own modes.
    pub fn sample(&self, uvw: &Vector3f) -> Float {
        if self.no_elements() == 0 {
            return 0.0;
        }

        let (filter_mode, wrap_mode) = match self.sampler {
            Some(sampler) => (sampler.filter_mode, sampler.wrap_mode),
            None => (self.filter_mode, self.wrap_mode),
        };

        let p = Vector3f::new(
            wrap_coord(uvw.x, wrap_mode),
            wrap_coord(uvw.y, wrap_mode),
            wrap_coord(uvw.z, wrap_mode),
        );

        match filter_mode {
            FilterMode::Nearest => self.sample_nearest(p),
            FilterMode::Linear => self.sample_trilinear(p),
        }
    }

    fn fetch(&self, x: isize, y: isize, z: isize) -> Float {
        let clamp = |v: isize, res: i32| v.clamp(0, res as isize - 1) as usize;
        let x = clamp(x, self.resolution.x);
        let y = clamp(y, self.resolution.y);
        let z = clamp(z, self.resolution.z);
        self.texel(x, y, z).into()
    }

    fn sample_nearest(&self, p: Vector3f) -> Float {
        let x = p.x * (self.resolution.x as Float - 1.0);
        let y = p.y * (self.resolution.y as Float - 1.0);
        let z = p.z * (self.resolution.z as Float - 1.0);

        self.fetch((x + 0.5).floor() as isize, (y + 0.5).floor() as isize, (z + 0.5).floor() as isize)
    }

    fn sample_trilinear(&self, p: Vector3f) -> Float {
        let x = p.x * (self.resolution.x as Float - 1.0);
        let y = p.y * (self.resolution.y as Float - 1.0);
        let z = p.z * (self.resolution.z as Float - 1.0);

        let x0 = x.floor() as isize;
        let y0 = y.floor() as isize;
        let z0 = z.floor() as isize;

        let tx = x - x0 as Float;
        let ty = y - y0 as Float;
        let tz = z - z0 as Float;

        let c00 = self.fetch(x0, y0, z0) * (1.0 - tx) + self.fetch(x0 + 1, y0, z0) * tx;
        let c10 = self.fetch(x0, y0 + 1, z0) * (1.0 - tx) + self.fetch(x0 + 1, y0 + 1, z0) * tx;
        let c01 = self.fetch(x0, y0, z0 + 1) * (1.0 - tx) + self.fetch(x0 + 1, y0, z0 + 1) * tx;
        let c11 = self.fetch(x0, y0 + 1, z0 + 1) * (1.0 - tx) + self.fetch(x0 + 1, y0 + 1, z0 + 1) * tx;

        let c0 = c00 * (1.0 - ty) + c10 * ty;
        let c1 = c01 * (1.0 - ty) + c11 * ty;

        c0 * (1.0 - tz) + c1 * tz
    }
}

fn wrap_coord(value: Float, mode: WrapMode) -> Float {
    match mode {
        WrapMode::Clamp => value.clamp(0.0, 1.0),
        WrapMode::Repeat => value - value.floor(),
        WrapMode::Mirror => {
            let mut v = value % 2.0;
            if v < 0.0 {
                v += 2.0;
            }
            if v > 1.0 {
                2.0 - v
            } else {
                v
            }
        }
    }
}
