// Copyright @yucwang 2026

//! Typed buffers mirrored between host and accelerator memory.
//!
//! A buffer owns exactly one allocation in the store chosen at construction.
//! `set` translates from whichever store the source lives in, so there are
//! four copy paths and no invalid combination. The dirty flag marks content
//! that has not been consumed since it last changed; `assign_from` only
//! transfers content when the source is dirty.

use crate::core::accelerator::{Accelerator, AllocationError, DeviceArray};
use crate::core::error::{RenderError, Result};

use bytemuck::Pod;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Element types a buffer can hold. The zero-fill pattern is all-zero bits.
pub trait Element: Pod + Send + Sync {}

impl<T: Pod + Send + Sync> Element for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryType {
    Host,
    Device,
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryType::Host => write!(f, "host"),
            MemoryType::Device => write!(f, "device"),
        }
    }
}

/// Source data for `Buffer::set`, tagged with the store it lives in.
pub enum BufferSource<'a, T: Element> {
    Host(&'a [T]),
    Device(&'a DeviceArray<T>),
}

impl<'a, T: Element> BufferSource<'a, T> {
    pub fn memory_type(&self) -> MemoryType {
        match self {
            BufferSource::Host(_) => MemoryType::Host,
            BufferSource::Device(_) => MemoryType::Device,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            BufferSource::Host(data) => data.len(),
            BufferSource::Device(array) => array.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait StorageBackend<T: Element>: Send + Sync {
    fn memory_type(&self) -> MemoryType;
    fn len(&self) -> usize;
    fn allocate(&mut self, count: usize) -> std::result::Result<(), AllocationError>;
    fn free(&mut self);
    fn zero_fill(&mut self);
    fn copy_from_host(&mut self, src: &[T]);
    fn copy_from_device(&mut self, src: &DeviceArray<T>);
    fn read_back(&self, dst: &mut [T]);
    fn source(&self) -> BufferSource<'_, T>;
    fn empty_like(&self) -> Box<dyn StorageBackend<T>>;
    fn view(&self) -> &[T];
    fn view_mut(&mut self) -> &mut [T];
}

pub struct HostStorage<T: Element> {
    data: Vec<T>,
}

impl<T: Element> HostStorage<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }
}

impl<T: Element> Default for HostStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> StorageBackend<T> for HostStorage<T> {
    fn memory_type(&self) -> MemoryType {
        MemoryType::Host
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn allocate(&mut self, count: usize) -> std::result::Result<(), AllocationError> {
        let bytes = count.saturating_mul(std::mem::size_of::<T>());
        let mut data: Vec<T> = Vec::new();
        data.try_reserve_exact(count).map_err(|_| AllocationError { bytes })?;
        data.resize(count, T::zeroed());
        self.data = data;
        Ok(())
    }

    fn free(&mut self) {
        self.data = Vec::new();
    }

    fn zero_fill(&mut self) {
        self.data.fill(T::zeroed());
    }

    fn copy_from_host(&mut self, src: &[T]) {
        let n = src.len().min(self.data.len());
        self.data[..n].copy_from_slice(&src[..n]);
    }

    fn copy_from_device(&mut self, src: &DeviceArray<T>) {
        src.download(&mut self.data);
    }

    fn read_back(&self, dst: &mut [T]) {
        let n = dst.len().min(self.data.len());
        dst[..n].copy_from_slice(&self.data[..n]);
    }

    fn source(&self) -> BufferSource<'_, T> {
        BufferSource::Host(&self.data)
    }

    fn empty_like(&self) -> Box<dyn StorageBackend<T>> {
        Box::new(HostStorage::new())
    }

    fn view(&self) -> &[T] {
        &self.data
    }

    fn view_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

pub struct DeviceStorage<T: Element> {
    device: Arc<Accelerator>,
    array: Option<DeviceArray<T>>,
}

impl<T: Element> DeviceStorage<T> {
    pub fn new(device: &Arc<Accelerator>) -> Self {
        Self { device: Arc::clone(device), array: None }
    }

    pub fn device(&self) -> &Arc<Accelerator> {
        &self.device
    }
}

impl<T: Element> StorageBackend<T> for DeviceStorage<T> {
    fn memory_type(&self) -> MemoryType {
        MemoryType::Device
    }

    fn len(&self) -> usize {
        self.array.as_ref().map_or(0, |array| array.len())
    }

    fn allocate(&mut self, count: usize) -> std::result::Result<(), AllocationError> {
        self.array = None;
        self.array = Some(self.device.allocate_array(count)?);
        Ok(())
    }

    fn free(&mut self) {
        self.array = None;
    }

    fn zero_fill(&mut self) {
        if let Some(array) = self.array.as_mut() {
            array.memset_zero();
        }
    }

    fn copy_from_host(&mut self, src: &[T]) {
        if let Some(array) = self.array.as_mut() {
            array.upload(src);
        }
    }

    fn copy_from_device(&mut self, src: &DeviceArray<T>) {
        if let Some(array) = self.array.as_mut() {
            array.copy_from_device(src);
        }
    }

    fn read_back(&self, dst: &mut [T]) {
        if let Some(array) = self.array.as_ref() {
            array.download(dst);
        }
    }

    fn source(&self) -> BufferSource<'_, T> {
        match self.array.as_ref() {
            Some(array) => BufferSource::Device(array),
            None => BufferSource::Host(&[]),
        }
    }

    fn empty_like(&self) -> Box<dyn StorageBackend<T>> {
        Box::new(DeviceStorage::new(&self.device))
    }

    fn view(&self) -> &[T] {
        match self.array.as_ref() {
            Some(array) => array.kernel_view(),
            None => &[],
        }
    }

    fn view_mut(&mut self) -> &mut [T] {
        match self.array.as_mut() {
            Some(array) => array.kernel_view_mut(),
            None => &mut [],
        }
    }
}

pub struct Buffer<T: Element> {
    name: String,
    storage: Box<dyn StorageBackend<T>>,
    no_elements: usize,
    dirty: AtomicBool,
}

impl<T: Element> Buffer<T> {
    pub fn with_storage(name: &str, storage: Box<dyn StorageBackend<T>>) -> Self {
        Self {
            name: name.to_string(),
            storage,
            no_elements: 0,
            dirty: AtomicBool::new(false),
        }
    }

    pub fn new_host(name: &str) -> Self {
        Self::with_storage(name, Box::new(HostStorage::new()))
    }

    pub fn new_device(name: &str, device: &Arc<Accelerator>) -> Self {
        Self::with_storage(name, Box::new(DeviceStorage::new(device)))
    }

    /// Copy construction: an empty buffer in the same store, then `assign_from`.
    pub fn copy_of(other: &Buffer<T>) -> Result<Self> {
        let mut buffer = Self::with_storage(&other.name, other.storage.empty_like());
        buffer.assign_from(other)?;
        Ok(buffer)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn memory_type(&self) -> MemoryType {
        self.storage.memory_type()
    }

    pub fn no_elements(&self) -> usize {
        self.no_elements
    }

    pub fn no_bytes(&self) -> usize {
        self.no_elements * std::mem::size_of::<T>()
    }

    pub fn is_empty(&self) -> bool {
        self.no_elements == 0
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::Release);
    }

    /// Consumer read of the dirty flag: returns it and clears it.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    pub fn resize(&mut self, no_elements: usize) -> Result<()> {
        if self.no_elements == no_elements && self.storage.len() == no_elements {
            return Ok(());
        }
        self.reallocate(no_elements)
    }

    /// Frees the current allocation and allocates `no_elements` zeroed
    /// elements, even when the count is unchanged.
    pub(crate) fn reallocate(&mut self, no_elements: usize) -> Result<()> {
        self.free();
        self.no_elements = no_elements;

        if no_elements == 0 {
            return Ok(());
        }

        if let Err(err) = self.storage.allocate(no_elements) {
            self.no_elements = 0;
            log::debug!("{}: failed to allocate {} bytes on {}", self.name, err.bytes, self.memory_type());
            return Err(RenderError::AllocationFailure {
                name: self.name.clone(),
                bytes: err.bytes,
                memory: self.memory_type(),
            });
        }

        log::debug!("{}: allocated {:.3} MB on {}", self.name,
                    self.no_bytes() as f64 / (1024.0 * 1024.0), self.memory_type());

        self.reset();
        Ok(())
    }

    pub fn set(&mut self, source: BufferSource<'_, T>, no_elements: usize) -> Result<()> {
        self.resize(no_elements)?;
        self.copy_in(source)
    }

    /// Copies `source` into the current allocation without resizing.
    pub(crate) fn copy_in(&mut self, source: BufferSource<'_, T>) -> Result<()> {
        if self.no_elements == 0 {
            return Ok(());
        }

        if source.len() < self.no_elements {
            return Err(RenderError::SourceSizeMismatch {
                name: self.name.clone(),
                expected: self.no_elements,
                actual: source.len(),
            });
        }

        log::debug!("{}: copy {} -> {} ({} elements)", self.name,
                    source.memory_type(), self.memory_type(), self.no_elements);

        match source {
            BufferSource::Host(data) => self.storage.copy_from_host(&data[..self.no_elements]),
            BufferSource::Device(array) => self.storage.copy_from_device(array),
        }

        self.set_dirty(true);
        Ok(())
    }

    pub fn reset(&mut self) {
        if self.no_elements == 0 {
            return;
        }

        self.storage.zero_fill();
        self.set_dirty(true);
    }

    pub fn free(&mut self) {
        if self.no_elements == 0 && self.storage.len() == 0 {
            return;
        }

        log::debug!("{}: free", self.name);
        self.storage.free();
        self.no_elements = 0;
        self.set_dirty(true);
    }

    /// Deferred sync: content is transferred only when `other` is dirty, and
    /// `other`'s flag is cleared afterwards. The name is always updated.
    pub fn assign_from(&mut self, other: &Buffer<T>) -> Result<()> {
        if other.is_dirty() {
            self.set(other.source(), other.no_elements)?;
            other.set_dirty(false);
        }

        self.name = format!("Copy of {}", other.name);
        Ok(())
    }

    pub(crate) fn source(&self) -> BufferSource<'_, T> {
        self.storage.source()
    }

    /// Host copy of the content, transferred through the proper direction.
    pub fn read_back(&self) -> Vec<T> {
        let mut out = vec![T::zeroed(); self.no_elements];
        self.storage.read_back(&mut out);
        out
    }

    /// Kernel-side view. For device storage this is device memory and is
    /// meant for per-pixel evaluation only.
    pub fn view(&self) -> &[T] {
        self.storage.view()
    }

    pub fn view_mut(&mut self) -> &mut [T] {
        self.storage.view_mut()
    }
}

impl<T: Element> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("name", &self.name)
            .field("memory", &self.memory_type())
            .field("no_elements", &self.no_elements)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_and_device() -> Vec<Buffer<f32>> {
        let device = Accelerator::unbounded("test");
        vec![Buffer::new_host("host"), Buffer::new_device("device", &device)]
    }

    #[test]
    fn test_empty_buffer_is_inert() {
        for mut buffer in host_and_device() {
            assert_eq!(buffer.no_elements(), 0);
            buffer.reset();
            buffer.free();
            assert!(!buffer.is_dirty());
            assert!(buffer.view().is_empty());
        }
    }

    #[test]
    fn test_resize_same_count_is_noop() {
        for mut buffer in host_and_device() {
            buffer.resize(16).unwrap();
            buffer.set_dirty(false);
            let ptr = buffer.view().as_ptr();
            buffer.resize(16).unwrap();
            assert_eq!(buffer.no_elements(), 16);
            assert_eq!(buffer.view().as_ptr(), ptr);
            assert!(!buffer.is_dirty());
        }
    }

    #[test]
    fn test_resize_zero_fills() {
        for mut buffer in host_and_device() {
            let data: Vec<f32> = (0..8).map(|v| v as f32 + 1.0).collect();
            buffer.set(BufferSource::Host(&data), 8).unwrap();
            buffer.resize(12).unwrap();
            assert_eq!(buffer.no_bytes(), 48);
            assert!(buffer.read_back().iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn test_set_four_directions() {
        let device = Accelerator::unbounded("test");
        let data: Vec<f32> = (0..10).map(|v| v as f32 * 0.5).collect();

        let mut host_src = Buffer::new_host("host_src");
        host_src.set(BufferSource::Host(&data), 10).unwrap();
        let mut device_src = Buffer::new_device("device_src", &device);
        device_src.set(BufferSource::Host(&data), 10).unwrap();

        for src in [&host_src, &device_src] {
            let mut host_dst = Buffer::new_host("host_dst");
            host_dst.set(src.source(), 10).unwrap();
            assert_eq!(host_dst.read_back(), data);

            let mut device_dst = Buffer::new_device("device_dst", &device);
            device_dst.set(src.source(), 10).unwrap();
            assert_eq!(device_dst.read_back(), data);
            assert!(device_dst.is_dirty());
        }
    }

    #[test]
    fn test_set_rejects_short_source() {
        let mut buffer: Buffer<f32> = Buffer::new_host("short");
        let err = buffer.set(BufferSource::Host(&[1.0, 2.0]), 4).err().expect("expected error");
        match err {
            RenderError::SourceSizeMismatch { expected, actual, .. } => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_allocation_failure_leaves_buffer_empty() {
        let device = Accelerator::new("tiny", 16);
        let mut buffer: Buffer<f32> = Buffer::new_device("big", &device);
        let err = buffer.resize(1024).err().expect("expected allocation failure");
        match err {
            RenderError::AllocationFailure { name, bytes, memory } => {
                assert_eq!(name, "big");
                assert_eq!(bytes, 4096);
                assert_eq!(memory, MemoryType::Device);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(buffer.no_elements(), 0);
        assert!(buffer.view().is_empty());
    }

    #[test]
    fn test_free_releases_device_memory() {
        let device = Accelerator::unbounded("test");
        let mut buffer: Buffer<u32> = Buffer::new_device("seeds", &device);
        buffer.resize(32).unwrap();
        assert_eq!(device.allocated_bytes(), 128);
        buffer.set_dirty(false);
        buffer.free();
        assert_eq!(device.allocated_bytes(), 0);
        assert_eq!(buffer.no_elements(), 0);
        assert!(buffer.is_dirty());
    }

    #[test]
    fn test_assign_from_syncs_only_when_dirty() {
        let data = [1.0f32, 2.0, 3.0];
        let mut src: Buffer<f32> = Buffer::new_host("src");
        src.set(BufferSource::Host(&data), 3).unwrap();

        let device = Accelerator::unbounded("test");
        let mut dst: Buffer<f32> = Buffer::new_device("dst", &device);
        dst.assign_from(&src).unwrap();
        assert_eq!(dst.read_back(), data.to_vec());
        assert!(!src.is_dirty());
        assert_eq!(dst.name(), "Copy of src");

        // Clean source: content untouched no matter how often it is assigned.
        dst.reset();
        for _ in 0..3 {
            dst.assign_from(&src).unwrap();
            assert_eq!(dst.read_back(), vec![0.0; 3]);
        }
    }

    #[test]
    fn test_copy_of_keeps_store() {
        let device = Accelerator::unbounded("test");
        let mut src: Buffer<u16> = Buffer::new_device("src", &device);
        src.set(BufferSource::Host(&[7, 8]), 2).unwrap();
        let copy = Buffer::copy_of(&src).unwrap();
        assert_eq!(copy.memory_type(), MemoryType::Device);
        assert_eq!(copy.read_back(), vec![7, 8]);
        assert!(!src.is_dirty());
    }
}
