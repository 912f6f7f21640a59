// Copyright @yucwang 2026

//! Accelerator memory domain.
//!
//! Device allocations are only reachable through explicit transfer
//! primitives; per-pixel kernels read them through `kernel_view`.

use crate::core::buffer::Element;

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub struct Accelerator {
    name: String,
    capacity: usize,
    allocated: AtomicUsize,
}

/// An allocation request that could not be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationError {
    pub bytes: usize,
}

impl Accelerator {
    pub fn new(name: &str, capacity_bytes: usize) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            capacity: capacity_bytes,
            allocated: AtomicUsize::new(0),
        })
    }

    pub fn unbounded(name: &str) -> Arc<Self> {
        Self::new(name, usize::MAX)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    /// Array allocation primitive. The array is zero-initialized.
    pub fn allocate_array<T: Element>(self: &Arc<Self>, count: usize) -> Result<DeviceArray<T>, AllocationError> {
        let bytes = count
            .checked_mul(std::mem::size_of::<T>())
            .ok_or(AllocationError { bytes: usize::MAX })?;

        if !self.reserve(bytes) {
            return Err(AllocationError { bytes });
        }

        let mut data: Vec<T> = Vec::new();
        if data.try_reserve_exact(count).is_err() {
            self.release(bytes);
            return Err(AllocationError { bytes });
        }
        data.resize(count, T::zeroed());

        Ok(DeviceArray { device: Arc::clone(self), data, bytes })
    }

    fn reserve(&self, bytes: usize) -> bool {
        let capacity = self.capacity;
        self.allocated
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_add(bytes).filter(|total| *total <= capacity)
            })
            .is_ok()
    }

    fn release(&self, bytes: usize) {
        self.allocated.fetch_sub(bytes, Ordering::AcqRel);
    }
}

impl fmt::Debug for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accelerator")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("allocated", &self.allocated_bytes())
            .finish()
    }
}

/// Accelerator-resident array. Returns its bytes to the device on drop.
pub struct DeviceArray<T: Element> {
    device: Arc<Accelerator>,
    data: Vec<T>,
    bytes: usize,
}

impl<T: Element> DeviceArray<T> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn no_bytes(&self) -> usize {
        self.bytes
    }

    pub fn device(&self) -> &Arc<Accelerator> {
        &self.device
    }

    pub fn memset_zero(&mut self) {
        self.data.fill(T::zeroed());
    }

    /// Host to device. Copies `min(src.len(), self.len())` elements.
    pub fn upload(&mut self, src: &[T]) {
        let n = src.len().min(self.data.len());
        self.data[..n].copy_from_slice(&src[..n]);
    }

    /// Device to host. Copies `min(dst.len(), self.len())` elements.
    pub fn download(&self, dst: &mut [T]) {
        let n = dst.len().min(self.data.len());
        dst[..n].copy_from_slice(&self.data[..n]);
    }

    /// Device to device. Copies `min(src.len(), self.len())` elements.
    pub fn copy_from_device(&mut self, src: &DeviceArray<T>) {
        let n = src.data.len().min(self.data.len());
        self.data[..n].copy_from_slice(&src.data[..n]);
    }

    pub fn kernel_view(&self) -> &[T] {
        &self.data
    }

    pub fn kernel_view_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Element> Drop for DeviceArray<T> {
    fn drop(&mut self) {
        self.device.release(self.bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_is_accounted_and_released() {
        let device = Accelerator::new("test", 1024);
        {
            let array = device.allocate_array::<f32>(64).expect("allocation should fit");
            assert_eq!(array.len(), 64);
            assert_eq!(array.no_bytes(), 256);
            assert_eq!(device.allocated_bytes(), 256);
            assert!(array.kernel_view().iter().all(|v| *v == 0.0));
        }
        assert_eq!(device.allocated_bytes(), 0);
    }

    #[test]
    fn test_allocation_over_capacity_fails() {
        let device = Accelerator::new("small", 100);
        let err = device.allocate_array::<f32>(64).err().expect("allocation should fail");
        assert_eq!(err.bytes, 256);
        assert_eq!(device.allocated_bytes(), 0);
    }

    #[test]
    fn test_transfers() {
        let device = Accelerator::unbounded("test");
        let mut a = device.allocate_array::<u32>(4).unwrap();
        a.upload(&[1, 2, 3, 4]);
        let mut b = device.allocate_array::<u32>(4).unwrap();
        b.copy_from_device(&a);
        let mut host = [0u32; 4];
        b.download(&mut host);
        assert_eq!(host, [1, 2, 3, 4]);
        b.memset_zero();
        b.download(&mut host);
        assert_eq!(host, [0, 0, 0, 0]);
    }
}
