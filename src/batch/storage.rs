//! Storage: device memory management with Arc-based sharing

use crate::error::Result;
use crate::runtime::{Allocator, Runtime, RuntimeClient};
use std::sync::Arc;

/// Untyped device buffer
///
/// Storage wraps device memory with reference counting, so several pointer
/// arrays (for instance a batch presented in permuted order) can address
/// the same buffer without copying.
///
/// Memory is returned to the allocator it came from when the last
/// reference is dropped.
pub struct Storage<R: Runtime> {
    inner: Arc<StorageInner<R>>,
}

struct StorageInner<R: Runtime> {
    /// Raw device pointer (GPU address or CPU ptr cast to u64)
    ptr: u64,
    size_bytes: usize,
    device: R::Device,
    allocator: R::Allocator,
}

impl<R: Runtime> Storage<R> {
    /// Allocate `size_bytes` of uninitialized device memory through the
    /// client's allocator
    pub fn new(client: &R::Client, size_bytes: usize) -> Result<Self> {
        let allocator = client.allocator().clone();
        let ptr = allocator.allocate(size_bytes)?;

        Ok(Self {
            inner: Arc::new(StorageInner {
                ptr,
                size_bytes,
                device: client.device().clone(),
                allocator,
            }),
        })
    }

    /// Allocate device memory and copy `data` into it
    pub fn from_bytes(client: &R::Client, data: &[u8]) -> Result<Self> {
        let storage = Self::new(client, data.len())?;
        if !data.is_empty() {
            R::copy_to_device(data, storage.ptr(), storage.device())?;
        }
        Ok(storage)
    }

    /// Get the raw device pointer
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.inner.ptr
    }

    /// Get size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.inner.size_bytes
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        &self.inner.device
    }

    /// Get the reference count
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Whether both handles refer to the same allocation
    #[inline]
    pub fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Copy device bytes starting at `offset` into `dst`
    pub fn read_bytes(&self, offset: usize, dst: &mut [u8]) -> Result<()> {
        debug_assert!(offset + dst.len() <= self.inner.size_bytes);
        if dst.is_empty() {
            return Ok(());
        }
        R::copy_from_device(self.inner.ptr + offset as u64, dst, &self.inner.device)
    }

    /// Copy data from device to host
    pub fn to_vec<T: bytemuck::Pod>(&self) -> Result<Vec<T>> {
        // Allocate with T's alignment, then view as bytes for the copy
        let mut result = vec![T::zeroed(); self.inner.size_bytes / std::mem::size_of::<T>()];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut result);
        self.read_bytes(0, bytes)?;
        Ok(result)
    }
}

impl<R: Runtime> Clone for Storage<R> {
    /// Clone increments the reference count (zero-copy)
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Runtime> Drop for StorageInner<R> {
    fn drop(&mut self) {
        if self.ptr != 0 {
            self.allocator.deallocate(self.ptr, self.size_bytes);
        }
    }
}

impl<R: Runtime> std::fmt::Debug for Storage<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("ptr", &format!("0x{:x}", self.inner.ptr))
            .field("size_bytes", &self.inner.size_bytes)
            .field("refs", &Arc::strong_count(&self.inner))
            .finish()
    }
}
