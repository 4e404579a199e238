//! Memory allocator traits and default implementation
//!
//! The Allocator trait provides device memory management with usage
//! tracking. Tracking makes scratch-buffer lifetimes observable: a call that
//! allocates its own workspace must hand every byte back on every exit path.

use crate::error::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Memory allocator trait for runtime backends
pub trait Allocator: Clone + Send + Sync {
    /// Allocate memory of given size
    ///
    /// Returns a device pointer (u64) that can be used for operations.
    /// Returns `Err(OutOfMemory)` if the request cannot be satisfied.
    fn allocate(&self, size_bytes: usize) -> Result<u64>;

    /// Deallocate memory
    fn deallocate(&self, ptr: u64, size_bytes: usize);

    /// Get the total allocated bytes
    fn allocated_bytes(&self) -> usize {
        0 // Default: tracking not supported
    }

    /// Number of allocations not yet returned
    fn live_allocations(&self) -> usize {
        0
    }
}

#[derive(Debug, Default)]
struct AllocStats {
    bytes: AtomicUsize,
    live: AtomicUsize,
}

/// Default allocator that delegates to Runtime methods
///
/// Calls the runtime's allocate/deallocate and keeps byte and allocation
/// counters shared between clones. An optional byte limit makes the
/// allocator refuse requests with `OutOfMemory` once it would be exceeded.
#[derive(Clone, Debug)]
pub struct DefaultAllocator<D> {
    device: D,
    allocate_fn: fn(usize, &D) -> Result<u64>,
    deallocate_fn: fn(u64, usize, &D),
    limit: Option<usize>,
    stats: Arc<AllocStats>,
}

impl<D: Clone + Send + Sync> DefaultAllocator<D> {
    /// Create a new default allocator
    pub fn new(
        device: D,
        allocate_fn: fn(usize, &D) -> Result<u64>,
        deallocate_fn: fn(u64, usize, &D),
    ) -> Self {
        Self {
            device,
            allocate_fn,
            deallocate_fn,
            limit: None,
            stats: Arc::new(AllocStats::default()),
        }
    }

    /// Cap the total number of live bytes
    pub fn with_limit(mut self, limit_bytes: usize) -> Self {
        self.limit = Some(limit_bytes);
        self
    }

    /// Get the device this allocator is associated with
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Configured byte limit, if any
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

impl<D: Clone + Send + Sync> Allocator for DefaultAllocator<D> {
    fn allocate(&self, size_bytes: usize) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }

        let previous = self.stats.bytes.fetch_add(size_bytes, Ordering::AcqRel);
        if let Some(limit) = self.limit {
            if previous.saturating_add(size_bytes) > limit {
                self.stats.bytes.fetch_sub(size_bytes, Ordering::AcqRel);
                return Err(Error::OutOfMemory { size: size_bytes });
            }
        }

        match (self.allocate_fn)(size_bytes, &self.device) {
            Ok(ptr) => {
                self.stats.live.fetch_add(1, Ordering::AcqRel);
                Ok(ptr)
            }
            Err(e) => {
                self.stats.bytes.fetch_sub(size_bytes, Ordering::AcqRel);
                Err(e)
            }
        }
    }

    fn deallocate(&self, ptr: u64, size_bytes: usize) {
        if ptr == 0 || size_bytes == 0 {
            return;
        }
        (self.deallocate_fn)(ptr, size_bytes, &self.device);
        self.stats.bytes.fetch_sub(size_bytes, Ordering::AcqRel);
        self.stats.live.fetch_sub(1, Ordering::AcqRel);
    }

    fn allocated_bytes(&self) -> usize {
        self.stats.bytes.load(Ordering::Acquire)
    }

    fn live_allocations(&self) -> usize {
        self.stats.live.load(Ordering::Acquire)
    }
}
