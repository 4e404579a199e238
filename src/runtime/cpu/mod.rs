//! CPU runtime implementation
//!
//! The CPU runtime uses standard heap allocation and provides the reference
//! implementation of every batched kernel. Device addresses are host
//! pointers cast to `u64`, so pointer arrays can be dereferenced directly.
//!
//! # Parallelism
//!
//! With the `rayon` feature (on by default), one launch spreads its batch
//! instances over a thread pool. Instances are independent, so results are
//! bitwise identical for any thread count.

mod batched;
mod client;
mod device;
pub(crate) mod kernels;
mod runtime;

pub use client::{CpuAllocator, CpuClient, ParallelismConfig};
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
