//! CPU kernel implementations
//!
//! Per-instance kernels over raw column-major pointers. The batched trait
//! implementation resolves each instance's address and calls these once
//! per instance.

#![allow(unsafe_op_in_unsafe_fn)] // Kernels are already marked unsafe, inner unsafe is redundant

pub mod gemm;
pub mod memory;
pub mod trtri;

pub use gemm::gemm_kernel;
pub use memory::{copy_kernel, fill_kernel};
pub use trtri::trtri_diag_kernel;

use crate::batch::BatchedView;

/// Address of instance `index` of `view`, displacement applied
///
/// # Safety
/// `view.pointers()` must be a host-addressable array with more than
/// `index` entries.
#[inline]
pub(crate) unsafe fn instance_ptr<T>(view: &BatchedView<'_, T>, index: usize) -> *mut T {
    let base = *(view.pointers() as *const u64).add(index);
    (base as *mut T).add(view.displacement())
}
