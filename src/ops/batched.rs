//! Batched kernel trait: the primitives a blocked triangular solve is
//! assembled from.

use super::flags::{CopyMode, Diag, Transpose, Uplo};
use crate::batch::{BatchedView, PointerArray};
use crate::dtype::Scalar;
use crate::error::Result;
use crate::runtime::{Runtime, RuntimeClient};

/// Batched kernels a backend provides for one element type.
///
/// Every method is one launch on the client's ordered queue and operates on
/// all `batch_count` instances uniformly; instances never exchange data.
/// Launches may complete asynchronously to the host, but each observes the
/// results of every launch issued before it on the same client.
///
/// Views passed in may carry a displacement; kernels apply it to every
/// instance's base address. Output views must not overlap input views
/// within an instance.
///
/// # Type Parameter
///
/// `T: Scalar` - element type (f32, f64, Complex64, Complex128)
pub trait BatchedKernels<R: Runtime, T: Scalar>: RuntimeClient<R> {
    /// Materialize a displaced view into a flat pointer array
    ///
    /// Writes `src.pointers[i] + src.displacement()` (in elements) into
    /// `dst[i]` for every instance and returns a view of the same shape that
    /// addresses the sub-block through `dst` with no displacement.
    fn displace<'p>(
        &self,
        src: BatchedView<'_, T>,
        dst: &'p PointerArray<R>,
    ) -> Result<BatchedView<'p, T>>;

    /// Batched GEMM: `C := alpha * op(A) * op(B) + beta * C`
    ///
    /// `op(A)` is `m x k`, `op(B)` is `k x n`, `C` is `m x n`. With
    /// `beta == 0`, `C` is not read.
    #[allow(clippy::too_many_arguments)]
    fn gemm_batched(
        &self,
        trans_a: Transpose,
        trans_b: Transpose,
        m: usize,
        n: usize,
        k: usize,
        alpha: T,
        a: BatchedView<'_, T>,
        b: BatchedView<'_, T>,
        beta: T,
        c: BatchedView<'_, T>,
    ) -> Result<()>;

    /// Invert the `nb x nb` diagonal blocks of an `n x n` triangular operand
    ///
    /// Block `j` (rows and columns `j*nb .. min((j+1)*nb, n)`) is inverted
    /// into columns `j*nb ..` of `inv`, so `inv` must be at least
    /// `nb x ceil(n/nb)*nb`. The trailing block may be shorter than `nb`.
    /// Only the `uplo` triangle of `a` is read, and its diagonal only when
    /// `diag` is `NonUnit`. With `reset_to_zero` the full `nb x nb` slot is
    /// cleared first, so padding of a short block reads as zero.
    #[allow(clippy::too_many_arguments)]
    fn trtri_diag_batched(
        &self,
        uplo: Uplo,
        diag: Diag,
        n: usize,
        nb: usize,
        a: BatchedView<'_, T>,
        inv: BatchedView<'_, T>,
        reset_to_zero: bool,
    ) -> Result<()>;

    /// Copy the `mode` region of an `m x n` matrix from `src` into `dst`
    fn copy_batched(
        &self,
        mode: CopyMode,
        m: usize,
        n: usize,
        src: BatchedView<'_, T>,
        dst: BatchedView<'_, T>,
    ) -> Result<()>;

    /// Set every element of an `m x n` region to `value`
    fn fill_batched(&self, m: usize, n: usize, value: T, dst: BatchedView<'_, T>) -> Result<()>;
}
