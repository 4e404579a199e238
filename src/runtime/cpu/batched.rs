//! CPU implementation of the batched kernel primitives

use super::kernels::{copy_kernel, fill_kernel, gemm_kernel, instance_ptr, trtri_diag_kernel};
use super::{CpuClient, CpuRuntime};
use crate::batch::{BatchedView, PointerArray};
use crate::dtype::Scalar;
use crate::error::{Error, Result};
use crate::ops::{BatchedKernels, CopyMode, Diag, Transpose, Uplo};

fn ensure_same_batch(op: &str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::Backend(format!(
            "{op}: operand batch {got} does not match launch batch {expected}"
        )));
    }
    Ok(())
}

fn ensure_fits<T>(op: &str, view: &BatchedView<'_, T>, rows: usize, cols: usize) -> Result<()> {
    if rows > view.rows() || cols > view.cols() {
        return Err(Error::Backend(format!(
            "{op}: {rows}x{cols} region exceeds {}x{} view",
            view.rows(),
            view.cols()
        )));
    }
    Ok(())
}

impl<T: Scalar> BatchedKernels<CpuRuntime, T> for CpuClient {
    fn displace<'p>(
        &self,
        src: BatchedView<'_, T>,
        dst: &'p PointerArray<CpuRuntime>,
    ) -> Result<BatchedView<'p, T>> {
        let batch = src.batch_count();
        if dst.len() < batch {
            return Err(Error::Backend(format!(
                "displace: pointer array holds {} entries, batch has {batch}",
                dst.len()
            )));
        }

        let out = dst.ptr();
        self.launch(batch, |i| unsafe {
            let addr = instance_ptr(&src, i) as u64;
            *(out as *mut u64).add(i) = addr;
        });

        Ok(src.rebased(out))
    }

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
    ) -> Result<()> {
        let batch = c.batch_count();
        ensure_same_batch("gemm", batch, a.batch_count())?;
        ensure_same_batch("gemm", batch, b.batch_count())?;
        ensure_fits("gemm", &c, m, n)?;
        let (a_rows, a_cols) = if trans_a.is_transposed() { (k, m) } else { (m, k) };
        let (b_rows, b_cols) = if trans_b.is_transposed() { (n, k) } else { (k, n) };
        ensure_fits("gemm", &a, a_rows, a_cols)?;
        ensure_fits("gemm", &b, b_rows, b_cols)?;

        self.launch(batch, |i| unsafe {
            gemm_kernel(
                trans_a,
                trans_b,
                m,
                n,
                k,
                alpha,
                instance_ptr(&a, i),
                a.ld(),
                instance_ptr(&b, i),
                b.ld(),
                beta,
                instance_ptr(&c, i),
                c.ld(),
            );
        });
        Ok(())
    }

    fn trtri_diag_batched(
        &self,
        uplo: Uplo,
        diag: Diag,
        n: usize,
        nb: usize,
        a: BatchedView<'_, T>,
        inv: BatchedView<'_, T>,
        reset_to_zero: bool,
    ) -> Result<()> {
        let batch = a.batch_count();
        ensure_same_batch("trtri_diag", batch, inv.batch_count())?;
        ensure_fits("trtri_diag", &a, n, n)?;
        if nb == 0 {
            return Err(Error::Backend("trtri_diag: block size must be positive".into()));
        }
        ensure_fits("trtri_diag", &inv, nb, n.div_ceil(nb) * nb)?;

        self.launch(batch, |i| unsafe {
            trtri_diag_kernel(
                uplo,
                diag,
                n,
                nb,
                instance_ptr(&a, i),
                a.ld(),
                instance_ptr(&inv, i),
                inv.ld(),
                reset_to_zero,
            );
        });
        Ok(())
    }

    fn copy_batched(
        &self,
        mode: CopyMode,
        m: usize,
        n: usize,
        src: BatchedView<'_, T>,
        dst: BatchedView<'_, T>,
    ) -> Result<()> {
        let batch = dst.batch_count();
        ensure_same_batch("copy", batch, src.batch_count())?;
        ensure_fits("copy", &src, m, n)?;
        ensure_fits("copy", &dst, m, n)?;

        self.launch(batch, |i| unsafe {
            copy_kernel(
                mode,
                m,
                n,
                instance_ptr(&src, i),
                src.ld(),
                instance_ptr(&dst, i),
                dst.ld(),
            );
        });
        Ok(())
    }

    fn fill_batched(&self, m: usize, n: usize, value: T, dst: BatchedView<'_, T>) -> Result<()> {
        ensure_fits("fill", &dst, m, n)?;
        self.launch(dst.batch_count(), |i| unsafe {
            fill_kernel(m, n, value, instance_ptr(&dst, i), dst.ld());
        });
        Ok(())
    }
}
