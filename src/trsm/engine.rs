//! Blocked triangular solve over a batch
//!
//! The solve never substitutes: each diagonal block is applied through its
//! explicit inverse with one batched GEMM, and one more GEMM removes the
//! solved chunk's contribution from the rest of the right-hand side.

use super::TrsmOp;
use super::sweep::SweepPlan;
use super::workspace::DisplacementScratch;
use crate::batch::BatchedView;
use crate::dtype::Scalar;
use crate::error::Result;
use crate::ops::{BatchedKernels, Diag, Side, Transpose, Uplo};
use crate::runtime::Runtime;

/// Invert the diagonal blocks of `a` into `inv`
pub(crate) fn invert_diagonal_blocks<R, T>(
    client: &R::Client,
    uplo: Uplo,
    diag: Diag,
    k: usize,
    nb: usize,
    a: BatchedView<'_, T>,
    inv: BatchedView<'_, T>,
) -> Result<()>
where
    R: Runtime,
    T: Scalar,
    R::Client: BatchedKernels<R, T>,
{
    client.trtri_diag_batched(uplo, diag, k, nb, a, inv, true)
}

/// Solve `op` chunk by chunk
///
/// `residual` holds the right-hand side on entry and is consumed: every
/// trailing update rewrites its unsolved part. The solution is written to
/// `x`. `inv` must already hold the inverted diagonal blocks for block
/// size `nb`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn solve_blocked<R, T>(
    client: &R::Client,
    op: &TrsmOp<T>,
    nb: usize,
    a: BatchedView<'_, T>,
    residual: BatchedView<'_, T>,
    x: BatchedView<'_, T>,
    inv: BatchedView<'_, T>,
    scratch: &DisplacementScratch<R>,
) -> Result<()>
where
    R: Runtime,
    T: Scalar,
    R::Client: BatchedKernels<R, T>,
{
    let plan = SweepPlan::new(op.side, op.uplo, op.trans, op.k(), nb);
    let (m, n) = (op.m, op.n);
    let trans = op.trans;
    let no_trans = Transpose::NoTrans;
    let neg_one = -T::one();

    for chunk in plan.chunks() {
        let (i, jb) = (chunk.offset, chunk.size);
        let scale = if chunk.first { op.alpha } else { T::one() };

        let inv_i = client.displace(inv.block(0, i, jb, jb), &scratch.inv)?;
        let x_i = match op.side {
            Side::Left => {
                let r_i = client.displace(residual.block(i, 0, jb, n), &scratch.b)?;
                let x_i = client.displace(x.block(i, 0, jb, n), &scratch.x)?;
                client.gemm_batched(
                    trans,
                    no_trans,
                    jb,
                    n,
                    jb,
                    scale,
                    inv_i,
                    r_i,
                    T::zero(),
                    x_i,
                )?;
                x_i
            }
            Side::Right => {
                let r_i = client.displace(residual.block(0, i, m, jb), &scratch.b)?;
                let x_i = client.displace(x.block(0, i, m, jb), &scratch.x)?;
                client.gemm_batched(
                    no_trans,
                    trans,
                    m,
                    jb,
                    jb,
                    scale,
                    r_i,
                    inv_i,
                    T::zero(),
                    x_i,
                )?;
                x_i
            }
        };

        if chunk.last {
            log::trace!("trsm chunk {i}+{jb}: solved, sweep done");
            break;
        }

        let rem = plan.remaining(&chunk);
        let len = rem.len();
        log::trace!("trsm chunk {i}+{jb}: solved, updating {}..{}", rem.start, rem.end);

        let (ar, ac, arows, acols) = plan.coupling_block(&chunk, &rem);
        let a_blk = client.displace(a.block(ar, ac, arows, acols), &scratch.a)?;
        match op.side {
            Side::Left => {
                let r_rem = client.displace(residual.block(rem.start, 0, len, n), &scratch.b)?;
                client.gemm_batched(
                    trans,
                    no_trans,
                    len,
                    n,
                    jb,
                    neg_one,
                    a_blk,
                    x_i,
                    scale,
                    r_rem,
                )?;
            }
            Side::Right => {
                let r_rem = client.displace(residual.block(0, rem.start, m, len), &scratch.b)?;
                client.gemm_batched(
                    no_trans,
                    trans,
                    m,
                    len,
                    jb,
                    neg_one,
                    x_i,
                    a_blk,
                    scale,
                    r_rem,
                )?;
            }
        }
    }

    Ok(())
}
