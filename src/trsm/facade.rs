//! Public solve entry points
//!
//! Three layers, each validating its own arguments:
//!
//! | Entry point | Caller supplies | Result |
//! |---|---|---|
//! | [`trsm_outofplace`] | `a`, `b`, `x`, workspace | `x` holds the solution, `b` untouched |
//! | [`trsm_work`] | `a`, `b`, `x`, workspace | `b` overwritten with the solution |
//! | [`trsm`] | `a`, `b` | `b` overwritten; scratch allocated and released internally |
//!
//! Argument errors are reported before anything is enqueued, with the
//! position of the offending argument counted from `side = 1`:
//!
//! ```text
//! trsm_outofplace / trsm_work:
//!   side=1 uplo=2 trans=3 diag=4 invert_diagonal=5 m=6 n=7 alpha=8
//!   a=9 b=10 x=11 workspace=12
//! trsm:
//!   side=1 uplo=2 trans=3 diag=4 m=5 n=6 alpha=7 a=8 b=9
//! ```
//!
//! Singular diagonal blocks are not detected; the affected instances come
//! back with non-finite entries. See
//! [`find_singular_diagonals`](super::find_singular_diagonals) for an
//! opt-in check.

use super::engine::{invert_diagonal_blocks, solve_blocked};
use super::validate::{self, Positions, SELF_CONTAINED, WITH_WORKSPACE};
use super::workspace::{TRSM_NB, TrsmWorkspace};
use super::TrsmOp;
use crate::batch::BatchedMatrix;
use crate::dtype::Scalar;
use crate::error::Result;
use crate::ops::{BatchedKernels, CopyMode};
use crate::runtime::{Runtime, RuntimeClient};

/// Solve into a separate buffer
///
/// Computes `x := alpha * op(a)^-1 * b` (`Side::Left`) or
/// `x := alpha * b * op(a)^-1` (`Side::Right`) for every instance. `b` is
/// copied into the workspace residual and never written.
///
/// With `invert_diagonal == false` the workspace must already hold the
/// inverted diagonal blocks of `a`, typically from an earlier solve
/// against the same `a` with the same workspace.
///
/// Returns as soon as the work is enqueued; call
/// [`RuntimeClient::synchronize`] before reading `x` on an asynchronous
/// backend.
pub fn trsm_outofplace<R, T>(
    client: &R::Client,
    op: &TrsmOp<T>,
    invert_diagonal: bool,
    a: &BatchedMatrix<R, T>,
    b: &BatchedMatrix<R, T>,
    x: &mut BatchedMatrix<R, T>,
    workspace: &mut TrsmWorkspace<R, T>,
) -> Result<()>
where
    R: Runtime,
    T: Scalar,
    R::Client: BatchedKernels<R, T>,
{
    outofplace_checked(client, op, invert_diagonal, a, b, x, workspace, &WITH_WORKSPACE)
}

/// Solve in place using caller-supplied scratch
///
/// Runs [`trsm_outofplace`] into `x`, then copies `x` back into `b`.
pub fn trsm_work<R, T>(
    client: &R::Client,
    op: &TrsmOp<T>,
    invert_diagonal: bool,
    a: &BatchedMatrix<R, T>,
    b: &mut BatchedMatrix<R, T>,
    x: &mut BatchedMatrix<R, T>,
    workspace: &mut TrsmWorkspace<R, T>,
) -> Result<()>
where
    R: Runtime,
    T: Scalar,
    R::Client: BatchedKernels<R, T>,
{
    work_checked(client, op, invert_diagonal, a, b, x, workspace, &WITH_WORKSPACE)
}

/// Solve in place, allocating all scratch internally
///
/// Sizes the workspace and the solution buffer, zero-initializes them,
/// solves with diagonal inversion and releases everything before
/// returning. The queue is synchronized before release on every exit path,
/// so this call blocks until its work has completed.
///
/// # Example
///
/// ```
/// use batrix::prelude::*;
/// use batrix::trsm::{TrsmOp, trsm};
///
/// let client = CpuRuntime::default_client(&CpuRuntime::default_device());
///
/// // one 2x2 lower-triangular system, column-major
/// let a_host = [[2.0, 1.0, 0.0, 4.0]];
/// let a = BatchedMatrix::<CpuRuntime, f64>::from_instances(&client, 2, 2, 2, &a_host)?;
/// let mut b = BatchedMatrix::from_instances(&client, 2, 1, 2, &[[2.0, 9.0]])?;
///
/// let op = TrsmOp::new(Side::Left, Uplo::Lower, Transpose::NoTrans, Diag::NonUnit, 2, 1, 1.0);
/// trsm(&client, &op, &a, &mut b)?;
///
/// assert_eq!(b.instance(0)?, vec![1.0, 2.0]);
/// # Ok::<(), batrix::error::Error>(())
/// ```
pub fn trsm<R, T>(
    client: &R::Client,
    op: &TrsmOp<T>,
    a: &BatchedMatrix<R, T>,
    b: &mut BatchedMatrix<R, T>,
) -> Result<()>
where
    R: Runtime,
    T: Scalar,
    R::Client: BatchedKernels<R, T>,
{
    trsm_with_block(client, op, a, b, TRSM_NB)
}

/// Scratch owned by a self-contained solve
///
/// Dropping it waits for the queue before the buffers go back to the
/// allocator.
struct ScopedScratch<'c, R: Runtime, T: Scalar> {
    client: &'c R::Client,
    workspace: TrsmWorkspace<R, T>,
    x: BatchedMatrix<R, T>,
}

impl<R: Runtime, T: Scalar> Drop for ScopedScratch<'_, R, T> {
    fn drop(&mut self) {
        self.client.synchronize();
    }
}

pub(crate) fn trsm_with_block<R, T>(
    client: &R::Client,
    op: &TrsmOp<T>,
    a: &BatchedMatrix<R, T>,
    b: &mut BatchedMatrix<R, T>,
    nb: usize,
) -> Result<()>
where
    R: Runtime,
    T: Scalar,
    R::Client: BatchedKernels<R, T>,
{
    let sizes = validate::check_operands(op, nb, a, b, &SELF_CONTAINED)?;
    if op.is_empty() {
        return Ok(());
    }
    let batch_count = a.batch_count();

    log::debug!(
        "trsm: allocating {} + {} + {} elements per instance for {batch_count} instances",
        sizes.diag_workspace_size,
        sizes.residual_size,
        sizes.solution_size
    );
    let allocated = TrsmWorkspace::allocate_with_block(client, op.side, op.m, op.n, batch_count, nb)
        .and_then(|workspace| {
            let x = BatchedMatrix::zeros(client, op.m, op.n, sizes.solution_ld, batch_count)?;
            Ok((workspace, x))
        });
    let (workspace, x) = match allocated {
        Ok(parts) => parts,
        Err(e) => {
            log::warn!("trsm: scratch allocation failed: {e}");
            return Err(e);
        }
    };

    let mut scratch = ScopedScratch {
        client,
        workspace,
        x,
    };
    let ScopedScratch { workspace, x, .. } = &mut scratch;
    work_checked(client, op, true, a, b, x, workspace, &SELF_CONTAINED)
}

#[allow(clippy::too_many_arguments)]
fn work_checked<R, T>(
    client: &R::Client,
    op: &TrsmOp<T>,
    invert_diagonal: bool,
    a: &BatchedMatrix<R, T>,
    b: &mut BatchedMatrix<R, T>,
    x: &mut BatchedMatrix<R, T>,
    workspace: &mut TrsmWorkspace<R, T>,
    pos: &Positions,
) -> Result<()>
where
    R: Runtime,
    T: Scalar,
    R::Client: BatchedKernels<R, T>,
{
    outofplace_checked(client, op, invert_diagonal, a, b, x, workspace, pos)?;
    if op.is_empty() {
        return Ok(());
    }
    client.copy_batched(CopyMode::Full, op.m, op.n, x.view(), b.view())
}

#[allow(clippy::too_many_arguments)]
fn outofplace_checked<R, T>(
    client: &R::Client,
    op: &TrsmOp<T>,
    invert_diagonal: bool,
    a: &BatchedMatrix<R, T>,
    b: &BatchedMatrix<R, T>,
    x: &mut BatchedMatrix<R, T>,
    workspace: &mut TrsmWorkspace<R, T>,
    pos: &Positions,
) -> Result<()>
where
    R: Runtime,
    T: Scalar,
    R::Client: BatchedKernels<R, T>,
{
    let nb = workspace.block_size;
    let sizes = validate::check_operands(op, nb, a, b, pos)?;
    let batch_count = a.batch_count();
    validate::check_solution(op, a, b, x, pos)?;
    validate::check_workspace(op, &sizes, workspace, batch_count, pos)?;

    if op.is_empty() {
        return Ok(());
    }

    log::debug!(
        "trsm {:?}/{:?}/{:?}/{:?}: m={} n={} batch={batch_count} nb={nb} invert={invert_diagonal}",
        op.side,
        op.uplo,
        op.trans,
        op.diag,
        op.m,
        op.n
    );

    let residual = workspace.residual.view();
    client.copy_batched(CopyMode::Full, op.m, op.n, b.view(), residual)?;

    let inv = workspace.inv_diag.view();
    if invert_diagonal {
        invert_diagonal_blocks::<R, T>(
            client,
            op.uplo,
            op.diag,
            sizes.k,
            nb,
            a.view(),
            inv,
        )?;
    }

    solve_blocked(
        client,
        op,
        nb,
        a.view(),
        residual,
        x.view(),
        inv,
        &workspace.scratch,
    )
}
