//! Host-side argument checks shared by every solve entry point
//!
//! All checks run before anything is enqueued. Failures carry the 1-based
//! position of the offending argument; see [`Positions`].

use super::TrsmOp;
use super::workspace::{WorkspaceSizes, overflow_error, sizes_for_block};
use crate::batch::BatchedMatrix;
use crate::dtype::Scalar;
use crate::error::{Error, Result};
use crate::runtime::Runtime;

/// Argument positions of one entry point's signature
#[derive(Debug, Clone, Copy)]
pub(crate) struct Positions {
    pub m: usize,
    pub n: usize,
    pub a: usize,
    pub b: usize,
    pub x: usize,
    pub workspace: usize,
}

/// `(side, uplo, trans, diag, invert_diagonal, m, n, alpha, a, b, x, workspace)`
pub(crate) const WITH_WORKSPACE: Positions = Positions {
    m: 6,
    n: 7,
    a: 9,
    b: 10,
    x: 11,
    workspace: 12,
};

/// `(side, uplo, trans, diag, m, n, alpha, a, b)`
///
/// `x` and `workspace` are internal to the self-contained solve; their
/// positions are never reported because the solve sizes them itself.
pub(crate) const SELF_CONTAINED: Positions = Positions {
    m: 5,
    n: 6,
    a: 8,
    b: 9,
    x: 0,
    workspace: 0,
};

fn check_matrix<R: Runtime, T: Scalar>(
    mat: &BatchedMatrix<R, T>,
    position: usize,
    arg: &'static str,
    rows: usize,
    cols: usize,
    batch_count: usize,
) -> Result<()> {
    let min_ld = rows.max(1);
    if mat.ld() < min_ld {
        return Err(Error::invalid_argument(
            position,
            arg,
            format!("leading dimension {} < max(1, {rows})", mat.ld()),
        ));
    }
    if mat.rows() < rows || mat.cols() < cols {
        return Err(Error::invalid_argument(
            position,
            arg,
            format!(
                "{}x{} matrix cannot hold {rows}x{cols}",
                mat.rows(),
                mat.cols()
            ),
        ));
    }
    if mat.batch_count() != batch_count {
        return Err(Error::invalid_argument(
            position,
            arg,
            format!(
                "batch of {} does not match {batch_count} triangular operands",
                mat.batch_count()
            ),
        ));
    }
    Ok(())
}

/// Check the dimensions and the caller's `a` and `b`
///
/// Returns the workspace requirements for block size `nb`.
pub(crate) fn check_operands<R: Runtime, T: Scalar>(
    op: &TrsmOp<T>,
    nb: usize,
    a: &BatchedMatrix<R, T>,
    b: &BatchedMatrix<R, T>,
    pos: &Positions,
) -> Result<WorkspaceSizes> {
    let sizes = sizes_for_block(op.side, op.m, op.n, nb)
        .ok_or_else(|| overflow_error(op.side, (pos.m, pos.n)))?;
    let batch_count = a.batch_count();

    check_matrix(a, pos.a, "a", sizes.k, sizes.k, batch_count)?;
    check_matrix(b, pos.b, "b", op.m, op.n, batch_count)?;
    Ok(sizes)
}

/// Check the solution buffer
///
/// `x` is written while `a` and `b` are still being read, so it must not
/// share storage with either of them.
pub(crate) fn check_solution<R: Runtime, T: Scalar>(
    op: &TrsmOp<T>,
    a: &BatchedMatrix<R, T>,
    b: &BatchedMatrix<R, T>,
    x: &BatchedMatrix<R, T>,
    pos: &Positions,
) -> Result<()> {
    check_matrix(x, pos.x, "x", op.m, op.n, a.batch_count())?;
    if x.shares_storage(a) || x.shares_storage(b) {
        return Err(Error::invalid_argument(
            pos.x,
            "x",
            "solution buffer shares storage with an input",
        ));
    }
    Ok(())
}

/// Check a caller-supplied workspace against the requirements
pub(crate) fn check_workspace<R: Runtime, T: Scalar>(
    op: &TrsmOp<T>,
    sizes: &WorkspaceSizes,
    workspace: &super::TrsmWorkspace<R, T>,
    batch_count: usize,
    pos: &Positions,
) -> Result<()> {
    let too_small = |what: String| {
        Error::invalid_argument(
            pos.workspace,
            "workspace",
            format!("workspace too small: {what}"),
        )
    };

    let nb = workspace.block_size;
    let inv = &workspace.inv_diag;
    let inv_cols = sizes.block_count(nb) * nb;
    if inv.rows() < nb
        || inv.cols() < inv_cols
        || workspace.diag_capacity() < sizes.diag_workspace_size
    {
        return Err(too_small(format!(
            "{} inverted-diagonal elements ({}x{}), need {} ({nb}x{inv_cols})",
            workspace.diag_capacity(),
            inv.rows(),
            inv.cols(),
            sizes.diag_workspace_size
        )));
    }

    let residual = &workspace.residual;
    if residual.rows() < op.m || residual.cols() < op.n {
        return Err(too_small(format!(
            "{}x{} residual, need {}x{}",
            residual.rows(),
            residual.cols(),
            op.m,
            op.n
        )));
    }

    if workspace.scratch.capacity() < batch_count {
        return Err(too_small(format!(
            "displacement arrays address {} instances, batch has {batch_count}",
            workspace.scratch.capacity()
        )));
    }

    if inv.batch_count() != batch_count || residual.batch_count() != batch_count {
        return Err(Error::invalid_argument(
            pos.workspace,
            "workspace",
            format!(
                "workspace serves {} instances, batch has {batch_count}",
                inv.batch_count().min(residual.batch_count())
            ),
        ));
    }
    Ok(())
}
