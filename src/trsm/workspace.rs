//! Workspace sizing and ownership for blocked triangular solves

use crate::batch::{BatchedMatrix, PointerArray};
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::ops::Side;
use crate::runtime::Runtime;

/// Block size of the blocked solve
///
/// The triangular operand is split into `TRSM_NB x TRSM_NB` diagonal
/// blocks; the diagonal-block inverter and the sweep both use this value,
/// and it fixes the inverted-diagonal workspace size formula.
pub const TRSM_NB: usize = 128;

/// Element counts a solve needs, per batch instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceSizes {
    /// Order of the triangular operand
    pub k: usize,
    /// `ceil(k / NB) * NB * NB`: inverted diagonal blocks
    pub diag_workspace_size: usize,
    /// Leading dimension of the solution buffer (`m`)
    pub solution_ld: usize,
    /// `solution_ld * n`: solution buffer
    pub solution_size: usize,
    /// `m * n`: running right-hand side consumed by the sweep
    pub residual_size: usize,
}

impl WorkspaceSizes {
    /// Number of diagonal blocks
    #[inline]
    pub fn block_count(&self, nb: usize) -> usize {
        self.k.div_ceil(nb)
    }
}

/// Workspace requirements for an `m x n` right-hand side
///
/// Pure function of its inputs. Fails only when the sizes do not fit in
/// `usize`, reporting `m` (position 2) or `n` (position 3).
pub fn workspace_sizes(side: Side, m: usize, n: usize) -> Result<WorkspaceSizes> {
    sizes_for_block(side, m, n, TRSM_NB)
        .ok_or_else(|| overflow_error(side, (2, 3)))
}

pub(crate) fn overflow_error(side: Side, (m_pos, n_pos): (usize, usize)) -> Error {
    match side {
        Side::Left => Error::invalid_argument(m_pos, "m", "workspace size overflows usize"),
        Side::Right => Error::invalid_argument(n_pos, "n", "workspace size overflows usize"),
    }
}

pub(crate) fn sizes_for_block(side: Side, m: usize, n: usize, nb: usize) -> Option<WorkspaceSizes> {
    let k = match side {
        Side::Left => m,
        Side::Right => n,
    };
    let diag_workspace_size = k.div_ceil(nb).checked_mul(nb)?.checked_mul(nb)?;
    let solution_size = m.checked_mul(n)?;
    Some(WorkspaceSizes {
        k,
        diag_workspace_size,
        solution_ld: m,
        solution_size,
        residual_size: solution_size,
    })
}

/// Pointer arrays rewritten by the displacement kernel before every
/// sub-block product
///
/// One array per operand that moves during the sweep: the triangular
/// operand, the running right-hand side, the solution and the inverted
/// diagonal blocks.
pub struct DisplacementScratch<R: Runtime> {
    pub(crate) a: PointerArray<R>,
    pub(crate) b: PointerArray<R>,
    pub(crate) x: PointerArray<R>,
    pub(crate) inv: PointerArray<R>,
}

impl<R: Runtime> DisplacementScratch<R> {
    /// Zeroed arrays for `batch_count` instances
    pub fn new(client: &R::Client, batch_count: usize) -> Result<Self> {
        Ok(Self {
            a: PointerArray::new(client, batch_count)?,
            b: PointerArray::new(client, batch_count)?,
            x: PointerArray::new(client, batch_count)?,
            inv: PointerArray::new(client, batch_count)?,
        })
    }

    /// Instances every array can address
    pub fn capacity(&self) -> usize {
        self.a
            .len()
            .min(self.b.len())
            .min(self.x.len())
            .min(self.inv.len())
    }
}

impl<R: Runtime> std::fmt::Debug for DisplacementScratch<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplacementScratch")
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Caller-owned scratch of a triangular solve
///
/// Holds the inverted diagonal blocks (an `NB x ceil(k/NB)*NB` matrix per
/// instance, block `j` in columns `j*NB..(j+1)*NB`), the running residual
/// and the displacement arrays. A workspace whose diagonal blocks were
/// filled by one solve can be passed to later solves against the same
/// triangular operand with diagonal inversion turned off.
pub struct TrsmWorkspace<R: Runtime, T: Element> {
    pub(crate) inv_diag: BatchedMatrix<R, T>,
    pub(crate) residual: BatchedMatrix<R, T>,
    pub(crate) scratch: DisplacementScratch<R>,
    pub(crate) block_size: usize,
}

impl<R: Runtime, T: Element> TrsmWorkspace<R, T> {
    /// Zero-initialized workspace for solves of `m x n` right-hand sides
    pub fn allocate(
        client: &R::Client,
        side: Side,
        m: usize,
        n: usize,
        batch_count: usize,
    ) -> Result<Self> {
        Self::allocate_with_block(client, side, m, n, batch_count, TRSM_NB)
    }

    pub(crate) fn allocate_with_block(
        client: &R::Client,
        side: Side,
        m: usize,
        n: usize,
        batch_count: usize,
        nb: usize,
    ) -> Result<Self> {
        let sizes = sizes_for_block(side, m, n, nb).ok_or_else(|| overflow_error(side, (2, 3)))?;
        let inv_cols = sizes.block_count(nb) * nb;

        let inv_diag = BatchedMatrix::zeros(client, nb, inv_cols, nb, batch_count)?;
        let residual = BatchedMatrix::zeros(client, m, n, m.max(1), batch_count)?;
        let scratch = DisplacementScratch::new(client, batch_count)?;

        Ok(Self {
            inv_diag,
            residual,
            scratch,
            block_size: nb,
        })
    }

    /// Assemble a workspace from caller-built parts
    ///
    /// `inv_diag` must be `TRSM_NB` rows by at least `ceil(k/TRSM_NB)*TRSM_NB`
    /// columns and `residual` at least `m x n`; this is checked when the
    /// workspace is used.
    pub fn from_parts(
        inv_diag: BatchedMatrix<R, T>,
        residual: BatchedMatrix<R, T>,
        scratch: DisplacementScratch<R>,
    ) -> Self {
        Self {
            inv_diag,
            residual,
            scratch,
            block_size: TRSM_NB,
        }
    }

    /// Inverted diagonal blocks
    pub fn inv_diag(&self) -> &BatchedMatrix<R, T> {
        &self.inv_diag
    }

    /// Running residual buffer
    pub fn residual(&self) -> &BatchedMatrix<R, T> {
        &self.residual
    }

    /// Displacement arrays
    pub fn scratch(&self) -> &DisplacementScratch<R> {
        &self.scratch
    }

    /// Block size the diagonal inverses are laid out for
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Elements of inverted diagonal storage per instance
    pub fn diag_capacity(&self) -> usize {
        self.inv_diag.rows() * self.inv_diag.cols()
    }

    /// Instances the workspace serves
    pub fn batch_count(&self) -> usize {
        self.inv_diag.batch_count()
    }
}

impl<R: Runtime, T: Element> std::fmt::Debug for TrsmWorkspace<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrsmWorkspace")
            .field("block_size", &self.block_size)
            .field("inv_diag", &self.inv_diag)
            .field("residual", &self.residual)
            .field("scratch", &self.scratch)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_left_and_right() {
        let s = workspace_sizes(Side::Left, 5, 3).unwrap();
        assert_eq!(s.k, 5);
        assert_eq!(s.diag_workspace_size, TRSM_NB * TRSM_NB);
        assert_eq!(s.solution_ld, 5);
        assert_eq!(s.solution_size, 15);
        assert_eq!(s.residual_size, 15);

        let s = workspace_sizes(Side::Right, 5, 300).unwrap();
        assert_eq!(s.k, 300);
        assert_eq!(s.diag_workspace_size, 3 * TRSM_NB * TRSM_NB);
        assert_eq!(s.solution_ld, 5);
    }

    #[test]
    fn test_sizes_at_block_boundaries() {
        for (k, blocks) in [(0, 0), (1, 1), (128, 1), (129, 2), (256, 2), (257, 3)] {
            let s = workspace_sizes(Side::Left, k, 1).unwrap();
            assert_eq!(s.diag_workspace_size, blocks * TRSM_NB * TRSM_NB, "k = {k}");
            assert!(s.diag_workspace_size >= k.div_ceil(TRSM_NB) * TRSM_NB * TRSM_NB);
            assert_eq!(s.block_count(TRSM_NB), blocks);
        }
    }

    #[test]
    fn test_sizes_small_block() {
        let s = sizes_for_block(Side::Left, 3, 3, 2).unwrap();
        assert_eq!(s.diag_workspace_size, 8);
        assert_eq!(s.block_count(2), 2);
    }

    #[test]
    fn test_sizes_overflow() {
        let err = workspace_sizes(Side::Left, usize::MAX, 2).unwrap_err();
        assert_eq!(err.position(), Some(2));
        let err = workspace_sizes(Side::Right, 2, usize::MAX).unwrap_err();
        assert_eq!(err.position(), Some(3));
    }
}
