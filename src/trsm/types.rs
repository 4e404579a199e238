//! Triangular-solve operation descriptor

use crate::dtype::Scalar;
use crate::error::{Error, Result};
use crate::ops::{Diag, Side, Transpose, Uplo};

/// One batched triangular solve
///
/// Solves `op(A) * X = alpha * B` (`Side::Left`) or `X * op(A) = alpha * B`
/// (`Side::Right`) for every instance, where `B` and `X` are `m x n` and the
/// triangular operand `A` is `k x k` with `k` given by [`k`](Self::k).
///
/// The fields are, in order, argument positions 1 to 4 of every entry point
/// followed by the dimensions and the scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrsmOp<T> {
    /// Side `A` multiplies from
    pub side: Side,
    /// Stored triangle of `A`
    pub uplo: Uplo,
    /// Operation applied to `A`
    pub trans: Transpose,
    /// Unit or non-unit diagonal
    pub diag: Diag,
    /// Rows of `B` and `X`
    pub m: usize,
    /// Columns of `B` and `X`
    pub n: usize,
    /// Scale applied to `B`
    pub alpha: T,
}

impl<T: Scalar> TrsmOp<T> {
    /// Describe a solve
    pub fn new(
        side: Side,
        uplo: Uplo,
        trans: Transpose,
        diag: Diag,
        m: usize,
        n: usize,
        alpha: T,
    ) -> Self {
        Self {
            side,
            uplo,
            trans,
            diag,
            m,
            n,
            alpha,
        }
    }

    /// Describe a solve from LAPACK option characters
    ///
    /// An unrecognized character is reported as an invalid argument at its
    /// position (1 for `side` through 4 for `diag`).
    ///
    /// ```
    /// # use batrix::trsm::TrsmOp;
    /// # use batrix::ops::{Side, Transpose};
    /// let op = TrsmOp::from_lapack('L', 'L', 'C', 'N', 4, 2, 1.0f64).unwrap();
    /// assert_eq!(op.side, Side::Left);
    /// assert_eq!(op.trans, Transpose::ConjTrans);
    ///
    /// let err = TrsmOp::from_lapack('L', 'X', 'N', 'N', 4, 2, 1.0f64).unwrap_err();
    /// assert_eq!(err.info(), -2);
    /// ```
    pub fn from_lapack(
        side: char,
        uplo: char,
        trans: char,
        diag: char,
        m: usize,
        n: usize,
        alpha: T,
    ) -> Result<Self> {
        let bad = |position, arg, c: char| {
            Error::invalid_argument(position, arg, format!("unrecognized option '{c}'"))
        };
        Ok(Self {
            side: Side::from_char(side).ok_or_else(|| bad(1, "side", side))?,
            uplo: Uplo::from_char(uplo).ok_or_else(|| bad(2, "uplo", uplo))?,
            trans: Transpose::from_char(trans).ok_or_else(|| bad(3, "trans", trans))?,
            diag: Diag::from_char(diag).ok_or_else(|| bad(4, "diag", diag))?,
            m,
            n,
            alpha,
        })
    }

    /// Order of the triangular operand: `m` for `Left`, `n` for `Right`
    #[inline]
    pub fn k(&self) -> usize {
        match self.side {
            Side::Left => self.m,
            Side::Right => self.n,
        }
    }

    /// True when there is nothing to solve
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.m == 0 || self.n == 0
    }
}
