//! Diagonal-block inversion of a triangular operand

use crate::dtype::Scalar;
use crate::ops::{Diag, Uplo};

/// Invert the `nb x nb` diagonal blocks of one `n x n` triangular instance
///
/// Block `j` of `a` is inverted into columns `j*nb ..` of `inv` (leading
/// dimension `ldinv`); the trailing block may be shorter than `nb`. Only
/// the `uplo` triangle of each block is read, and the diagonal is skipped
/// for unit-diagonal operands. Singular blocks are not detected: a zero
/// pivot yields non-finite entries in that block's inverse.
///
/// # Safety
/// - `a` must be valid for an `n x n` matrix with leading dimension `lda`
/// - `inv` must be valid for `nb x ceil(n/nb)*nb` with leading dimension `ldinv >= nb`
#[allow(clippy::too_many_arguments)]
pub unsafe fn trtri_diag_kernel<T: Scalar>(
    uplo: Uplo,
    diag: Diag,
    n: usize,
    nb: usize,
    a: *const T,
    lda: usize,
    inv: *mut T,
    ldinv: usize,
    reset_to_zero: bool,
) {
    if n == 0 || nb == 0 {
        return;
    }

    for blk in 0..n.div_ceil(nb) {
        let off = blk * nb;
        let jb = nb.min(n - off);
        let dst = inv.add(off * ldinv);

        if reset_to_zero {
            for j in 0..nb {
                for i in 0..nb {
                    *dst.add(i + j * ldinv) = T::zero();
                }
            }
        }

        invert_block(uplo, diag, jb, a.add(off + off * lda), lda, dst, ldinv);
    }
}

/// Column-by-column substitution against the identity
unsafe fn invert_block<T: Scalar>(
    uplo: Uplo,
    diag: Diag,
    jb: usize,
    a: *const T,
    lda: usize,
    inv: *mut T,
    ldinv: usize,
) {
    let unit = diag.is_unit();
    let zero = T::zero();
    let at = |i: usize, j: usize| unsafe { *a.add(i + j * lda) };
    let pivot = |i: usize| if unit { T::one() } else { at(i, i) };

    for j in 0..jb {
        let col = inv.add(j * ldinv);
        match uplo {
            Uplo::Lower => {
                for i in 0..j {
                    *col.add(i) = zero;
                }
                *col.add(j) = T::one() / pivot(j);
                for i in j + 1..jb {
                    let mut s = zero;
                    for p in j..i {
                        s = s + at(i, p) * *col.add(p);
                    }
                    *col.add(i) = -s / pivot(i);
                }
            }
            Uplo::Upper => {
                for i in j + 1..jb {
                    *col.add(i) = zero;
                }
                *col.add(j) = T::one() / pivot(j);
                for i in (0..j).rev() {
                    let mut s = zero;
                    for p in i + 1..=j {
                        s = s + at(i, p) * *col.add(p);
                    }
                    *col.add(i) = -s / pivot(i);
                }
            }
        }
    }
}
