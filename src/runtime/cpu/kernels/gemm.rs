//! General matrix multiply on one column-major instance

use crate::dtype::Scalar;
use crate::ops::Transpose;

#[inline(always)]
unsafe fn load<T: Scalar>(ptr: *const T, trans: Transpose, row: usize, col: usize, ld: usize) -> T {
    match trans {
        Transpose::NoTrans => *ptr.add(row + col * ld),
        Transpose::Trans => *ptr.add(col + row * ld),
        Transpose::ConjTrans => (*ptr.add(col + row * ld)).conj(),
    }
}

/// `C := alpha * op(A) * op(B) + beta * C` for one instance
///
/// `op(A)` is `m x k`, `op(B)` is `k x n`; all matrices column-major.
/// With `beta == 0`, `C` is overwritten without being read, so it may hold
/// garbage (including NaN) on entry.
///
/// # Safety
/// - All pointers must be valid for the specified dimensions and strides
/// - `c` must not alias with `a` or `b`
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemm_kernel<T: Scalar>(
    trans_a: Transpose,
    trans_b: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: *const T,
    lda: usize,
    b: *const T,
    ldb: usize,
    beta: T,
    c: *mut T,
    ldc: usize,
) {
    if m == 0 || n == 0 {
        return;
    }
    let zero = T::zero();

    for j in 0..n {
        let c_col = c.add(j * ldc);

        if beta == zero {
            for i in 0..m {
                *c_col.add(i) = zero;
            }
        } else if beta != T::one() {
            for i in 0..m {
                *c_col.add(i) = beta * *c_col.add(i);
            }
        }

        if k == 0 || alpha == zero {
            continue;
        }

        if trans_a.is_transposed() {
            // Column i of A is row i of op(A): dot products
            let conj_a = trans_a.conjugates();
            for i in 0..m {
                let a_col = a.add(i * lda);
                let mut sum = zero;
                for p in 0..k {
                    let av = if conj_a {
                        (*a_col.add(p)).conj()
                    } else {
                        *a_col.add(p)
                    };
                    sum = sum + av * load(b, trans_b, p, j, ldb);
                }
                *c_col.add(i) = *c_col.add(i) + alpha * sum;
            }
        } else {
            // axpy over columns of A
            for p in 0..k {
                let t = alpha * load(b, trans_b, p, j, ldb);
                let a_col = a.add(p * lda);
                for i in 0..m {
                    *c_col.add(i) = *c_col.add(i) + *a_col.add(i) * t;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::Complex128;

    // op(X)[i, j] on a packed column-major rows x cols matrix
    fn op_at(x: &[f64], rows: usize, trans: Transpose, i: usize, j: usize) -> f64 {
        match trans {
            Transpose::NoTrans => x[i + j * rows],
            _ => x[j + i * rows],
        }
    }

    #[test]
    fn test_gemm_all_transpose_pairs() {
        let (m, n, k) = (3, 2, 4);
        let a_nt: Vec<f64> = (0..m * k).map(|v| v as f64 * 0.5 - 1.0).collect(); // m x k
        let a_t: Vec<f64> = (0..k * m).map(|v| v as f64 * 0.25 + 0.5).collect(); // k x m
        let b_nt: Vec<f64> = (0..k * n).map(|v| 2.0 - v as f64).collect(); // k x n
        let b_t: Vec<f64> = (0..n * k).map(|v| v as f64 * 0.75).collect(); // n x k

        for ta in [Transpose::NoTrans, Transpose::Trans] {
            for tb in [Transpose::NoTrans, Transpose::Trans] {
                let (a, lda) = if ta.is_transposed() { (&a_t, k) } else { (&a_nt, m) };
                let (b, ldb) = if tb.is_transposed() { (&b_t, n) } else { (&b_nt, k) };
                let mut c = vec![1.0f64; m * n];

                unsafe {
                    gemm_kernel(
                        ta,
                        tb,
                        m,
                        n,
                        k,
                        2.0,
                        a.as_ptr(),
                        lda,
                        b.as_ptr(),
                        ldb,
                        -1.0,
                        c.as_mut_ptr(),
                        m,
                    );
                }

                for j in 0..n {
                    for i in 0..m {
                        let mut expected = -1.0;
                        for p in 0..k {
                            expected +=
                                2.0 * op_at(a, lda, ta, i, p) * op_at(b, ldb, tb, p, j);
                        }
                        assert!(
                            (c[i + j * m] - expected).abs() < 1e-12,
                            "{ta:?}/{tb:?} C[{i},{j}] = {} vs {expected}",
                            c[i + j * m]
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_gemm_beta_zero_ignores_nan() {
        let a = [1.0f64, 2.0];
        let b = [3.0f64];
        let mut c = [f64::NAN, f64::NAN];
        unsafe {
            gemm_kernel(
                Transpose::NoTrans,
                Transpose::NoTrans,
                2,
                1,
                1,
                1.0,
                a.as_ptr(),
                2,
                b.as_ptr(),
                1,
                0.0,
                c.as_mut_ptr(),
                2,
            );
        }
        assert_eq!(c, [3.0, 6.0]);
    }

    #[test]
    fn test_gemm_conj_trans_conjugates() {
        // 1x1: conj(a) * b
        let a = [Complex128::new(1.0, 2.0)];
        let b = [Complex128::new(0.0, 1.0)];
        let mut c = [Complex128::ZERO];
        unsafe {
            gemm_kernel(
                Transpose::ConjTrans,
                Transpose::NoTrans,
                1,
                1,
                1,
                Complex128::ONE,
                a.as_ptr(),
                1,
                b.as_ptr(),
                1,
                Complex128::ZERO,
                c.as_mut_ptr(),
                1,
            );
        }
        // (1 - 2i) * i = 2 + i
        assert_eq!(c[0], Complex128::new(2.0, 1.0));
    }
}
