//! Copy and fill kernels

use crate::ops::CopyMode;

/// Copy the `mode` region of an `m x n` column-major matrix
///
/// # Safety
/// `src` and `dst` must be valid for `m x n` with their leading dimensions
/// and must not overlap.
pub unsafe fn copy_kernel<T: Copy>(
    mode: CopyMode,
    m: usize,
    n: usize,
    src: *const T,
    ld_src: usize,
    dst: *mut T,
    ld_dst: usize,
) {
    for j in 0..n {
        let rows = match mode {
            CopyMode::Full => 0..m,
            CopyMode::Upper => 0..m.min(j + 1),
            CopyMode::Lower => j.min(m)..m,
        };
        for i in rows {
            *dst.add(i + j * ld_dst) = *src.add(i + j * ld_src);
        }
    }
}

/// Set every element of an `m x n` region to `value`
///
/// # Safety
/// `dst` must be valid for `m x n` with leading dimension `ld`.
pub unsafe fn fill_kernel<T: Copy>(m: usize, n: usize, value: T, dst: *mut T, ld: usize) {
    for j in 0..n {
        let col = dst.add(j * ld);
        for i in 0..m {
            *col.add(i) = value;
        }
    }
}
