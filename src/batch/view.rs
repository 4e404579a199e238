//! Displaced views over a batch of column-major matrices

use std::marker::PhantomData;

/// A `rows x cols` window into every matrix of a batch
///
/// The view records the device address of the batch's pointer array, the
/// shared leading dimension, and a (row, col) displacement from each
/// instance's base address. Taking a sub-block never allocates or copies:
/// [`offset`](Self::offset) and [`block`](Self::block) only adjust the
/// bookkeeping. Instance `i` of the view starts at
/// `pointers[i] + row_offset + col_offset * ld` elements.
#[derive(Debug, Clone, Copy)]
pub struct BatchedView<'a, T> {
    pointers: u64,
    batch_count: usize,
    rows: usize,
    cols: usize,
    ld: usize,
    row_offset: usize,
    col_offset: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> BatchedView<'a, T> {
    /// Build a view from raw parts
    ///
    /// # Safety
    /// `pointers` must be the device address of an array of at least
    /// `batch_count` instance base addresses, each valid for `ld * cols`
    /// elements of `T`, for the lifetime `'a`.
    pub unsafe fn from_raw(
        pointers: u64,
        batch_count: usize,
        rows: usize,
        cols: usize,
        ld: usize,
    ) -> Self {
        Self {
            pointers,
            batch_count,
            rows,
            cols,
            ld,
            row_offset: 0,
            col_offset: 0,
            _marker: PhantomData,
        }
    }

    /// Sub-view starting `row` rows and `col` columns into this one,
    /// extending to the end of both dimensions
    #[inline]
    pub fn offset(self, row: usize, col: usize) -> Self {
        debug_assert!(row <= self.rows, "row offset {row} > {} rows", self.rows);
        debug_assert!(col <= self.cols, "col offset {col} > {} cols", self.cols);
        Self {
            rows: self.rows - row,
            cols: self.cols - col,
            row_offset: self.row_offset + row,
            col_offset: self.col_offset + col,
            ..self
        }
    }

    /// Sub-view of exactly `rows x cols` starting at (`row`, `col`)
    #[inline]
    pub fn block(self, row: usize, col: usize, rows: usize, cols: usize) -> Self {
        debug_assert!(row + rows <= self.rows && col + cols <= self.cols);
        Self {
            rows,
            cols,
            ..self.offset(row, col)
        }
    }

    /// Same shape, addressed through another pointer array with no
    /// displacement
    ///
    /// Used by the displacement kernel once it has written this view's
    /// displaced addresses into `pointers`.
    pub(crate) fn rebased<'b>(self, pointers: u64) -> BatchedView<'b, T> {
        BatchedView {
            pointers,
            batch_count: self.batch_count,
            rows: self.rows,
            cols: self.cols,
            ld: self.ld,
            row_offset: 0,
            col_offset: 0,
            _marker: PhantomData,
        }
    }

    /// Element displacement from each instance's base address
    #[inline]
    pub fn displacement(&self) -> usize {
        self.row_offset + self.col_offset * self.ld
    }

    /// Device address of the pointer array
    #[inline]
    pub fn pointers(&self) -> u64 {
        self.pointers
    }

    /// Number of matrices in the batch
    #[inline]
    pub fn batch_count(&self) -> usize {
        self.batch_count
    }

    /// Rows visible through the view
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Columns visible through the view
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Leading dimension shared by every instance
    #[inline]
    pub fn ld(&self) -> usize {
        self.ld
    }

    /// Row displacement
    #[inline]
    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// Column displacement
    #[inline]
    pub fn col_offset(&self) -> usize {
        self.col_offset
    }
}
