//! Traversal plan for the eight (side, uplo, trans) variants
//!
//! The triangular operand is cut into chunks at multiples of the block
//! size, so a short chunk, if any, sits at the high-index end. A forward
//! sweep meets it last; a backward sweep starts on it.

use crate::ops::{Side, Transpose, Uplo};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    /// From offset 0 towards `k`
    Forward,
    /// From the last chunk towards offset 0
    Backward,
}

/// Where the block of `A` coupling a solved chunk to the remaining
/// right-hand side is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Panel {
    /// `A[remaining, chunk]`
    Column,
    /// `A[chunk, remaining]`
    Row,
}

/// One record per variant: direction of travel and which panel of `A`
/// feeds the trailing update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SweepPlan {
    pub direction: Direction,
    pub panel: Panel,
    k: usize,
    nb: usize,
}

impl SweepPlan {
    pub fn new(side: Side, uplo: Uplo, trans: Transpose, k: usize, nb: usize) -> Self {
        use Direction::*;
        use Panel::*;

        let transposed = trans.is_transposed();
        let (direction, panel) = match (side, uplo, transposed) {
            (Side::Left, Uplo::Lower, false) => (Forward, Column),
            (Side::Left, Uplo::Lower, true) => (Backward, Row),
            (Side::Left, Uplo::Upper, false) => (Backward, Column),
            (Side::Left, Uplo::Upper, true) => (Forward, Row),
            (Side::Right, Uplo::Lower, false) => (Backward, Row),
            (Side::Right, Uplo::Lower, true) => (Forward, Column),
            (Side::Right, Uplo::Upper, false) => (Forward, Row),
            (Side::Right, Uplo::Upper, true) => (Backward, Column),
        };

        Self {
            direction,
            panel,
            k,
            nb,
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.k.div_ceil(self.nb)
    }

    /// Chunks in the order they are solved
    pub fn chunks(&self) -> impl Iterator<Item = Chunk> + '_ {
        let count = self.chunk_count();
        (0..count).map(move |step| {
            let index = match self.direction {
                Direction::Forward => step,
                Direction::Backward => count - 1 - step,
            };
            let offset = index * self.nb;
            Chunk {
                offset,
                size: self.nb.min(self.k - offset),
                first: step == 0,
                last: step + 1 == count,
            }
        })
    }

    /// Rows (`Left`) or columns (`Right`) not yet solved once `chunk` is
    pub fn remaining(&self, chunk: &Chunk) -> Range<usize> {
        match self.direction {
            Direction::Forward => chunk.offset + chunk.size..self.k,
            Direction::Backward => 0..chunk.offset,
        }
    }

    /// `(row, col, rows, cols)` of the `A` block coupling `chunk` to
    /// `remaining`
    pub fn coupling_block(
        &self,
        chunk: &Chunk,
        remaining: &Range<usize>,
    ) -> (usize, usize, usize, usize) {
        let len = remaining.end - remaining.start;
        match self.panel {
            Panel::Column => (remaining.start, chunk.offset, len, chunk.size),
            Panel::Row => (chunk.offset, remaining.start, chunk.size, len),
        }
    }
}

/// A run of `size` rows (`Left`) or columns (`Right`) starting at `offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Chunk {
    pub offset: usize,
    pub size: usize,
    /// Solved first: carries the `alpha` scaling
    pub first: bool,
    /// Solved last: no trailing update follows
    pub last: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(plan: &SweepPlan) -> Vec<(usize, usize)> {
        plan.chunks().map(|c| (c.offset, c.size)).collect()
    }

    #[test]
    fn test_forward_partial_block_is_last() {
        let plan = SweepPlan::new(Side::Left, Uplo::Lower, Transpose::NoTrans, 5, 2);
        assert_eq!(plan.direction, Direction::Forward);
        assert_eq!(offsets(&plan), [(0, 2), (2, 2), (4, 1)]);
    }

    #[test]
    fn test_backward_starts_on_partial_block() {
        let plan = SweepPlan::new(Side::Left, Uplo::Lower, Transpose::Trans, 5, 2);
        assert_eq!(plan.direction, Direction::Backward);
        assert_eq!(offsets(&plan), [(4, 1), (2, 2), (0, 2)]);

        let chunks: Vec<_> = plan.chunks().collect();
        assert!(chunks[0].first && !chunks[0].last);
        assert!(chunks[2].last && !chunks[2].first);
    }

    #[test]
    fn test_directions_table() {
        use Direction::*;
        let cases = [
            (Side::Left, Uplo::Lower, Transpose::NoTrans, Forward),
            (Side::Left, Uplo::Lower, Transpose::ConjTrans, Backward),
            (Side::Left, Uplo::Upper, Transpose::NoTrans, Backward),
            (Side::Left, Uplo::Upper, Transpose::Trans, Forward),
            (Side::Right, Uplo::Lower, Transpose::NoTrans, Backward),
            (Side::Right, Uplo::Lower, Transpose::Trans, Forward),
            (Side::Right, Uplo::Upper, Transpose::NoTrans, Forward),
            (Side::Right, Uplo::Upper, Transpose::ConjTrans, Backward),
        ];
        for (side, uplo, trans, expected) in cases {
            let plan = SweepPlan::new(side, uplo, trans, 4, 2);
            assert_eq!(plan.direction, expected, "{side:?} {uplo:?} {trans:?}");
        }
    }

    #[test]
    fn test_coupling_block_stays_in_stored_triangle() {
        for side in [Side::Left, Side::Right] {
            for uplo in [Uplo::Lower, Uplo::Upper] {
                for trans in [Transpose::NoTrans, Transpose::Trans] {
                    let plan = SweepPlan::new(side, uplo, trans, 7, 3);
                    for chunk in plan.chunks().filter(|c| !c.last) {
                        let rem = plan.remaining(&chunk);
                        let (r, c, rows, cols) = plan.coupling_block(&chunk, &rem);
                        assert!(rows > 0 && cols > 0);
                        // every entry strictly inside the stored triangle
                        let stored = match uplo {
                            Uplo::Lower => r >= c + cols,
                            Uplo::Upper => c >= r + rows,
                        };
                        assert!(
                            stored,
                            "{side:?} {uplo:?} {trans:?} block ({r},{c}) {rows}x{cols}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_chunk_has_no_remaining() {
        let plan = SweepPlan::new(Side::Right, Uplo::Upper, Transpose::NoTrans, 3, 128);
        let chunks: Vec<_> = plan.chunks().collect();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].first && chunks[0].last);
        assert!(plan.remaining(&chunks[0]).is_empty());
    }

    #[test]
    fn test_exact_multiple_has_no_short_chunk() {
        let plan = SweepPlan::new(Side::Left, Uplo::Upper, Transpose::NoTrans, 6, 3);
        assert_eq!(offsets(&plan), [(3, 3), (0, 3)]);
        let empty = SweepPlan::new(Side::Left, Uplo::Upper, Transpose::NoTrans, 0, 3);
        assert_eq!(empty.chunk_count(), 0);
    }
}
