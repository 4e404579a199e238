//! Batched triangular solves by inverted diagonal blocks
//!
//! Solves `op(A) * X = alpha * B` or `X * op(A) = alpha * B` for every
//! instance of a batch, where `A` is triangular. The operand is cut into
//! [`TRSM_NB`]-sized diagonal blocks; each block is inverted explicitly
//! and the solve proceeds as a sweep of batched GEMMs:
//!
//! ```text
//! for each chunk i in sweep order:
//!     X[i]      := s * inv(A[i,i]) * R[i]        (s = alpha on the first chunk, else 1)
//!     R[rest]   := s * R[rest] - A[rest,i] * X[i] (skipped after the last chunk)
//! ```
//!
//! `R` starts as a copy of `B`. Every sub-block product addresses its
//! operands through displaced pointer arrays, so a step is one launch for
//! the whole batch.

mod diagnostics;
mod engine;
mod facade;
mod sweep;
mod types;
mod validate;
mod workspace;

pub use diagnostics::find_singular_diagonals;
pub use facade::{trsm, trsm_outofplace, trsm_work};
pub use types::TrsmOp;
pub use workspace::{DisplacementScratch, TRSM_NB, TrsmWorkspace, WorkspaceSizes, workspace_sizes};
