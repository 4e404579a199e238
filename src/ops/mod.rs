//! Backend operation traits and BLAS flags

mod batched;
mod flags;

pub use batched::BatchedKernels;
pub use flags::{CopyMode, Diag, Side, Transpose, Uplo};
