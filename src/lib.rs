//! # batrix
//!
//! **Batched triangular solves built from inverted diagonal blocks and
//! batched GEMM.**
//!
//! batrix solves `op(A) * X = alpha * B` or `X * op(A) = alpha * B` for many
//! independent, same-shaped problems at once. Every step of the blocked
//! algorithm is a single launch over the whole batch, so small problems
//! keep a device busy.
//!
//! ## Layers
//!
//! - **Runtime**: [`Runtime`](runtime::Runtime), its devices, an ordered
//!   command queue ([`RuntimeClient`](runtime::RuntimeClient)) and a
//!   tracking allocator. A reference CPU backend is always built.
//! - **Batches**: [`BatchedMatrix`](batch::BatchedMatrix) owns the
//!   instances and their device pointer array;
//!   [`BatchedView`](batch::BatchedView) selects a sub-block of every
//!   instance by displacement.
//! - **Kernels**: [`BatchedKernels`](ops::BatchedKernels) is the backend
//!   seam: displacement, GEMM, diagonal-block inversion, copy and fill.
//! - **Solves**: [`trsm`](trsm::trsm), [`trsm_work`](trsm::trsm_work) and
//!   [`trsm_outofplace`](trsm::trsm_outofplace).
//!
//! ## Quick Start
//!
//! ```rust
//! use batrix::prelude::*;
//! use batrix::trsm::{TrsmOp, trsm};
//!
//! let client = CpuRuntime::default_client(&CpuRuntime::default_device());
//!
//! // two upper-triangular 2x2 operands, column-major
//! let a = BatchedMatrix::<CpuRuntime, f64>::from_instances(
//!     &client, 2, 2, 2,
//!     &[[1.0, 0.0, 2.0, 4.0], [2.0, 0.0, 0.0, 1.0]],
//! )?;
//! let mut b = BatchedMatrix::identity(&client, 2, 2)?;
//!
//! let op = TrsmOp::new(Side::Left, Uplo::Upper, Transpose::NoTrans, Diag::NonUnit, 2, 2, 1.0);
//! trsm(&client, &op, &a, &mut b)?; // b now holds inv(A) per instance
//! # assert_eq!(b.instance(1)?, vec![0.5, 0.0, 0.0, 1.0]);
//! # Ok::<(), batrix::error::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): spread the instances of each CPU launch over threads

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod runtime;
pub mod trsm;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::batch::{BatchedMatrix, BatchedView};
    pub use crate::dtype::{Complex64, Complex128, DType, Element, Scalar};
    pub use crate::error::{Error, Result};
    pub use crate::ops::{BatchedKernels, CopyMode, Diag, Side, Transpose, Uplo};
    pub use crate::runtime::cpu::{CpuClient, CpuRuntime};
    pub use crate::runtime::{Device, Runtime, RuntimeClient};
    pub use crate::trsm::{TRSM_NB, TrsmOp, TrsmWorkspace};
}
