//! Batched matrix containers
//!
//! A batch is a set of same-shaped column-major matrices addressed through
//! a device-resident pointer array. [`BatchedView`] selects the same
//! sub-block of every instance by displacement, without copying.

mod matrix;
mod pointer_array;
mod storage;
mod view;

pub use matrix::BatchedMatrix;
pub use pointer_array::PointerArray;
pub use storage::Storage;
pub use view::BatchedView;
