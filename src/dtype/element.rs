//! Element trait for mapping Rust types to DType

use super::{Complex64, Complex128, DType};
use bytemuck::{Pod, Zeroable};
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Sub};

/// Trait for types that can be stored in a batched matrix
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - kernels move values across worker threads
/// - `Pod + Zeroable` - buffers are untyped device memory (bytemuck)
/// - `Add + Sub + Mul + Div` - arithmetic operations (Output = Self)
pub trait Element:
    Copy
    + Clone
    + Send
    + Sync
    + Pod
    + Zeroable
    + Debug
    + PartialEq
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert from f64 to this type
    ///
    /// For complex types, this creates a real number (imaginary part = 0).
    fn from_f64(v: f64) -> Self;

    /// Zero value
    fn zero() -> Self;

    /// One value
    fn one() -> Self;
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }
}

impl Element for Complex64 {
    const DTYPE: DType = DType::Complex64;

    #[inline]
    fn from_f64(v: f64) -> Self {
        Complex64::new(v as f32, 0.0)
    }

    #[inline]
    fn zero() -> Self {
        Complex64::ZERO
    }

    #[inline]
    fn one() -> Self {
        Complex64::ONE
    }
}

impl Element for Complex128 {
    const DTYPE: DType = DType::Complex128;

    #[inline]
    fn from_f64(v: f64) -> Self {
        Complex128::new(v, 0.0)
    }

    #[inline]
    fn zero() -> Self {
        Complex128::ZERO
    }

    #[inline]
    fn one() -> Self {
        Complex128::ONE
    }
}
