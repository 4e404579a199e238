//! Data type system for batched matrices
//!
//! `DType` names the element type of a device buffer at runtime; `Element`
//! and `Scalar` connect Rust types to it at compile time.

pub mod complex;
mod element;
mod scalar;

pub use complex::{Complex64, Complex128};
pub use element::Element;
pub use scalar::Scalar;

use std::fmt;

/// Element types supported by the batched kernels
///
/// Discriminant values are stable so that serialized descriptors stay
/// compatible.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u8)]
pub enum DType {
    /// 64-bit floating point
    F64 = 0,
    /// 32-bit floating point
    F32 = 1,
    /// 64-bit complex (two f32: re, im)
    Complex64 = 40,
    /// 128-bit complex (two f64: re, im)
    Complex128 = 41,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::Complex128 => 16,
            Self::F64 | Self::Complex64 => 8,
            Self::F32 => 4,
        }
    }

    /// Returns true if this is a complex number type
    #[inline]
    pub const fn is_complex(self) -> bool {
        matches!(self, Self::Complex64 | Self::Complex128)
    }

    /// BLAS precision prefix (`s`, `d`, `c`, `z`)
    pub const fn blas_prefix(self) -> char {
        match self {
            Self::F32 => 's',
            Self::F64 => 'd',
            Self::Complex64 => 'c',
            Self::Complex128 => 'z',
        }
    }

    /// Short name for display (e.g., "f32", "c128")
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
            Self::Complex64 => "c64",
            Self::Complex128 => "c128",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_match_rust_types() {
        assert_eq!(DType::F32.size_in_bytes(), std::mem::size_of::<f32>());
        assert_eq!(DType::F64.size_in_bytes(), std::mem::size_of::<f64>());
        assert_eq!(
            DType::Complex64.size_in_bytes(),
            std::mem::size_of::<Complex64>()
        );
        assert_eq!(
            DType::Complex128.size_in_bytes(),
            std::mem::size_of::<Complex128>()
        );
    }

    #[test]
    fn test_blas_prefix() {
        assert_eq!(DType::F32.blas_prefix(), 's');
        assert_eq!(DType::Complex128.blas_prefix(), 'z');
        assert!(DType::Complex64.is_complex());
        assert!(!DType::F64.is_complex());
    }
}
