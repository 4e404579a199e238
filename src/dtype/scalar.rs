//! Scalar trait for elements that take part in triangular solves

use super::{Complex64, Complex128, Element};
use std::ops::Neg;

/// Elements that support the operations a triangular solve needs.
///
/// Extends `Element` with conjugation (for `ConjTrans`), a magnitude used by
/// diagnostics and residual checks, and the machine epsilon of the
/// underlying real type.
pub trait Scalar: Element + Neg<Output = Self> {
    /// Complex conjugate (identity for real types)
    fn conj(self) -> Self;

    /// Absolute value / complex magnitude, widened to f64
    fn modulus(self) -> f64;

    /// Machine epsilon of the underlying real type
    fn epsilon() -> f64;

    /// All components finite
    fn is_finite_val(self) -> bool;
}

impl Scalar for f32 {
    #[inline]
    fn conj(self) -> Self {
        self
    }
    #[inline]
    fn modulus(self) -> f64 {
        self.abs() as f64
    }
    #[inline]
    fn epsilon() -> f64 {
        f32::EPSILON as f64
    }
    #[inline]
    fn is_finite_val(self) -> bool {
        self.is_finite()
    }
}

impl Scalar for f64 {
    #[inline]
    fn conj(self) -> Self {
        self
    }
    #[inline]
    fn modulus(self) -> f64 {
        self.abs()
    }
    #[inline]
    fn epsilon() -> f64 {
        f64::EPSILON
    }
    #[inline]
    fn is_finite_val(self) -> bool {
        self.is_finite()
    }
}

impl Scalar for Complex64 {
    #[inline]
    fn conj(self) -> Self {
        Complex64::conj(self)
    }
    #[inline]
    fn modulus(self) -> f64 {
        self.magnitude() as f64
    }
    #[inline]
    fn epsilon() -> f64 {
        f32::EPSILON as f64
    }
    #[inline]
    fn is_finite_val(self) -> bool {
        self.is_finite()
    }
}

impl Scalar for Complex128 {
    #[inline]
    fn conj(self) -> Self {
        Complex128::conj(self)
    }
    #[inline]
    fn modulus(self) -> f64 {
        self.magnitude()
    }
    #[inline]
    fn epsilon() -> f64 {
        f64::EPSILON
    }
    #[inline]
    fn is_finite_val(self) -> bool {
        self.is_finite()
    }
}
