//! Complex element types for complex-valued triangular solves
//!
//! `Complex64` and `Complex128` are plain interleaved `(re, im)` pairs that
//! derive bytemuck's `Pod`, so batches of complex matrices live in the same
//! untyped device buffers as real ones.
//!
//! # Storage Format
//!
//! Interleaved (re, im, re, im...), matching the layout GPU BLAS libraries
//! expect for `cuComplex` / `cuDoubleComplex`.
//!
//! # Arithmetic
//!
//! - Multiplication: `(a+bi)(c+di) = (ac-bd) + (ad+bc)i`
//! - Division: `(a+bi)/(c+di) = (a+bi)*conj(c+di)/|c+di|²`
//!
//! Division by zero yields NaN components rather than panicking; a singular
//! diagonal block therefore poisons only its own batch instance.

use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

macro_rules! impl_complex {
    ($name:ident, $float:ty, $doc_bits:literal, $doc_float_bits:literal) => {
        #[doc = concat!(
            $doc_bits,
            "-bit complex number with ",
            $doc_float_bits,
            " real and imaginary parts"
        )]
        #[repr(C)]
        #[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
        pub struct $name {
            /// Real part
            pub re: $float,
            /// Imaginary part
            pub im: $float,
        }

        impl $name {
            /// Zero complex number
            pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

            /// One (real unit)
            pub const ONE: Self = Self { re: 1.0, im: 0.0 };

            /// Imaginary unit i
            pub const I: Self = Self { re: 0.0, im: 1.0 };

            /// Create a new complex number
            #[inline]
            pub const fn new(re: $float, im: $float) -> Self {
                Self { re, im }
            }

            /// Magnitude (absolute value): |z| = sqrt(re² + im²)
            #[inline]
            pub fn magnitude(self) -> $float {
                self.re.hypot(self.im)
            }

            /// Squared magnitude: |z|² = re² + im²
            #[inline]
            pub fn magnitude_squared(self) -> $float {
                self.re * self.re + self.im * self.im
            }

            /// Complex conjugate: conj(a + bi) = a - bi
            #[inline]
            pub fn conj(self) -> Self {
                Self {
                    re: self.re,
                    im: -self.im,
                }
            }

            /// Both components finite
            #[inline]
            pub fn is_finite(self) -> bool {
                self.re.is_finite() && self.im.is_finite()
            }
        }

        impl Add for $name {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self {
                    re: self.re + rhs.re,
                    im: self.im + rhs.im,
                }
            }
        }

        impl Sub for $name {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self {
                    re: self.re - rhs.re,
                    im: self.im - rhs.im,
                }
            }
        }

        impl Mul for $name {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: Self) -> Self {
                Self {
                    re: self.re * rhs.re - self.im * rhs.im,
                    im: self.re * rhs.im + self.im * rhs.re,
                }
            }
        }

        impl Div for $name {
            type Output = Self;

            #[inline]
            fn div(self, rhs: Self) -> Self {
                let denom = rhs.magnitude_squared();
                if denom == 0.0 {
                    Self {
                        re: <$float>::NAN,
                        im: <$float>::NAN,
                    }
                } else {
                    Self {
                        re: (self.re * rhs.re + self.im * rhs.im) / denom,
                        im: (self.im * rhs.re - self.re * rhs.im) / denom,
                    }
                }
            }
        }

        impl Neg for $name {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                Self {
                    re: -self.re,
                    im: -self.im,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.im >= 0.0 {
                    write!(f, "{}+{}i", self.re, self.im)
                } else {
                    write!(f, "{}{}i", self.re, self.im)
                }
            }
        }

        impl From<$float> for $name {
            #[inline]
            fn from(re: $float) -> Self {
                Self { re, im: 0.0 }
            }
        }

        impl From<($float, $float)> for $name {
            #[inline]
            fn from((re, im): ($float, $float)) -> Self {
                Self { re, im }
            }
        }
    };
}

impl_complex!(Complex64, f32, "64", "f32");
impl_complex!(Complex128, f64, "128", "f64");

impl From<Complex64> for Complex128 {
    #[inline]
    fn from(c: Complex64) -> Self {
        Self {
            re: c.re as f64,
            im: c.im as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_complex_type {
        ($mod_name:ident, $type_name:ident) => {
            mod $mod_name {
                use super::*;

                #[test]
                fn test_arithmetic() {
                    let a = $type_name::new(1.0, 2.0);
                    let b = $type_name::new(3.0, 4.0);

                    assert_eq!(a + b, $type_name::new(4.0, 6.0));
                    assert_eq!(a - b, $type_name::new(-2.0, -2.0));
                    // (1+2i)(3+4i) = -5 + 10i
                    assert_eq!(a * b, $type_name::new(-5.0, 10.0));
                    assert_eq!(-a, $type_name::new(-1.0, -2.0));
                }

                #[test]
                fn test_conjugate_product_is_real() {
                    let z = $type_name::new(3.0, 4.0);
                    let prod = z * z.conj();
                    assert!((prod.re - 25.0).abs() < 1e-6);
                    assert!(prod.im.abs() < 1e-6);
                    assert_eq!(z.magnitude(), 5.0);
                }

                #[test]
                fn test_division() {
                    // 1/i = -i
                    let result = $type_name::ONE / $type_name::I;
                    assert!(result.re.abs() < 1e-6);
                    assert!((result.im + 1.0).abs() < 1e-6);
                }

                #[test]
                fn test_division_by_zero_is_nan() {
                    let result = $type_name::ONE / $type_name::ZERO;
                    assert!(!result.is_finite());
                }
            }
        };
    }

    test_complex_type!(complex64_tests, Complex64);
    test_complex_type!(complex128_tests, Complex128);

    #[test]
    fn test_complex_pod_layout() {
        let z = Complex128::new(3.0, 4.0);
        let bytes = bytemuck::bytes_of(&z);
        assert_eq!(bytes.len(), 16);
        assert_eq!(*bytemuck::from_bytes::<Complex128>(bytes), z);
        assert_eq!(std::mem::size_of::<Complex64>(), 8);
        assert_eq!(std::mem::align_of::<Complex64>(), 4);
    }
}
