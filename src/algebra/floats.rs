#![allow(non_snake_case)]
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Core trait for scalar element types.
///
/// Every matrix and solver component in the crate is generic over `ScalarT`.
/// Implementations are provided for `f64` and for the compensated
/// extended-precision types [`DoubleF64`](crate::algebra::DoubleF64) and
/// [`QuadF64`](crate::algebra::QuadF64).  Generic code must take the same
/// control-flow path for every implementation; only numeric accuracy may
/// differ between them.
pub trait ScalarT:
    'static
    + Copy
    + Send
    + Sync
    + Default
    + Debug
    + Display
    + PartialEq
    + PartialOrd
    + Neg<Output = Self>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Sum
{
    /// Number of f64 words used by the packed element encoding.
    const WORDS: usize;

    fn zero() -> Self;
    fn one() -> Self;
    fn from_f64(x: f64) -> Self;

    /// Leading (most significant) f64 word of the value.
    fn to_f64(self) -> f64;

    fn abs(self) -> Self;
    fn sqrt(self) -> Self;
    fn recip(self) -> Self;
    fn max(self, other: Self) -> Self;
    fn min(self, other: Self) -> Self;

    /// Machine epsilon of this representation.
    fn epsilon() -> Self;

    fn is_finite(self) -> bool;

    /// Write the packed word encoding of `self` into `out`.
    ///
    /// `out` must have length `Self::WORDS`.
    fn write_words(self, out: &mut [f64]);

    /// Reassemble a value from its packed word encoding.
    fn read_words(words: &[f64]) -> Self;
}

impl ScalarT for f64 {
    const WORDS: usize = 1;

    #[inline]
    fn zero() -> Self {
        0.0
    }
    #[inline]
    fn one() -> Self {
        1.0
    }
    #[inline]
    fn from_f64(x: f64) -> Self {
        x
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
    #[inline]
    fn abs(self) -> Self {
        Float::abs(self)
    }
    #[inline]
    fn sqrt(self) -> Self {
        Float::sqrt(self)
    }
    #[inline]
    fn recip(self) -> Self {
        Float::recip(self)
    }
    #[inline]
    fn max(self, other: Self) -> Self {
        Float::max(self, other)
    }
    #[inline]
    fn min(self, other: Self) -> Self {
        Float::min(self, other)
    }
    #[inline]
    fn epsilon() -> Self {
        f64::EPSILON
    }
    #[inline]
    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
    #[inline]
    fn write_words(self, out: &mut [f64]) {
        out[0] = self;
    }
    #[inline]
    fn read_words(words: &[f64]) -> Self {
        words[0]
    }
}

/// Trait for converting Rust primitives to [`ScalarT`] values.
///
/// Allows `(2.0).as_T()` on constant primitives rather than the awkward
/// `T::from_f64(2.0)` at every site.  Implemented for f32/f64 and the
/// unsigned integer types used for dimensions.
pub trait AsScalarT<T>: 'static {
    fn as_T(&self) -> T;
}

macro_rules! impl_as_ScalarT {
    ($ty:ty) => {
        impl<T> AsScalarT<T> for $ty
        where
            T: ScalarT,
        {
            #[inline]
            fn as_T(&self) -> T {
                T::from_f64(f64::from_usize(*self as usize).unwrap())
            }
        }
    };
}
impl_as_ScalarT!(u32);
impl_as_ScalarT!(u64);
impl_as_ScalarT!(usize);

impl<T> AsScalarT<T> for f64
where
    T: ScalarT,
{
    #[inline]
    fn as_T(&self) -> T {
        T::from_f64(*self)
    }
}

impl<T> AsScalarT<T> for f32
where
    T: ScalarT,
{
    #[inline]
    fn as_T(&self) -> T {
        T::from_f64(f64::from(*self))
    }
}
