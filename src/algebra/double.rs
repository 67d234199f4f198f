//! Compensated double-word arithmetic.
//!
//! [`DoubleF64`] represents a value as an unevaluated sum of two `f64`
//! components, giving roughly twice the significand width of `f64`.  The
//! error-free transforms follow the classical Dekker/Knuth constructions,
//! with `two_prod` implemented through a fused multiply-add.

use crate::algebra::ScalarT;
use std::fmt;
use std::iter::Sum;

/// Double-word compensated floating point value (value + error term).
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct DoubleF64(pub f64, pub f64);

#[inline]
fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let err = b - (s - a);
    (s, err)
}

#[inline]
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let err = (a - (s - bb)) + (b - bb);
    (s, err)
}

#[inline]
fn two_diff(a: f64, b: f64) -> (f64, f64) {
    let s = a - b;
    let bb = s - a;
    let err = (a - (s - bb)) - (b + bb);
    (s, err)
}

#[inline]
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let err = f64::mul_add(a, b, -p);
    (p, err)
}

impl DoubleF64 {
    /// 2^{-104}
    pub const EPSILON: Self = Self(4.93038065763132e-32, 0.0);

    pub const ZERO: Self = Self(0.0, 0.0);
    pub const ONE: Self = Self(1.0, 0.0);
    pub const NAN: Self = Self(f64::NAN, f64::NAN);

    #[inline]
    pub fn from_f64(x: f64) -> Self {
        Self(x, 0.0)
    }

    /// Leading component.
    #[inline]
    pub fn hi(self) -> f64 {
        self.0
    }

    /// Trailing error component.
    #[inline]
    pub fn lo(self) -> f64 {
        self.1
    }

    #[inline]
    pub fn abs(self) -> Self {
        if self.0 < 0.0 {
            -self
        } else {
            self
        }
    }

    #[inline]
    pub fn recip(self) -> Self {
        Self::ONE / self
    }

    pub fn sqrt(self) -> Self {
        if self == Self::ZERO {
            Self::ZERO
        } else if self.0 < 0.0 {
            Self::NAN
        } else {
            // one Newton step from the f64 estimate, in the style of
            // Karp and Markstein
            let x = self.0.sqrt().recip();
            let ax = Self(self.0 * x, 0.0);
            ax + (self - ax * ax) * Self(x * 0.5, 0.0)
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite() && self.1.is_finite()
    }

    /// Multiply by a plain f64 with a compensated product.
    #[inline]
    pub(crate) fn mul_f64(self, b: f64) -> Self {
        let (p1, p2) = two_prod(self.0, b);
        let p2 = p2 + self.1 * b;
        let (p1, p2) = quick_two_sum(p1, p2);
        Self(p1, p2)
    }
}

impl core::ops::Add for DoubleF64 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let (s, e) = two_sum(self.0, rhs.0);
        let e = e + (self.1 + rhs.1);
        let (s, e) = quick_two_sum(s, e);
        Self(s, e)
    }
}

impl core::ops::Sub for DoubleF64 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let (s, e) = two_diff(self.0, rhs.0);
        let e = e + self.1;
        let e = e - rhs.1;
        let (s, e) = quick_two_sum(s, e);
        Self(s, e)
    }
}

impl core::ops::Mul for DoubleF64 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let (p1, p2) = two_prod(self.0, rhs.0);
        let p2 = p2 + (self.0 * rhs.1 + self.1 * rhs.0);
        let (p1, p2) = quick_two_sum(p1, p2);
        Self(p1, p2)
    }
}

impl core::ops::Div for DoubleF64 {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        let q1 = self.0 / rhs.0;
        let r = rhs.mul_f64(q1);

        let (s1, s2) = two_diff(self.0, r.0);
        let s2 = s2 - r.1;
        let s2 = s2 + self.1;

        let q2 = (s1 + s2) / rhs.0;
        let (r0, r1) = quick_two_sum(q1, q2);
        Self(r0, r1)
    }
}

impl core::ops::Neg for DoubleF64 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(-self.0, -self.1)
    }
}

impl core::ops::AddAssign for DoubleF64 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl core::ops::SubAssign for DoubleF64 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl core::ops::MulAssign for DoubleF64 {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl core::ops::DivAssign for DoubleF64 {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Sum for DoubleF64 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc + x)
    }
}

impl fmt::Display for DoubleF64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ScalarT for DoubleF64 {
    const WORDS: usize = 2;

    #[inline]
    fn zero() -> Self {
        Self::ZERO
    }
    #[inline]
    fn one() -> Self {
        Self::ONE
    }
    #[inline]
    fn from_f64(x: f64) -> Self {
        Self::from_f64(x)
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self.0
    }
    #[inline]
    fn abs(self) -> Self {
        Self::abs(self)
    }
    #[inline]
    fn sqrt(self) -> Self {
        Self::sqrt(self)
    }
    #[inline]
    fn recip(self) -> Self {
        Self::recip(self)
    }
    #[inline]
    fn max(self, other: Self) -> Self {
        if other > self {
            other
        } else {
            self
        }
    }
    #[inline]
    fn min(self, other: Self) -> Self {
        if other < self {
            other
        } else {
            self
        }
    }
    #[inline]
    fn epsilon() -> Self {
        Self::EPSILON
    }
    #[inline]
    fn is_finite(self) -> bool {
        Self::is_finite(self)
    }
    #[inline]
    fn write_words(self, out: &mut [f64]) {
        out[0] = self.0;
        out[1] = self.1;
    }
    #[inline]
    fn read_words(words: &[f64]) -> Self {
        Self(words[0], words[1])
    }
}
