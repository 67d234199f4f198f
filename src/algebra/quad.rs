//! Quad-word compensated arithmetic, built as a pair of [`DoubleF64`]
//! components.  The construction mirrors the double-word one a level up:
//! the value is the unevaluated sum `hi + lo` with `|lo|` far below the
//! last place of `hi`.

use crate::algebra::{DoubleF64, ScalarT};
use std::fmt;
use std::iter::Sum;

/// Four-word compensated floating point value.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct QuadF64 {
    pub hi: DoubleF64,
    pub lo: DoubleF64,
}

#[inline]
fn quick_two_sum(a: DoubleF64, b: DoubleF64) -> (DoubleF64, DoubleF64) {
    let s = a + b;
    let err = b - (s - a);
    (s, err)
}

#[inline]
fn two_sum(a: DoubleF64, b: DoubleF64) -> (DoubleF64, DoubleF64) {
    let s = a + b;
    let bb = s - a;
    let err = (a - (s - bb)) + (b - bb);
    (s, err)
}

#[inline]
fn renorm(hi: DoubleF64, lo: DoubleF64) -> QuadF64 {
    let (s, e) = quick_two_sum(hi, lo);
    QuadF64 { hi: s, lo: e }
}

impl QuadF64 {
    /// 2^{-200}
    pub const EPSILON: Self = Self {
        hi: DoubleF64(6.223015277861142e-61, 0.0),
        lo: DoubleF64(0.0, 0.0),
    };

    pub const ZERO: Self = Self {
        hi: DoubleF64::ZERO,
        lo: DoubleF64::ZERO,
    };
    pub const ONE: Self = Self {
        hi: DoubleF64::ONE,
        lo: DoubleF64::ZERO,
    };
    pub const NAN: Self = Self {
        hi: DoubleF64::NAN,
        lo: DoubleF64::NAN,
    };

    #[inline]
    pub fn from_f64(x: f64) -> Self {
        Self {
            hi: DoubleF64::from_f64(x),
            lo: DoubleF64::ZERO,
        }
    }

    #[inline]
    pub fn abs(self) -> Self {
        if self.hi.hi() < 0.0 {
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
        } else if self.hi.hi() < 0.0 {
            Self::NAN
        } else {
            // Newton refinement of the double-word square root
            let x0 = Self {
                hi: self.hi.sqrt(),
                lo: DoubleF64::ZERO,
            };
            let half = Self::from_f64(0.5);
            x0 + (self - x0 * x0) / x0 * half
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.hi.is_finite() && self.lo.is_finite()
    }
}

impl core::ops::Add for QuadF64 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let (s, e) = two_sum(self.hi, rhs.hi);
        let e = e + (self.lo + rhs.lo);
        renorm(s, e)
    }
}

impl core::ops::Sub for QuadF64 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl core::ops::Mul for QuadF64 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        // hi*hi carries the leading product; the cross terms land in the
        // compensation limb
        let p = self.hi * rhs.hi;
        let e = self.hi * rhs.lo + self.lo * rhs.hi + self.lo * rhs.lo;
        renorm(p, e)
    }
}

impl core::ops::Div for QuadF64 {
    type Output = Self;

    #[inline]
    fn div(self, rhs: Self) -> Self {
        let q1 = self.hi / rhs.hi;
        let r = self
            - rhs
                * Self {
                    hi: q1,
                    lo: DoubleF64::ZERO,
                };
        let q2 = r.hi / rhs.hi;
        renorm(q1, q2)
    }
}

impl core::ops::Neg for QuadF64 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl core::ops::AddAssign for QuadF64 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl core::ops::SubAssign for QuadF64 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl core::ops::MulAssign for QuadF64 {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl core::ops::DivAssign for QuadF64 {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Sum for QuadF64 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc + x)
    }
}

impl fmt::Display for QuadF64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hi.hi())
    }
}

impl ScalarT for QuadF64 {
    const WORDS: usize = 4;

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
        self.hi.hi()
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
        out[0] = self.hi.0;
        out[1] = self.hi.1;
        out[2] = self.lo.0;
        out[3] = self.lo.1;
    }
    #[inline]
    fn read_words(words: &[f64]) -> Self {
        Self {
            hi: DoubleF64(words[0], words[1]),
            lo: DoubleF64(words[2], words[3]),
        }
    }
}
