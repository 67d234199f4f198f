use crate::algebra::ScalarT;
use itertools::izip;
use std::iter::zip;

/// Vector operations on slices of [`ScalarT`](crate::algebra::ScalarT)
pub trait VectorMath {
    type T;

    /// Copy values from `src` to `self`
    fn copy_from(&mut self, src: &Self) -> &mut Self;

    /// Set all elements to the same value
    fn set(&mut self, c: Self::T) -> &mut Self;

    /// Elementwise scaling
    fn scale(&mut self, c: Self::T) -> &mut Self;

    /// Elementwise negation of entries
    fn negate(&mut self) -> &mut Self;

    /// Dot product
    fn dot(&self, y: &Self) -> Self::T;

    /// Sum of squares of the elements
    fn sumsq(&self) -> Self::T;

    /// 2-norm
    fn norm(&self) -> Self::T;

    /// Infinity norm
    fn norm_inf(&self) -> Self::T;

    /// self = a*x + b*self
    fn axpby(&mut self, a: Self::T, x: &Self, b: Self::T) -> &mut Self;

    /// true if all elements are finite
    fn is_finite(&self) -> bool;
}

impl<T: ScalarT> VectorMath for [T] {
    type T = T;

    fn copy_from(&mut self, src: &[T]) -> &mut Self {
        assert_eq!(self.len(), src.len());
        self.copy_from_slice(src);
        self
    }

    fn set(&mut self, c: T) -> &mut Self {
        self.fill(c);
        self
    }

    fn scale(&mut self, c: T) -> &mut Self {
        for x in &mut *self {
            *x *= c;
        }
        self
    }

    fn negate(&mut self) -> &mut Self {
        for x in &mut *self {
            *x = -*x;
        }
        self
    }

    fn dot(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        zip(self, y).fold(T::zero(), |acc, (&x, &y)| acc + x * y)
    }

    fn sumsq(&self) -> T {
        self.dot(self)
    }

    fn norm(&self) -> T {
        self.sumsq().sqrt()
    }

    fn norm_inf(&self) -> T {
        self.iter().fold(T::zero(), |acc, &x| acc.max(x.abs()))
    }

    fn axpby(&mut self, a: T, x: &[T], b: T) -> &mut Self {
        assert_eq!(self.len(), x.len());
        for (y, &x) in izip!(&mut *self, x) {
            *y = a * x + b * *y;
        }
        self
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|x| x.is_finite())
    }
}
