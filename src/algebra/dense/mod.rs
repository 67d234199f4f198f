#![allow(non_snake_case)]

mod cholesky;
mod core;
mod matrix_math;

pub use cholesky::*;

use crate::algebra::ShapedMatrix;

/// Dense matrix in column major format.
///
/// __Example usage__ : To construct the 2 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  4.  6.]
/// ```
///
/// ```no_run
/// use polychol::algebra::Matrix;
///
/// let A = Matrix::new_from_slice((2, 3), &[1., 2., 3., 4., 5., 6.]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// vector of data in column major format
    pub data: Vec<T>,
}

/// Borrowed dense matrix view over an externally owned column major buffer.
///
/// Lifecycle: borrowed for the duration of one engine call and never
/// outlives it.  The stride between columns is exactly `m`.
#[derive(Debug, Clone, Copy)]
pub struct BorrowedMatrix<'a, T> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// borrowed column major data, of length `m * n`
    pub data: &'a [T],
}

/// Linear indexing for dense column major data
pub trait DenseMatrix: ShapedMatrix {
    type T;
    fn index_linear(&self, idx: (usize, usize)) -> usize;
    fn data(&self) -> &[Self::T];

    #[inline]
    fn at(&self, idx: (usize, usize)) -> Self::T
    where
        Self::T: Copy,
    {
        self.data()[self.index_linear(idx)]
    }
}

impl<T> ShapedMatrix for Matrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
}

impl<T> ShapedMatrix for BorrowedMatrix<'_, T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
}

impl<T> DenseMatrix for Matrix<T> {
    type T = T;
    #[inline]
    fn index_linear(&self, idx: (usize, usize)) -> usize {
        idx.0 + self.m * idx.1
    }
    fn data(&self) -> &[T] {
        &self.data
    }
}

impl<T> DenseMatrix for BorrowedMatrix<'_, T> {
    type T = T;
    #[inline]
    fn index_linear(&self, idx: (usize, usize)) -> usize {
        idx.0 + self.m * idx.1
    }
    fn data(&self) -> &[T] {
        self.data
    }
}
