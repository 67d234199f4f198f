#![allow(non_snake_case)]

use super::{BorrowedMatrix, Matrix};
use crate::algebra::{DenseMatrix, ScalarT, ShapedMatrix};
use std::ops::{Index, IndexMut};

impl<T> Matrix<T>
where
    T: Copy + Default,
{
    /// Construct an m x n matrix of default-valued entries.
    pub fn zeros(size: (usize, usize)) -> Self {
        let (m, n) = size;
        let data = vec![T::default(); m * n];
        Self { m, n, data }
    }

    pub fn new_from_slice(size: (usize, usize), src: &[T]) -> Self {
        let (m, n) = size;
        assert!(m * n == src.len());
        Self {
            m,
            n,
            data: src.to_vec(),
        }
    }

    pub fn col_slice(&self, col: usize) -> &[T] {
        assert!(col < self.n);
        &self.data[(col * self.m)..(col + 1) * self.m]
    }

    pub fn col_slice_mut(&mut self, col: usize) -> &mut [T] {
        assert!(col < self.n);
        &mut self.data[(col * self.m)..(col + 1) * self.m]
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Borrowed view of the whole matrix.
    pub fn as_borrowed(&self) -> BorrowedMatrix<'_, T> {
        BorrowedMatrix {
            m: self.m,
            n: self.n,
            data: &self.data,
        }
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros((self.n, self.m));
        for j in 0..self.n {
            for i in 0..self.m {
                out[(j, i)] = self[(i, j)];
            }
        }
        out
    }
}

impl<T> Matrix<T>
where
    T: ScalarT,
{
    pub fn identity(n: usize) -> Self {
        let mut mat = Matrix::zeros((n, n));
        for i in 0..n {
            mat[(i, i)] = T::one();
        }
        mat
    }

    /// Elementwise conversion of the data to a new scalar type through f64.
    pub fn map_scalars<U: ScalarT>(&self) -> Matrix<U> {
        Matrix {
            m: self.m,
            n: self.n,
            data: self.data.iter().map(|&x| U::from_f64(x.to_f64())).collect(),
        }
    }
}

impl<'a, T> BorrowedMatrix<'a, T> {
    pub fn new(size: (usize, usize), data: &'a [T]) -> Self {
        let (m, n) = size;
        assert_eq!(m * n, data.len());
        Self { m, n, data }
    }
}

impl<T: Copy> BorrowedMatrix<'_, T> {
    /// Owned copy of the viewed data.
    pub fn to_owned(&self) -> Matrix<T> {
        Matrix {
            m: self.m,
            n: self.n,
            data: self.data.to_vec(),
        }
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &Self::Output {
        &self.data[idx.0 + self.m * idx.1]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut Self::Output {
        &mut self.data[idx.0 + self.m * idx.1]
    }
}

impl<T: Copy> Index<(usize, usize)> for BorrowedMatrix<'_, T> {
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &Self::Output {
        &self.data[self.index_linear(idx)]
    }
}

#[test]
fn test_dense_indexing() {
    let A = Matrix::new_from_slice((2, 3), &[1., 2., 3., 4., 5., 6.]);
    assert_eq!(A[(0, 0)], 1.);
    assert_eq!(A[(1, 0)], 2.);
    assert_eq!(A[(0, 2)], 5.);
    assert_eq!(A[(1, 2)], 6.);
    assert_eq!(A.nrows(), 2);
    assert_eq!(A.ncols(), 3);

    let At = A.transpose();
    assert_eq!(At[(2, 0)], 5.);
    assert_eq!(At[(0, 1)], 2.);
}
