#![allow(non_snake_case)]

use super::Matrix;
use crate::algebra::{MatrixVectorMultiply, ScalarT, VectorMath};

impl<T: ScalarT> MatrixVectorMultiply for Matrix<T> {
    type T = T;

    // y = a*A*x + b*y
    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.m);

        y.scale(b);

        for (col, &xj) in x.iter().enumerate() {
            let Acol = self.col_slice(col);
            for (yi, &Aij) in y.iter_mut().zip(Acol) {
                *yi += a * Aij * xj;
            }
        }
    }
}

impl<T: ScalarT> Matrix<T> {
    /// C = A*B with a plain nested loop.
    pub fn mul(&self, B: &Matrix<T>) -> Matrix<T> {
        assert_eq!(self.n, B.m);
        let mut C = Matrix::zeros((self.m, B.n));

        for j in 0..B.n {
            let Bcol = B.col_slice(j);
            let Ccol = C.col_slice_mut(j);
            for (k, &bkj) in Bcol.iter().enumerate() {
                let Acol = self.col_slice(k);
                for (ci, &aik) in Ccol.iter_mut().zip(Acol) {
                    *ci += aik * bkj;
                }
            }
        }
        C
    }
}
