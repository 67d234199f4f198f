#![allow(non_snake_case)]

use super::Matrix;
use crate::algebra::{DenseFactorizationError, ScalarT};

/// Native dense Cholesky factorization of a symmetric positive definite
/// matrix.
///
/// This is the backup solve path for dense systems; the sparse systems of
/// the persistent solver go through the LDL factorization in
/// [`chol`](crate::chol) instead.
#[derive(Debug)]
pub struct DenseCholesky<T> {
    /// lower triangular factor, with the strict upper triangle zeroed
    pub L: Matrix<T>,
}

impl<T> DenseCholesky<T>
where
    T: ScalarT,
{
    /// Factor `A = L*L^T`.  Only the lower triangle of `A` is referenced.
    pub fn new(A: &Matrix<T>) -> Result<Self, DenseFactorizationError> {
        if A.m != A.n {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let n = A.n;
        let mut L = Matrix::<T>::zeros((n, n));

        for j in 0..n {
            // diagonal entry
            let mut d = A[(j, j)];
            for k in 0..j {
                d -= L[(j, k)] * L[(j, k)];
            }
            if !(d > T::zero()) || !d.is_finite() {
                return Err(DenseFactorizationError::NotPositiveDefinite);
            }
            let djsqrt = d.sqrt();
            L[(j, j)] = djsqrt;
            let djinv = djsqrt.recip();

            // subdiagonal part of column j
            for i in (j + 1)..n {
                let mut s = A[(i, j)];
                for k in 0..j {
                    s -= L[(i, k)] * L[(j, k)];
                }
                L[(i, j)] = s * djinv;
            }
        }
        Ok(Self { L })
    }

    /// Solve `A*x = b` in place using the factors of `A`.
    pub fn solve(&self, x: &mut [T]) {
        let n = self.L.n;
        assert_eq!(x.len(), n);

        // forward substitution L*y = b
        for i in 0..n {
            let mut s = x[i];
            for k in 0..i {
                s -= self.L[(i, k)] * x[k];
            }
            x[i] = s * self.L[(i, i)].recip();
        }
        // backward substitution L^T*x = y
        for i in (0..n).rev() {
            let mut s = x[i];
            for k in (i + 1)..n {
                s -= self.L[(k, i)] * x[k];
            }
            x[i] = s * self.L[(i, i)].recip();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::VectorMath;

    #[test]
    fn test_dense_cholesky_solve() {
        // A = [4 2; 2 3], spd
        let A = Matrix::new_from_slice((2, 2), &[4., 2., 2., 3.]);
        let chol = DenseCholesky::new(&A).unwrap();

        let mut x = vec![10., 8.];
        chol.solve(&mut x);

        // A*x = b check
        let r0 = 4. * x[0] + 2. * x[1] - 10.;
        let r1 = 2. * x[0] + 3. * x[1] - 8.;
        assert!([r0, r1].norm() <= 1e-12);
    }

    #[test]
    fn test_dense_cholesky_indefinite() {
        let A = Matrix::new_from_slice((2, 2), &[1., 2., 2., 1.]);
        assert!(matches!(
            DenseCholesky::new(&A),
            Err(DenseFactorizationError::NotPositiveDefinite)
        ));
    }
}
