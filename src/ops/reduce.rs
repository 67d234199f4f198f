//! Column-wise reductions.
//!
//! The fold carries no identity element: the first value encountered in a
//! column seeds the accumulator, and a column with nothing to visit reduces
//! to `T::default()`.  For sparse operands only stored entries are visited,
//! so an all-implicit-zero column also yields the default.  This matches the
//! long-standing behavior of the callers and is asserted by tests rather
//! than being "fixed" into a monoid fold.

use super::MatrixRef;
use crate::algebra::{Matrix, ScalarT};

/// Reduce each column of `a` with `f(acc, value)`, producing a `1 x n` dense
/// result.
pub fn column_reduce<T, F>(a: MatrixRef<'_, T>, f: &F) -> Matrix<T>
where
    T: ScalarT,
    F: Fn(T, T) -> T,
{
    match a {
        MatrixRef::Dense(a) => {
            let mut out = Vec::with_capacity(a.n);
            for j in 0..a.n {
                let col = &a.data[j * a.m..(j + 1) * a.m];
                out.push(fold_seeded(col.iter().copied(), f));
            }
            Matrix {
                m: 1,
                n: a.n,
                data: out,
            }
        }
        MatrixRef::Sparse(a) => {
            let mut out = Vec::with_capacity(a.n);
            for j in 0..a.n {
                let vals = a.nzval[a.colptr[j]..a.colptr[j + 1]].iter().copied();
                out.push(fold_seeded(vals, f));
            }
            Matrix {
                m: 1,
                n: a.n,
                data: out,
            }
        }
    }
}

// first element seeds the accumulator; empty input yields the default
fn fold_seeded<T, F, I>(mut it: I, f: &F) -> T
where
    T: ScalarT,
    F: Fn(T, T) -> T,
    I: Iterator<Item = T>,
{
    match it.next() {
        Some(first) => it.fold(first, f),
        None => T::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::CscMatrix;

    #[test]
    fn dense_column_sum() {
        let a = Matrix::new_from_slice((3, 2), &[1., 2., 3., 4., 5., 6.]);
        let r = column_reduce((&a).into(), &|acc: f64, x| acc + x);
        assert_eq!(r.data, vec![6., 15.]);
    }

    #[test]
    fn dense_column_max() {
        let a = Matrix::new_from_slice((2, 2), &[-1., -5., 3., 7.]);
        let r = column_reduce((&a).into(), &|acc: f64, x| acc.max(x));
        assert_eq!(r.data, vec![-1., 7.]);
    }

    #[test]
    fn sparse_visits_stored_entries_only() {
        // col 0 holds {2, 4}; max over stored entries is 4 even though the
        // dense column would include implicit zeros
        let a = CscMatrix::new(3, 2, vec![0, 2, 3], vec![0, 2, 1], vec![2., 4., -3.]);
        let r = column_reduce((&a).into(), &|acc: f64, x| acc.max(x));
        assert_eq!(r.data, vec![4., -3.]);
    }

    #[test]
    fn empty_column_yields_default() {
        let a = CscMatrix::new(3, 2, vec![0, 0, 2], vec![0, 1], vec![5., 6.]);
        let r = column_reduce((&a).into(), &|acc: f64, x| acc * x);
        // column 0 stores nothing: no identity element exists for the fold,
        // the result is the scalar default
        assert_eq!(r.data, vec![0., 30.]);
    }

    #[test]
    fn product_is_seeded_not_identity_based() {
        let a = Matrix::new_from_slice((3, 1), &[2., 3., 4.]);
        let r = column_reduce((&a).into(), &|acc: f64, x| acc * x);
        assert_eq!(r.data, vec![24.]);
    }
}
