//! Binary operator dispatch: broadcast normalization followed by one of the
//! four storage-combination algorithms.

use super::broadcast;
use super::merge::merge_columns;
use super::{AnyMatrix, BinaryOpTraits, EntryType, MatrixRef, OpError};
use crate::algebra::{BorrowedCscMatrix, CscMatrix, DenseMatrix, Matrix, ScalarT};

/// Apply `f(row, col, a, b, entry_type)` elementwise over `a` and `b` under
/// MATLAB broadcast rules.  The operator descriptor `traits` decides which
/// storage combinations keep a sparse result; combinations it disallows are
/// densified before the generic dense pass runs.
///
/// Sparse-result paths probe the operator's implicit-zero invariant at
/// runtime and fail with [`OpError::ZeroPreserving`] when it does not hold.
pub fn binary_map<T, U, F>(
    a: MatrixRef<'_, T>,
    b: MatrixRef<'_, T>,
    traits: BinaryOpTraits,
    f: &F,
) -> Result<AnyMatrix<U>, OpError>
where
    T: ScalarT,
    U: ScalarT,
    F: Fn(usize, usize, T, T, EntryType) -> U,
{
    let shape = broadcast::resolve_shape(a.size(), b.size())?;

    // a replicated sparse broadcast source keeps its tiled pattern only
    // when the operator annihilates its implicit zeros against arbitrary
    // values on the other side (the one-sided sparse-path invariant);
    // otherwise it densifies before the generic pass, so dense-natural
    // operators like addition report dense output under broadcast
    let na = broadcast::normalize(a, shape, traits.sparse_sd);
    let nb = broadcast::normalize(b, shape, traits.sparse_ds);
    let av = na.as_ref().map_or(a, |x| x.as_ref());
    let bv = nb.as_ref().map_or(b, |x| x.as_ref());

    match (av, bv) {
        (MatrixRef::Sparse(sa), MatrixRef::Sparse(sb)) if traits.sparse_ss => {
            if f(0, 0, T::zero(), T::zero(), EntryType::Neither) != U::zero() {
                return Err(OpError::ZeroPreserving);
            }
            let mut out = merge_columns(sa, sb, f);
            if traits.prune_zeros {
                out.prune_zeros();
            }
            Ok(AnyMatrix::Sparse(out))
        }
        (MatrixRef::Sparse(sa), MatrixRef::Dense(db)) if traits.sparse_sd => {
            // positions outside the left pattern pair an implicit left zero
            // with an arbitrary right value and are never visited
            probe_absent_left(f)?;
            Ok(AnyMatrix::Sparse(pattern_map(sa, traits, &|i, j, x| {
                f(i, j, x, db.at((i, j)), EntryType::Both)
            })))
        }
        (MatrixRef::Dense(da), MatrixRef::Sparse(sb)) if traits.sparse_ds => {
            probe_absent_right(f)?;
            Ok(AnyMatrix::Sparse(pattern_map(sb, traits, &|i, j, x| {
                f(i, j, da.at((i, j)), x, EntryType::Both)
            })))
        }
        (av, bv) => Ok(AnyMatrix::Dense(dense_apply(av, bv, f))),
    }
}

// f over an unvisited position must yield zero for the sparse-left pattern
// to stand in for the full result.  Probed with nonzero right-hand samples:
// an implicit left zero annihilates whatever the dense side holds, so zero
// itself is not probed (division would report 0/0 and fail spuriously)
fn probe_absent_left<T, U, F>(f: &F) -> Result<(), OpError>
where
    T: ScalarT,
    U: ScalarT,
    F: Fn(usize, usize, T, T, EntryType) -> U,
{
    for v in [T::one(), -T::one()] {
        if f(0, 0, T::zero(), v, EntryType::RightOnly) != U::zero() {
            return Err(OpError::ZeroPreserving);
        }
    }
    Ok(())
}

fn probe_absent_right<T, U, F>(f: &F) -> Result<(), OpError>
where
    T: ScalarT,
    U: ScalarT,
    F: Fn(usize, usize, T, T, EntryType) -> U,
{
    for v in [T::one(), -T::one()] {
        if f(0, 0, v, T::zero(), EntryType::LeftOnly) != U::zero() {
            return Err(OpError::ZeroPreserving);
        }
    }
    Ok(())
}

// map over the stored entries of one pattern, keeping its structure
fn pattern_map<T, U, F>(a: BorrowedCscMatrix<'_, T>, traits: BinaryOpTraits, f: &F) -> CscMatrix<U>
where
    T: ScalarT,
    U: ScalarT,
    F: Fn(usize, usize, T) -> U,
{
    let mut nzval = Vec::with_capacity(a.nnz());
    for j in 0..a.n {
        for k in a.colptr[j]..a.colptr[j + 1] {
            nzval.push(f(a.rowval[k], j, a.nzval[k]));
        }
    }
    let mut out = CscMatrix {
        m: a.m,
        n: a.n,
        colptr: a.colptr.to_vec(),
        rowval: a.rowval.to_vec(),
        nzval,
    };
    if traits.prune_zeros {
        out.prune_zeros();
    }
    out
}

// the densifying fallback: both operands materialized to full storage
fn dense_apply<T, U, F>(a: MatrixRef<'_, T>, b: MatrixRef<'_, T>, f: &F) -> Matrix<U>
where
    T: ScalarT,
    U: ScalarT,
    F: Fn(usize, usize, T, T, EntryType) -> U,
{
    let da = to_owned_dense(a);
    let db = to_owned_dense(b);
    let (m, n) = (da.m, da.n);
    let mut data = Vec::with_capacity(m * n);
    for j in 0..n {
        for i in 0..m {
            data.push(f(i, j, da[(i, j)], db[(i, j)], EntryType::Both));
        }
    }
    Matrix { m, n, data }
}

fn to_owned_dense<T: ScalarT>(a: MatrixRef<'_, T>) -> Matrix<T> {
    match a {
        MatrixRef::Dense(a) => a.to_owned(),
        MatrixRef::Sparse(a) => a.to_dense(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMES: BinaryOpTraits = BinaryOpTraits {
        sparse_ss: true,
        sparse_sd: true,
        sparse_ds: true,
        prune_zeros: false,
    };

    const PLUS: BinaryOpTraits = BinaryOpTraits {
        sparse_ss: true,
        sparse_sd: false,
        sparse_ds: false,
        prune_zeros: false,
    };

    const DIVIDE: BinaryOpTraits = BinaryOpTraits {
        sparse_ss: false,
        sparse_sd: true,
        sparse_ds: false,
        prune_zeros: false,
    };

    fn sp_eye2() -> CscMatrix<f64> {
        CscMatrix::identity(2)
    }

    #[test]
    fn sparse_plus_sparse_stays_sparse() {
        let a = CscMatrix::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![1., 2.]);
        let b = CscMatrix::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![3., 4.]);
        let r = binary_map((&a).into(), (&b).into(), PLUS, &|_, _, x, y, _| x + y)
            .unwrap();
        match r {
            AnyMatrix::Sparse(s) => {
                assert_eq!(s.nnz(), 2);
                assert_eq!(s.to_dense().data, vec![4., 0., 0., 6.]);
            }
            _ => panic!("expected sparse result"),
        }
    }

    #[test]
    fn sparse_times_dense_keeps_pattern() {
        let a = sp_eye2();
        let b = Matrix::new_from_slice((2, 2), &[10., 20., 30., 40.]);
        let r = binary_map((&a).into(), (&b).into(), TIMES, &|_, _, x, y, _| x * y).unwrap();
        match r {
            AnyMatrix::Sparse(s) => {
                assert_eq!(s.nnz(), 2);
                assert_eq!(s.to_dense().data, vec![10., 0., 0., 40.]);
            }
            _ => panic!("expected sparse result"),
        }
    }

    #[test]
    fn sparse_divided_by_dense_keeps_pattern() {
        // the quotient is taken over the stored pattern only; the dense
        // zero at an off-pattern position must not trip the implicit-zero
        // check, since 0/y is zero for every stored right-hand value
        let a = CscMatrix::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![4., 6.]);
        let b = Matrix::new_from_slice((2, 2), &[2., 0., 5., 2.]);
        let r = binary_map((&a).into(), (&b).into(), DIVIDE, &|_, _, x, y, _| x / y).unwrap();
        match r {
            AnyMatrix::Sparse(s) => {
                assert_eq!(s.nnz(), 2);
                assert_eq!(s.to_dense().data, vec![2., 0., 0., 3.]);
            }
            _ => panic!("expected sparse result"),
        }
    }

    #[test]
    fn sparse_broadcast_under_plus_densifies() {
        // a sparse column source replicated under addition populates every
        // position, so the result comes back dense
        let a = sp_eye2();
        let b = CscMatrix::new(2, 1, vec![0, 1], vec![0], vec![10.]);
        let r = binary_map((&a).into(), (&b).into(), PLUS, &|_, _, x, y, _| x + y).unwrap();
        assert!(!r.is_sparse());
        assert_eq!(r.to_dense().data, vec![11., 0., 10., 1.]);
    }

    #[test]
    fn scalar_broadcast_times_dense() {
        let a = Matrix::new_from_slice((2, 2), &[1., 3., 2., 4.]);
        let b = Matrix::new_from_slice((1, 1), &[10.]);
        let r = binary_map((&a).into(), (&b).into(), TIMES, &|_, _, x, y, _| x * y).unwrap();
        assert_eq!(r.to_dense().data, vec![10., 30., 20., 40.]);
    }

    #[test]
    fn row_broadcast_against_column_broadcast() {
        // outer-sum of [1;2] and [10 20 30]
        let a = Matrix::new_from_slice((2, 1), &[1., 2.]);
        let b = Matrix::new_from_slice((1, 3), &[10., 20., 30.]);
        let r = binary_map((&a).into(), (&b).into(), PLUS, &|_, _, x, y, _| x + y)
            .unwrap();
        assert_eq!(r.size(), (2, 3));
        assert_eq!(r.to_dense().data, vec![11., 12., 21., 22., 31., 32.]);
    }

    #[test]
    fn mismatch_is_an_error() {
        let a = Matrix::<f64>::zeros((2, 2));
        let b = Matrix::<f64>::zeros((3, 2));
        let r = binary_map(
            (&a).into(),
            (&b).into(),
            PLUS,
            &|_, _, x: f64, y, _| x + y,
        );
        assert!(matches!(r, Err(OpError::DimensionMismatch)));
    }

    #[test]
    fn non_preserving_sparse_op_is_rejected() {
        let a = sp_eye2();
        let b = sp_eye2();
        // max with an implicit-zero floor of 1 fails the Neither probe
        let r = binary_map((&a).into(), (&b).into(), TIMES, &|_, _, x: f64, y: f64, _| {
            x.max(y) + 1.0
        });
        assert!(matches!(r, Err(OpError::ZeroPreserving)));
    }

    #[test]
    fn disallowed_combination_densifies() {
        // plus over sparse×dense must densify since implicit zeros matter
        let a = sp_eye2();
        let b = Matrix::new_from_slice((2, 2), &[1., 1., 1., 1.]);
        let r = binary_map((&a).into(), (&b).into(), PLUS, &|_, _, x, y, _| x + y)
            .unwrap();
        assert!(!r.is_sparse());
        assert_eq!(r.to_dense().data, vec![2., 1., 1., 2.]);
    }

    #[test]
    fn sparse_sparse_matches_dense_reference() {
        let a = CscMatrix::new(3, 2, vec![0, 2, 3], vec![0, 2, 1], vec![1., -2., 5.]);
        let b = CscMatrix::new(3, 2, vec![0, 1, 3], vec![2, 0, 1], vec![4., -1., 2.]);
        let f = |_: usize, _: usize, x: f64, y: f64, _: EntryType| x * 2.0 + y;
        let sparse = binary_map((&a).into(), (&b).into(), PLUS, &f).unwrap();
        let (ad, bd) = (a.to_dense(), b.to_dense());
        let dense = binary_map((&ad).into(), (&bd).into(), PLUS, &f).unwrap();
        assert_eq!(sparse.to_dense().data, dense.to_dense().data);
    }
}
