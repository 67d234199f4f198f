//! Entrywise unary application over either storage format.

use super::{AnyMatrix, MatrixRef, OpError, UnaryOpTraits};
use crate::algebra::{CscMatrix, Matrix, ScalarT};

/// Apply `f(row, col, value)` to every entry of `a`, in whichever storage
/// format `a` uses.  A sparse input visits stored entries only, so its
/// result stays sparse when the descriptor allows it and `f(0) == 0`
/// (probed at runtime); a descriptor forcing dense output materializes the
/// operand first, matching the binary dispatcher's densifying fallback.
pub fn unary_map<T, U, F>(
    a: MatrixRef<'_, T>,
    traits: UnaryOpTraits,
    f: &F,
) -> Result<AnyMatrix<U>, OpError>
where
    T: ScalarT,
    U: ScalarT,
    F: Fn(usize, usize, T) -> U,
{
    match a {
        MatrixRef::Dense(a) => Ok(AnyMatrix::Dense(dense_apply(a.m, a.n, a.data, f))),
        MatrixRef::Sparse(a) => {
            if !traits.sparse_out {
                let d = a.to_dense();
                return Ok(AnyMatrix::Dense(dense_apply(d.m, d.n, &d.data, f)));
            }
            // a sparse result is only sound when implicit zeros map to zero
            if f(0, 0, T::zero()) != U::zero() {
                return Err(OpError::ZeroPreserving);
            }
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
            Ok(AnyMatrix::Sparse(out))
        }
    }
}

// column-major loop shared by the dense arm and the densifying fallback
fn dense_apply<T, U, F>(m: usize, n: usize, data: &[T], f: &F) -> Matrix<U>
where
    T: ScalarT,
    U: ScalarT,
    F: Fn(usize, usize, T) -> U,
{
    let mut out = Vec::with_capacity(m * n);
    for j in 0..n {
        for i in 0..m {
            out.push(f(i, j, data[i + j * m]));
        }
    }
    Matrix { m, n, data: out }
}
