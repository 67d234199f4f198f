//! Broadcasting materialization.
//!
//! Shape normalization is a separate phase from the elementwise algorithms:
//! a scalar, single-row or single-column operand is first expanded to the
//! resolved output shape, so the four storage-combination algorithms never
//! see mismatched shapes.

use super::{AnyMatrix, MatrixRef, OpError};
use crate::algebra::{BorrowedCscMatrix, BorrowedMatrix, CscMatrix, DenseMatrix, Matrix, ScalarT};

// resolve a single dimension pair under MATLAB broadcast rules
fn resolve_dim(a: usize, b: usize) -> Result<usize, OpError> {
    if a == b {
        Ok(a)
    } else if a == 1 {
        Ok(b)
    } else if b == 1 {
        Ok(a)
    } else {
        Err(OpError::DimensionMismatch)
    }
}

/// Resolve the broadcast output shape of two operands.
pub(crate) fn resolve_shape(
    a: (usize, usize),
    b: (usize, usize),
) -> Result<(usize, usize), OpError> {
    Ok((resolve_dim(a.0, b.0)?, resolve_dim(a.1, b.1)?))
}

/// Expand a broadcast-source operand to the full output shape, or return
/// `None` if it is already full shape.  `keep_sparse` selects between the
/// sparse replication and densification of a sparse source.
pub(crate) fn normalize<T: ScalarT>(
    op: MatrixRef<'_, T>,
    shape: (usize, usize),
    keep_sparse: bool,
) -> Option<AnyMatrix<T>> {
    if op.size() == shape {
        return None;
    }
    Some(match op {
        MatrixRef::Dense(a) => AnyMatrix::Dense(expand_dense(a, shape)),
        MatrixRef::Sparse(a) => {
            if keep_sparse {
                AnyMatrix::Sparse(replicate_sparse(a, shape))
            } else {
                AnyMatrix::Dense(expand_dense_from_sparse(a, shape))
            }
        }
    })
}

// replicate a dense 1 x n, m x 1 or 1 x 1 source to the full shape
fn expand_dense<T: ScalarT>(a: BorrowedMatrix<'_, T>, shape: (usize, usize)) -> Matrix<T> {
    let (m, n) = shape;
    let mut out = Matrix::zeros((m, n));
    for j in 0..n {
        let src_j = if a.n == 1 { 0 } else { j };
        for i in 0..m {
            let src_i = if a.m == 1 { 0 } else { i };
            out[(i, j)] = a.at((src_i, src_j));
        }
    }
    out
}

fn expand_dense_from_sparse<T: ScalarT>(
    a: BorrowedCscMatrix<'_, T>,
    shape: (usize, usize),
) -> Matrix<T> {
    let dense = a.to_dense();
    expand_dense(dense.as_borrowed(), shape)
}

// Replicate a sparse broadcast source into a full sparse matrix: the
// outer-product expansion ones(m,1)*a (row source) or a*ones(1,n) (column
// source), so the generic merge algorithm can run unmodified.
fn replicate_sparse<T: ScalarT>(a: BorrowedCscMatrix<'_, T>, shape: (usize, usize)) -> CscMatrix<T> {
    let (m, n) = shape;
    let reprow = a.m == 1 && m > 1;
    let repcol = a.n == 1 && n > 1;

    // per source column nonzero count
    let src_nnz = a.nnz();
    let nnz = match (reprow, repcol) {
        (true, true) => src_nnz * m * n, // 1 x 1 source
        (true, false) => src_nnz * m,    // 1 x n source: each column fills m rows
        (false, true) => src_nnz * n,    // m x 1 source: column repeated n times
        (false, false) => src_nnz,
    };

    let mut out = CscMatrix::spalloc((m, n), nnz);

    let mut ptr = 0;
    for j in 0..n {
        out.colptr[j] = ptr;
        let src_j = if repcol { 0 } else { j };
        for k in a.colptr[src_j]..a.colptr[src_j + 1] {
            if reprow {
                // single stored row expands to every output row
                for i in 0..m {
                    out.rowval[ptr] = i;
                    out.nzval[ptr] = a.nzval[k];
                    ptr += 1;
                }
            } else {
                out.rowval[ptr] = a.rowval[k];
                out.nzval[ptr] = a.nzval[k];
                ptr += 1;
            }
        }
    }
    out.colptr[n] = ptr;
    out
}
