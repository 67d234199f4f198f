//! Weighted Gram matrix `H = A·W·Aᵀ` with a fixed nonzero pattern.
//!
//! The upper triangular pattern of H is computed once at construction and
//! reused for every numeric refresh with new diagonal weights, so the
//! symbolic analysis of the factorization downstream stays valid.  The
//! diagonal is always structurally present, which lets a scalar shift be
//! folded into the stored values without touching the pattern.

#![allow(non_snake_case)]

use crate::algebra::*;

#[derive(Debug)]
pub(crate) struct WeightedGram<T> {
    /// constraint matrix, m x n with m <= n
    A: CscMatrix<T>,
    /// its transpose, used for row access to A
    At: CscMatrix<T>,
    /// upper triangle of A·W·Aᵀ; pattern fixed, values refreshed
    pub H: CscMatrix<T>,
    /// position of each diagonal entry (i,i) in `H.nzval`
    pub diag_idx: Vec<usize>,
    /// dense scatter accumulator for one column of H
    scratch: Vec<T>,
}

impl<T> WeightedGram<T>
where
    T: ScalarT,
{
    /// Capture `A` and compute the upper triangular pattern of A·Aᵀ with a
    /// structurally present diagonal.  Values in `H` are unspecified until
    /// the first [`refresh`](WeightedGram::refresh).
    pub fn new(A: CscMatrix<T>) -> Self {
        let m = A.nrows();
        let At = A.transpose();

        let H = triu_gram_pattern(&A, &At);

        // diagonal entry positions within each column of H.  The pattern
        // construction guarantees one exists per column, as the last
        // stored row of that column.
        let mut diag_idx = Vec::with_capacity(m);
        for i in 0..m {
            let k = H.colptr[i + 1] - 1;
            debug_assert_eq!(H.rowval[k], i);
            diag_idx.push(k);
        }

        Self {
            A,
            At,
            H,
            diag_idx,
            scratch: vec![T::zero(); m],
        }
    }

    pub fn a(&self) -> &CscMatrix<T> {
        &self.A
    }

    pub fn at(&self) -> &CscMatrix<T> {
        &self.At
    }

    pub fn nrows(&self) -> usize {
        self.A.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.A.ncols()
    }

    /// Recompute the stored values of H for diagonal weights `w`, leaving
    /// the pattern untouched.  `w` must have one entry per column of A.
    pub fn refresh(&mut self, w: &[T]) {
        assert_eq!(w.len(), self.A.ncols());

        let (A, At, H) = (&self.A, &self.At, &mut self.H);
        let vals = &mut self.scratch;

        // column c of H is sum_j w_j A[c,j] * A[:,j], restricted to the
        // upper triangle; scatter into a dense column, gather through the
        // fixed pattern
        for c in 0..H.n {
            for k in At.colptr[c]..At.colptr[c + 1] {
                let j = At.rowval[k];
                let alpha = w[j] * At.nzval[k];
                for kk in A.colptr[j]..A.colptr[j + 1] {
                    let r = A.rowval[kk];
                    if r <= c {
                        vals[r] += alpha * A.nzval[kk];
                    }
                }
            }
            for k in H.colptr[c]..H.colptr[c + 1] {
                let r = H.rowval[k];
                H.nzval[k] = vals[r];
                vals[r] = T::zero();
            }
        }
    }
}

// upper triangular pattern of A·Aᵀ unioned with the full diagonal.  Row
// indices ascend within each column, so the diagonal entry closes each
// column.  Stored values are meaningless; only the structure is kept.
fn triu_gram_pattern<T: ScalarT>(A: &CscMatrix<T>, At: &CscMatrix<T>) -> CscMatrix<T> {
    let m = A.nrows();

    // symbolic pass: count entries of each upper-triangle column,
    // with the diagonal forced in
    let mut marker = vec![usize::MAX; m];
    let mut counts = vec![0usize; m];
    for c in 0..m {
        marker[c] = c;
        counts[c] = 1;
        for k in At.colptr[c]..At.colptr[c + 1] {
            let j = At.rowval[k];
            for kk in A.colptr[j]..A.colptr[j + 1] {
                let r = A.rowval[kk];
                if r < c && marker[r] != c {
                    marker[r] = c;
                    counts[c] += 1;
                }
            }
        }
    }

    let nnz = counts.iter().sum();
    let mut H = CscMatrix::<T>::spalloc((m, m), nnz);

    marker.fill(usize::MAX);
    let mut rows = Vec::with_capacity(m);
    let mut ptr = 0;
    for c in 0..m {
        H.colptr[c] = ptr;
        rows.clear();

        for k in At.colptr[c]..At.colptr[c + 1] {
            let j = At.rowval[k];
            for kk in A.colptr[j]..A.colptr[j + 1] {
                let r = A.rowval[kk];
                if r < c && marker[r] != c {
                    marker[r] = c;
                    rows.push(r);
                }
            }
        }

        rows.sort_unstable();
        for &r in &rows {
            H.rowval[ptr] = r;
            ptr += 1;
        }
        // diagonal always last in the column
        H.rowval[ptr] = c;
        ptr += 1;
    }
    H.colptr[m] = ptr;
    H
}
