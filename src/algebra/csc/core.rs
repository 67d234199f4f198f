#![allow(non_snake_case)]

use super::{BorrowedCscMatrix, CscMatrix};
use crate::algebra::{Adjoint, Matrix, ScalarT, SparseFormatError};

impl<T> CscMatrix<T>
where
    T: Copy + Default + PartialEq,
{
    /// `CscMatrix` constructor.
    ///
    /// # Panics
    /// Makes rudimentary dimensional compatibility checks and panics on
    /// failure.  This constructor does __not__ ensure that row indices
    /// are in bounds or that entries within each column appear in order
    /// of increasing row index.  Use [`check_format`](CscMatrix::check_format)
    /// to verify those conditions.
    pub fn new(m: usize, n: usize, colptr: Vec<usize>, rowval: Vec<usize>, nzval: Vec<T>) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        assert_eq!(colptr[n], rowval.len());
        CscMatrix {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// allocate space for a sparse matrix with `nnz` elements
    pub fn spalloc(size: (usize, usize), nnz: usize) -> Self {
        let (m, n) = size;
        let mut colptr = vec![0; n + 1];
        let rowval = vec![0; nnz];
        let nzval = vec![T::default(); nnz];
        colptr[n] = nnz;

        CscMatrix::new(m, n, colptr, rowval, nzval)
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// transposed (adjoint) view
    pub fn t(&self) -> Adjoint<'_, Self> {
        Adjoint { src: self }
    }

    /// Borrowed view of the whole matrix.
    pub fn as_borrowed(&self) -> BorrowedCscMatrix<'_, T> {
        BorrowedCscMatrix {
            m: self.m,
            n: self.n,
            colptr: &self.colptr,
            rowval: &self.rowval,
            nzval: &self.nzval,
        }
    }

    /// Check that matrix data is correctly formatted.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        self.as_borrowed().check_format()
    }

    /// `true` if all stored entries sit on or above the diagonal
    pub fn is_triu(&self) -> bool {
        for j in 0..self.n {
            for k in self.colptr[j]..self.colptr[j + 1] {
                if self.rowval[k] > j {
                    return false;
                }
            }
        }
        true
    }

    /// Drop stored entries whose value equals the default (zero) value,
    /// compacting the storage in place.
    pub fn prune_zeros(&mut self) {
        let zero = T::default();
        let mut write = 0;

        for col in 0..self.n {
            let first = self.colptr[col];
            let last = self.colptr[col + 1];
            self.colptr[col] = write;
            for ptr in first..last {
                if self.nzval[ptr] != zero {
                    self.rowval[write] = self.rowval[ptr];
                    self.nzval[write] = self.nzval[ptr];
                    write += 1;
                }
            }
        }
        self.colptr[self.n] = write;
        self.rowval.truncate(write);
        self.nzval.truncate(write);
    }

    /// Transposed copy with sorted column entries.
    pub fn transpose(&self) -> Self {
        let mut At = CscMatrix::spalloc((self.n, self.m), self.nnz());

        // counting pass: entries per row of self become column counts of At
        for &row in &self.rowval {
            At.colptr[row] += 1;
        }
        At.colcount_to_colptr();

        // scatter pass, using colptr as the write cursor per column
        for col in 0..self.n {
            for ptr in self.colptr[col]..self.colptr[col + 1] {
                let row = self.rowval[ptr];
                let dest = At.colptr[row];
                At.rowval[dest] = col;
                At.nzval[dest] = self.nzval[ptr];
                At.colptr[row] += 1;
            }
        }
        At.backshift_colptrs();
        At
    }

    // convert an accumulated count-per-column into a colptr
    // (exclusive cumulative sum, leaving the total in the last slot)
    pub(crate) fn colcount_to_colptr(&mut self) {
        let mut currentptr = 0;
        for p in &mut self.colptr {
            let count = *p;
            *p = currentptr;
            currentptr += count;
        }
    }

    // after a fill pass that advanced colptr[j] to the end of column j,
    // shift the pointers back by one column to restore the invariant
    pub(crate) fn backshift_colptrs(&mut self) {
        self.colptr.rotate_right(1);
        self.colptr[0] = 0;
    }
}

impl<T> CscMatrix<T>
where
    T: ScalarT,
{
    /// Identity matrix of size `n`
    pub fn identity(n: usize) -> Self {
        let colptr = (0usize..=n).collect();
        let rowval = (0usize..n).collect();
        let nzval = vec![T::one(); n];

        CscMatrix::new(n, n, colptr, rowval, nzval)
    }

    /// Dense copy of the matrix.
    pub fn to_dense(&self) -> Matrix<T> {
        self.as_borrowed().to_dense()
    }

    /// Sparse copy of a dense matrix, storing only its nonzero entries.
    pub fn from_dense(A: &Matrix<T>) -> Self {
        let nnz = A.data.iter().filter(|&&x| x != T::zero()).count();
        let mut out = CscMatrix::spalloc((A.m, A.n), nnz);

        let mut ptr = 0;
        for col in 0..A.n {
            out.colptr[col] = ptr;
            for (row, &x) in A.col_slice(col).iter().enumerate() {
                if x != T::zero() {
                    out.rowval[ptr] = row;
                    out.nzval[ptr] = x;
                    ptr += 1;
                }
            }
        }
        out.colptr[A.n] = ptr;
        out
    }

    /// Elementwise conversion of the stored values to a new scalar type
    /// through f64, preserving the sparsity pattern.
    pub fn map_scalars<U: ScalarT>(&self) -> CscMatrix<U> {
        CscMatrix {
            m: self.m,
            n: self.n,
            colptr: self.colptr.clone(),
            rowval: self.rowval.clone(),
            nzval: self.nzval.iter().map(|&x| U::from_f64(x.to_f64())).collect(),
        }
    }
}

impl<'a, T> BorrowedCscMatrix<'a, T> {
    pub fn new(
        m: usize,
        n: usize,
        colptr: &'a [usize],
        rowval: &'a [usize],
        nzval: &'a [T],
    ) -> Self {
        assert_eq!(rowval.len(), nzval.len());
        assert_eq!(colptr.len(), n + 1);
        Self {
            m,
            n,
            colptr,
            rowval,
            nzval,
        }
    }

    /// number of nonzeros
    pub fn nnz(&self) -> usize {
        self.colptr[self.n]
    }

    /// Check that the viewed data satisfies the CSC format invariants.
    pub fn check_format(&self) -> Result<(), SparseFormatError> {
        if self.rowval.len() != self.nzval.len() {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        if self.colptr.is_empty()
            || (self.colptr.len() - 1) != self.n
            || self.colptr[self.n] != self.rowval.len()
        {
            return Err(SparseFormatError::IncompatibleDimension);
        }

        // check for colptr monotonicity
        if self.colptr.windows(2).any(|c| c[0] > c[1]) {
            return Err(SparseFormatError::BadColptr);
        }

        // check for rowval monotonicity (no duplicates) within each column
        for col in 0..self.n {
            let rng = self.colptr[col]..self.colptr[col + 1];
            if self.rowval[rng].windows(2).any(|c| c[0] >= c[1]) {
                return Err(SparseFormatError::BadRowOrdering);
            }
        }
        // check for row values out of bounds
        if !self.rowval.iter().all(|r| r < &self.m) {
            return Err(SparseFormatError::BadRowval);
        }

        Ok(())
    }
}

impl<T: Copy + Default + PartialEq> BorrowedCscMatrix<'_, T> {
    /// Owned copy of the viewed data.
    pub fn to_owned(&self) -> CscMatrix<T> {
        CscMatrix {
            m: self.m,
            n: self.n,
            colptr: self.colptr.to_vec(),
            rowval: self.rowval.to_vec(),
            nzval: self.nzval.to_vec(),
        }
    }
}

impl<T: ScalarT> BorrowedCscMatrix<'_, T> {
    /// Dense copy of the viewed matrix.
    pub fn to_dense(&self) -> Matrix<T> {
        let mut out = Matrix::zeros((self.m, self.n));
        for col in 0..self.n {
            for ptr in self.colptr[col]..self.colptr[col + 1] {
                out[(self.rowval[ptr], col)] = self.nzval[ptr];
            }
        }
        out
    }
}
