use crate::algebra::*;

impl<T: ScalarT> MatrixVectorMultiply for CscMatrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_n(self, y, x, a, b);
    }
}

impl<T: ScalarT> MatrixVectorMultiply for Adjoint<'_, CscMatrix<T>> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_t(self.src, y, x, a, b);
    }
}

impl<T: ScalarT> CscMatrix<T> {
    /// C = A*B with both operands sparse.
    ///
    /// Classical two-pass column product: a symbolic pass marks the rows
    /// reached in each output column, a numeric pass scatters products into
    /// a dense accumulator and gathers them back out in sorted row order.
    #[allow(non_snake_case)]
    pub fn spgemm(&self, B: &CscMatrix<T>) -> CscMatrix<T> {
        assert_eq!(self.n, B.m);
        let m = self.m;
        let n = B.n;

        // symbolic pass: count the pattern of each output column
        let mut marker = vec![usize::MAX; m];
        let mut nnz = 0;
        for j in 0..n {
            for ptr in B.colptr[j]..B.colptr[j + 1] {
                let k = B.rowval[ptr];
                for aptr in self.colptr[k]..self.colptr[k + 1] {
                    let i = self.rowval[aptr];
                    if marker[i] != j {
                        marker[i] = j;
                        nnz += 1;
                    }
                }
            }
        }

        let mut C = CscMatrix::spalloc((m, n), nnz);
        let mut accum = vec![T::zero(); m];
        let mut rows = Vec::with_capacity(m);
        marker.fill(usize::MAX);

        let mut ptrC = 0;
        for j in 0..n {
            C.colptr[j] = ptrC;
            rows.clear();

            for ptr in B.colptr[j]..B.colptr[j + 1] {
                let k = B.rowval[ptr];
                let bkj = B.nzval[ptr];
                for aptr in self.colptr[k]..self.colptr[k + 1] {
                    let i = self.rowval[aptr];
                    if marker[i] != j {
                        marker[i] = j;
                        accum[i] = T::zero();
                        rows.push(i);
                    }
                    accum[i] += self.nzval[aptr] * bkj;
                }
            }

            rows.sort_unstable();
            for &i in &rows {
                C.rowval[ptrC] = i;
                C.nzval[ptrC] = accum[i];
                ptrC += 1;
            }
        }
        C.colptr[n] = ptrC;
        C
    }

    /// C = A*B with a dense right operand, producing a dense result.
    #[allow(non_snake_case)]
    pub fn mul_dense(&self, B: &Matrix<T>) -> Matrix<T> {
        assert_eq!(self.n, B.m);
        let mut C = Matrix::zeros((self.m, B.n));
        for j in 0..B.n {
            self.gemv(C.col_slice_mut(j), B.col_slice(j), T::one(), T::zero());
        }
        C
    }
}

// sparse matrix-vector multiply, no transpose
fn _csc_axpby_n<T: ScalarT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    // first do the b*y part
    if b == T::zero() {
        y.set(T::zero());
    } else if b == T::one() {
    } else if b == -T::one() {
        y.negate();
    } else {
        y.scale(b);
    }

    // if a is zero, we're done
    if a == T::zero() {
        return;
    }

    assert_eq!(A.nzval.len(), *A.colptr.last().unwrap());
    assert_eq!(x.len(), A.n);
    assert_eq!(y.len(), A.m);

    // y += a*A*x
    if a == T::one() {
        for (j, xj) in x.iter().enumerate().take(A.n) {
            for i in A.colptr[j]..A.colptr[j + 1] {
                y[A.rowval[i]] += A.nzval[i] * *xj;
            }
        }
    } else if a == -T::one() {
        for (j, xj) in x.iter().enumerate().take(A.n) {
            for i in A.colptr[j]..A.colptr[j + 1] {
                y[A.rowval[i]] -= A.nzval[i] * *xj;
            }
        }
    } else {
        for (j, xj) in x.iter().enumerate().take(A.n) {
            for i in A.colptr[j]..A.colptr[j + 1] {
                y[A.rowval[i]] += a * A.nzval[i] * *xj;
            }
        }
    }
}

// sparse matrix-vector multiply, transposed
fn _csc_axpby_t<T: ScalarT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    // first do the b*y part
    if b == T::zero() {
        y.set(T::zero());
    } else if b == T::one() {
    } else if b == -T::one() {
        y.negate();
    } else {
        y.scale(b);
    }

    // if a is zero, we're done
    if a == T::zero() {
        return;
    }

    assert_eq!(A.nzval.len(), *A.colptr.last().unwrap());
    assert_eq!(x.len(), A.m);
    assert_eq!(y.len(), A.n);

    // y += a*A'*x
    if a == T::one() {
        for (j, yj) in y.iter_mut().enumerate().take(A.n) {
            for k in A.colptr[j]..A.colptr[j + 1] {
                *yj += A.nzval[k] * x[A.rowval[k]];
            }
        }
    } else if a == -T::one() {
        for (j, yj) in y.iter_mut().enumerate().take(A.n) {
            for k in A.colptr[j]..A.colptr[j + 1] {
                *yj -= A.nzval[k] * x[A.rowval[k]];
            }
        }
    } else {
        for (j, yj) in y.iter_mut().enumerate().take(A.n) {
            for k in A.colptr[j]..A.colptr[j + 1] {
                *yj += a * A.nzval[k] * x[A.rowval[k]];
            }
        }
    }
}
