#![allow(non_snake_case)]

mod core;
mod matrix_math;

use crate::algebra::ShapedMatrix;

/// Sparse matrix in standard Compressed Sparse Column (CSC) format
///
/// __Example usage__ : To construct the 3 x 3 matrix
/// ```text
/// A = [1.  3.  5.]
///     [2.  0.  6.]
///     [0.  4.  7.]
/// ```
///
/// ```no_run
/// use polychol::algebra::CscMatrix;
///
/// let A: CscMatrix<f64> = CscMatrix::new(
///    3,                                // m
///    3,                                // n
///    vec![0, 2, 4, 7],                 // colptr
///    vec![0, 1, 0, 2, 0, 1, 2],        // rowval
///    vec![1., 2., 3., 4., 5., 6., 7.], // nzval
///  );
///
/// // optional correctness check
/// assert!(A.check_format().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix<T = f64> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// CSC format column pointer.
    ///
    /// This field should have length `n+1`. The last entry corresponds
    /// to the number of nonzeros and should agree with the lengths
    /// of the `rowval` and `nzval` fields.
    pub colptr: Vec<usize>,
    /// vector of row indices
    pub rowval: Vec<usize>,
    /// vector of non-zero matrix elements
    pub nzval: Vec<T>,
}

/// Borrowed CSC view over externally owned column pointer / row index /
/// value triples.  Borrowed for the duration of one engine call.
#[derive(Debug, Clone, Copy)]
pub struct BorrowedCscMatrix<'a, T> {
    /// number of rows
    pub m: usize,
    /// number of columns
    pub n: usize,
    /// column pointer of length `n+1`
    pub colptr: &'a [usize],
    /// row indices
    pub rowval: &'a [usize],
    /// stored values
    pub nzval: &'a [T],
}

impl<T> ShapedMatrix for CscMatrix<T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
}

impl<T> ShapedMatrix for BorrowedCscMatrix<'_, T> {
    fn nrows(&self) -> usize {
        self.m
    }
    fn ncols(&self) -> usize {
        self.n
    }
}
