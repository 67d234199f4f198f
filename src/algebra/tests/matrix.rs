#![allow(non_snake_case)]
use crate::algebra::*;

fn test_matrix_3x4() -> CscMatrix<f64> {
    // A =
    //[-1.0  -17.0  6.0  10.0]
    //[ 3.0     ⋅   7.0    ⋅ ]
    //[  ⋅    -4.0   ⋅   -5.0]
    let Ap = vec![0, 2, 4, 6, 8];
    let Ai = vec![0, 1, 0, 2, 0, 1, 0, 2];
    let Ax = vec![-1., 3., -17., -4., 6., 7., 10., -5.];
    CscMatrix::new(3, 4, Ap, Ai, Ax)
}

#[test]
fn test_check_format() {
    let A = test_matrix_3x4();
    assert!(A.check_format().is_ok());

    let mut B = test_matrix_3x4();
    B.rowval[0] = 5; // out of bounds
    assert!(matches!(
        B.check_format(),
        Err(SparseFormatError::BadRowval)
    ));

    let mut C = test_matrix_3x4();
    C.colptr[1] = 3; // non monotone relative to colptr[2] == 4? still ok; break harder
    C.colptr[2] = 2;
    assert!(matches!(
        C.check_format(),
        Err(SparseFormatError::BadColptr)
    ));

    let mut D = test_matrix_3x4();
    D.rowval.swap(0, 1); // unsorted within column
    assert!(matches!(
        D.check_format(),
        Err(SparseFormatError::BadRowOrdering)
    ));
}

#[test]
fn test_to_dense_from_dense_roundtrip() {
    let A = test_matrix_3x4();
    let D = A.to_dense();

    assert_eq!(D[(0, 0)], -1.);
    assert_eq!(D[(1, 0)], 3.);
    assert_eq!(D[(2, 0)], 0.);
    assert_eq!(D[(2, 3)], -5.);

    let B = CscMatrix::from_dense(&D);
    assert_eq!(A, B);
}

#[test]
fn test_transpose() {
    let A = test_matrix_3x4();
    let At = A.transpose();

    assert!(At.check_format().is_ok());
    assert_eq!(At.nrows(), 4);
    assert_eq!(At.ncols(), 3);
    assert_eq!(At.to_dense(), A.to_dense().transpose());

    // transposing back reproduces the original exactly
    assert_eq!(At.transpose(), A);
}

#[test]
fn test_gemv() {
    let A = test_matrix_3x4();
    let x = vec![1., 2., 3., 4.];
    let mut y = vec![1., 1., 1.];

    // y = 2*A*x + y
    A.gemv(&mut y, &x, 2., 1.);
    assert_eq!(y, vec![2. * 23. + 1., 2. * 24. + 1., 2. * (-28.) + 1.]);

    // y = A'*x with x of length 3
    let x = vec![1., 2., 3.];
    let mut y = vec![0.; 4];
    A.t().gemv(&mut y, &x, 1., 0.);
    assert_eq!(y, vec![5., -29., 20., -5.]);
}

#[test]
fn test_spgemm_matches_dense() {
    let A = test_matrix_3x4();
    let B = A.transpose(); // 4 x 3

    let C = A.spgemm(&B);
    assert!(C.check_format().is_ok());

    let Cref = A.to_dense().mul(&B.to_dense());
    assert_eq!(C.to_dense(), Cref);
}

#[test]
fn test_mul_dense() {
    let A = test_matrix_3x4();
    let B = Matrix::identity(4);
    assert_eq!(A.mul_dense(&B), A.to_dense());
}

#[test]
fn test_prune_zeros() {
    let mut A = test_matrix_3x4();
    A.nzval[1] = 0.;
    A.nzval[5] = 0.;
    A.prune_zeros();

    assert!(A.check_format().is_ok());
    assert_eq!(A.nnz(), 6);
    assert_eq!(A.to_dense()[(1, 0)], 0.);
    assert_eq!(A.to_dense()[(1, 2)], 0.);
}

#[test]
fn test_map_scalars_roundtrip() {
    let A = test_matrix_3x4();
    let Add: CscMatrix<DoubleF64> = A.map_scalars();
    let back: CscMatrix<f64> = Add.map_scalars();
    assert_eq!(A, back);
}
