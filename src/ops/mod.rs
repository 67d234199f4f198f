//! Elementwise operator framework over dense and sparse matrices.
//!
//! Operators are expressed as per-element closures plus a small descriptor
//! value declaring, for each storage combination, whether the result may
//! remain sparse.  Broadcasting of scalar, single-row and single-column
//! operands follows MATLAB rules: shapes are normalized first, then one of
//! four uniform algorithms runs (dense×dense, sparse×sparse merge, and the
//! two pattern-preserving mixed passes).
//!
//! Sparse outputs require the operator to preserve implicit zeros; this is
//! probed at runtime rather than assumed.

mod binary;
mod broadcast;
mod merge;
mod reduce;
mod unary;

pub use binary::*;
pub use reduce::*;
pub use unary::*;

use crate::algebra::{BorrowedCscMatrix, BorrowedMatrix, CscMatrix, Matrix, ScalarT};
use thiserror::Error;

/// Presence tag handed to a binary operator at each combined position,
/// recovering the implicit-zero semantics of sparse storage.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntryType {
    /// both operands store an entry here
    Both,
    /// only the left operand stores an entry here
    LeftOnly,
    /// only the right operand stores an entry here
    RightOnly,
    /// neither operand stores an entry here
    Neither,
}

/// Error type returned by the operator dispatch functions.
#[derive(Error, Debug)]
pub enum OpError {
    /// Operand shapes cannot be reconciled by broadcasting
    #[error("Operand dimensions are incompatible")]
    DimensionMismatch,
    /// A sparse-output operator failed its implicit-zero probe
    #[error("Operator does not map implicit zeros to zero")]
    ZeroPreserving,
}

/// Per-operator configuration for unary dispatch.
#[derive(Copy, Clone, Debug)]
pub struct UnaryOpTraits {
    /// a sparse operand may produce a sparse result with the same pattern
    pub sparse_out: bool,
    /// drop explicit default-valued entries from a sparse result
    pub prune_zeros: bool,
}

/// Per-operator configuration for binary dispatch: whether each storage
/// combination may keep a sparse result rather than densifying.
#[derive(Copy, Clone, Debug)]
pub struct BinaryOpTraits {
    /// sparse×sparse may stay sparse (requires `f(...,Neither) == 0`)
    pub sparse_ss: bool,
    /// sparse×dense may keep the left operand's pattern
    pub sparse_sd: bool,
    /// dense×sparse may keep the right operand's pattern
    pub sparse_ds: bool,
    /// drop explicit default-valued entries from a sparse result
    pub prune_zeros: bool,
}

impl BinaryOpTraits {
    /// Configuration for operators that always densify.
    pub const DENSE: Self = Self {
        sparse_ss: false,
        sparse_sd: false,
        sparse_ds: false,
        prune_zeros: false,
    };
}

/// Borrowed operand for the operator framework: a dense or sparse view.
#[derive(Copy, Clone, Debug)]
pub enum MatrixRef<'a, T> {
    Dense(BorrowedMatrix<'a, T>),
    Sparse(BorrowedCscMatrix<'a, T>),
}

impl<T> MatrixRef<'_, T> {
    pub fn size(&self) -> (usize, usize) {
        match self {
            MatrixRef::Dense(a) => (a.m, a.n),
            MatrixRef::Sparse(a) => (a.m, a.n),
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, MatrixRef::Sparse(_))
    }
}

impl<'a, T: Copy + Default + PartialEq> From<&'a Matrix<T>> for MatrixRef<'a, T> {
    fn from(src: &'a Matrix<T>) -> Self {
        MatrixRef::Dense(BorrowedMatrix {
            m: src.m,
            n: src.n,
            data: &src.data,
        })
    }
}

impl<'a, T: Copy + Default + PartialEq> From<&'a CscMatrix<T>> for MatrixRef<'a, T> {
    fn from(src: &'a CscMatrix<T>) -> Self {
        MatrixRef::Sparse(src.as_borrowed())
    }
}

/// Owned result of an operator: freshly allocated dense or sparse storage,
/// handed back to the result-encoding boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyMatrix<T> {
    Dense(Matrix<T>),
    Sparse(CscMatrix<T>),
}

impl<T: Copy + Default + PartialEq> AnyMatrix<T> {
    pub fn as_ref(&self) -> MatrixRef<'_, T> {
        match self {
            AnyMatrix::Dense(a) => MatrixRef::Dense(BorrowedMatrix {
                m: a.m,
                n: a.n,
                data: &a.data,
            }),
            AnyMatrix::Sparse(a) => MatrixRef::Sparse(a.as_borrowed()),
        }
    }

    pub fn size(&self) -> (usize, usize) {
        self.as_ref().size()
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, AnyMatrix::Sparse(_))
    }
}

impl<T: ScalarT> AnyMatrix<T> {
    /// Dense copy of the result, whatever its storage kind.
    pub fn to_dense(&self) -> Matrix<T> {
        match self {
            AnyMatrix::Dense(a) => a.clone(),
            AnyMatrix::Sparse(a) => a.to_dense(),
        }
    }
}
