//! Scalar and matrix types underlying the operator framework and the
//! persistent Cholesky solver.
//!
//! All numeric code in the crate is generic over the [`ScalarT`] trait, with
//! implementations for `f64` and the compensated extended-precision types
//! [`DoubleF64`] and [`QuadF64`].

mod csc;
mod dense;
mod double;
mod error_types;
mod floats;
mod quad;
mod vecmath;

pub use csc::*;
pub use dense::*;
pub use double::*;
pub use error_types::*;
pub use floats::*;
pub use quad::*;
pub use vecmath::*;

#[cfg(test)]
mod tests;

/// Matrix orientation marker
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum MatrixShape {
    /// Normal matrix orientation
    N,
    /// Transposed matrix orientation
    T,
}

/// Adjoint (transpose) view of a matrix
#[derive(Debug, Clone, Copy)]
pub struct Adjoint<'a, M> {
    /// The source matrix for this transposed view
    pub src: &'a M,
}

/// Dimension queries common to all matrix types
pub trait ShapedMatrix {
    fn nrows(&self) -> usize;
    fn ncols(&self) -> usize;
    fn size(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }
    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }
}

/// Matrix-vector multiply `y = a*self*x + b*y`
pub trait MatrixVectorMultiply {
    type T;
    fn gemv(&self, y: &mut [Self::T], x: &[Self::T], a: Self::T, b: Self::T);
}
