//! Persistent solver for repeated factorizations of `A·W·Aᵀ + shift·I`.

#![allow(non_snake_case)]

use super::ldl::{CholSettings, LdlError, LdlFactor};
use super::spmat::WeightedGram;
use crate::algebra::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// One solver instance bound to a fixed constraint matrix A (m x n, m <= n).
///
/// The pattern of `H = A·W·Aᵀ` and its symbolic factorization are computed
/// once at construction; `factorize` may then be called any number of times
/// with fresh diagonal weights and shift.  Numeric loss of positive
/// definiteness is an expected outcome reported as `false`, after which the
/// caller may retry with different weights.  `solve`, `sqrt_diag` and
/// `half_projection` require the most recent factorize to have succeeded.
#[derive(Debug)]
pub struct PackedChol<T: ScalarT> {
    gram: WeightedGram<T>,
    ldl: LdlFactor<T>,
    // identity entry map for streaming H values into the factorization
    hidx: Vec<usize>,
    settings: CholSettings<T>,
    rng: StdRng,
    factored: bool,
}

impl<T> PackedChol<T>
where
    T: ScalarT,
{
    /// Bind to `A` and perform the symbolic analysis of A·Aᵀ.  `seed`
    /// determines the deterministic stream of random projections drawn by
    /// [`half_projection`](PackedChol::half_projection).
    pub fn new(A: CscMatrix<T>, seed: u64, settings: CholSettings<T>) -> Result<Self, LdlError> {
        if A.nrows() > A.ncols() {
            return Err(LdlError::IncompatibleDimension);
        }

        let gram = WeightedGram::new(A);
        let ldl = LdlFactor::new(&gram.H, &settings)?;
        let hidx = (0..gram.H.nnz()).collect();

        Ok(Self {
            gram,
            ldl,
            hidx,
            settings,
            rng: StdRng::seed_from_u64(seed),
            factored: false,
        })
    }

    pub fn nrows(&self) -> usize {
        self.gram.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.gram.ncols()
    }

    /// `true` when the most recent factorize succeeded
    pub fn is_factored(&self) -> bool {
        self.factored
    }

    /// Default refinement step count from the solver settings.
    pub fn refine_steps(&self) -> usize {
        self.settings.refine_steps
    }

    /// Refactorize `A·W·Aᵀ + shift·I` for diagonal weights `w`.  The shift
    /// is folded into the stored diagonal values rather than being formed
    /// as a matrix.  Returns the success of the numeric factorization.
    pub fn factorize(&mut self, w: &[T], shift: T) -> bool {
        assert_eq!(w.len(), self.gram.ncols());

        self.gram.refresh(w);
        self.ldl.update_values(&self.hidx, &self.gram.H.nzval);
        if shift != T::zero() {
            self.ldl.offset_values(&self.gram.diag_idx, shift);
        }

        self.factored = self.ldl.refactor().is_ok();
        self.factored
    }

    /// Solve `H·X = B` column by column with `refine_steps` rounds of
    /// iterative refinement against the weights `w`.  Each round computes
    /// the residual `R = B − A·(W·(AᵀX))` from the unshifted weighted Gram
    /// product and adds the correction `H⁻¹R`.  `w` may differ slightly
    /// from the weights factorized; refinement then corrects the solution
    /// toward the supplied weights, with the shift acting purely as a
    /// regularizer of the factorization.
    pub fn solve(&mut self, B: &Matrix<T>, w: &[T], refine_steps: usize) -> Matrix<T> {
        assert!(self.factored);
        let m = self.nrows();
        let n = self.ncols();
        assert_eq!(B.nrows(), m);
        assert_eq!(w.len(), n);

        let mut X = B.clone();
        let mut resid = vec![T::zero(); m];
        let mut atx = vec![T::zero(); n];

        for j in 0..B.ncols() {
            let x = X.col_slice_mut(j);
            self.ldl.solve(x);

            for _ in 0..refine_steps {
                // R = b - A*(W*(A'x))
                let A = self.gram.a();
                self.gram.at().gemv(&mut atx, x, T::one(), T::zero());
                for (v, wi) in atx.iter_mut().zip(w) {
                    *v *= *wi;
                }
                resid.copy_from(B.col_slice(j));
                A.gemv(&mut resid, &atx, -T::one(), T::one());

                self.ldl.solve(&mut resid);
                for (xi, di) in x.iter_mut().zip(&resid) {
                    *xi += *di;
                }
            }
        }
        X
    }

    /// Diagonal of the Cholesky factor of H, in original row order.
    pub fn sqrt_diag(&self) -> Vec<T> {
        assert!(self.factored);
        let mut out = vec![T::zero(); self.nrows()];
        self.ldl.sqrt_diagonal(&mut out);
        out
    }

    /// Draw `k` random ±1 columns, apply the inverse upper triangular
    /// factor to each, and project through Aᵀ.  The result is an n x k
    /// sketch whose squared row norms estimate the leverage scores of the
    /// weighted system.  Draws advance the instance's deterministic RNG.
    pub fn half_projection(&mut self, k: usize) -> Matrix<T> {
        assert!(self.factored);
        let m = self.nrows();
        let n = self.ncols();

        let mut out = Matrix::zeros((n, k));
        let mut s = vec![T::zero(); m];

        for j in 0..k {
            for si in s.iter_mut() {
                *si = if self.rng.gen::<bool>() {
                    T::one()
                } else {
                    -T::one()
                };
            }
            self.ldl.half_solve(&mut s);
            self.gram.at().gemv(out.col_slice_mut(j), &s, T::one(), T::zero());
        }
        out
    }
}
