//! Precision-tagged bundle of solver instances over one constraint matrix.

#![allow(non_snake_case)]

use super::ldl::{CholSettings, LdlError};
use super::packedchol::PackedChol;
use crate::algebra::*;

/// Runtime tag selecting one of the three scalar representations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarTag {
    /// native f64, one word
    F64,
    /// compensated double-double, two words
    Double,
    /// compensated quad-double, four words
    Quad,
}

impl ScalarTag {
    /// words per element of the packed encoding for this tag
    pub fn words(&self) -> usize {
        match self {
            ScalarTag::F64 => f64::WORDS,
            ScalarTag::Double => DoubleF64::WORDS,
            ScalarTag::Quad => QuadF64::WORDS,
        }
    }
}

/// Three parallel [`PackedChol`] instances (f64, double-double and
/// quad-double) built from the same constraint matrix and seed.
///
/// `factorize` records the precision tag it was called with; subsequent
/// solve, diagonal and projection calls route to that instance.  The matrix
/// boundary of every operation is native f64; the selected precision governs
/// the internal arithmetic only.
#[derive(Debug)]
pub struct CholBundle {
    chol1: PackedChol<f64>,
    chol2: PackedChol<DoubleF64>,
    chol4: PackedChol<QuadF64>,
    active: Option<ScalarTag>,
}

impl CholBundle {
    pub fn new(A: &CscMatrix<f64>, seed: u64) -> Result<Self, LdlError> {
        Ok(Self {
            chol1: PackedChol::new(A.clone(), seed, CholSettings::default())?,
            chol2: PackedChol::new(A.map_scalars(), seed, CholSettings::default())?,
            chol4: PackedChol::new(A.map_scalars(), seed, CholSettings::default())?,
            active: None,
        })
    }

    pub fn nrows(&self) -> usize {
        self.chol1.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.chol1.ncols()
    }

    /// Tag recorded by the most recent factorize, if any.
    pub fn active(&self) -> Option<ScalarTag> {
        self.active
    }

    /// `true` when the most recent factorize succeeded
    pub fn is_factored(&self) -> bool {
        match self.active {
            Some(ScalarTag::F64) => self.chol1.is_factored(),
            Some(ScalarTag::Double) => self.chol2.is_factored(),
            Some(ScalarTag::Quad) => self.chol4.is_factored(),
            None => false,
        }
    }

    pub fn refine_steps(&self) -> usize {
        self.chol1.refine_steps()
    }

    pub fn factorize(&mut self, tag: ScalarTag, w: &[f64], shift: f64) -> bool {
        self.active = Some(tag);
        match tag {
            ScalarTag::F64 => self.chol1.factorize(w, shift),
            ScalarTag::Double => {
                let w = w.iter().map(|&x| DoubleF64::from_f64(x)).collect::<Vec<_>>();
                self.chol2.factorize(&w, DoubleF64::from_f64(shift))
            }
            ScalarTag::Quad => {
                let w = w.iter().map(|&x| QuadF64::from_f64(x)).collect::<Vec<_>>();
                self.chol4.factorize(&w, QuadF64::from_f64(shift))
            }
        }
    }

    pub fn solve(&mut self, B: &Matrix<f64>, w: &[f64], refine_steps: usize) -> Matrix<f64> {
        match self.active {
            Some(ScalarTag::F64) => self.chol1.solve(B, w, refine_steps),
            Some(ScalarTag::Double) => {
                let w = w.iter().map(|&x| DoubleF64::from_f64(x)).collect::<Vec<_>>();
                self.chol2.solve(&B.map_scalars(), &w, refine_steps).map_scalars()
            }
            Some(ScalarTag::Quad) => {
                let w = w.iter().map(|&x| QuadF64::from_f64(x)).collect::<Vec<_>>();
                self.chol4.solve(&B.map_scalars(), &w, refine_steps).map_scalars()
            }
            None => unreachable!("solve requires a successful factorize"),
        }
    }

    pub fn sqrt_diag(&self) -> Vec<f64> {
        match self.active {
            Some(ScalarTag::F64) => self.chol1.sqrt_diag(),
            Some(ScalarTag::Double) => self.chol2.sqrt_diag().iter().map(|x| x.to_f64()).collect(),
            Some(ScalarTag::Quad) => self.chol4.sqrt_diag().iter().map(|x| x.to_f64()).collect(),
            None => unreachable!("sqrt_diag requires a successful factorize"),
        }
    }

    pub fn half_projection(&mut self, k: usize) -> Matrix<f64> {
        match self.active {
            Some(ScalarTag::F64) => self.chol1.half_projection(k),
            Some(ScalarTag::Double) => self.chol2.half_projection(k).map_scalars(),
            Some(ScalarTag::Quad) => self.chol4.half_projection(k).map_scalars(),
            None => unreachable!("half_projection requires a successful factorize"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye(n: usize) -> CscMatrix<f64> {
        CscMatrix::identity(n)
    }

    #[test]
    fn factorize_records_the_tag() {
        let mut bundle = CholBundle::new(&eye(2), 0).unwrap();
        assert_eq!(bundle.active(), None);
        assert!(!bundle.is_factored());

        assert!(bundle.factorize(ScalarTag::Double, &[1., 1.], 0.));
        assert_eq!(bundle.active(), Some(ScalarTag::Double));
        assert!(bundle.is_factored());
    }

    #[test]
    fn all_precisions_agree_on_simple_systems() {
        let B = Matrix::new_from_slice((2, 1), &[3., 5.]);
        for tag in [ScalarTag::F64, ScalarTag::Double, ScalarTag::Quad] {
            let mut bundle = CholBundle::new(&eye(2), 0).unwrap();
            assert!(bundle.factorize(tag, &[1., 1.], 0.));
            let X = bundle.solve(&B, &[1., 1.], 0);
            assert_eq!(X.data, vec![3., 5.]);
        }
    }

    #[test]
    fn tag_words() {
        assert_eq!(ScalarTag::F64.words(), 1);
        assert_eq!(ScalarTag::Double.words(), 2);
        assert_eq!(ScalarTag::Quad.words(), 4);
    }
}
