//! Call-scoped request/response state.
//!
//! Matrix operands cross the boundary as f64 word arrays: one word per
//! element for the native type, two or four words for the compensated
//! extended types, per the [`ScalarT`] packed encoding.  The input cursor
//! and output accumulator live in an explicit [`CallContext`] value rather
//! than in any module-level state.

use super::registry::Handle;
use super::EngineError;
use crate::algebra::{CscMatrix, Matrix, ScalarT};
use crate::chol::ScalarTag;
use crate::ops::AnyMatrix;

/// Borrowed input operand of one engine call.
#[derive(Copy, Clone, Debug)]
pub enum Value<'a> {
    Scalar(f64),
    Handle(Handle),
    Dense {
        tag: ScalarTag,
        m: usize,
        n: usize,
        words: &'a [f64],
    },
    Sparse {
        tag: ScalarTag,
        m: usize,
        n: usize,
        colptr: &'a [usize],
        rowval: &'a [usize],
        words: &'a [f64],
    },
}

impl Value<'_> {
    /// Precision tag of a matrix operand.
    pub fn tag(&self) -> Option<ScalarTag> {
        match self {
            Value::Dense { tag, .. } | Value::Sparse { tag, .. } => Some(*tag),
            _ => None,
        }
    }
}

/// Owned output operand of one engine call.
#[derive(Clone, Debug, PartialEq)]
pub enum OwnedValue {
    Scalar(f64),
    Bool(bool),
    Handle(Handle),
    Dense {
        tag: ScalarTag,
        m: usize,
        n: usize,
        words: Vec<f64>,
    },
    Sparse {
        tag: ScalarTag,
        m: usize,
        n: usize,
        colptr: Vec<usize>,
        rowval: Vec<usize>,
        words: Vec<f64>,
    },
}

impl OwnedValue {
    /// Encode a result matrix under the given tag.
    pub(crate) fn from_matrix<T: ScalarT>(tag: ScalarTag, a: AnyMatrix<T>) -> Self {
        debug_assert_eq!(tag.words(), T::WORDS);
        match a {
            AnyMatrix::Dense(a) => OwnedValue::Dense {
                tag,
                m: a.m,
                n: a.n,
                words: encode_words(&a.data),
            },
            AnyMatrix::Sparse(a) => OwnedValue::Sparse {
                tag,
                m: a.m,
                n: a.n,
                colptr: a.colptr,
                rowval: a.rowval,
                words: encode_words(&a.nzval),
            },
        }
    }

    pub(crate) fn from_dense<T: ScalarT>(tag: ScalarTag, a: Matrix<T>) -> Self {
        Self::from_matrix(tag, AnyMatrix::Dense(a))
    }
}

/// Explicit per-call state: an input cursor over the operand sequence and
/// an accumulator of produced outputs.
pub struct CallContext<'a> {
    inputs: &'a [Value<'a>],
    cursor: usize,
    outputs: Vec<OwnedValue>,
}

impl<'a> CallContext<'a> {
    pub fn new(inputs: &'a [Value<'a>]) -> Self {
        Self {
            inputs,
            cursor: 0,
            outputs: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.inputs.len() - self.cursor
    }

    /// Next raw operand; exhausting the inputs is an argument-count error.
    pub fn next(&mut self) -> Result<Value<'a>, EngineError> {
        let v = self
            .inputs
            .get(self.cursor)
            .copied()
            .ok_or(EngineError::WrongArgumentCount)?;
        self.cursor += 1;
        Ok(v)
    }

    /// Tag of the next operand without consuming it.
    pub fn peek_tag(&self) -> Result<ScalarTag, EngineError> {
        self.inputs
            .get(self.cursor)
            .and_then(Value::tag)
            .ok_or(EngineError::UnsupportedType)
    }

    pub fn next_scalar(&mut self) -> Result<f64, EngineError> {
        match self.next()? {
            Value::Scalar(x) => Ok(x),
            _ => Err(EngineError::UnsupportedType),
        }
    }

    pub fn next_handle(&mut self) -> Result<Handle, EngineError> {
        match self.next()? {
            Value::Handle(h) => Ok(h),
            _ => Err(EngineError::UnsupportedType),
        }
    }

    /// Decode the next operand as a matrix of the statically chosen scalar
    /// type, which must agree with the operand's runtime tag.
    pub fn next_matrix<T: ScalarT>(&mut self) -> Result<AnyMatrix<T>, EngineError> {
        match self.next()? {
            Value::Dense { tag, m, n, words } => {
                check_tag::<T>(tag)?;
                Ok(AnyMatrix::Dense(decode_dense(m, n, words)?))
            }
            Value::Sparse {
                tag,
                m,
                n,
                colptr,
                rowval,
                words,
            } => {
                check_tag::<T>(tag)?;
                Ok(AnyMatrix::Sparse(decode_sparse(
                    m, n, colptr, rowval, words,
                )?))
            }
            _ => Err(EngineError::UnsupportedType),
        }
    }

    /// Decode the next operand as a dense native-precision matrix.
    pub fn next_dense_f64(&mut self) -> Result<Matrix<f64>, EngineError> {
        match self.next_matrix::<f64>()? {
            AnyMatrix::Dense(a) => Ok(a),
            AnyMatrix::Sparse(_) => Err(EngineError::UnsupportedType),
        }
    }

    /// Decode the next operand as a sparse native-precision matrix.
    pub fn next_sparse_f64(&mut self) -> Result<CscMatrix<f64>, EngineError> {
        match self.next_matrix::<f64>()? {
            AnyMatrix::Sparse(a) => Ok(a),
            AnyMatrix::Dense(_) => Err(EngineError::UnsupportedType),
        }
    }

    pub fn push(&mut self, v: OwnedValue) {
        self.outputs.push(v);
    }

    pub fn finish(self) -> Vec<OwnedValue> {
        self.outputs
    }
}

fn check_tag<T: ScalarT>(tag: ScalarTag) -> Result<(), EngineError> {
    if tag.words() == T::WORDS {
        Ok(())
    } else {
        Err(EngineError::UnsupportedType)
    }
}

fn encode_words<T: ScalarT>(vals: &[T]) -> Vec<f64> {
    let mut words = vec![0.0; vals.len() * T::WORDS];
    for (v, chunk) in vals.iter().zip(words.chunks_exact_mut(T::WORDS)) {
        v.write_words(chunk);
    }
    words
}

fn decode_vals<T: ScalarT>(count: usize, words: &[f64]) -> Result<Vec<T>, EngineError> {
    if words.len() != count * T::WORDS {
        return Err(EngineError::MalformedOperand);
    }
    Ok(words.chunks_exact(T::WORDS).map(T::read_words).collect())
}

fn decode_dense<T: ScalarT>(m: usize, n: usize, words: &[f64]) -> Result<Matrix<T>, EngineError> {
    let data = decode_vals(m * n, words)?;
    Ok(Matrix { m, n, data })
}

fn decode_sparse<T: ScalarT>(
    m: usize,
    n: usize,
    colptr: &[usize],
    rowval: &[usize],
    words: &[f64],
) -> Result<CscMatrix<T>, EngineError> {
    if colptr.len() != n + 1 {
        return Err(EngineError::MalformedOperand);
    }
    let nnz = colptr[n];
    if rowval.len() != nnz {
        return Err(EngineError::MalformedOperand);
    }
    let nzval = decode_vals(nnz, words)?;
    let out = CscMatrix {
        m,
        n,
        colptr: colptr.to_vec(),
        rowval: rowval.to_vec(),
        nzval,
    };
    out.check_format()
        .map_err(|_| EngineError::MalformedOperand)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::DoubleF64;

    #[test]
    fn word_roundtrip_native() {
        let a = Matrix::new_from_slice((2, 2), &[1., 2., 3., 4.]);
        let v = OwnedValue::from_dense(ScalarTag::F64, a.clone());
        match v {
            OwnedValue::Dense { tag, m, n, words } => {
                assert_eq!((tag, m, n), (ScalarTag::F64, 2, 2));
                assert_eq!(words, a.data);
            }
            _ => panic!("expected dense output"),
        }
    }

    #[test]
    fn word_roundtrip_extended() {
        // a value with a nonzero compensation limb survives the boundary
        let x = DoubleF64::from_f64(1.0) / DoubleF64::from_f64(3.0);
        assert_ne!(x.1, 0.0);

        let a = Matrix {
            m: 1,
            n: 1,
            data: vec![x],
        };
        let v = OwnedValue::from_dense(ScalarTag::Double, a);
        let words = match v {
            OwnedValue::Dense { words, .. } => words,
            _ => unreachable!(),
        };
        assert_eq!(words.len(), 2);

        let back: Matrix<DoubleF64> = decode_dense(1, 1, &words).unwrap();
        assert_eq!(back.data[0], x);
    }

    #[test]
    fn bad_word_count_is_rejected() {
        let words = [1.0, 2.0, 3.0];
        assert!(matches!(
            decode_dense::<f64>(2, 2, &words),
            Err(EngineError::MalformedOperand)
        ));
    }

    #[test]
    fn cursor_exhaustion_is_an_argument_error() {
        let inputs = [Value::Scalar(1.0)];
        let mut ctx = CallContext::new(&inputs);
        assert_eq!(ctx.next_scalar().unwrap(), 1.0);
        assert!(matches!(
            ctx.next_scalar(),
            Err(EngineError::WrongArgumentCount)
        ));
    }
}
