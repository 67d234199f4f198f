//! Command/response execution engine.
//!
//! Every entry point is a call of the form `(command name, operands)`;
//! the name resolves through a fixed vocabulary, operands are consumed
//! through an explicit per-call cursor, and results accumulate in the same
//! call context.  Solver instances persist between calls behind opaque
//! integer handles; everything else is call-scoped.  Any error aborts only
//! the current call and leaves the registry and all live handles intact.

mod commands;
mod context;
mod registry;

pub use commands::Command;
pub use context::{CallContext, OwnedValue, Value};
pub use registry::{Handle, Registry};

use crate::algebra::{
    DenseFactorizationError, DenseCholesky, DoubleF64, Matrix, QuadF64, ScalarT, ShapedMatrix,
};
use crate::chol::{CholBundle, LdlError, ScalarTag};
use crate::ops::{
    binary_map, column_reduce, AnyMatrix, BinaryOpTraits, OpError, UnaryOpTraits, unary_map,
};
use thiserror::Error;

/// Error taxonomy of the call boundary.
///
/// Numeric factorization failure is deliberately absent: it is reported as
/// a boolean result of `factorize`, not as an error.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Operand dimensions are incompatible")]
    DimensionMismatch,
    #[error("Command name is not recognized")]
    UnsupportedCommand,
    #[error("Operand type is not supported by this command")]
    UnsupportedType,
    #[error("Operator does not map implicit zeros to zero")]
    ZeroPreserving,
    #[error("Handle does not identify a live solver instance")]
    InvalidHandle,
    #[error("No successful factorization is available")]
    NotFactorized,
    #[error("Wrong number of operands for this command")]
    WrongArgumentCount,
    #[error("Operand encoding is malformed")]
    MalformedOperand,
    #[error("Matrix is not positive definite")]
    NotPositiveDefinite,
    #[error(transparent)]
    Factor(#[from] LdlError),
}

impl From<OpError> for EngineError {
    fn from(e: OpError) -> Self {
        match e {
            OpError::DimensionMismatch => EngineError::DimensionMismatch,
            OpError::ZeroPreserving => EngineError::ZeroPreserving,
        }
    }
}

impl From<DenseFactorizationError> for EngineError {
    fn from(e: DenseFactorizationError) -> Self {
        match e {
            DenseFactorizationError::IncompatibleDimension => EngineError::DimensionMismatch,
            DenseFactorizationError::NotPositiveDefinite => EngineError::NotPositiveDefinite,
        }
    }
}

// run a block with a concrete scalar type chosen by a runtime tag.  All
// three instantiations share one code path.
macro_rules! for_tag {
    ($tag:expr, $T:ident, $body:block) => {
        match $tag {
            ScalarTag::F64 => {
                type $T = f64;
                $body
            }
            ScalarTag::Double => {
                type $T = DoubleF64;
                $body
            }
            ScalarTag::Quad => {
                type $T = QuadF64;
                $body
            }
        }
    };
}

// operator descriptors: which storage combinations may stay sparse
const UN_SPARSE: UnaryOpTraits = UnaryOpTraits {
    sparse_out: true,
    prune_zeros: false,
};
const UN_DENSE: UnaryOpTraits = UnaryOpTraits {
    sparse_out: false,
    prune_zeros: false,
};
const UN_BOOL: UnaryOpTraits = UnaryOpTraits {
    sparse_out: true,
    prune_zeros: true,
};

const BIN_SS: BinaryOpTraits = BinaryOpTraits {
    sparse_ss: true,
    sparse_sd: false,
    sparse_ds: false,
    prune_zeros: false,
};
const BIN_ALL: BinaryOpTraits = BinaryOpTraits {
    sparse_ss: true,
    sparse_sd: true,
    sparse_ds: true,
    prune_zeros: false,
};
const BIN_SD: BinaryOpTraits = BinaryOpTraits {
    sparse_ss: false,
    sparse_sd: true,
    sparse_ds: false,
    prune_zeros: false,
};
const BOOL_SS: BinaryOpTraits = BinaryOpTraits {
    sparse_ss: true,
    sparse_sd: false,
    sparse_ds: false,
    prune_zeros: true,
};
const BOOL_ALL: BinaryOpTraits = BinaryOpTraits {
    sparse_ss: true,
    sparse_sd: true,
    sparse_ds: true,
    prune_zeros: true,
};

/// The persistent execution engine: a handle registry plus the command
/// dispatcher.
#[derive(Default)]
pub struct Engine {
    registry: Registry,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live solver handles.
    pub fn live_handles(&self) -> usize {
        self.registry.len()
    }

    /// Execute one command against the operand sequence, returning the
    /// produced outputs.  On error the registry is left untouched.
    pub fn call(&mut self, name: &str, inputs: &[Value]) -> Result<Vec<OwnedValue>, EngineError> {
        let cmd = Command::lookup(name).ok_or(EngineError::UnsupportedCommand)?;
        let mut ctx = CallContext::new(inputs);
        self.dispatch(cmd, &mut ctx)?;
        Ok(ctx.finish())
    }

    fn dispatch(&mut self, cmd: Command, ctx: &mut CallContext) -> Result<(), EngineError> {
        use Command::*;
        match cmd {
            Create => self.cmd_create(ctx),
            Factorize => self.cmd_factorize(ctx),
            Solve => self.cmd_solve(ctx),
            Diagonal => self.cmd_diagonal(ctx),
            HalfProj => self.cmd_halfproj(ctx),
            Delete => self.cmd_delete(ctx),
            Abs | Sqrt | Negate => cmd_unary(cmd, ctx),
            Not | Boolean => cmd_unary_bool(cmd, ctx),
            Double => cmd_to_double(ctx),
            Plus | Minus | Times | Divide | Max | Min => cmd_binary(cmd, ctx),
            Lt | Gt | Ne | Or | And => cmd_binary_bool(cmd, ctx),
            ColMax | ColMin | ColSum | ColProd => cmd_reduce(cmd, ctx),
            Transpose => cmd_transpose(ctx),
            MatMul => cmd_matmul(ctx),
            Backslash => cmd_backslash(ctx),
            Chol => cmd_chol(ctx),
            Eps => cmd_eps(ctx),
        }
    }

    // ---- solver lifecycle ----

    fn cmd_create(&mut self, ctx: &mut CallContext) -> Result<(), EngineError> {
        let a = ctx.next_sparse_f64()?;
        let seed = ctx.next_scalar()? as u64;

        let bundle = CholBundle::new(&a, seed)?;
        let handle = self.registry.insert(bundle);
        ctx.push(OwnedValue::Handle(handle));
        Ok(())
    }

    fn cmd_factorize(&mut self, ctx: &mut CallContext) -> Result<(), EngineError> {
        let h = ctx.next_handle()?;

        // the weight vector's precision tag selects the instance
        let tag = ctx.peek_tag()?;
        let w: Vec<f64> = for_tag!(tag, T, {
            let w = ctx.next_matrix::<T>()?.to_dense();
            w.data.iter().map(|x| x.to_f64()).collect()
        });
        let shift = ctx.next_scalar()?;

        let bundle = self.registry.get_mut(h)?;
        if w.len() != bundle.ncols() {
            return Err(EngineError::DimensionMismatch);
        }
        let ok = bundle.factorize(tag, &w, shift);
        ctx.push(OwnedValue::Bool(ok));
        Ok(())
    }

    fn cmd_solve(&mut self, ctx: &mut CallContext) -> Result<(), EngineError> {
        let h = ctx.next_handle()?;
        let b = ctx.next_dense_f64()?;
        let w = ctx.next_dense_f64()?;
        let steps = if ctx.remaining() > 0 {
            Some(ctx.next_scalar()? as usize)
        } else {
            None
        };

        let bundle = self.registry.get_mut(h)?;
        if !bundle.is_factored() {
            return Err(EngineError::NotFactorized);
        }
        if b.nrows() != bundle.nrows() || w.data.len() != bundle.ncols() {
            return Err(EngineError::DimensionMismatch);
        }

        let steps = steps.unwrap_or_else(|| bundle.refine_steps());
        let x = bundle.solve(&b, &w.data, steps);
        ctx.push(OwnedValue::from_dense(ScalarTag::F64, x));
        Ok(())
    }

    fn cmd_diagonal(&mut self, ctx: &mut CallContext) -> Result<(), EngineError> {
        let h = ctx.next_handle()?;
        let bundle = self.registry.get_mut(h)?;
        if !bundle.is_factored() {
            return Err(EngineError::NotFactorized);
        }

        let d = bundle.sqrt_diag();
        let m = d.len();
        ctx.push(OwnedValue::from_dense(
            ScalarTag::F64,
            Matrix { m, n: 1, data: d },
        ));
        Ok(())
    }

    fn cmd_halfproj(&mut self, ctx: &mut CallContext) -> Result<(), EngineError> {
        let h = ctx.next_handle()?;
        let k = ctx.next_scalar()? as usize;

        let bundle = self.registry.get_mut(h)?;
        if !bundle.is_factored() {
            return Err(EngineError::NotFactorized);
        }

        let sketch = bundle.half_projection(k);
        ctx.push(OwnedValue::from_dense(ScalarTag::F64, sketch));
        Ok(())
    }

    fn cmd_delete(&mut self, ctx: &mut CallContext) -> Result<(), EngineError> {
        let h = ctx.next_handle()?;
        self.registry.remove(h)
    }
}

// ---- elementwise and structural commands (registry-free) ----

fn cmd_unary(cmd: Command, ctx: &mut CallContext) -> Result<(), EngineError> {
    let tag = ctx.peek_tag()?;
    for_tag!(tag, T, {
        let a = ctx.next_matrix::<T>()?;
        let out = match cmd {
            Command::Abs => unary_map(a.as_ref(), UN_SPARSE, &|_, _, x: T| x.abs())?,
            Command::Sqrt => unary_map(a.as_ref(), UN_SPARSE, &|_, _, x: T| x.sqrt())?,
            Command::Negate => unary_map(a.as_ref(), UN_SPARSE, &|_, _, x: T| -x)?,
            _ => unreachable!(),
        };
        ctx.push(OwnedValue::from_matrix(tag, out));
    });
    Ok(())
}

// boolean-valued unary operators always report in the native scalar type
fn cmd_unary_bool(cmd: Command, ctx: &mut CallContext) -> Result<(), EngineError> {
    let tag = ctx.peek_tag()?;
    for_tag!(tag, T, {
        let a = ctx.next_matrix::<T>()?;
        let out = match cmd {
            // logical not maps implicit zeros to one, so a sparse operand
            // is materialized and the complement comes back dense
            Command::Not => unary_map(a.as_ref(), UN_DENSE, &|_, _, x: T| {
                if x == T::zero() {
                    1.0
                } else {
                    0.0
                }
            })?,
            Command::Boolean => unary_map(a.as_ref(), UN_BOOL, &|_, _, x: T| {
                if x == T::zero() {
                    0.0
                } else {
                    1.0
                }
            })?,
            _ => unreachable!(),
        };
        ctx.push(OwnedValue::from_matrix(ScalarTag::F64, out));
    });
    Ok(())
}

// conversion to the native scalar type, whatever the operand's tag
fn cmd_to_double(ctx: &mut CallContext) -> Result<(), EngineError> {
    let tag = ctx.peek_tag()?;
    for_tag!(tag, T, {
        let a = ctx.next_matrix::<T>()?;
        let out = unary_map(a.as_ref(), UN_SPARSE, &|_, _, x: T| x.to_f64())?;
        ctx.push(OwnedValue::from_matrix(ScalarTag::F64, out));
    });
    Ok(())
}

fn cmd_binary(cmd: Command, ctx: &mut CallContext) -> Result<(), EngineError> {
    let tag = ctx.peek_tag()?;
    for_tag!(tag, T, {
        let a = ctx.next_matrix::<T>()?;
        let b = ctx.next_matrix::<T>()?;
        let (av, bv) = (a.as_ref(), b.as_ref());
        let out = match cmd {
            Command::Plus => binary_map(av, bv, BIN_SS, &|_, _, x: T, y, _| x + y)?,
            Command::Minus => binary_map(av, bv, BIN_SS, &|_, _, x: T, y, _| x - y)?,
            Command::Times => binary_map(av, bv, BIN_ALL, &|_, _, x: T, y, _| x * y)?,
            Command::Divide => binary_map(av, bv, BIN_SD, &|_, _, x: T, y, _| x / y)?,
            Command::Max => binary_map(av, bv, BIN_SS, &|_, _, x: T, y, _| x.max(y))?,
            Command::Min => binary_map(av, bv, BIN_SS, &|_, _, x: T, y, _| x.min(y))?,
            _ => unreachable!(),
        };
        ctx.push(OwnedValue::from_matrix(tag, out));
    });
    Ok(())
}

// comparisons and logical connectives report 0/1 in the native scalar type
fn cmd_binary_bool(cmd: Command, ctx: &mut CallContext) -> Result<(), EngineError> {
    let tag = ctx.peek_tag()?;
    for_tag!(tag, T, {
        let a = ctx.next_matrix::<T>()?;
        let b = ctx.next_matrix::<T>()?;
        let (av, bv) = (a.as_ref(), b.as_ref());
        let zero = T::zero();

        let out = match cmd {
            Command::Lt => binary_map(av, bv, BOOL_SS, &|_, _, x: T, y, _| {
                if x < y {
                    1.0
                } else {
                    0.0
                }
            })?,
            Command::Gt => binary_map(av, bv, BOOL_SS, &|_, _, x: T, y, _| {
                if x > y {
                    1.0
                } else {
                    0.0
                }
            })?,
            Command::Ne => binary_map(av, bv, BOOL_SS, &|_, _, x: T, y, _| {
                if x != y {
                    1.0
                } else {
                    0.0
                }
            })?,
            Command::Or => binary_map(av, bv, BOOL_SS, &|_, _, x: T, y, _| {
                if x != zero || y != zero {
                    1.0
                } else {
                    0.0
                }
            })?,
            Command::And => binary_map(av, bv, BOOL_ALL, &|_, _, x: T, y, _| {
                if x != zero && y != zero {
                    1.0
                } else {
                    0.0
                }
            })?,
            _ => unreachable!(),
        };
        ctx.push(OwnedValue::from_matrix(ScalarTag::F64, out));
    });
    Ok(())
}

fn cmd_reduce(cmd: Command, ctx: &mut CallContext) -> Result<(), EngineError> {
    let tag = ctx.peek_tag()?;
    for_tag!(tag, T, {
        let a = ctx.next_matrix::<T>()?;
        let out = match cmd {
            Command::ColMax => column_reduce(a.as_ref(), &|acc: T, x| acc.max(x)),
            Command::ColMin => column_reduce(a.as_ref(), &|acc: T, x| acc.min(x)),
            Command::ColSum => column_reduce(a.as_ref(), &|acc: T, x| acc + x),
            Command::ColProd => column_reduce(a.as_ref(), &|acc: T, x| acc * x),
            _ => unreachable!(),
        };
        ctx.push(OwnedValue::from_dense(tag, out));
    });
    Ok(())
}

fn cmd_transpose(ctx: &mut CallContext) -> Result<(), EngineError> {
    let tag = ctx.peek_tag()?;
    for_tag!(tag, T, {
        let out = match ctx.next_matrix::<T>()? {
            AnyMatrix::Dense(a) => AnyMatrix::Dense(a.transpose()),
            AnyMatrix::Sparse(a) => AnyMatrix::Sparse(a.transpose()),
        };
        ctx.push(OwnedValue::from_matrix(tag, out));
    });
    Ok(())
}

fn cmd_matmul(ctx: &mut CallContext) -> Result<(), EngineError> {
    let tag = ctx.peek_tag()?;
    for_tag!(tag, T, {
        let a = ctx.next_matrix::<T>()?;
        let b = ctx.next_matrix::<T>()?;
        if a.size().1 != b.size().0 {
            return Err(EngineError::DimensionMismatch);
        }

        let out = match (a, b) {
            (AnyMatrix::Dense(a), AnyMatrix::Dense(b)) => AnyMatrix::Dense(a.mul(&b)),
            (AnyMatrix::Sparse(a), AnyMatrix::Sparse(b)) => AnyMatrix::Sparse(a.spgemm(&b)),
            (AnyMatrix::Sparse(a), AnyMatrix::Dense(b)) => AnyMatrix::Dense(a.mul_dense(&b)),
            (AnyMatrix::Dense(a), AnyMatrix::Sparse(b)) => AnyMatrix::Dense(a.mul(&b.to_dense())),
        };
        ctx.push(OwnedValue::from_matrix(tag, out));
    });
    Ok(())
}

// dense symmetric positive definite linear solve
fn cmd_backslash(ctx: &mut CallContext) -> Result<(), EngineError> {
    let tag = ctx.peek_tag()?;
    for_tag!(tag, T, {
        let a = ctx.next_matrix::<T>()?.to_dense();
        let b = ctx.next_matrix::<T>()?.to_dense();
        if !a.is_square() || a.nrows() != b.nrows() {
            return Err(EngineError::DimensionMismatch);
        }

        let chol = DenseCholesky::new(&a)?;
        let mut x = b;
        for j in 0..x.ncols() {
            chol.solve(x.col_slice_mut(j));
        }
        ctx.push(OwnedValue::from_dense(tag, x));
    });
    Ok(())
}

fn cmd_chol(ctx: &mut CallContext) -> Result<(), EngineError> {
    let tag = ctx.peek_tag()?;
    for_tag!(tag, T, {
        let a = ctx.next_matrix::<T>()?.to_dense();
        let chol = DenseCholesky::new(&a)?;
        ctx.push(OwnedValue::from_dense(tag, chol.L));
    });
    Ok(())
}

// machine epsilon of the precision selected by its word count
fn cmd_eps(ctx: &mut CallContext) -> Result<(), EngineError> {
    let eps = match ctx.next_scalar()? as usize {
        1 => f64::EPSILON,
        2 => DoubleF64::epsilon().to_f64(),
        4 => QuadF64::epsilon().to_f64(),
        _ => return Err(EngineError::UnsupportedType),
    };
    ctx.push(OwnedValue::Scalar(eps));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_command_is_rejected() {
        let mut engine = Engine::new();
        assert!(matches!(
            engine.call("bogus", &[]),
            Err(EngineError::UnsupportedCommand)
        ));
    }

    #[test]
    fn eps_selects_by_word_count() {
        let mut engine = Engine::new();
        let out = engine.call("eps", &[Value::Scalar(1.0)]).unwrap();
        assert_eq!(out, vec![OwnedValue::Scalar(f64::EPSILON)]);

        let out = engine.call("eps", &[Value::Scalar(2.0)]).unwrap();
        match out[0] {
            OwnedValue::Scalar(e) => assert!(e > 0.0 && e < f64::EPSILON),
            _ => panic!("expected scalar"),
        }

        assert!(matches!(
            engine.call("eps", &[Value::Scalar(3.0)]),
            Err(EngineError::UnsupportedType)
        ));
    }
}
