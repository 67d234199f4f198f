//! __polychol__ is a numeric linear-algebra execution engine for interior-point
//! and barrier sampling algorithms.  It provides two things:
//!
//! * a uniform elementwise operator framework over dense and compressed
//!   sparse column matrices, with MATLAB-style broadcasting of scalar,
//!   single-row and single-column operands, and
//!
//! * a persistent, multi-precision Cholesky solver for systems of the form
//!   $H = AWA^T + \sigma I$, supporting repeated refactorization under new
//!   weights $W$, multi right-hand-side solves with iterative refinement,
//!   factor diagonal extraction, and a randomized half-projection used for
//!   fast leverage-score estimation.
//!
//! All numeric components are generic over a scalar type implementing
//! [`ScalarT`](crate::algebra::ScalarT), with implementations for `f64` and
//! two compensated extended-precision types,
//! [`DoubleF64`](crate::algebra::DoubleF64) and
//! [`QuadF64`](crate::algebra::QuadF64).
//!
//! The host-facing surface is the [`Engine`](crate::engine::Engine), which
//! maps string commands and opaque integer handles onto the generic
//! internals.

// Greek characters appear in some numerical internals
#![allow(confusable_idents)]

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod algebra;
pub mod chol;
pub mod engine;
pub mod ops;

/// Crate version string.
pub fn version() -> &'static str {
    VERSION
}
