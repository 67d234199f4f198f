//! Persistent multi-precision Cholesky solver for weighted Gram systems.
//!
//! A solver instance is bound once to a rectangular constraint matrix A and
//! then repeatedly refactorizes `H = A·W·Aᵀ + shift·I` as the diagonal
//! weights W evolve.  The fill reducing ordering and elimination tree of H
//! are computed a single time; only numeric values move on each call.
//! Instances exist in three scalar precisions behind a runtime tag, all
//! sharing identical control flow.

mod bundle;
mod ldl;
mod packedchol;
mod spmat;

pub use bundle::{CholBundle, ScalarTag};
pub use ldl::{CholSettings, CholSettingsBuilder, LdlError, LdlFactor};
pub use packedchol::PackedChol;
