//! Error types for solver operations.

use bf_core::error::BfError;
use thiserror::Error;

/// Errors that can occur during the linear and nonlinear solves.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Singular system: pivot ratio {pivot:e} at row {index}")]
    SingularSystem { pivot: f64, index: usize },

    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for BfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::SingularSystem { .. } => BfError::Invariant {
                what: "singular system",
            },
            SolverError::DimensionMismatch { what, .. } => BfError::InvalidArg { what },
            SolverError::Numeric { .. } => BfError::InvalidArg { what: "numeric" },
        }
    }
}

impl From<BfError> for SolverError {
    fn from(e: BfError) -> Self {
        SolverError::Numeric {
            what: e.to_string(),
        }
    }
}
