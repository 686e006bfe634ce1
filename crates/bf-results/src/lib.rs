//! bf-results: derived surface fields and run output records.

pub mod fields;
pub mod types;
pub mod vertex;

pub use fields::{AeroCoefficients, FieldInputs, FieldPostProcessor};
pub use types::*;
pub use vertex::{VertexWeighting, vertex_average, vertex_average_vec};

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl From<ResultsError> for bf_core::BfError {
    fn from(e: ResultsError) -> Self {
        match e {
            ResultsError::Json(_) => bf_core::BfError::InvalidArg { what: "json" },
            ResultsError::LengthMismatch { what, .. } | ResultsError::InvalidArg { what } => {
                bf_core::BfError::InvalidArg { what }
            }
        }
    }
}

pub(crate) fn check_len(what: &'static str, actual: usize, expected: usize) -> ResultsResult<()> {
    if actual != expected {
        return Err(ResultsError::LengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
