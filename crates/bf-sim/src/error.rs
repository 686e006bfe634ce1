//! Error types for time-marching runs.

use thiserror::Error;

/// Errors that abort a run.
///
/// Per-step nonlinear non-convergence is not an error; it is recorded as a
/// warning in the run record.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Mesh error: {0}")]
    Mesh(#[from] bf_mesh::MeshError),

    #[error("Solver error: {0}")]
    Solver(#[from] bf_solver::SolverError),

    #[error("Results error: {0}")]
    Results(#[from] bf_results::ResultsError),

    #[error("Core error: {0}")]
    Core(#[from] bf_core::BfError),
}

pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_errors_convert() {
        let err: SimError = bf_solver::SolverError::SingularSystem {
            pivot: 0.0,
            index: 2,
        }
        .into();
        assert!(matches!(err, SimError::Solver(_)));
        assert!(err.to_string().starts_with("Solver error"));
    }
}
