//! Dense LU with a pivot-ratio singularity check, and the closed-surface gauge.

use bf_core::Real;
use nalgebra::{DMatrix, DVector, Dyn, LU};

use crate::error::{SolverError, SolverResult};

/// Smallest accepted ratio between the smallest and largest |U_ii|.
pub const SINGULAR_PIVOT_RATIO: Real = 1e-13;

/// LU factorization of a square matrix known to be nonsingular.
pub struct DenseLu {
    lu: LU<Real, Dyn, Dyn>,
    n: usize,
}

impl DenseLu {
    /// Factor `matrix`, rejecting it when the pivots collapse.
    pub fn factor(matrix: DMatrix<Real>) -> SolverResult<Self> {
        let (rows, cols) = matrix.shape();
        if rows != cols {
            return Err(SolverError::DimensionMismatch {
                what: "square matrix",
                expected: rows,
                actual: cols,
            });
        }
        if rows == 0 {
            return Err(SolverError::DimensionMismatch {
                what: "matrix size",
                expected: 1,
                actual: 0,
            });
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::Numeric {
                what: "non-finite matrix entry".to_string(),
            });
        }

        let lu = matrix.lu();
        let u = lu.u();
        let diag = u.diagonal();
        let max = diag.iter().fold(0.0, |m: Real, d| m.max(d.abs()));
        let (index, min) = diag
            .iter()
            .enumerate()
            .fold((0, Real::INFINITY), |(bi, bm), (i, d)| {
                if d.abs() < bm { (i, d.abs()) } else { (bi, bm) }
            });
        let pivot = if max > 0.0 { min / max } else { 0.0 };
        if pivot.is_nan() || pivot < SINGULAR_PIVOT_RATIO {
            return Err(SolverError::SingularSystem { pivot, index });
        }
        Ok(Self { lu, n: rows })
    }

    pub fn solve(&self, rhs: &DVector<Real>) -> SolverResult<DVector<Real>> {
        if rhs.len() != self.n {
            return Err(SolverError::DimensionMismatch {
                what: "right-hand side",
                expected: self.n,
                actual: rhs.len(),
            });
        }
        self.lu.solve(rhs).ok_or_else(|| SolverError::Numeric {
            what: "LU solve failed".to_string(),
        })
    }
}

/// Rank-one augmentation `A + 1·wᵀ` removing the constant null vector of a
/// closed surface's doublet matrix.
///
/// With consistent data it is equivalent to appending `Σ w_j μ_j = 0`.
#[derive(Clone, Debug, PartialEq)]
pub struct Gauge {
    weights: DVector<Real>,
}

impl Gauge {
    /// Area weights normalised to unit sum.
    pub fn from_areas(areas: &[Real]) -> SolverResult<Self> {
        let total: Real = areas.iter().sum();
        if areas.is_empty() || !total.is_finite() || total <= 0.0 {
            return Err(SolverError::Numeric {
                what: "gauge weights need positive total area".to_string(),
            });
        }
        Ok(Self {
            weights: DVector::from_iterator(areas.len(), areas.iter().map(|a| a / total)),
        })
    }

    pub fn weights(&self) -> &DVector<Real> {
        &self.weights
    }

    /// Add `wᵀ` to every row of `matrix`.
    pub fn apply(&self, matrix: &mut DMatrix<Real>) {
        for mut row in matrix.row_iter_mut() {
            for (v, w) in row.iter_mut().zip(self.weights.iter()) {
                *v += w;
            }
        }
    }

    /// Scalar `wᵀ·μ` added to every residual row.
    pub fn term(&self, mu: &DVector<Real>) -> Real {
        self.weights.dot(mu)
    }
}
