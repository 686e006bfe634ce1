//! Wake-free steady solve for the panel doublet strengths.

use bf_core::Real;
use bf_mesh::PanelMesh;
use nalgebra::{DMatrix, DVector};

use crate::error::{SolverError, SolverResult};
use crate::linear::{DenseLu, Gauge};

/// Doublet strengths satisfying the no-penetration condition without a wake.
#[derive(Clone, Debug)]
pub struct SteadySolution {
    /// Panel doublet strengths
    pub mu: DVector<Real>,
    /// `‖A·μ + b‖` on the unaugmented system
    pub residual_norm: Real,
    /// Whether the closed-surface gauge was applied
    pub gauged: bool,
}

/// Direct dense solver for `A·μ = -b`.
///
/// A singular matrix is fatal: it indicates duplicate or degenerate panels.
#[derive(Clone, Debug, Default)]
pub struct SteadyLinearSolver {
    gauge: Option<Gauge>,
}

impl SteadyLinearSolver {
    /// Solver without gauge augmentation (open surfaces).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gauge(gauge: Gauge) -> Self {
        Self { gauge: Some(gauge) }
    }

    /// Pick the gauge from the mesh topology: closed surfaces get one.
    pub fn for_mesh(mesh: &PanelMesh) -> SolverResult<Self> {
        if mesh.is_closed() {
            let areas: Vec<Real> = mesh.panels().iter().map(|p| p.area()).collect();
            Ok(Self::with_gauge(Gauge::from_areas(&areas)?))
        } else {
            Ok(Self::new())
        }
    }

    pub fn gauge(&self) -> Option<&Gauge> {
        self.gauge.as_ref()
    }

    /// Solve for `μ` given the normal doublet influence `A` and the known
    /// normal velocity `b` (freestream plus sources) at each control point.
    pub fn solve(
        &self,
        doublet: &DMatrix<Real>,
        source_normal: &DVector<Real>,
    ) -> SolverResult<SteadySolution> {
        let n = doublet.nrows();
        if source_normal.len() != n {
            return Err(SolverError::DimensionMismatch {
                what: "source normal velocity",
                expected: n,
                actual: source_normal.len(),
            });
        }

        let mut matrix = doublet.clone();
        if let Some(gauge) = &self.gauge {
            if gauge.weights().len() != n {
                return Err(SolverError::DimensionMismatch {
                    what: "gauge weights",
                    expected: n,
                    actual: gauge.weights().len(),
                });
            }
            gauge.apply(&mut matrix);
        }

        let lu = DenseLu::factor(matrix)?;
        let mu = lu.solve(&(-source_normal))?;
        let residual_norm = (doublet * &mu + source_normal).norm();

        tracing::debug!(
            panels = n,
            residual = residual_norm,
            gauged = self.gauge.is_some(),
            "steady doublet solve"
        );

        Ok(SteadySolution {
            mu,
            residual_norm,
            gauged: self.gauge.is_some(),
        })
    }
}
