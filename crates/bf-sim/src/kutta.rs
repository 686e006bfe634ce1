//! Per-step nonlinear solve coupling panel doublets and new wake circulation.
//!
//! Unknowns are `x = [μ; Γ_new]`. The first `N` residual rows are the normal
//! velocity left at each control point (the transpiration), plus the gauge term
//! on closed surfaces. The last rows enforce the Kutta condition
//! `Γ_e = μ_upper - μ_lower` at every trailing edge.

use bf_core::Real;
use bf_mesh::TrailingEdge;
use bf_solver::{Gauge, NewtonResult, SolverError, SolverResult, dense_newton, newton_krylov};
use nalgebra::{DMatrix, DVector};

use crate::options::KuttaMethod;

/// Linear operators of one time step.
#[derive(Debug)]
pub struct KuttaProblem<'a> {
    /// Normal doublet influence `A`
    pub doublet: &'a DMatrix<Real>,
    /// Normal freestream plus source velocity `n·B`
    pub source_normal: &'a DVector<Real>,
    /// Normal influence of the newest wake panels at unit circulation, `N × n_te`
    pub wake_column: &'a DMatrix<Real>,
    /// Normal velocity of the older wake panels
    pub wake_normal: &'a DVector<Real>,
    pub gauge: Option<&'a Gauge>,
    pub edges: &'a [TrailingEdge],
}

impl KuttaProblem<'_> {
    pub fn panels(&self) -> usize {
        self.doublet.nrows()
    }

    pub fn unknowns(&self) -> usize {
        self.panels() + self.edges.len()
    }

    fn check_shapes(&self) -> SolverResult<()> {
        let n = self.panels();
        let checks = [
            ("doublet columns", self.doublet.ncols(), n),
            ("source normal velocity", self.source_normal.len(), n),
            ("wake column rows", self.wake_column.nrows(), n),
            ("wake column count", self.wake_column.ncols(), self.edges.len()),
            ("older wake velocity", self.wake_normal.len(), n),
        ];
        for (what, actual, expected) in checks {
            if actual != expected {
                return Err(SolverError::DimensionMismatch {
                    what,
                    expected,
                    actual,
                });
            }
        }
        if let Some(gauge) = self.gauge {
            if gauge.weights().len() != n {
                return Err(SolverError::DimensionMismatch {
                    what: "gauge weights",
                    expected: n,
                    actual: gauge.weights().len(),
                });
            }
        }
        if let Some(edge) = self.edges.iter().find(|e| e.upper >= n || e.lower >= n) {
            return Err(SolverError::DimensionMismatch {
                what: "trailing edge panel",
                expected: n,
                actual: edge.upper.max(edge.lower),
            });
        }
        Ok(())
    }

    /// Normal velocity at every control point for strengths `mu` and new circulation `gamma`.
    pub fn transpiration(&self, mu: &DVector<Real>, gamma: &DVector<Real>) -> DVector<Real> {
        self.doublet * mu + self.source_normal + self.wake_column * gamma + self.wake_normal
    }

    pub fn residual(&self, x: &DVector<Real>) -> SolverResult<DVector<Real>> {
        let n = self.panels();
        if x.len() != self.unknowns() {
            return Err(SolverError::DimensionMismatch {
                what: "Kutta unknowns",
                expected: self.unknowns(),
                actual: x.len(),
            });
        }
        let mu = x.rows(0, n).into_owned();
        let gamma = x.rows(n, self.edges.len()).into_owned();

        let mut r = DVector::zeros(x.len());
        let mut flow = self.transpiration(&mu, &gamma);
        if let Some(gauge) = self.gauge {
            flow.add_scalar_mut(gauge.term(&mu));
        }
        r.rows_mut(0, n).copy_from(&flow);
        for (e, edge) in self.edges.iter().enumerate() {
            r[n + e] = gamma[e] - (mu[edge.upper] - mu[edge.lower]);
        }
        if r.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::Numeric {
                what: "non-finite Kutta residual".to_string(),
            });
        }
        Ok(r)
    }
}

/// Converged (or best available) state of one step.
#[derive(Clone, Debug)]
pub struct KuttaSolution {
    pub mu: DVector<Real>,
    pub circulation: DVector<Real>,
    pub transpiration: DVector<Real>,
    pub residual_norm: Real,
    pub iterations: usize,
    pub converged: bool,
}

/// Solves the coupled doublet/circulation system of one time step.
#[derive(Clone, Debug, Default)]
pub struct UnsteadyKuttaSolver {
    method: KuttaMethod,
}

impl UnsteadyKuttaSolver {
    pub fn new(method: KuttaMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> &KuttaMethod {
        &self.method
    }

    /// Solve from the seeds `mu0` and `gamma0`.
    ///
    /// Non-convergence is not an error: the returned solution carries
    /// `converged = false` and the lowest-residual iterate seen, which is never
    /// worse than the seed.
    pub fn solve(
        &self,
        problem: &KuttaProblem<'_>,
        mu0: &DVector<Real>,
        gamma0: &DVector<Real>,
    ) -> SolverResult<KuttaSolution> {
        problem.check_shapes()?;
        let n = problem.panels();
        let m = problem.edges.len();
        if mu0.len() != n || gamma0.len() != m {
            return Err(SolverError::DimensionMismatch {
                what: "Kutta seed",
                expected: n + m,
                actual: mu0.len() + gamma0.len(),
            });
        }

        let mut x0 = DVector::zeros(n + m);
        x0.rows_mut(0, n).copy_from(mu0);
        x0.rows_mut(n, m).copy_from(gamma0);

        let residual = |x: &DVector<Real>| -> SolverResult<DVector<Real>> { problem.residual(x) };
        let result: NewtonResult = match &self.method {
            KuttaMethod::NewtonKrylov(config) => newton_krylov(x0, residual, config)?,
            KuttaMethod::DenseNewton(config) => dense_newton(x0, residual, config)?,
        };

        let mu = result.x.rows(0, n).into_owned();
        let circulation = result.x.rows(n, m).into_owned();
        let transpiration = problem.transpiration(&mu, &circulation);
        Ok(KuttaSolution {
            mu,
            circulation,
            transpiration,
            residual_norm: result.residual_norm,
            iterations: result.iterations,
            converged: result.converged,
        })
    }
}
