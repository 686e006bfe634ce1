//! Jacobian-free Newton–Krylov.
//!
//! Each Newton step solves `J·dx = -F(x)` with restarted GMRES, where the
//! Jacobian is only ever applied through directional finite differences.

use bf_core::Real;
use nalgebra::DVector;

use crate::error::SolverResult;
use crate::gmres::{GmresConfig, gmres};
use crate::jacobian::directional_derivative;
use crate::newton::{NewtonResult, is_converged, line_search};

/// Newton–Krylov configuration.
#[derive(Debug, Clone)]
pub struct KrylovConfig {
    /// Maximum Newton iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: Real,
    /// Relative tolerance for residual norm
    pub rel_tol: Real,
    /// Relative step for directional differences
    pub fd_epsilon: Real,
    /// Line search backtracking factor
    pub line_search_beta: Real,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
    /// Inner linear solver settings
    pub gmres: GmresConfig,
}

impl Default for KrylovConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            abs_tol: 1e-9,
            rel_tol: 1e-12,
            fd_epsilon: 1e-7,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
            gmres: GmresConfig::default(),
        }
    }
}

/// Solve `F(x) = 0` from `x0` without forming the Jacobian.
pub fn newton_krylov<F>(
    x0: DVector<Real>,
    residual_fn: F,
    config: &KrylovConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<Real>) -> SolverResult<DVector<Real>>,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    let mut r_norm = r.norm();
    let r0_norm = r_norm;
    let mut best = (x.clone(), r_norm);
    let mut iterations = 0;

    while iterations < config.max_iterations {
        if is_converged(r_norm, r0_norm, config.abs_tol, config.rel_tol) {
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                initial_residual_norm: r0_norm,
                iterations,
                converged: true,
            });
        }
        iterations += 1;

        let jv = |v: &DVector<Real>| directional_derivative(&x, &r, v, &residual_fn, config.fd_epsilon);
        let linear = gmres(jv, &(-&r), None, &config.gmres)?;
        tracing::trace!(
            iteration = iterations,
            gmres_iterations = linear.iterations,
            gmres_residual = linear.residual,
            "newton-krylov step"
        );

        let (alpha, x_new, r_new) = line_search(
            &x,
            &linear.x,
            r_norm,
            &residual_fn,
            config.line_search_beta,
            config.max_line_search_iters,
        )?;

        x = x_new;
        r = r_new;
        r_norm = r.norm();
        if r_norm < best.1 {
            best = (x.clone(), r_norm);
        }

        if alpha < 1e-10 {
            tracing::debug!(iteration = iterations, residual = r_norm, "line search stagnated");
            break;
        }
    }

    if is_converged(r_norm, r0_norm, config.abs_tol, config.rel_tol) {
        return Ok(NewtonResult {
            x,
            residual_norm: r_norm,
            initial_residual_norm: r0_norm,
            iterations,
            converged: true,
        });
    }

    Ok(NewtonResult {
        x: best.0,
        residual_norm: best.1,
        initial_residual_norm: r0_norm,
        iterations,
        converged: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn linear_system_converges_quickly() {
        let a = DMatrix::from_fn(30, 30, |i, j| {
            if i == j { -2.0 } else { 0.2 / (1.0 + (i as Real - j as Real).abs()) }
        });
        let b = DVector::from_fn(30, |i, _| (i as Real * 0.37).cos());
        let residual = |x: &DVector<Real>| -> SolverResult<DVector<Real>> { Ok(&a * x + &b) };

        let result = newton_krylov(DVector::zeros(30), residual, &KrylovConfig::default()).unwrap();
        assert!(result.converged);
        assert!(result.iterations <= 3);
        assert!((&a * &result.x + &b).norm() < 1e-9);
    }

    #[test]
    fn nonlinear_system() {
        // x0^2 + x1 = 3, x0 - x1^3 = -7 -> (1, 2)
        let residual = |x: &DVector<Real>| -> SolverResult<DVector<Real>> {
            Ok(DVector::from_vec(vec![
                x[0] * x[0] + x[1] - 3.0,
                x[0] - x[1].powi(3) + 7.0,
            ]))
        };
        let x0 = DVector::from_vec(vec![1.2, 1.8]);
        let result = newton_krylov(x0, residual, &KrylovConfig::default()).unwrap();
        assert!(result.converged);
        assert!((result.x[0] - 1.0).abs() < 1e-8);
        assert!((result.x[1] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn converged_start_takes_no_iterations() {
        let residual = |x: &DVector<Real>| -> SolverResult<DVector<Real>> { Ok(x * 2.0) };
        let result =
            newton_krylov(DVector::zeros(3), residual, &KrylovConfig::default()).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
    }
}
