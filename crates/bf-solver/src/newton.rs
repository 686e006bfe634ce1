//! Damped Newton iteration with a dense finite-difference Jacobian.

use bf_core::Real;
use nalgebra::{DMatrix, DVector};

use crate::error::{SolverError, SolverResult};
use crate::jacobian::finite_difference_jacobian;

/// Newton solver configuration.
#[derive(Debug, Clone)]
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: Real,
    /// Relative tolerance for residual norm
    pub rel_tol: Real,
    /// Line search backtracking factor
    pub line_search_beta: Real,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
    /// Relative finite-difference step for the Jacobian
    pub fd_epsilon: Real,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 20,
            abs_tol: 1e-9,
            rel_tol: 1e-12,
            line_search_beta: 0.5,
            max_line_search_iters: 20,
            fd_epsilon: 1e-7,
        }
    }
}

/// Newton iteration result.
///
/// When `converged` is false, `x` is the iterate with the smallest residual
/// seen, and `residual_norm` is its residual.
#[derive(Debug, Clone)]
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<Real>,
    /// Final residual norm
    pub residual_norm: Real,
    /// Residual norm at the initial guess
    pub initial_residual_norm: Real,
    /// Number of iterations
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

pub(crate) fn is_converged(r_norm: Real, r0_norm: Real, abs_tol: Real, rel_tol: Real) -> bool {
    r_norm < abs_tol || r_norm < rel_tol * r0_norm
}

/// Backtracking along `dx` until the residual decreases.
///
/// Returns the accepted step length with its iterate and residual.
pub(crate) fn line_search<F>(
    x: &DVector<Real>,
    dx: &DVector<Real>,
    r_norm: Real,
    residual_fn: &F,
    beta: Real,
    max_iters: usize,
) -> SolverResult<(Real, DVector<Real>, DVector<Real>)>
where
    F: Fn(&DVector<Real>) -> SolverResult<DVector<Real>>,
{
    let mut alpha = 1.0;
    let mut x_new = x + dx;
    let mut r_new = residual_fn(&x_new)?;

    for _ in 0..max_iters {
        if r_new.norm() < r_norm {
            break;
        }
        alpha *= beta;
        x_new = x + dx * alpha;
        r_new = residual_fn(&x_new)?;
    }
    Ok((alpha, x_new, r_new))
}

/// Newton solver with an explicit Jacobian callback and backtracking.
pub fn newton_solve<F, J>(
    x0: DVector<Real>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<Real>) -> SolverResult<DVector<Real>>,
    J: Fn(&DVector<Real>, &DVector<Real>) -> SolverResult<DMatrix<Real>>,
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

        let jac = jacobian_fn(&x, &r)?;

        // Solve J * dx = -r
        let dx = jac.lu().solve(&(-&r)).ok_or_else(|| SolverError::Numeric {
            what: "Jacobian solve failed".to_string(),
        })?;

        let (alpha, x_new, r_new) = line_search(
            &x,
            &dx,
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

/// Dense Newton with a forward-difference Jacobian.
pub fn dense_newton<F>(
    x0: DVector<Real>,
    residual_fn: F,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<Real>) -> SolverResult<DVector<Real>>,
{
    let eps = config.fd_epsilon;
    newton_solve(
        x0,
        &residual_fn,
        |x, r| finite_difference_jacobian(x, r, &residual_fn, eps),
        config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0 from x = 3
        let residual = |x: &DVector<Real>| -> SolverResult<DVector<Real>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<Real>, _r: &DVector<Real>| -> SolverResult<DMatrix<Real>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 3.0);
        let config = NewtonConfig::default();
        let result = newton_solve(x0, residual, jacobian, &config).unwrap();

        assert!(result.converged);
        assert!((result.x[0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn dense_newton_on_coupled_system() {
        // x0 + x1 = 3, x0 * x1 = 2 -> (1, 2) from a nearby guess
        let residual = |x: &DVector<Real>| -> SolverResult<DVector<Real>> {
            Ok(DVector::from_vec(vec![x[0] + x[1] - 3.0, x[0] * x[1] - 2.0]))
        };
        let x0 = DVector::from_vec(vec![0.8, 2.3]);
        let result = dense_newton(x0, residual, &NewtonConfig::default()).unwrap();
        assert!(result.converged);
        assert!((result.x[0] - 1.0).abs() < 1e-8);
        assert!((result.x[1] - 2.0).abs() < 1e-8);
    }

    #[test]
    fn reports_nonconvergence_with_best_iterate() {
        // No real root: x^2 + 1 = 0
        let residual = |x: &DVector<Real>| -> SolverResult<DVector<Real>> {
            Ok(DVector::from_element(1, x[0] * x[0] + 1.0))
        };
        let config = NewtonConfig {
            max_iterations: 5,
            ..Default::default()
        };
        let result = dense_newton(DVector::from_element(1, 0.5), residual, &config).unwrap();
        assert!(!result.converged);
        assert!(result.residual_norm <= result.initial_residual_norm);
        assert!(result.residual_norm >= 1.0);
    }

    #[test]
    fn stalled_line_search_reports_iterations_used() {
        // Jacobian with the wrong sign: every Newton step points uphill
        let residual =
            |x: &DVector<Real>| -> SolverResult<DVector<Real>> { Ok(DVector::from_element(1, x[0])) };
        let jacobian = |_x: &DVector<Real>, _r: &DVector<Real>| -> SolverResult<DMatrix<Real>> {
            Ok(DMatrix::from_element(1, 1, -1.0))
        };
        let config = NewtonConfig {
            max_iterations: 20,
            max_line_search_iters: 60,
            ..Default::default()
        };
        let result =
            newton_solve(DVector::from_element(1, 1.0), residual, jacobian, &config).unwrap();
        assert!(!result.converged);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.x[0], 1.0);
        assert_eq!(result.residual_norm, result.initial_residual_norm);
    }
}
