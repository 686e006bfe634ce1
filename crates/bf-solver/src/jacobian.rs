//! Finite difference Jacobian computation.

use bf_core::Real;
use nalgebra::{DMatrix, DVector};

use crate::error::SolverResult;

/// Compute the Jacobian using forward finite differences.
///
/// For each column j, perturbs x[j] by `epsilon * max(|x[j]|, 1)` and
/// computes (f(x+e) - f(x))/e. `f_x` is the residual already evaluated at `x`.
pub fn finite_difference_jacobian<F>(
    x: &DVector<Real>,
    f_x: &DVector<Real>,
    f: F,
    epsilon: Real,
) -> SolverResult<DMatrix<Real>>
where
    F: Fn(&DVector<Real>) -> SolverResult<DVector<Real>>,
{
    let n = x.len();
    let m = f_x.len();
    let mut jac = DMatrix::zeros(m, n);
    let mut x_perturbed = x.clone();

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);
        x_perturbed[j] = x[j] + dx;
        let f_perturbed = f(&x_perturbed)?;
        x_perturbed[j] = x[j];

        let df = (f_perturbed - f_x) / dx;
        jac.set_column(j, &df);
    }

    Ok(jac)
}

/// Directional derivative `J·v ≈ (f(x + εv) - f(x)) / ε` without forming `J`.
///
/// `ε` is scaled by the sizes of `x` and `v` so the perturbation stays
/// relative to the current iterate.
pub fn directional_derivative<F>(
    x: &DVector<Real>,
    f_x: &DVector<Real>,
    v: &DVector<Real>,
    f: &F,
    epsilon: Real,
) -> SolverResult<DVector<Real>>
where
    F: Fn(&DVector<Real>) -> SolverResult<DVector<Real>>,
{
    let v_norm = v.norm();
    if v_norm == 0.0 {
        return Ok(DVector::zeros(f_x.len()));
    }
    let eps = epsilon * (1.0 + x.norm()) / v_norm;
    let f_perturbed = f(&(x + v * eps))?;
    Ok((f_perturbed - f_x) / eps)
}
