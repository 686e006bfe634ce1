//! Restarted GMRES (Saad & Schultz) on a matrix-free operator.
//!
//! Arnoldi with modified Gram-Schmidt; the Hessenberg least-squares problem is
//! kept triangular with Givens rotations so the residual is known at every
//! inner step without forming the iterate.

use bf_core::Real;
use nalgebra::{DMatrix, DVector};

use crate::error::SolverResult;

/// Relative Arnoldi breakdown threshold.
const BREAKDOWN_TOL: Real = 1e-14;

/// GMRES solver configuration.
#[derive(Debug, Clone)]
pub struct GmresConfig {
    /// Maximum number of restart cycles
    pub max_restarts: usize,
    /// Krylov dimension per cycle
    pub restart: usize,
    /// Relative residual tolerance
    pub tolerance: Real,
}

impl Default for GmresConfig {
    fn default() -> Self {
        Self {
            max_restarts: 20,
            restart: 120,
            tolerance: 1e-10,
        }
    }
}

/// GMRES solver result.
#[derive(Debug, Clone)]
pub struct GmresSolution {
    pub x: DVector<Real>,
    /// Operator applications in Arnoldi steps
    pub iterations: usize,
    pub restarts: usize,
    /// Final relative residual
    pub residual: Real,
    pub converged: bool,
}

/// Solve `A x = b` where `apply` evaluates `A v`.
pub fn gmres<A>(
    apply: A,
    b: &DVector<Real>,
    x0: Option<&DVector<Real>>,
    config: &GmresConfig,
) -> SolverResult<GmresSolution>
where
    A: Fn(&DVector<Real>) -> SolverResult<DVector<Real>>,
{
    let n = b.len();
    let m = config.restart.clamp(1, n.max(1));
    let mut x = x0.cloned().unwrap_or_else(|| DVector::zeros(n));

    let b_norm = b.norm();
    if b_norm == 0.0 {
        return Ok(GmresSolution {
            x: DVector::zeros(n),
            iterations: 0,
            restarts: 0,
            residual: 0.0,
            converged: true,
        });
    }

    let mut iterations = 0;
    let mut restarts = 0;

    for _ in 0..config.max_restarts.max(1) {
        let r = b - apply(&x)?;
        let beta = r.norm();
        if beta / b_norm < config.tolerance {
            return Ok(GmresSolution {
                x,
                iterations,
                restarts,
                residual: beta / b_norm,
                converged: true,
            });
        }

        let mut v: Vec<DVector<Real>> = Vec::with_capacity(m + 1);
        v.push(r / beta);
        let mut h = DMatrix::<Real>::zeros(m + 1, m);
        let mut cs: Vec<Real> = Vec::with_capacity(m);
        let mut sn: Vec<Real> = Vec::with_capacity(m);
        let mut g = DVector::<Real>::zeros(m + 1);
        g[0] = beta;

        let mut used = m;
        let mut finished = false;
        let mut rel_residual = 1.0;

        for j in 0..m {
            iterations += 1;
            let mut w = apply(&v[j])?;

            for i in 0..=j {
                let hij = v[i].dot(&w);
                h[(i, j)] = hij;
                w.axpy(-hij, &v[i], 1.0);
            }
            let w_norm = w.norm();
            h[(j + 1, j)] = w_norm;
            let breakdown = w_norm <= BREAKDOWN_TOL * beta;
            if !breakdown {
                v.push(w / w_norm);
            }

            for i in 0..j {
                let temp = cs[i] * h[(i, j)] + sn[i] * h[(i + 1, j)];
                h[(i + 1, j)] = -sn[i] * h[(i, j)] + cs[i] * h[(i + 1, j)];
                h[(i, j)] = temp;
            }

            let (c, s) = givens_rotation(h[(j, j)], h[(j + 1, j)]);
            cs.push(c);
            sn.push(s);
            h[(j, j)] = c * h[(j, j)] + s * h[(j + 1, j)];
            h[(j + 1, j)] = 0.0;
            g[j + 1] = -s * g[j];
            g[j] *= c;

            rel_residual = g[j + 1].abs() / b_norm;
            if rel_residual < config.tolerance || breakdown {
                used = j + 1;
                finished = true;
                break;
            }
        }

        let y = solve_upper_triangular(&h, &g, used);
        for (i, yi) in y.iter().enumerate() {
            x.axpy(*yi, &v[i], 1.0);
        }

        if finished {
            tracing::trace!(iterations, restarts, residual = rel_residual, "gmres converged");
            return Ok(GmresSolution {
                x,
                iterations,
                restarts,
                residual: rel_residual,
                converged: true,
            });
        }
        restarts += 1;
    }

    let residual = (b - apply(&x)?).norm() / b_norm;
    Ok(GmresSolution {
        x,
        iterations,
        restarts,
        residual,
        converged: residual < config.tolerance,
    })
}

/// Rotation `(c, s)` zeroing `b` in `[a, b]`.
fn givens_rotation(a: Real, b: Real) -> (Real, Real) {
    let r = a.hypot(b);
    if r == 0.0 { (1.0, 0.0) } else { (a / r, b / r) }
}

/// Back substitution on the leading `k × k` block of `h`.
fn solve_upper_triangular(h: &DMatrix<Real>, g: &DVector<Real>, k: usize) -> Vec<Real> {
    let mut y = vec![0.0; k];
    for i in (0..k).rev() {
        let mut sum = g[i];
        for l in (i + 1)..k {
            sum -= h[(i, l)] * y[l];
        }
        y[i] = if h[(i, i)] != 0.0 { sum / h[(i, i)] } else { 0.0 };
    }
    y
}
