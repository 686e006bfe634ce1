//! Dense influence assembly over all panel pairs.
//!
//! Rows are independent and assembled in parallel; each row writes only its
//! own output cells.

use bf_core::{BfError, BfResult, Real, Vec3};
use bf_mesh::PanelMesh;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::kernel::{
    local_doublet_velocity, local_source_velocity, panel_doublet_velocity, panel_source_velocity,
};
use crate::ring::WakeRing;

/// Velocities induced at every control point by unit doublets on every panel.
#[derive(Clone, Debug)]
pub struct InfluenceMatrices {
    /// `A[i, j] = n_i · v_ij`
    pub doublet: DMatrix<Real>,
    /// x, y, z components of `v_ij`.
    pub velocity: [DMatrix<Real>; 3],
}

impl InfluenceMatrices {
    /// Build `A` and its velocity components for `mesh`.
    pub fn assemble(mesh: &PanelMesh) -> Self {
        let rows = pairwise_rows(mesh, |mesh, i, j| {
            let target = mesh.panel(i);
            let source = mesh.panel(j);
            if i == j {
                local_doublet_velocity(source, &source.control_point_local())
            } else {
                panel_doublet_velocity(source, &target.control_point())
            }
        });

        let n = mesh.len();
        let mut doublet = DMatrix::zeros(n, n);
        let mut velocity = [
            DMatrix::zeros(n, n),
            DMatrix::zeros(n, n),
            DMatrix::zeros(n, n),
        ];
        for (i, row) in rows.iter().enumerate() {
            let normal = mesh.panel(i).normal();
            for (j, v) in row.iter().enumerate() {
                doublet[(i, j)] = normal.dot(v);
                for (axis, m) in velocity.iter_mut().enumerate() {
                    m[(i, j)] = v[axis];
                }
            }
        }

        tracing::debug!(panels = n, "doublet influence assembled");
        Self { doublet, velocity }
    }

    pub fn len(&self) -> usize {
        self.doublet.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Velocity at control point `i` induced by doublet strengths `mu`.
    pub fn velocity_at(&self, i: usize, mu: &DVector<Real>) -> Vec3 {
        let dot = |m: &DMatrix<Real>| -> Real {
            m.row(i).iter().zip(mu.iter()).map(|(a, b)| a * b).sum()
        };
        Vec3::new(
            dot(&self.velocity[0]),
            dot(&self.velocity[1]),
            dot(&self.velocity[2]),
        )
    }

    /// Doublet-induced velocity at every control point.
    pub fn velocities(&self, mu: &DVector<Real>) -> BfResult<Vec<Vec3>> {
        check_len(mu.len(), self.len(), "doublet strength")?;
        let vx = &self.velocity[0] * mu;
        let vy = &self.velocity[1] * mu;
        let vz = &self.velocity[2] * mu;
        Ok((0..self.len())
            .map(|i| Vec3::new(vx[i], vy[i], vz[i]))
            .collect())
    }
}

/// Known part of the control-point velocity: freestream plus source panels.
#[derive(Clone, Debug)]
pub struct SourceInfluence {
    /// `B_i = V∞ + Σ_j σ_j S_ij`
    pub velocity: Vec<Vec3>,
    /// `n_i · B_i`
    pub normal: DVector<Real>,
}

/// Neumann source strengths `σ_i = -V∞ · n_i`.
pub fn source_strengths(mesh: &PanelMesh, freestream: &Vec3) -> DVector<Real> {
    DVector::from_iterator(
        mesh.len(),
        mesh.panels().iter().map(|p| -freestream.dot(&p.normal())),
    )
}

impl SourceInfluence {
    pub fn assemble(
        mesh: &PanelMesh,
        sigma: &DVector<Real>,
        freestream: &Vec3,
    ) -> BfResult<Self> {
        check_len(sigma.len(), mesh.len(), "source strength")?;

        let rows = pairwise_rows(mesh, |mesh, i, j| {
            let target = mesh.panel(i);
            let source = mesh.panel(j);
            let unit = if i == j {
                local_source_velocity(source, &source.control_point_local())
            } else {
                panel_source_velocity(source, &target.control_point())
            };
            unit * sigma[j]
        });

        let velocity: Vec<Vec3> = rows
            .into_iter()
            .map(|row| row.into_iter().fold(*freestream, |acc, v| acc + v))
            .collect();
        let normal = DVector::from_iterator(
            mesh.len(),
            velocity
                .iter()
                .zip(mesh.panels())
                .map(|(v, p)| v.dot(&p.normal())),
        );
        Ok(Self { velocity, normal })
    }
}

/// Evaluate `f(mesh, target, source)` for every panel pair, row-parallel.
fn pairwise_rows<F>(mesh: &PanelMesh, f: F) -> Vec<Vec<Vec3>>
where
    F: Fn(&PanelMesh, usize, usize) -> Vec3 + Sync,
{
    let n = mesh.len();
    (0..n)
        .into_par_iter()
        .map(|i| (0..n).map(|j| f(mesh, i, j)).collect())
        .collect()
}

/// Normal influence of each newest wake ring at unit circulation: `C[i, e]`.
pub fn wake_column(mesh: &PanelMesh, newest: &[WakeRing]) -> DMatrix<Real> {
    let rows: Vec<Vec<Real>> = mesh
        .panels()
        .par_iter()
        .map(|panel| {
            let cp = panel.control_point();
            let normal = panel.normal();
            newest
                .iter()
                .map(|ring| normal.dot(&ring.unit_velocity(&cp)))
                .collect()
        })
        .collect();

    let mut c = DMatrix::zeros(mesh.len(), newest.len());
    for (i, row) in rows.iter().enumerate() {
        for (e, value) in row.iter().enumerate() {
            c[(i, e)] = *value;
        }
    }
    c
}

/// Velocity at each point induced by wake rings of known circulation.
pub fn wake_velocity(points: &[Vec3], rings: &[(WakeRing, Real)]) -> Vec<Vec3> {
    points
        .par_iter()
        .map(|p| {
            rings
                .iter()
                .fold(Vec3::zeros(), |acc, (ring, gamma)| acc + ring.velocity(p, *gamma))
        })
        .collect()
}

/// Velocity at an arbitrary field point induced by the body singularities.
///
/// Does not include the freestream or the wake.
pub fn body_velocity(
    mesh: &PanelMesh,
    sigma: &DVector<Real>,
    mu: &DVector<Real>,
    p: &Vec3,
) -> Vec3 {
    mesh.panels()
        .iter()
        .enumerate()
        .fold(Vec3::zeros(), |acc, (j, panel)| {
            acc + panel_source_velocity(panel, p) * sigma[j] + panel_doublet_velocity(panel, p) * mu[j]
        })
}

fn check_len(actual: usize, expected: usize, what: &'static str) -> BfResult<()> {
    if actual != expected {
        return Err(BfError::IndexOob {
            what,
            index: actual,
            len: expected,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bf_mesh::samples;

    #[test]
    fn matrices_have_mesh_shape() {
        let mesh = samples::flat_plate(2, 3, 1.0, 1.5).unwrap();
        let inf = InfluenceMatrices::assemble(&mesh);
        assert_eq!(inf.len(), 6);
        assert_eq!(inf.doublet.shape(), (6, 6));
        // Flat plate: every velocity is along the shared normal
        for i in 0..6 {
            for j in 0..6 {
                assert!((inf.doublet[(i, j)] - inf.velocity[2][(i, j)]).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn self_influence_is_negative_on_flat_plate() {
        let mesh = samples::flat_plate(3, 3, 1.0, 1.0).unwrap();
        let inf = InfluenceMatrices::assemble(&mesh);
        for i in 0..mesh.len() {
            assert!(inf.doublet[(i, i)] < 0.0);
        }
    }

    #[test]
    fn source_strengths_cancel_normal_freestream() {
        let mesh = samples::flat_plate(2, 2, 1.0, 1.0).unwrap();
        let sigma = source_strengths(&mesh, &Vec3::new(-1.0, 0.0, 0.5));
        assert!(sigma.iter().all(|s| (s + 0.5).abs() < 1e-15));
    }

    #[test]
    fn source_length_mismatch_is_rejected() {
        let mesh = samples::flat_plate(2, 2, 1.0, 1.0).unwrap();
        let sigma = DVector::zeros(3);
        assert!(SourceInfluence::assemble(&mesh, &sigma, &Vec3::zeros()).is_err());
    }

    #[test]
    fn velocities_match_row_products() {
        let mesh = samples::closed_box(1.0, 1.0, 1.0, 1).unwrap();
        let inf = InfluenceMatrices::assemble(&mesh);
        let mu = DVector::from_fn(mesh.len(), |i, _| i as Real * 0.1 - 0.2);
        let all = inf.velocities(&mu).unwrap();
        for (i, v) in all.iter().enumerate() {
            assert!((inf.velocity_at(i, &mu) - v).norm() < 1e-12);
        }
    }
}
