//! Surface velocity, pressure and force coefficients from converged strengths.

use bf_core::{Real, Vec2, Vec3};
use bf_mesh::PanelMesh;
use nalgebra::Matrix2;

use crate::types::PanelFields;
use crate::{ResultsError, ResultsResult, check_len};

/// Converged per-panel data feeding the post-processor.
#[derive(Clone, Copy, Debug)]
pub struct FieldInputs<'a> {
    pub sigma: &'a [Real],
    pub mu: &'a [Real],
    /// Normal velocity left at each control point
    pub transpiration: &'a [Real],
    /// `∂μ/∂t` for the unsteady Bernoulli term, if wanted
    pub dmu_dt: Option<&'a [Real]>,
}

/// Precomputed least-squares stencil of one panel: neighbour offsets in the
/// panel's (e1, e2) plane and the inverse normal matrix.
#[derive(Clone, Debug)]
enum Stencil {
    None,
    Line { neighbor: usize, d: Vec2 },
    LeastSquares { neighbors: Vec<(usize, Vec2)>, inv: Matrix2<Real> },
}

/// Derives surface fields from the panel strengths of one mesh.
#[derive(Clone, Debug)]
pub struct FieldPostProcessor<'a> {
    mesh: &'a PanelMesh,
    freestream: Vec3,
    stencils: Vec<Stencil>,
}

impl<'a> FieldPostProcessor<'a> {
    pub fn new(mesh: &'a PanelMesh, freestream: Vec3) -> Self {
        let stencils: Vec<Stencil> = (0..mesh.len()).map(|i| Self::stencil(mesh, i)).collect();
        tracing::debug!(panels = stencils.len(), "surface gradient stencils prepared");
        Self {
            mesh,
            freestream,
            stencils,
        }
    }

    fn stencil(mesh: &PanelMesh, i: usize) -> Stencil {
        let panel = mesh.panel(i);
        let frame = panel.frame();
        let neighbors: Vec<(usize, Vec2)> = mesh
            .neighbors(i)
            .iter()
            .map(|&k| {
                let d = mesh.panel(k).centroid() - panel.centroid();
                (k, Vec2::new(d.dot(&frame.e1), d.dot(&frame.e2)))
            })
            .collect();

        match neighbors.len() {
            0 => Stencil::None,
            1 => Stencil::Line {
                neighbor: neighbors[0].0,
                d: neighbors[0].1,
            },
            _ => {
                let m = neighbors
                    .iter()
                    .fold(Matrix2::zeros(), |acc, (_, d)| acc + d * d.transpose());
                let scale = m.trace();
                match m.try_inverse() {
                    Some(inv) if m.determinant().abs() > 1e-12 * scale * scale => {
                        Stencil::LeastSquares { neighbors, inv }
                    }
                    // Collinear neighbours: fall back to the first direction
                    _ => Stencil::Line {
                        neighbor: neighbors[0].0,
                        d: neighbors[0].1,
                    },
                }
            }
        }
    }

    /// Tangential gradient of `mu` on every panel, in global coordinates.
    ///
    /// Neighbours across a trailing edge are excluded from the stencil.
    pub fn surface_gradient(&self, mu: &[Real]) -> ResultsResult<Vec<Vec3>> {
        check_len("doublet strength", mu.len(), self.mesh.len())?;
        Ok(self
            .stencils
            .iter()
            .enumerate()
            .map(|(i, stencil)| {
                let local = match stencil {
                    Stencil::None => Vec2::zeros(),
                    Stencil::Line { neighbor, d } => d * ((mu[*neighbor] - mu[i]) / d.norm_squared()),
                    Stencil::LeastSquares { neighbors, inv } => {
                        let rhs = neighbors
                            .iter()
                            .fold(Vec2::zeros(), |acc, (k, d)| acc + d * (mu[*k] - mu[i]));
                        inv * rhs
                    }
                };
                let frame = self.mesh.panel(i).frame();
                frame.e1 * local.x + frame.e2 * local.y
            })
            .collect())
    }

    /// Velocity, pressure coefficient and pass-through arrays for every panel.
    pub fn compute(&self, inputs: FieldInputs<'_>) -> ResultsResult<PanelFields> {
        let n = self.mesh.len();
        check_len("source strength", inputs.sigma.len(), n)?;
        check_len("transpiration", inputs.transpiration.len(), n)?;
        if let Some(d) = inputs.dmu_dt {
            check_len("doublet rate", d.len(), n)?;
        }
        let speed_sq = self.freestream.norm_squared();
        if speed_sq.is_nan() || speed_sq <= 0.0 {
            return Err(ResultsError::InvalidArg {
                what: "freestream speed must be positive",
            });
        }

        let gradient = self.surface_gradient(inputs.mu)?;
        let mut velocity = Vec::with_capacity(n);
        let mut cp = Vec::with_capacity(n);

        for (i, panel) in self.mesh.panels().iter().enumerate() {
            let normal = panel.normal();
            let tangential = self.freestream - normal * self.freestream.dot(&normal);
            let v = tangential + gradient[i] + normal * inputs.transpiration[i];
            let unsteady = inputs.dmu_dt.map_or(0.0, |d| 2.0 * d[i] / speed_sq);
            cp.push(1.0 - v.norm_squared() / speed_sq - unsteady);
            velocity.push([v.x, v.y, v.z]);
        }

        Ok(PanelFields {
            source: inputs.sigma.to_vec(),
            doublet: inputs.mu.to_vec(),
            transpiration: inputs.transpiration.to_vec(),
            velocity,
            cp,
        })
    }

    /// Pressure force coefficient `CF = -Σ cp·A·n / S_ref`.
    pub fn force_coefficient(&self, cp: &[Real], reference_area: Real) -> ResultsResult<Vec3> {
        check_len("pressure coefficient", cp.len(), self.mesh.len())?;
        if reference_area.is_nan() || reference_area <= 0.0 {
            return Err(ResultsError::InvalidArg {
                what: "reference area must be positive",
            });
        }
        let sum = self
            .mesh
            .panels()
            .iter()
            .zip(cp)
            .fold(Vec3::zeros(), |acc, (p, c)| acc + p.normal() * (c * p.area()));
        Ok(-sum / reference_area)
    }

    /// Lift and drag split of a force coefficient relative to the freestream.
    pub fn aero_coefficients(&self, cf: Vec3) -> AeroCoefficients {
        let drag_dir = self.freestream.normalize();
        let lift_raw = Vec3::z() - drag_dir * drag_dir.z;
        let lift_dir = if lift_raw.norm() > 1e-12 {
            lift_raw.normalize()
        } else {
            Vec3::zeros()
        };
        AeroCoefficients {
            cf: [cf.x, cf.y, cf.z],
            cl: cf.dot(&lift_dir),
            cd: cf.dot(&drag_dir),
        }
    }
}

/// Force coefficient with its lift/drag components.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AeroCoefficients {
    pub cf: [Real; 3],
    pub cl: Real,
    pub cd: Real,
}
