//! Panel-to-vertex averaging for plotting and export.

use bf_core::{Real, Vec3, safe_div};
use bf_mesh::PanelMesh;
use serde::{Deserialize, Serialize};

use crate::{ResultsResult, check_len};

/// How panel values are weighted when averaged onto a shared vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexWeighting {
    /// Interior angle of each panel at the vertex
    #[default]
    Angle,
    /// Panel area
    Area,
}

impl VertexWeighting {
    fn weights(self, mesh: &PanelMesh, vertex: usize) -> impl Iterator<Item = (usize, Real)> + '_ {
        mesh.incidence(vertex).iter().map(move |inc| {
            let w = match self {
                VertexWeighting::Angle => inc.angle,
                VertexWeighting::Area => mesh.panel(inc.panel).area(),
            };
            (inc.panel, w)
        })
    }
}

/// Weighted average of per-panel scalars at every vertex.
///
/// Vertices that belong to no panel get zero.
pub fn vertex_average(
    mesh: &PanelMesh,
    values: &[Real],
    weighting: VertexWeighting,
) -> ResultsResult<Vec<Real>> {
    check_len("panel values", values.len(), mesh.len())?;
    Ok((0..mesh.vertices().len())
        .map(|v| {
            let (sum, total) = weighting
                .weights(mesh, v)
                .fold((0.0, 0.0), |(s, t), (p, w)| (s + w * values[p], t + w));
            safe_div(sum, total, Real::MIN_POSITIVE)
        })
        .collect())
}

pub fn vertex_average_vec(
    mesh: &PanelMesh,
    values: &[Vec3],
    weighting: VertexWeighting,
) -> ResultsResult<Vec<Vec3>> {
    check_len("panel vectors", values.len(), mesh.len())?;
    Ok((0..mesh.vertices().len())
        .map(|v| {
            let (sum, total) = weighting
                .weights(mesh, v)
                .fold((Vec3::zeros(), 0.0), |(s, t), (p, w)| (s + values[p] * w, t + w));
            if total > 0.0 { sum / total } else { Vec3::zeros() }
        })
        .collect())
}
