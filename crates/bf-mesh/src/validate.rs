//! Mesh validation logic.

use std::collections::HashMap;

use bf_core::Vec3;

use crate::error::{MeshError, MeshResult};
use crate::mesh::{TrailingEdge, edge_key};
use crate::panel::Panel;

/// Every vertex coordinate must be finite.
pub(crate) fn validate_vertices(vertices: &[Vec3]) -> MeshResult<()> {
    for (i, v) in vertices.iter().enumerate() {
        if !v.iter().all(|c| c.is_finite()) {
            return Err(MeshError::NonFiniteVertex { vertex: i });
        }
    }
    Ok(())
}

/// Side counts, vertex index ranges and repeated corners.
pub(crate) fn validate_connectivity(n_vertices: usize, panels: &[Vec<usize>]) -> MeshResult<()> {
    if panels.is_empty() {
        return Err(MeshError::Empty);
    }

    for (i, ids) in panels.iter().enumerate() {
        if !(3..=4).contains(&ids.len()) {
            return Err(MeshError::InvalidSideCount {
                panel: i,
                sides: ids.len(),
            });
        }
        for (k, &v) in ids.iter().enumerate() {
            if v >= n_vertices {
                return Err(MeshError::VertexOutOfRange {
                    panel: i,
                    vertex: v,
                    len: n_vertices,
                });
            }
            if ids[..k].contains(&v) {
                return Err(MeshError::DuplicateVertex { panel: i, vertex: v });
            }
        }
    }
    Ok(())
}

/// Check each declared trailing edge and orient its roots by the upper panel.
///
/// The edge must belong to both panels, be shared by exactly those two, and
/// be traversed in opposite directions by them.
pub(crate) fn validate_trailing_edges(
    panels: &[Panel],
    edge_panels: &HashMap<(usize, usize), Vec<usize>>,
    trailing: &[(usize, usize, usize, usize)],
) -> MeshResult<Vec<TrailingEdge>> {
    let len = panels.len();
    let mut out = Vec::with_capacity(trailing.len());

    for (edge, &(upper, lower, v1, v2)) in trailing.iter().enumerate() {
        for panel in [upper, lower] {
            if panel >= len {
                return Err(MeshError::TrailingEdgePanelOutOfRange { edge, panel, len });
            }
            if !panels[panel].has_edge(v1, v2) {
                return Err(MeshError::TrailingEdgeNotOnPanel {
                    edge,
                    panel,
                    v1,
                    v2,
                });
            }
        }

        let count = edge_panels
            .get(&edge_key(v1, v2))
            .map_or(0, |ps| ps.len());
        if count != 2 || upper == lower {
            return Err(MeshError::TrailingEdgeUnpaired {
                edge,
                v1,
                v2,
                count,
            });
        }

        let roots = if panels[upper].directed_edge(v1, v2).is_some() {
            [v1, v2]
        } else {
            [v2, v1]
        };
        if panels[lower].directed_edge(roots[1], roots[0]).is_none() {
            return Err(MeshError::TrailingEdgeOrientation { edge });
        }

        out.push(TrailingEdge {
            upper,
            lower,
            roots,
        });
    }
    Ok(out)
}
