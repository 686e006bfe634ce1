//! Immutable panel mesh and its incremental builder.

use std::collections::{HashMap, HashSet};

use bf_core::{Real, Vec3};

use crate::error::MeshResult;
use crate::panel::Panel;
use crate::validate;

/// A trailing-edge edge from which a wake filament is shed.
///
/// `roots` holds the two edge vertices in the order the upper panel
/// traverses them; the lower panel traverses them in reverse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrailingEdge {
    pub upper: usize,
    pub lower: usize,
    pub roots: [usize; 2],
}

/// Undirected edge key (smaller vertex first).
pub(crate) fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// One panel's share of a vertex: the panel index and its interior angle there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Incidence {
    pub panel: usize,
    pub angle: Real,
}

/// Builder for constructing a mesh incrementally.
///
/// Use `add_vertex`, `add_panel` and `add_trailing_edge` to describe the
/// surface, then call `build()` to validate and freeze it into a `PanelMesh`.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    vertices: Vec<Vec3>,
    panels: Vec<Vec<usize>>,
    trailing: Vec<(usize, usize, usize, usize)>,
}

impl MeshBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, p: Vec3) -> usize {
        self.vertices.push(p);
        self.vertices.len() - 1
    }

    /// Add a panel from its ordered vertex indices and return its index.
    ///
    /// Vertices must run counter-clockwise about the outward normal.
    pub fn add_panel(&mut self, vertices: &[usize]) -> usize {
        self.panels.push(vertices.to_vec());
        self.panels.len() - 1
    }

    /// Declare the edge `(v1, v2)` shared by `upper` and `lower` as a shedding edge.
    pub fn add_trailing_edge(&mut self, upper: usize, lower: usize, v1: usize, v2: usize) {
        self.trailing.push((upper, lower, v1, v2));
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Build and validate the mesh.
    pub fn build(self) -> MeshResult<PanelMesh> {
        PanelMesh::new(self.vertices, self.panels, self.trailing)
    }
}

/// Immutable geometric description of the discretized surface.
#[derive(Clone, Debug)]
pub struct PanelMesh {
    vertices: Vec<Vec3>,
    panels: Vec<Panel>,
    trailing_edges: Vec<TrailingEdge>,
    neighbors: Vec<Vec<usize>>,
    incidence: Vec<Vec<Incidence>>,
    closed: bool,
}

impl PanelMesh {
    /// Validate raw connectivity and compute every panel's geometry.
    ///
    /// `trailing` entries are `(upper_panel, lower_panel, v1, v2)`.
    pub fn new(
        vertices: Vec<Vec3>,
        panel_vertices: Vec<Vec<usize>>,
        trailing: Vec<(usize, usize, usize, usize)>,
    ) -> MeshResult<Self> {
        validate::validate_vertices(&vertices)?;
        validate::validate_connectivity(vertices.len(), &panel_vertices)?;

        let panels = panel_vertices
            .into_iter()
            .enumerate()
            .map(|(i, ids)| {
                let corners: Vec<Vec3> = ids.iter().map(|&v| vertices[v]).collect();
                Panel::from_corners(i, ids, &corners)
            })
            .collect::<MeshResult<Vec<_>>>()?;

        let edge_panels = Self::build_edge_map(&panels);
        let trailing_edges = validate::validate_trailing_edges(&panels, &edge_panels, &trailing)?;

        let te_keys: HashSet<(usize, usize)> = trailing_edges
            .iter()
            .map(|te| edge_key(te.roots[0], te.roots[1]))
            .collect();
        let neighbors = Self::build_neighbors(panels.len(), &edge_panels, &te_keys);
        let incidence = Self::build_incidence(&vertices, &panels);
        let closed = edge_panels.values().all(|ps| ps.len() == 2);

        tracing::debug!(
            vertices = vertices.len(),
            panels = panels.len(),
            trailing_edges = trailing_edges.len(),
            closed,
            "panel mesh built"
        );

        Ok(Self {
            vertices,
            panels,
            trailing_edges,
            neighbors,
            incidence,
            closed,
        })
    }

    /// Map every undirected edge to the panels using it, in panel order.
    fn build_edge_map(panels: &[Panel]) -> HashMap<(usize, usize), Vec<usize>> {
        let mut map: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        for (i, panel) in panels.iter().enumerate() {
            let ids = panel.vertices();
            for k in 0..ids.len() {
                let key = edge_key(ids[k], ids[(k + 1) % ids.len()]);
                map.entry(key).or_default().push(i);
            }
        }
        map
    }

    /// Edge-adjacent panels, excluding pairs that only meet across a trailing edge.
    fn build_neighbors(
        n_panels: usize,
        edge_panels: &HashMap<(usize, usize), Vec<usize>>,
        te_keys: &HashSet<(usize, usize)>,
    ) -> Vec<Vec<usize>> {
        let mut neighbors = vec![Vec::new(); n_panels];
        for (key, ps) in edge_panels {
            if te_keys.contains(key) {
                continue;
            }
            for &a in ps {
                for &b in ps {
                    if a != b && !neighbors[a].contains(&b) {
                        neighbors[a].push(b);
                    }
                }
            }
        }
        // Sort each list for determinism
        for list in &mut neighbors {
            list.sort_unstable();
        }
        neighbors
    }

    fn build_incidence(vertices: &[Vec3], panels: &[Panel]) -> Vec<Vec<Incidence>> {
        let mut incidence = vec![Vec::new(); vertices.len()];
        for (i, panel) in panels.iter().enumerate() {
            let ids = panel.vertices();
            let n = ids.len();
            for k in 0..n {
                let here = vertices[ids[k]];
                let next = vertices[ids[(k + 1) % n]] - here;
                let prev = vertices[ids[(k + n - 1) % n]] - here;
                let cos = next.dot(&prev) / (next.norm() * prev.norm());
                incidence[ids[k]].push(Incidence {
                    panel: i,
                    angle: cos.clamp(-1.0, 1.0).acos(),
                });
            }
        }
        incidence
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panel(&self, index: usize) -> &Panel {
        &self.panels[index]
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn trailing_edges(&self) -> &[TrailingEdge] {
        &self.trailing_edges
    }

    /// Edge-adjacent panels of `panel`, not counting trailing-edge partners.
    pub fn neighbors(&self, panel: usize) -> &[usize] {
        &self.neighbors[panel]
    }

    /// Panels touching `vertex`, with their interior angle at that vertex.
    pub fn incidence(&self, vertex: usize) -> &[Incidence] {
        &self.incidence[vertex]
    }

    /// True when every edge is shared by exactly two panels.
    ///
    /// A uniform doublet distribution on a closed surface induces no velocity,
    /// so the doublet influence matrix of such a mesh has a constant null vector.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Total wetted area.
    pub fn total_area(&self) -> Real {
        self.panels.iter().map(Panel::area).sum()
    }

    /// Outward normals of every panel.
    pub fn normals(&self) -> Vec<Vec3> {
        self.panels.iter().map(Panel::normal).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_panel_strip() -> MeshBuilder {
        let mut b = MeshBuilder::new();
        let v: Vec<usize> = [
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (0.0, 1.0),
            (1.0, 1.0),
            (2.0, 1.0),
        ]
        .iter()
        .map(|&(x, y)| b.add_vertex(Vec3::new(x, y, 0.0)))
        .collect();
        b.add_panel(&[v[0], v[1], v[4], v[3]]);
        b.add_panel(&[v[1], v[2], v[5], v[4]]);
        b
    }

    #[test]
    fn builder_basic() {
        let b = two_panel_strip();
        assert_eq!(b.vertex_count(), 6);
        assert_eq!(b.panel_count(), 2);
        let mesh = b.build().unwrap();
        assert_eq!(mesh.len(), 2);
        assert!(!mesh.is_closed());
        assert!((mesh.total_area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn neighbors_follow_shared_edges() {
        let mesh = two_panel_strip().build().unwrap();
        assert_eq!(mesh.neighbors(0), &[1]);
        assert_eq!(mesh.neighbors(1), &[0]);
    }

    #[test]
    fn incidence_angles_are_right_angles() {
        let mesh = two_panel_strip().build().unwrap();
        // Vertex 1 is shared by both panels
        let inc = mesh.incidence(1);
        assert_eq!(inc.len(), 2);
        for entry in inc {
            assert!((entry.angle - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        }
        assert_eq!(mesh.incidence(0).len(), 1);
    }

    #[test]
    fn edge_key_is_unordered() {
        assert_eq!(edge_key(3, 1), edge_key(1, 3));
    }
}
