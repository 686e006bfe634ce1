//! Mesh-specific error types.

use bf_core::BfError;
use thiserror::Error;

/// Degenerate or inconsistent mesh input, detected at construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("Mesh has no panels")]
    Empty,

    #[error("Panel {panel} has {sides} sides (expected 3 or 4)")]
    InvalidSideCount { panel: usize, sides: usize },

    #[error("Panel {panel} refers to vertex {vertex} but mesh has {len} vertices")]
    VertexOutOfRange {
        panel: usize,
        vertex: usize,
        len: usize,
    },

    #[error("Panel {panel} repeats vertex {vertex}")]
    DuplicateVertex { panel: usize, vertex: usize },

    #[error("Vertex {vertex} has a non-finite coordinate")]
    NonFiniteVertex { vertex: usize },

    #[error("Panel {panel} has zero area ({area:e})")]
    ZeroArea { panel: usize, area: f64 },

    #[error("Trailing edge {edge} refers to panel {panel} but mesh has {len} panels")]
    TrailingEdgePanelOutOfRange {
        edge: usize,
        panel: usize,
        len: usize,
    },

    #[error("Trailing edge {edge}: vertices ({v1}, {v2}) are not an edge of panel {panel}")]
    TrailingEdgeNotOnPanel {
        edge: usize,
        panel: usize,
        v1: usize,
        v2: usize,
    },

    #[error("Trailing edge {edge}: ({v1}, {v2}) is shared by {count} panels (expected 2)")]
    TrailingEdgeUnpaired {
        edge: usize,
        v1: usize,
        v2: usize,
        count: usize,
    },

    #[error("Trailing edge {edge}: upper and lower panels traverse the edge in the same direction")]
    TrailingEdgeOrientation { edge: usize },
}

pub type MeshResult<T> = Result<T, MeshError>;

impl From<MeshError> for BfError {
    fn from(_: MeshError) -> Self {
        BfError::Invariant {
            what: "degenerate mesh",
        }
    }
}
