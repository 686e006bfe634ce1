//! bf-mesh: panel mesh layer for birdflow.
//!
//! Provides:
//! - Planar panel geometry (local frame, control point, far-field radius)
//! - Immutable `PanelMesh` with trailing-edge pairing, smooth neighbours and
//!   vertex incidence
//! - Incremental mesh builder with validation
//! - Sample meshes (flat plate, closed box, rectangular wing)
//!
//! # Example
//!
//! ```
//! use bf_mesh::MeshBuilder;
//! use bf_core::Vec3;
//!
//! let mut builder = MeshBuilder::new();
//! let a = builder.add_vertex(Vec3::new(0.0, 0.0, 0.0));
//! let b = builder.add_vertex(Vec3::new(1.0, 0.0, 0.0));
//! let c = builder.add_vertex(Vec3::new(0.0, 1.0, 0.0));
//! builder.add_panel(&[a, b, c]);
//! let mesh = builder.build().unwrap();
//!
//! assert_eq!(mesh.len(), 1);
//! assert!((mesh.total_area() - 0.5).abs() < 1e-12);
//! ```

pub mod error;
pub mod mesh;
pub mod panel;
pub mod samples;
pub(crate) mod validate;

pub use error::{MeshError, MeshResult};
pub use mesh::{Incidence, MeshBuilder, PanelMesh, TrailingEdge};
pub use panel::{CONTROL_POINT_OFFSET, FAR_FIELD_FACTOR, Frame, Panel};
