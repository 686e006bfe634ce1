//! Influence kernels and dense influence assembly for the panel method.
//!
//! `kernel` holds the closed-form doublet, source and vortex-segment kernels,
//! `assemble` builds the body and wake influence matrices from them, and
//! `ring` describes the quadrilateral vortex rings that make up the wake.

pub mod assemble;
pub mod kernel;
pub mod ring;

pub use assemble::{
    InfluenceMatrices, SourceInfluence, body_velocity, source_strengths, wake_column,
    wake_velocity,
};
pub use kernel::{
    doublet_potential, doublet_velocity, line_vortex_velocity, panel_doublet_velocity,
    panel_source_velocity, source_potential, source_velocity, vortex_ring_velocity,
};
pub use ring::WakeRing;
