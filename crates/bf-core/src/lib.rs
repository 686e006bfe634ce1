//! bf-core: stable foundation for birdflow.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - flow (freestream conditions)
//! - timing (phase timers reported through tracing)
//! - error (shared error types)

pub mod error;
pub mod flow;
pub mod numeric;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{BfError, BfResult};
pub use flow::FlowConditions;
pub use numeric::*;
pub use units::*;

/// 3D vector type used for every point and velocity.
pub type Vec3 = nalgebra::Vector3<Real>;

/// 2D vector type used for in-plane panel coordinates.
pub type Vec2 = nalgebra::Vector2<Real>;
