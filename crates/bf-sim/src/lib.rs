//! Unsteady panel-method runs with a shed wake and a Kutta condition.
//!
//! Provides:
//! - A wake model that grows one vortex-ring column per step from every
//!   trailing edge, frozen or free to roll up
//! - The per-step nonlinear Kutta solve coupling doublets and new circulation
//! - A time-marching driver with progress reporting and cooperative cancellation
//!
//! ```no_run
//! use bf_core::FlowConditions;
//! use bf_mesh::samples;
//! use bf_sim::{SimOptions, Simulation};
//!
//! let mesh = samples::rectangular_wing(1.0, 4.0, 0.12, 8, 4)?;
//! let flow = FlowConditions::from_degrees(10.0, 5.0, 0.0);
//! let record = Simulation::new(mesh, flow, SimOptions::default())?.run()?;
//! println!("{} steps, {} warnings", record.steps_completed, record.warnings.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod kutta;
pub mod options;
pub mod sim;
pub mod wake;

pub use error::{SimError, SimResult};
pub use kutta::{KuttaProblem, KuttaSolution, UnsteadyKuttaSolver};
pub use options::{KuttaMethod, SimOptions, WakePolicy};
pub use sim::{CancelToken, Simulation, StepProgress};
pub use wake::{BodyState, WakeModel};
