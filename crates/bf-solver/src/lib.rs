//! Linear and nonlinear solvers for the panel method.
//!
//! The steady problem is a dense linear system in the panel doublet strengths,
//! solved directly by LU. The unsteady Kutta problem is solved by one of two
//! derivative-free Newton methods: Jacobian-free Newton–Krylov (restarted
//! GMRES on directional differences) or dense Newton on a forward-difference
//! Jacobian.

pub mod error;
pub mod gmres;
pub mod jacobian;
pub mod krylov;
pub mod linear;
pub mod newton;
pub mod steady;

pub use error::{SolverError, SolverResult};
pub use gmres::{GmresConfig, GmresSolution, gmres};
pub use krylov::{KrylovConfig, newton_krylov};
pub use linear::{DenseLu, Gauge, SINGULAR_PIVOT_RATIO};
pub use newton::{NewtonConfig, NewtonResult, dense_newton, newton_solve};
pub use steady::{SteadyLinearSolver, SteadySolution};
