//! Run configuration.

use bf_core::units::{Area, Length, Time, m, s};
use bf_core::Real;
use bf_solver::{KrylovConfig, NewtonConfig};

use crate::error::{SimError, SimResult};

/// How existing wake columns move each step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WakePolicy {
    /// Every column is carried rigidly by the freestream.
    #[default]
    Frozen,
    /// Columns follow the locally induced velocity (freestream, body and wake).
    /// The trailing-edge column sheds with the mean surface velocity of the
    /// adjacent panels.
    FreeRollup,
}

/// Nonlinear method for the per-step Kutta solve.
#[derive(Clone, Debug)]
pub enum KuttaMethod {
    /// Jacobian-free Newton–Krylov (default).
    NewtonKrylov(KrylovConfig),
    /// Newton on a dense forward-difference Jacobian.
    DenseNewton(NewtonConfig),
}

impl Default for KuttaMethod {
    fn default() -> Self {
        KuttaMethod::NewtonKrylov(KrylovConfig::default())
    }
}

impl KuttaMethod {
    pub fn max_iterations(&self) -> usize {
        match self {
            KuttaMethod::NewtonKrylov(c) => c.max_iterations,
            KuttaMethod::DenseNewton(c) => c.max_iterations,
        }
    }
}

/// Options for a time-marching run.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Fixed time step
    pub dt: Time,
    /// Total wake extent, in mesh length units
    pub wake_length: Length,
    /// Number of unsteady steps; `None` marches until the wake is full
    pub steps: Option<usize>,
    pub wake_policy: WakePolicy,
    pub kutta: KuttaMethod,
    /// Record a snapshot every N-th step (decimation)
    pub record_every: usize,
    /// Include the `-2 ∂μ/∂t / U²` term in cp
    pub unsteady_pressure: bool,
    /// Reference area for force coefficients; half the wetted area if unset
    pub reference_area: Option<Area>,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: s(0.01),
            wake_length: m(1.0),
            steps: None,
            wake_policy: WakePolicy::default(),
            kutta: KuttaMethod::default(),
            record_every: 1,
            unsteady_pressure: false,
            reference_area: None,
        }
    }
}

impl SimOptions {
    pub fn validate(&self) -> SimResult<()> {
        let dt = self.dt.value;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        let length = self.wake_length.value;
        if !length.is_finite() || length <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "wake_length must be positive",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        if self.kutta.max_iterations() == 0 {
            return Err(SimError::InvalidArg {
                what: "Kutta solver needs at least one iteration",
            });
        }
        if let Some(area) = self.reference_area {
            if !area.value.is_finite() || area.value <= 0.0 {
                return Err(SimError::InvalidArg {
                    what: "reference_area must be positive",
                });
            }
        }
        Ok(())
    }

    /// Wake panels per trailing edge: `ceil(wake_length / (U·dt))`, at least one.
    pub fn wake_capacity(&self, speed: Real) -> SimResult<usize> {
        let travel = speed * self.dt.value;
        if !travel.is_finite() || travel <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "freestream speed and dt must be positive",
            });
        }
        let panels = (self.wake_length.value / travel).ceil();
        if !panels.is_finite() || panels > usize::MAX as Real {
            return Err(SimError::InvalidArg {
                what: "wake is too long for the time step",
            });
        }
        Ok((panels as usize).max(1))
    }
}
