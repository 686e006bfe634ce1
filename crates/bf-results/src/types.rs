//! Result data types handed to the external writer.

use bf_core::{Real, Vec3, timing::RunTimings};
use serde::{Deserialize, Serialize};

use crate::ResultsResult;

/// Per-panel output arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelFields {
    pub source: Vec<Real>,
    pub doublet: Vec<Real>,
    pub transpiration: Vec<Real>,
    pub velocity: Vec<[Real; 3]>,
    pub cp: Vec<Real>,
}

impl PanelFields {
    pub fn len(&self) -> usize {
        self.doublet.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doublet.is_empty()
    }

    pub fn velocity_vec(&self, panel: usize) -> Vec3 {
        let [x, y, z] = self.velocity[panel];
        Vec3::new(x, y, z)
    }
}

/// Wake geometry shaped `[trailing edge][column][root a/b][xyz]`.
///
/// Column 0 sits on the trailing edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WakeGeometry {
    pub filaments: Vec<Vec<[[Real; 3]; 2]>>,
}

impl WakeGeometry {
    pub fn columns(&self, edge: usize) -> usize {
        self.filaments.get(edge).map_or(0, Vec::len)
    }
}

/// A time step whose nonlinear Kutta solve did not converge.
///
/// The run kept going with the best available iterate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NonconvergenceWarning {
    pub step: usize,
    pub iterations: usize,
    pub residual_norm: Real,
}

/// Recorded state after one time step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub step: usize,
    pub time_s: Real,
    pub fields: PanelFields,
    /// Newest shed circulation per trailing edge
    pub shed_circulation: Vec<Real>,
    pub force_coefficient: [Real; 3],
}

/// Everything a run produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Wake-free initial solution
    pub steady: PanelFields,
    /// Decimated per-step snapshots
    pub snapshots: Vec<StepSnapshot>,
    /// Fields after the last completed step
    pub final_fields: PanelFields,
    pub wake: WakeGeometry,
    /// Circulation per trailing edge, newest first, zero-padded to the wake length
    pub circulation: Vec<Vec<Real>>,
    pub warnings: Vec<NonconvergenceWarning>,
    /// Number of unsteady steps completed
    pub steps_completed: usize,
    pub cancelled: bool,
    pub timings: RunTimings,
}

impl RunRecord {
    pub fn to_json(&self) -> ResultsResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> ResultsResult<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
