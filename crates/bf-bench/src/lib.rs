//! Benchmark scenarios for the panel solver on the built-in sample meshes.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use bf_core::units::{m, s};
use bf_core::{FlowConditions, Real};
use bf_mesh::{MeshResult, PanelMesh, samples};
use bf_sim::{SimError, SimOptions, Simulation, WakePolicy};

/// Errors raised while running a scenario.
#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("mesh: {0}")]
    Mesh(#[from] bf_mesh::MeshError),

    #[error("simulation: {0}")]
    Sim(#[from] SimError),

    #[error("scenario needs at least one run")]
    NoRuns,
}

/// Which sample mesh a scenario uses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum SampleMesh {
    FlatPlate {
        nx: usize,
        ny: usize,
    },
    ClosedBox {
        n: usize,
    },
    Wing {
        thickness_ratio: Real,
        nc: usize,
        ns: usize,
    },
}

impl SampleMesh {
    pub fn build(&self) -> MeshResult<PanelMesh> {
        match *self {
            SampleMesh::FlatPlate { nx, ny } => samples::flat_plate(nx, ny, 1.0, 2.0),
            SampleMesh::ClosedBox { n } => samples::closed_box(1.0, 0.6, 0.4, n),
            SampleMesh::Wing {
                thickness_ratio,
                nc,
                ns,
            } => samples::rectangular_wing(1.0, 4.0, thickness_ratio, nc, ns),
        }
    }
}

/// A benchmark scenario definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkScenario {
    /// Unique identifier for this benchmark.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub mesh: SampleMesh,
    pub speed_mps: Real,
    pub alpha_deg: Real,
    pub dt_s: Real,
    pub wake_length_m: Real,
    pub free_wake: bool,
}

impl BenchmarkScenario {
    pub fn simulation(&self) -> Result<Simulation, BenchError> {
        let mesh = self.mesh.build()?;
        let options = SimOptions {
            dt: s(self.dt_s),
            wake_length: m(self.wake_length_m),
            wake_policy: if self.free_wake {
                WakePolicy::FreeRollup
            } else {
                WakePolicy::Frozen
            },
            ..SimOptions::default()
        };
        let flow = FlowConditions::from_degrees(self.speed_mps, self.alpha_deg, 0.0);
        Ok(Simulation::new(mesh, flow, options)?)
    }
}

/// A single run's timing breakdown and aerodynamic summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunMetrics {
    pub total_time_s: f64,
    pub assembly_time_s: f64,
    pub steady_solve_time_s: f64,
    pub wake_time_s: f64,
    pub kutta_time_s: f64,
    pub post_time_s: f64,
    pub steps: usize,
    pub warnings: usize,
    pub cl: Real,
    pub cd: Real,
}

/// Aggregated statistics for multiple runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub run_count: usize,
    pub total_time_median_s: f64,
    pub total_time_min_s: f64,
    pub total_time_max_s: f64,
    pub assembly_time_median_s: f64,
    pub kutta_time_median_s: f64,
    pub steps: usize,
    pub warnings_total: usize,
    pub cl: Real,
    pub cd: Real,
}

/// Complete benchmark result for a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub scenario: BenchmarkScenario,
    pub runs: Vec<RunMetrics>,
    pub aggregate: AggregateMetrics,
}

/// Collection of benchmark results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSuite {
    pub timestamp: String,
    pub results: Vec<BenchmarkResult>,
}

/// Run a single benchmark scenario N times.
pub fn run_scenario(scenario: &BenchmarkScenario, times: usize) -> Result<BenchmarkResult, BenchError> {
    if times == 0 {
        return Err(BenchError::NoRuns);
    }
    let sim = scenario.simulation()?;
    let mut runs = Vec::with_capacity(times);

    for run in 0..times {
        let started = Instant::now();
        let record = sim.run()?;
        let total_time_s = started.elapsed().as_secs_f64();
        let aero = sim.aero_coefficients(&record.final_fields)?;
        let timing = &record.timings;

        tracing::debug!(scenario = %scenario.id, run, total_time_s, "benchmark run finished");
        runs.push(RunMetrics {
            total_time_s,
            assembly_time_s: timing.assembly_s,
            steady_solve_time_s: timing.steady_solve_s,
            wake_time_s: timing.wake_s,
            kutta_time_s: timing.kutta_s,
            post_time_s: timing.post_s,
            steps: record.steps_completed,
            warnings: record.warnings.len(),
            cl: aero.cl,
            cd: aero.cd,
        });
    }

    let aggregate = compute_aggregates(&runs);
    Ok(BenchmarkResult {
        scenario: scenario.clone(),
        runs,
        aggregate,
    })
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values[values.len() / 2]
}

fn compute_aggregates(runs: &[RunMetrics]) -> AggregateMetrics {
    let Some(last) = runs.last() else {
        return AggregateMetrics::default();
    };
    let totals: Vec<f64> = runs.iter().map(|r| r.total_time_s).collect();

    AggregateMetrics {
        run_count: runs.len(),
        total_time_median_s: median(totals.clone()),
        total_time_min_s: totals.iter().copied().fold(f64::INFINITY, f64::min),
        total_time_max_s: totals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        assembly_time_median_s: median(runs.iter().map(|r| r.assembly_time_s).collect()),
        kutta_time_median_s: median(runs.iter().map(|r| r.kutta_time_s).collect()),
        steps: last.steps,
        warnings_total: runs.iter().map(|r| r.warnings).sum(),
        // Runs are deterministic, so any run's coefficients will do
        cl: last.cl,
        cd: last.cd,
    }
}

/// The default benchmark suite.
pub fn default_benchmarks() -> Vec<BenchmarkScenario> {
    vec![
        BenchmarkScenario {
            id: "plate".to_string(),
            name: "Flat plate, zero incidence".to_string(),
            mesh: SampleMesh::FlatPlate { nx: 8, ny: 8 },
            speed_mps: 10.0,
            alpha_deg: 0.0,
            dt_s: 0.05,
            wake_length_m: 1.0,
            free_wake: false,
        },
        BenchmarkScenario {
            id: "box".to_string(),
            name: "Closed box, gauged steady solve".to_string(),
            mesh: SampleMesh::ClosedBox { n: 4 },
            speed_mps: 5.0,
            alpha_deg: 4.0,
            dt_s: 0.1,
            wake_length_m: 0.5,
            free_wake: false,
        },
        BenchmarkScenario {
            id: "wing-frozen".to_string(),
            name: "Rectangular wing, frozen wake".to_string(),
            mesh: SampleMesh::Wing {
                thickness_ratio: 0.12,
                nc: 10,
                ns: 8,
            },
            speed_mps: 10.0,
            alpha_deg: 5.0,
            dt_s: 0.05,
            wake_length_m: 4.0,
            free_wake: false,
        },
        BenchmarkScenario {
            id: "wing-free".to_string(),
            name: "Rectangular wing, free wake".to_string(),
            mesh: SampleMesh::Wing {
                thickness_ratio: 0.12,
                nc: 10,
                ns: 8,
            },
            speed_mps: 10.0,
            alpha_deg: 5.0,
            dt_s: 0.05,
            wake_length_m: 2.0,
            free_wake: true,
        },
    ]
}
