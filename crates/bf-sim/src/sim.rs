//! Time-marching driver and run recording.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bf_core::timing::{RunTimings, Timer};
use bf_core::{FlowConditions, Real, Vec3, ensure_all_finite};
use bf_influence::{InfluenceMatrices, SourceInfluence, source_strengths, wake_column, wake_velocity};
use bf_mesh::PanelMesh;
use bf_results::{
    FieldInputs, FieldPostProcessor, NonconvergenceWarning, PanelFields, RunRecord, StepSnapshot,
};
use bf_solver::SteadyLinearSolver;
use nalgebra::DVector;

use crate::error::{SimError, SimResult};
use crate::kutta::{KuttaProblem, UnsteadyKuttaSolver};
use crate::options::SimOptions;
use crate::wake::{BodyState, WakeModel};

/// Cooperative cancellation flag, checked between time steps only.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Progress report after each completed time step.
#[derive(Clone, Copy, Debug)]
pub struct StepProgress {
    pub step: usize,
    pub total_steps: usize,
    pub time_s: Real,
    pub fraction_complete: Real,
    pub residual_norm: Real,
    pub converged: bool,
}

/// One panel-method run: a mesh, flow conditions and options.
///
/// Every `run*` call builds its own solution state, so repeated runs are
/// independent.
#[derive(Clone, Debug)]
pub struct Simulation {
    mesh: PanelMesh,
    conditions: FlowConditions,
    options: SimOptions,
    capacity: usize,
}

impl Simulation {
    pub fn new(mesh: PanelMesh, conditions: FlowConditions, options: SimOptions) -> SimResult<Self> {
        if mesh.is_empty() {
            return Err(SimError::InvalidArg {
                what: "mesh has no panels",
            });
        }
        conditions.validate()?;
        options.validate()?;
        let capacity = options.wake_capacity(conditions.speed_mps())?;
        Ok(Self {
            mesh,
            conditions,
            options,
            capacity,
        })
    }

    pub fn mesh(&self) -> &PanelMesh {
        &self.mesh
    }

    pub fn options(&self) -> &SimOptions {
        &self.options
    }

    /// Wake panels per trailing edge (`n_w`).
    pub fn wake_capacity(&self) -> usize {
        self.capacity
    }

    /// Number of unsteady steps a full run takes.
    pub fn total_steps(&self) -> usize {
        self.options.steps.unwrap_or(self.capacity)
    }

    pub fn run(&self) -> SimResult<RunRecord> {
        self.execute(None, None)
    }

    /// Run, stopping early once `cancel` is set.
    pub fn run_until(&self, cancel: &CancelToken) -> SimResult<RunRecord> {
        self.execute(Some(cancel), None)
    }

    pub fn run_with_progress(
        &self,
        cancel: Option<&CancelToken>,
        progress: &mut dyn FnMut(&StepProgress),
    ) -> SimResult<RunRecord> {
        self.execute(cancel, Some(progress))
    }

    fn reference_area(&self) -> Real {
        self.options
            .reference_area
            .map_or(0.5 * self.mesh.total_area(), |a| a.value)
    }

    fn execute(
        &self,
        cancel: Option<&CancelToken>,
        mut progress: Option<&mut dyn FnMut(&StepProgress)>,
    ) -> SimResult<RunRecord> {
        let mesh = &self.mesh;
        let freestream = self.conditions.freestream();
        let dt = self.options.dt.value;
        let reference_area = self.reference_area();
        let total_steps = self.total_steps();
        let mut timings = RunTimings::default();

        tracing::info!(
            panels = mesh.len(),
            trailing_edges = mesh.trailing_edges().len(),
            closed = mesh.is_closed(),
            wake_capacity = self.capacity,
            steps = total_steps,
            "starting panel run"
        );

        // Static influence
        let timer = Timer::start("assembly");
        let sigma = source_strengths(mesh, &freestream);
        let influence = InfluenceMatrices::assemble(mesh);
        let sources = SourceInfluence::assemble(mesh, &sigma, &freestream)?;
        timings.assembly_s = timer.stop_and_log();

        // Wake-free solve
        let timer = Timer::start("steady solve");
        let steady_solver = SteadyLinearSolver::for_mesh(mesh)?;
        let steady = steady_solver.solve(&influence.doublet, &sources.normal)?;
        ensure_all_finite(steady.mu.as_slice(), "steady doublet strengths")?;
        timings.steady_solve_s = timer.stop_and_log();
        tracing::info!(
            residual = steady.residual_norm,
            gauged = steady.gauged,
            "steady solution"
        );

        let post = FieldPostProcessor::new(mesh, freestream);
        let timer = Timer::start("post-processing");
        let steady_transpiration = &influence.doublet * &steady.mu + &sources.normal;
        let steady_fields = post.compute(FieldInputs {
            sigma: sigma.as_slice(),
            mu: steady.mu.as_slice(),
            transpiration: steady_transpiration.as_slice(),
            dmu_dt: None,
        })?;
        timings.post_s += timer.stop();

        let edges = mesh.trailing_edges().to_vec();
        let control_points: Vec<Vec3> = mesh.panels().iter().map(|p| p.control_point()).collect();
        let normals = mesh.normals();
        let kutta = UnsteadyKuttaSolver::new(self.options.kutta.clone());
        let mut wake = WakeModel::new(mesh, self.options.wake_policy, self.capacity, dt, freestream);

        let mut mu = steady.mu.clone();
        let mut fields = steady_fields.clone();
        let mut snapshots = Vec::new();
        let mut warnings = Vec::new();
        let mut cancelled = false;
        let mut steps_completed = 0;

        for step in 1..=total_steps {
            if cancel.is_some_and(CancelToken::is_cancelled) {
                tracing::info!(step, "run cancelled");
                cancelled = true;
                break;
            }

            let timer = Timer::start("wake");
            let surface_velocity: Vec<Vec3> = (0..mesh.len()).map(|i| fields.velocity_vec(i)).collect();
            wake.convect(&BodyState {
                mesh,
                sigma: &sigma,
                mu: &mu,
                surface_velocity: &surface_velocity,
            });
            wake.shed(mesh.vertices());
            let newest = wake_column(mesh, &wake.newest_rings());
            let older = wake_velocity(&control_points, &wake.older_rings());
            let wake_normal =
                DVector::from_iterator(mesh.len(), older.iter().zip(&normals).map(|(v, n)| v.dot(n)));
            timings.wake_s += timer.stop();

            let timer = Timer::start("kutta");
            let problem = KuttaProblem {
                doublet: &influence.doublet,
                source_normal: &sources.normal,
                wake_column: &newest,
                wake_normal: &wake_normal,
                gauge: steady_solver.gauge(),
                edges: &edges,
            };
            let gamma0 = DVector::from_vec(wake.newest_circulation());
            let solution = kutta.solve(&problem, &mu, &gamma0)?;
            ensure_all_finite(solution.mu.as_slice(), "doublet strengths")?;
            ensure_all_finite(solution.circulation.as_slice(), "shed circulation")?;
            timings.kutta_s += timer.stop();

            if !solution.converged {
                tracing::warn!(
                    step,
                    iterations = solution.iterations,
                    residual = solution.residual_norm,
                    "Kutta solve did not converge; keeping best iterate"
                );
                warnings.push(NonconvergenceWarning {
                    step,
                    iterations: solution.iterations,
                    residual_norm: solution.residual_norm,
                });
            }
            wake.set_newest(solution.circulation.as_slice());

            let timer = Timer::start("post-processing");
            let dmu_dt = self
                .options
                .unsteady_pressure
                .then(|| (&solution.mu - &mu) / dt);
            fields = post.compute(FieldInputs {
                sigma: sigma.as_slice(),
                mu: solution.mu.as_slice(),
                transpiration: solution.transpiration.as_slice(),
                dmu_dt: dmu_dt.as_ref().map(|d| d.as_slice()),
            })?;
            let cf = post.force_coefficient(&fields.cp, reference_area)?;
            timings.post_s += timer.stop();

            tracing::debug!(
                step,
                iterations = solution.iterations,
                residual = solution.residual_norm,
                cz = cf.z,
                "time step complete"
            );

            if step % self.options.record_every == 0 || step == total_steps {
                snapshots.push(StepSnapshot {
                    step,
                    time_s: step as Real * dt,
                    fields: fields.clone(),
                    shed_circulation: solution.circulation.iter().copied().collect(),
                    force_coefficient: [cf.x, cf.y, cf.z],
                });
            }

            mu = solution.mu;
            steps_completed = step;

            if let Some(cb) = progress.as_deref_mut() {
                cb(&StepProgress {
                    step,
                    total_steps,
                    time_s: step as Real * dt,
                    fraction_complete: step as Real / total_steps as Real,
                    residual_norm: solution.residual_norm,
                    converged: solution.converged,
                });
            }
        }

        timings.steps = steps_completed;
        timings.log_summary();
        if !warnings.is_empty() {
            tracing::warn!(count = warnings.len(), "steps finished without convergence");
        }

        Ok(RunRecord {
            steady: steady_fields,
            snapshots,
            final_fields: fields,
            wake: wake.geometry(),
            circulation: wake.circulation_history(),
            warnings,
            steps_completed,
            cancelled,
            timings,
        })
    }

    /// Force coefficient of a set of fields, with its lift/drag split.
    pub fn aero_coefficients(&self, fields: &PanelFields) -> SimResult<bf_results::AeroCoefficients> {
        let post = FieldPostProcessor::new(&self.mesh, self.conditions.freestream());
        let cf = post.force_coefficient(&fields.cp, self.reference_area())?;
        Ok(post.aero_coefficients(cf))
    }
}
