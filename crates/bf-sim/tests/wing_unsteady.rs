//! End-to-end unsteady runs on the sample wing.

use bf_core::units::{m, s};
use bf_core::{FlowConditions, Real, Tolerances, nearly_equal};
use bf_mesh::{PanelMesh, samples};
use bf_results::RunRecord;
use bf_sim::{CancelToken, KuttaMethod, SimOptions, Simulation, WakePolicy};
use bf_solver::{KrylovConfig, NewtonConfig};

const SPEED: Real = 10.0;

fn wing() -> PanelMesh {
    samples::rectangular_wing(1.0, 4.0, 0.12, 6, 3).expect("wing mesh")
}

fn options(steps: usize) -> SimOptions {
    SimOptions {
        dt: s(0.05),
        wake_length: m(5.0),
        steps: Some(steps),
        ..SimOptions::default()
    }
}

fn run(alpha_deg: Real, options: SimOptions) -> (Simulation, RunRecord) {
    let sim = Simulation::new(wing(), FlowConditions::from_degrees(SPEED, alpha_deg, 0.0), options)
        .expect("valid setup");
    let record = sim.run().expect("run should succeed");
    (sim, record)
}

fn assert_kutta(sim: &Simulation, record: &RunRecord) {
    for snapshot in &record.snapshots {
        for (e, edge) in sim.mesh().trailing_edges().iter().enumerate() {
            let jump = snapshot.fields.doublet[edge.upper] - snapshot.fields.doublet[edge.lower];
            let gamma = snapshot.shed_circulation[e];
            assert!(
                (gamma - jump).abs() < 1e-8,
                "step {}: Γ = {gamma}, μ_u - μ_l = {jump}",
                snapshot.step
            );
        }
    }
}

#[test]
fn symmetric_wing_at_zero_incidence_sheds_nothing() {
    let (sim, record) = run(0.0, options(3));
    assert_eq!(record.steps_completed, 3);
    assert!(record.warnings.is_empty());
    for row in &record.circulation {
        for gamma in row {
            assert!(gamma.abs() < 1e-6 * SPEED, "Γ = {gamma}");
        }
    }
    assert_kutta(&sim, &record);
}

#[test]
fn kutta_condition_holds_every_step_with_newton_krylov() {
    let opts = SimOptions {
        kutta: KuttaMethod::NewtonKrylov(KrylovConfig::default()),
        ..options(4)
    };
    let (sim, record) = run(5.0, opts);
    assert_eq!(record.snapshots.len(), 4);
    assert!(record.warnings.is_empty());
    assert_kutta(&sim, &record);
}

#[test]
fn kutta_condition_holds_every_step_with_dense_newton() {
    let opts = SimOptions {
        kutta: KuttaMethod::DenseNewton(NewtonConfig::default()),
        ..options(3)
    };
    let (sim, record) = run(5.0, opts);
    assert!(record.warnings.is_empty());
    assert_kutta(&sim, &record);
}

#[test]
fn both_methods_agree() {
    let krylov = run(5.0, options(2)).1;
    let dense = run(
        5.0,
        SimOptions {
            kutta: KuttaMethod::DenseNewton(NewtonConfig::default()),
            ..options(2)
        },
    )
    .1;
    for (a, b) in krylov.circulation.iter().flatten().zip(dense.circulation.iter().flatten()) {
        assert!((a - b).abs() < 1e-6 * (1.0 + a.abs()), "{a} vs {b}");
    }
}

#[test]
fn lifting_wing_builds_up_circulation() {
    let (sim, record) = run(5.0, options(3));
    let history: Vec<&Vec<Real>> = record.snapshots.iter().map(|s| &s.shed_circulation).collect();
    for e in 0..3 {
        assert!(history[0][e] > 0.0);
        // Starting vortex moves away: shed circulation grows toward steady state
        assert!(history[1][e] > history[0][e]);
        assert!(history[2][e] > history[1][e]);
    }
    // Spanwise symmetry of the untwisted wing
    let last = history[2];
    assert!((last[0] - last[2]).abs() < 1e-6 * last[1].abs());

    let aero = sim.aero_coefficients(&record.final_fields).unwrap();
    assert!(aero.cl > 0.0);
}

/// Mid-span shed circulation per step and the final lift coefficient.
fn long_run(policy: WakePolicy) -> (Vec<Real>, Real) {
    let mesh = samples::rectangular_wing(1.0, 4.0, 0.12, 8, 4).expect("wing mesh");
    let opts = SimOptions {
        dt: s(0.02),
        // 8 / (10 · 0.02) = 40 panels, so nothing is dropped
        wake_length: m(8.0),
        steps: Some(40),
        wake_policy: policy,
        ..SimOptions::default()
    };
    let sim = Simulation::new(mesh, FlowConditions::from_degrees(SPEED, 5.0, 0.0), opts)
        .expect("valid setup");
    let record = sim.run().expect("run should succeed");
    assert_eq!(record.snapshots.len(), 40);
    assert!(record.warnings.is_empty());
    let history = record.snapshots.iter().map(|s| s.shed_circulation[1]).collect();
    let cl = sim.aero_coefficients(&record.final_fields).unwrap().cl;
    (history, cl)
}

#[test]
fn long_wake_settles_for_both_policies() {
    let (frozen, cl_frozen) = long_run(WakePolicy::Frozen);
    let (free, cl_free) = long_run(WakePolicy::FreeRollup);

    for history in [&frozen, &free] {
        let first = history[1] - history[0];
        let last = history[39] - history[38];
        assert!(first > 0.0);
        assert!(last.abs() < 0.05 * first, "first {first}, last {last}");
    }

    let close = Tolerances { abs: 0.0, rel: 1e-2 };
    assert!(nearly_equal(frozen[39], free[39], close), "{} vs {}", frozen[39], free[39]);
    assert!(cl_frozen > 0.0);
    assert!(nearly_equal(cl_frozen, cl_free, close), "{cl_frozen} vs {cl_free}");
}

#[test]
fn nonconvergence_is_collected_and_the_run_continues() {
    let starved = KrylovConfig {
        max_iterations: 1,
        abs_tol: 0.0,
        rel_tol: 0.0,
        ..KrylovConfig::default()
    };
    let opts = SimOptions {
        kutta: KuttaMethod::NewtonKrylov(starved),
        ..options(3)
    };
    let (_, record) = run(5.0, opts);
    assert_eq!(record.steps_completed, 3);
    assert!(!record.cancelled);
    let steps: Vec<usize> = record.warnings.iter().map(|w| w.step).collect();
    assert_eq!(steps, vec![1, 2, 3]);
    for warning in &record.warnings {
        assert_eq!(warning.iterations, 1);
        assert!(warning.residual_norm.is_finite());
    }
    assert!(record.final_fields.cp.iter().all(|c| c.is_finite()));
}

#[test]
fn flat_plate_in_its_own_plane_stays_undisturbed() {
    let plate = samples::flat_plate(4, 4, 1.0, 1.0).expect("plate mesh");
    let sim = Simulation::new(plate, FlowConditions::from_degrees(SPEED, 0.0, 0.0), options(3))
        .expect("valid setup");
    let record = sim.run().expect("run should succeed");
    assert_eq!(record.steps_completed, 3);
    assert!(record.warnings.is_empty());

    let fields = &record.final_fields;
    for i in 0..fields.len() {
        assert!(fields.doublet[i].abs() < 1e-10, "μ = {}", fields.doublet[i]);
        assert!(fields.cp[i].abs() < 1e-10, "cp = {}", fields.cp[i]);
        assert!((fields.velocity_vec(i).norm() / SPEED - 1.0).abs() < 1e-10);
    }
}

#[test]
fn wake_grows_then_saturates() {
    let opts = SimOptions {
        dt: s(0.05),
        // 1.5 / (10 · 0.05) = 3 panels
        wake_length: m(1.5),
        steps: Some(5),
        ..SimOptions::default()
    };
    let (sim, record) = run(5.0, opts);
    assert_eq!(sim.wake_capacity(), 3);
    assert_eq!(record.steps_completed, 5);
    for e in 0..3 {
        assert_eq!(record.wake.columns(e), 4);
        assert_eq!(record.circulation[e].len(), 3);
        assert!(record.circulation[e].iter().all(|g| *g > 0.0));
    }
    // Frozen wake: the oldest kept column is three steps downstream of the edge
    let oldest = record.wake.filaments[0][3][0];
    let expected_x = -3.0 * 0.05 * SPEED * (5.0 as Real).to_radians().cos();
    assert!((oldest[0] - expected_x).abs() < 1e-9);
}

#[test]
fn default_run_fills_the_wake() {
    let opts = SimOptions {
        dt: s(0.05),
        wake_length: m(1.0),
        ..SimOptions::default()
    };
    let (sim, record) = run(3.0, opts);
    assert_eq!(sim.total_steps(), 2);
    assert_eq!(record.steps_completed, 2);
    assert_eq!(record.wake.columns(0), 3);
}

#[test]
fn free_rollup_keeps_kutta_and_stays_finite() {
    let opts = SimOptions {
        wake_policy: WakePolicy::FreeRollup,
        ..options(3)
    };
    let (sim, record) = run(5.0, opts);
    assert_kutta(&sim, &record);
    for filament in &record.wake.filaments {
        assert!(filament.iter().flatten().flatten().all(|v| v.is_finite()));
    }
    // Column 0 stays on the trailing edge
    let te = sim.mesh().trailing_edges()[0];
    let root = sim.mesh().vertices()[te.roots[0]];
    let first = record.wake.filaments[0][0][0];
    assert!((first[0] - root.x).abs() < 1e-12);
    assert!((first[2] - root.z).abs() < 1e-12);
}

#[test]
fn cancellation_before_first_step_returns_steady_solution() {
    let sim = Simulation::new(wing(), FlowConditions::from_degrees(SPEED, 5.0, 0.0), options(3))
        .unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();
    let record = sim.run_until(&cancel).unwrap();
    assert!(record.cancelled);
    assert_eq!(record.steps_completed, 0);
    assert!(record.snapshots.is_empty());
    assert_eq!(record.final_fields, record.steady);
    assert!(record.circulation.iter().flatten().all(|g| *g == 0.0));
}

#[test]
fn cancellation_from_progress_stops_between_steps() {
    let sim = Simulation::new(wing(), FlowConditions::from_degrees(SPEED, 5.0, 0.0), options(5))
        .unwrap();
    let cancel = CancelToken::new();
    let mut seen = Vec::new();
    let record = sim
        .run_with_progress(Some(&cancel), &mut |p| {
            seen.push(p.step);
            if p.step == 2 {
                cancel.cancel();
            }
        })
        .unwrap();
    assert!(record.cancelled);
    assert_eq!(record.steps_completed, 2);
    assert_eq!(seen, vec![1, 2]);
    assert_eq!(record.wake.columns(0), 3);
}

#[test]
fn repeated_runs_are_identical() {
    let sim = Simulation::new(wing(), FlowConditions::from_degrees(SPEED, 4.0, 1.0), options(2))
        .unwrap();
    let a = sim.run().unwrap();
    let b = sim.run().unwrap();
    assert_eq!(a.circulation, b.circulation);
    assert_eq!(a.final_fields, b.final_fields);
}

#[test]
fn record_serializes_for_the_writer() {
    let (_, record) = run(5.0, options(2));
    let json = record.to_json().unwrap();
    let back = RunRecord::from_json(&json).unwrap();
    assert_eq!(back.steps_completed, 2);
    assert_eq!(back.snapshots.len(), 2);
    assert_eq!(back.final_fields.len(), record.final_fields.len());
}
