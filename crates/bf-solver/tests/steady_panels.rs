//! Steady solves on the sample meshes.

use bf_core::{FlowConditions, Vec3};
use bf_influence::{InfluenceMatrices, SourceInfluence, source_strengths};
use bf_mesh::samples;
use bf_solver::SteadyLinearSolver;

fn steady_mu(mesh: &bf_mesh::PanelMesh, freestream: Vec3) -> bf_solver::SteadySolution {
    let inf = InfluenceMatrices::assemble(mesh);
    let sigma = source_strengths(mesh, &freestream);
    let src = SourceInfluence::assemble(mesh, &sigma, &freestream).unwrap();
    SteadyLinearSolver::for_mesh(mesh)
        .unwrap()
        .solve(&inf.doublet, &src.normal)
        .unwrap()
}

#[test]
fn flat_plate_edge_on_has_zero_doublets() {
    let mesh = samples::flat_plate(4, 4, 1.0, 1.0).unwrap();
    let flow = FlowConditions::from_degrees(10.0, 0.0, 0.0);
    let sol = steady_mu(&mesh, flow.freestream());
    assert!(!sol.gauged);
    assert!(sol.mu.amax() < 1e-12);
}

#[test]
fn closed_box_solves_with_gauge() {
    let mesh = samples::closed_box(1.0, 0.6, 0.4, 2).unwrap();
    let flow = FlowConditions::from_degrees(5.0, 4.0, 2.0);
    let sol = steady_mu(&mesh, flow.freestream());
    assert!(sol.gauged);
    assert!(sol.mu.iter().all(|m| m.is_finite()));
    // Source data on a closed surface is consistent, so the gauge costs nothing
    assert!(sol.residual_norm < 1e-6 * flow.speed_mps());
}

#[test]
fn repeated_solves_are_bit_identical() {
    let mesh = samples::rectangular_wing(1.0, 3.0, 0.12, 6, 4).unwrap();
    let flow = FlowConditions::from_degrees(12.0, 3.0, 0.0);
    let first = steady_mu(&mesh, flow.freestream());
    let second = steady_mu(&mesh, flow.freestream());
    assert_eq!(first.mu, second.mu);
}
