//! Assembly-level checks on the sample meshes.

use bf_core::{Real, Vec3};
use bf_influence::{
    InfluenceMatrices, SourceInfluence, WakeRing, body_velocity, source_strengths, wake_column,
    wake_velocity,
};
use bf_mesh::samples;
use nalgebra::DVector;

#[test]
fn closed_box_uniform_doublet_induces_nothing() {
    let mesh = samples::closed_box(1.0, 1.5, 0.8, 2).unwrap();
    let inf = InfluenceMatrices::assemble(&mesh);
    let diag_max = (0..mesh.len())
        .map(|i| inf.doublet[(i, i)].abs())
        .fold(0.0, Real::max);
    let ones = DVector::from_element(mesh.len(), 1.0);
    let row_sums = &inf.doublet * &ones;
    assert!(diag_max > 0.1);
    assert!(row_sums.amax() < 1e-6 * diag_max, "A·1 = {row_sums}");
}

#[test]
fn plate_in_its_own_plane_has_no_normal_source_velocity() {
    let mesh = samples::flat_plate(4, 4, 1.0, 1.0).unwrap();
    let freestream = Vec3::new(-10.0, 0.0, 0.0);
    let sigma = source_strengths(&mesh, &freestream);
    assert!(sigma.iter().all(|s| *s == 0.0));
    let src = SourceInfluence::assemble(&mesh, &sigma, &freestream).unwrap();
    assert!(src.normal.amax() < 1e-14);
    assert!(src.velocity.iter().all(|v| (v - freestream).norm() < 1e-14));
}

#[test]
fn wake_ring_over_a_panel_matches_its_doublet_column() {
    let mesh = samples::flat_plate(3, 3, 1.0, 1.0).unwrap();
    let inf = InfluenceMatrices::assemble(&mesh);
    let j = 4;
    let ids = mesh.panel(j).vertices();
    let p = |k: usize| mesh.vertices()[ids[k]];
    // Reversed traversal of the panel outline
    let ring = WakeRing::new([p(3), p(2)], [p(0), p(1)]);
    let c = wake_column(&mesh, &[ring]);
    assert_eq!(c.shape(), (mesh.len(), 1));
    for i in 0..mesh.len() {
        let a = inf.doublet[(i, j)];
        assert!((c[(i, 0)] - a).abs() <= 1e-6 * a.abs() + 1e-12, "row {i}");
    }
}

#[test]
fn wake_velocity_is_linear_in_circulation() {
    let ring = WakeRing::new(
        [Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, -0.5, 0.0)],
        [Vec3::new(-1.0, 0.5, 0.0), Vec3::new(-1.0, -0.5, 0.0)],
    );
    let points = vec![Vec3::new(0.3, 0.1, 0.2), Vec3::new(-2.0, 0.0, -0.4)];
    let single = wake_velocity(&points, &[(ring, 1.0)]);
    let double = wake_velocity(&points, &[(ring, 1.5), (ring, 0.5)]);
    for (a, b) in single.iter().zip(&double) {
        assert!((a * 2.0 - b).norm() < 1e-14);
    }
}

#[test]
fn body_velocity_off_surface_matches_matrices_near_control_points() {
    let mesh = samples::closed_box(1.0, 1.0, 1.0, 1).unwrap();
    let freestream = Vec3::new(-1.0, 0.2, 0.1);
    let sigma = source_strengths(&mesh, &freestream);
    let mu = DVector::from_fn(mesh.len(), |i, _| 0.05 * i as Real);
    let inf = InfluenceMatrices::assemble(&mesh);
    let src = SourceInfluence::assemble(&mesh, &sigma, &freestream).unwrap();

    let i = 2;
    let cp = mesh.panel(i).control_point();
    let direct = body_velocity(&mesh, &sigma, &mu, &cp) + freestream;
    let assembled = src.velocity[i] + inf.velocity_at(i, &mu);
    assert!((direct - assembled).norm() < 1e-8);
}
