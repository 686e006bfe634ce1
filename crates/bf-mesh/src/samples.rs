//! Built-in sample meshes used by tests and the bench binary.

use std::collections::HashMap;

use bf_core::{Real, Vec3};

use crate::error::{MeshError, MeshResult};
use crate::mesh::{MeshBuilder, PanelMesh};

fn check_counts(counts: &[usize]) -> MeshResult<()> {
    if counts.contains(&0) {
        return Err(MeshError::Empty);
    }
    Ok(())
}

/// Flat rectangular plate in the z = 0 plane, normal +z.
///
/// Spans `x ∈ [0, chord]`, `y ∈ [-span/2, span/2]` with `nx × ny` quads and
/// no trailing edge.
pub fn flat_plate(nx: usize, ny: usize, chord: Real, span: Real) -> MeshResult<PanelMesh> {
    check_counts(&[nx, ny])?;
    let mut b = MeshBuilder::new();
    let mut ids = vec![vec![0usize; ny + 1]; nx + 1];
    for (i, row) in ids.iter_mut().enumerate() {
        for (j, id) in row.iter_mut().enumerate() {
            let x = chord * i as Real / nx as Real;
            let y = span * (j as Real / ny as Real - 0.5);
            *id = b.add_vertex(Vec3::new(x, y, 0.0));
        }
    }
    for i in 0..nx {
        for j in 0..ny {
            b.add_panel(&[ids[i][j], ids[i + 1][j], ids[i + 1][j + 1], ids[i][j + 1]]);
        }
    }
    b.build()
}

/// Closed axis-aligned box centred on the origin, `n × n` quads per face.
pub fn closed_box(lx: Real, ly: Real, lz: Real, n: usize) -> MeshResult<PanelMesh> {
    check_counts(&[n])?;
    // (origin, u, v) in lattice units; u × v points out of the box.
    let faces: [([usize; 3], [usize; 3], [usize; 3]); 6] = [
        ([0, 0, 0], [0, 1, 0], [1, 0, 0]),
        ([0, 0, n], [1, 0, 0], [0, 1, 0]),
        ([0, 0, 0], [1, 0, 0], [0, 0, 1]),
        ([0, n, 0], [0, 0, 1], [1, 0, 0]),
        ([0, 0, 0], [0, 0, 1], [0, 1, 0]),
        ([n, 0, 0], [0, 1, 0], [0, 0, 1]),
    ];
    let scale = [lx / n as Real, ly / n as Real, lz / n as Real];
    let half = Vec3::new(0.5 * lx, 0.5 * ly, 0.5 * lz);

    let mut b = MeshBuilder::new();
    let mut lattice: HashMap<[usize; 3], usize> = HashMap::new();
    let mut vertex = |b: &mut MeshBuilder, p: [usize; 3]| -> usize {
        *lattice.entry(p).or_insert_with(|| {
            let q = Vec3::new(
                p[0] as Real * scale[0],
                p[1] as Real * scale[1],
                p[2] as Real * scale[2],
            );
            b.add_vertex(q - half)
        })
    };

    let at = |o: [usize; 3], u: [usize; 3], v: [usize; 3], a: usize, c: usize| -> [usize; 3] {
        [
            o[0] + a * u[0] + c * v[0],
            o[1] + a * u[1] + c * v[1],
            o[2] + a * u[2] + c * v[2],
        ]
    };

    for (o, u, v) in faces {
        for a in 0..n {
            for c in 0..n {
                let quad = [
                    at(o, u, v, a, c),
                    at(o, u, v, a + 1, c),
                    at(o, u, v, a + 1, c + 1),
                    at(o, u, v, a, c + 1),
                ];
                let ids: Vec<usize> = quad.iter().map(|&p| vertex(&mut b, p)).collect();
                b.add_panel(&ids);
            }
        }
    }
    b.build()
}

/// Untwisted rectangular wing with a symmetric biconvex-like section and open tips.
///
/// The leading edge lies at `x = chord` and the trailing edge at `x = 0`, so a
/// freestream along `-x` sweeps from nose to tail. Half thickness is
/// `2·τ·c·s·(1 - s)` with `s` the cosine-spaced chord fraction from the nose.
/// One trailing edge is declared per spanwise strip.
pub fn rectangular_wing(
    chord: Real,
    span: Real,
    thickness_ratio: Real,
    nc: usize,
    ns: usize,
) -> MeshResult<PanelMesh> {
    check_counts(&[nc, ns])?;
    let mut b = MeshBuilder::new();

    let stations: Vec<Real> = (0..=nc)
        .map(|k| 0.5 * (1.0 - (std::f64::consts::PI * k as Real / nc as Real).cos()))
        .collect();
    let ys: Vec<Real> = (0..=ns)
        .map(|j| span * (j as Real / ns as Real - 0.5))
        .collect();

    // upper[k][j] / lower[k][j]; rows 0 (nose) and nc (trailing edge) are shared.
    let mut upper = vec![vec![0usize; ns + 1]; nc + 1];
    let mut lower = vec![vec![0usize; ns + 1]; nc + 1];
    for (k, &s) in stations.iter().enumerate() {
        let x = chord * (1.0 - s);
        let t = 2.0 * thickness_ratio * chord * s * (1.0 - s);
        for (j, &y) in ys.iter().enumerate() {
            if k == 0 || k == nc {
                let id = b.add_vertex(Vec3::new(x, y, 0.0));
                upper[k][j] = id;
                lower[k][j] = id;
            } else {
                upper[k][j] = b.add_vertex(Vec3::new(x, y, t));
                lower[k][j] = b.add_vertex(Vec3::new(x, y, -t));
            }
        }
    }

    let mut te_upper = Vec::with_capacity(ns);
    let mut te_lower = Vec::with_capacity(ns);
    for k in 0..nc {
        for j in 0..ns {
            let u = b.add_panel(&[
                upper[k][j],
                upper[k][j + 1],
                upper[k + 1][j + 1],
                upper[k + 1][j],
            ]);
            if k + 1 == nc {
                te_upper.push(u);
            }
        }
    }
    for k in 0..nc {
        for j in 0..ns {
            let l = b.add_panel(&[
                lower[k][j],
                lower[k + 1][j],
                lower[k + 1][j + 1],
                lower[k][j + 1],
            ]);
            if k + 1 == nc {
                te_lower.push(l);
            }
        }
    }
    for j in 0..ns {
        b.add_trailing_edge(te_upper[j], te_lower[j], upper[nc][j], upper[nc][j + 1]);
    }
    b.build()
}
