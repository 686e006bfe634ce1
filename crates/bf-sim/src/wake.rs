//! Wake filaments shed from the trailing edges.
//!
//! Each trailing edge owns one filament: a list of point-pair columns, column 0
//! pinned to the edge roots. Wake panel `k` spans columns `k` and `k + 1` and
//! carries circulation `Γ_k`; panel 0 is the newest.

use std::collections::HashMap;

use bf_core::{Real, Vec3};
use bf_influence::{WakeRing, body_velocity, wake_velocity};
use bf_mesh::{PanelMesh, TrailingEdge};
use bf_results::WakeGeometry;
use nalgebra::DVector;
use rayon::prelude::*;

use crate::options::WakePolicy;

/// Body state used to convect a free wake.
#[derive(Clone, Copy, Debug)]
pub struct BodyState<'a> {
    pub mesh: &'a PanelMesh,
    pub sigma: &'a DVector<Real>,
    pub mu: &'a DVector<Real>,
    /// Surface velocity of every panel
    pub surface_velocity: &'a [Vec3],
}

#[derive(Clone, Debug)]
struct Filament {
    edge: TrailingEdge,
    columns: Vec<[Vec3; 2]>,
    circulation: Vec<Real>,
}

impl Filament {
    fn ring(&self, k: usize) -> WakeRing {
        WakeRing::new(self.columns[k], self.columns[k + 1])
    }
}

/// Growing, convecting wake of one run.
#[derive(Clone, Debug)]
pub struct WakeModel {
    policy: WakePolicy,
    capacity: usize,
    dt: Real,
    freestream: Vec3,
    filaments: Vec<Filament>,
}

impl WakeModel {
    /// Empty wake (one root column per trailing edge, no panels).
    pub fn new(
        mesh: &PanelMesh,
        policy: WakePolicy,
        capacity: usize,
        dt: Real,
        freestream: Vec3,
    ) -> Self {
        let vertices = mesh.vertices();
        let filaments = mesh
            .trailing_edges()
            .iter()
            .map(|edge| Filament {
                edge: *edge,
                columns: vec![[vertices[edge.roots[0]], vertices[edge.roots[1]]]],
                circulation: Vec::new(),
            })
            .collect();
        Self {
            policy,
            capacity,
            dt,
            freestream,
            filaments,
        }
    }

    pub fn policy(&self) -> WakePolicy {
        self.policy
    }

    /// Maximum wake panels per filament (`n_w`).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn edge_count(&self) -> usize {
        self.filaments.len()
    }

    /// Wake panels currently held by each filament (all filaments grow together).
    pub fn panel_count(&self) -> usize {
        self.filaments.first().map_or(0, |f| f.circulation.len())
    }

    pub fn trailing_edges(&self) -> Vec<TrailingEdge> {
        self.filaments.iter().map(|f| f.edge).collect()
    }

    /// Move every existing column by one time step.
    ///
    /// All velocities are evaluated on the current geometry before any point
    /// moves.
    pub fn convect(&mut self, body: &BodyState<'_>) {
        match self.policy {
            WakePolicy::Frozen => {
                let shift = self.freestream * self.dt;
                for filament in &mut self.filaments {
                    for column in &mut filament.columns {
                        column[0] += shift;
                        column[1] += shift;
                    }
                }
            }
            WakePolicy::FreeRollup => {
                let root_velocity = self.root_velocities(body);
                let rings = self.rings();
                let freestream = self.freestream;
                let velocities: Vec<Vec<[Vec3; 2]>> = self
                    .filaments
                    .par_iter()
                    .map(|filament| {
                        filament
                            .columns
                            .iter()
                            .enumerate()
                            .map(|(k, column)| {
                                if k == 0 {
                                    return filament.edge.roots.map(|root| {
                                        root_velocity.get(&root).copied().unwrap_or(freestream)
                                    });
                                }
                                let induced = wake_velocity(column, &rings);
                                [0, 1].map(|r| {
                                    freestream
                                        + body_velocity(body.mesh, body.sigma, body.mu, &column[r])
                                        + induced[r]
                                })
                            })
                            .collect()
                    })
                    .collect();

                for (filament, velocity) in self.filaments.iter_mut().zip(velocities) {
                    for (column, v) in filament.columns.iter_mut().zip(velocity) {
                        column[0] += v[0] * self.dt;
                        column[1] += v[1] * self.dt;
                    }
                }
            }
        }
    }

    /// Mean surface velocity of all trailing-edge panels touching each root vertex.
    fn root_velocities(&self, body: &BodyState<'_>) -> HashMap<usize, Vec3> {
        let mut sums: HashMap<usize, (Vec3, usize)> = HashMap::new();
        for filament in &self.filaments {
            let edge = filament.edge;
            let v = (body.surface_velocity[edge.upper] + body.surface_velocity[edge.lower]) * 0.5;
            for root in edge.roots {
                let entry = sums.entry(root).or_insert((Vec3::zeros(), 0));
                entry.0 += v;
                entry.1 += 1;
            }
        }
        sums.into_iter()
            .map(|(root, (sum, count))| (root, sum / count as Real))
            .collect()
    }

    /// Insert a fresh column at the trailing edge, opening a new wake panel.
    ///
    /// The new panel's circulation is seeded with the previous newest value;
    /// once a filament exceeds `capacity` panels its oldest column is dropped.
    pub fn shed(&mut self, vertices: &[Vec3]) {
        for filament in &mut self.filaments {
            let roots = filament.edge.roots;
            filament
                .columns
                .insert(0, [vertices[roots[0]], vertices[roots[1]]]);
            let seed = filament.circulation.first().copied().unwrap_or(0.0);
            filament.circulation.insert(0, seed);
            if filament.circulation.len() > self.capacity {
                filament.circulation.pop();
                filament.columns.pop();
            }
        }
    }

    /// Newest circulation of every filament (zero before the first shed).
    pub fn newest_circulation(&self) -> Vec<Real> {
        self.filaments
            .iter()
            .map(|f| f.circulation.first().copied().unwrap_or(0.0))
            .collect()
    }

    /// Overwrite the newest circulation of every filament.
    pub fn set_newest(&mut self, circulation: &[Real]) {
        for (filament, gamma) in self.filaments.iter_mut().zip(circulation) {
            if let Some(first) = filament.circulation.first_mut() {
                *first = *gamma;
            }
        }
    }

    /// The newest wake panel of every filament, if one has been shed.
    pub fn newest_rings(&self) -> Vec<WakeRing> {
        self.filaments
            .iter()
            .filter(|f| !f.circulation.is_empty())
            .map(|f| f.ring(0))
            .collect()
    }

    /// Older wake panels with their known circulation.
    pub fn older_rings(&self) -> Vec<(WakeRing, Real)> {
        self.filaments
            .iter()
            .flat_map(|f| (1..f.circulation.len()).map(move |k| (f.ring(k), f.circulation[k])))
            .collect()
    }

    /// Every wake panel with its circulation.
    pub fn rings(&self) -> Vec<(WakeRing, Real)> {
        self.filaments
            .iter()
            .flat_map(|f| (0..f.circulation.len()).map(move |k| (f.ring(k), f.circulation[k])))
            .collect()
    }

    /// Column positions shaped `[edge][column][root][xyz]`.
    pub fn geometry(&self) -> WakeGeometry {
        WakeGeometry {
            filaments: self
                .filaments
                .iter()
                .map(|f| {
                    f.columns
                        .iter()
                        .map(|c| [[c[0].x, c[0].y, c[0].z], [c[1].x, c[1].y, c[1].z]])
                        .collect()
                })
                .collect(),
        }
    }

    /// Circulation per filament, newest first, zero-padded to `capacity`.
    pub fn circulation_history(&self) -> Vec<Vec<Real>> {
        self.filaments
            .iter()
            .map(|f| {
                let mut row = f.circulation.clone();
                row.resize(self.capacity, 0.0);
                row
            })
            .collect()
    }
}
