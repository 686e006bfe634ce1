//! Quadrilateral vortex rings used for wake panels.

use bf_core::{Real, Vec3};

use crate::kernel::vortex_ring_velocity;

/// A wake panel between two consecutive filament columns.
///
/// Corners run `a0 -> b0 -> b1 -> a1`, where `(a0, b0)` is the upstream
/// column in trailing-edge root order. A positive circulation on the
/// upstream side cancels the bound vorticity `μ_upper - μ_lower` left at the
/// trailing edge by the two adjacent surface panels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WakeRing {
    pub corners: [Vec3; 4],
}

impl WakeRing {
    pub fn new(upstream: [Vec3; 2], downstream: [Vec3; 2]) -> Self {
        Self {
            corners: [upstream[0], upstream[1], downstream[1], downstream[0]],
        }
    }

    /// Velocity of this ring at unit circulation.
    #[inline]
    pub fn unit_velocity(&self, p: &Vec3) -> Vec3 {
        vortex_ring_velocity(p, &self.corners)
    }

    #[inline]
    pub fn velocity(&self, p: &Vec3, circulation: Real) -> Vec3 {
        self.unit_velocity(p) * circulation
    }

    pub fn centroid(&self) -> Vec3 {
        self.corners.iter().fold(Vec3::zeros(), |acc, c| acc + c) * 0.25
    }
}
