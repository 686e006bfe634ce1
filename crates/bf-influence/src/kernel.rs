//! Closed-form influence kernels for planar polygon panels and vortex segments.
//!
//! Panel kernels take the field point in the panel's local frame (centroid at
//! the origin, e3 along z) and the polygon corners in the (e1, e2) plane,
//! ordered counter-clockwise. Triangles and quadrilaterals share one edge-loop
//! implementation. No kernel returns NaN or Inf for finite input: degenerate
//! configurations contribute zero.

use std::f64::consts::TAU;

use bf_core::{INV_FOUR_PI, Real, Vec2, Vec3};
use bf_mesh::Panel;

/// Guard for vortex segment legs and their cross product.
pub const SEGMENT_EPS: Real = 1e-8;

/// Finite-difference step relative to `sqrt(area)`.
pub const FD_STEP: Real = 1e-6;

/// Relative guard for edge lengths and logarithm arguments.
const EDGE_EPS: Real = 1e-14;

/// Edge-loop sums shared by the doublet and source kernels.
#[derive(Clone, Copy, Debug, Default)]
struct EdgeSums {
    /// Solid angle subtended by the panel from the point mirrored to `z >= 0`.
    solid_angle: Real,
    /// `Σ S·Q`
    log_s: Real,
    /// `Σ C·Q`
    log_c: Real,
    /// `Σ R·Q`
    log_r: Real,
}

fn edge_sums(p: &Vec3, vertices: &[Vec2]) -> EdgeSums {
    let (x, y, z) = (p.x, p.y, p.z);
    let az = z.abs();
    let n = vertices.len();
    let scale: Real = vertices.iter().map(|v| v.norm()).fold(0.0, Real::max);

    let mut sums = EdgeSums::default();
    let mut inside = true;

    for k in 0..n {
        let a = vertices[k];
        let b = vertices[(k + 1) % n];
        let d = (b - a).norm();
        if d <= EDGE_EPS * scale {
            continue;
        }
        let c = (b.x - a.x) / d;
        let s = (b.y - a.y) / d;

        // Signed distance to the edge line; negative on the interior side.
        let r_edge = (x - a.x) * s - (y - a.y) * c;
        if r_edge >= 0.0 {
            inside = false;
        }

        let r1 = ((x - a.x).powi(2) + (y - a.y).powi(2) + z * z).sqrt();
        let r2 = ((x - b.x).powi(2) + (y - b.y).powi(2) + z * z).sqrt();
        let s1 = (a.x - x) * c + (a.y - y) * s;
        let s2 = (b.x - x) * c + (b.y - y) * s;

        sums.solid_angle += (r_edge * az * (r1 * s2 - r2 * s1))
            .atan2(r1 * r2 * r_edge * r_edge + z * z * s1 * s2);

        let denom = r1 + r2 - d;
        if denom > EDGE_EPS * (r1 + r2 + d) {
            let q = ((r1 + r2 + d) / denom).ln();
            sums.log_s += s * q;
            sums.log_c += c * q;
            sums.log_r += r_edge * q;
        }
    }

    if inside {
        sums.solid_angle += TAU;
    }
    sums
}

#[inline]
fn side(z: Real) -> Real {
    if z >= 0.0 { 1.0 } else { -1.0 }
}

fn near_doublet_potential(p: &Vec3, vertices: &[Vec2]) -> Real {
    side(p.z) * edge_sums(p, vertices).solid_angle * INV_FOUR_PI
}

/// Potential of a unit doublet panel (axis +e3).
///
/// Jumps by exactly 1 across the panel: `+1/2` just above, `-1/2` just below.
pub fn doublet_potential(p: &Vec3, vertices: &[Vec2], area: Real, max_distance: Real) -> Real {
    let r = p.norm();
    if r > max_distance {
        return area * p.z * INV_FOUR_PI / (r * r * r);
    }
    near_doublet_potential(p, vertices)
}

/// Velocity of a unit doublet panel, in the panel frame.
///
/// Near field differentiates the closed-form potential numerically. Within two
/// steps of the panel plane the normal derivative uses a one-sided stencil on
/// the point's own side so it never straddles the sheet.
pub fn doublet_velocity(p: &Vec3, vertices: &[Vec2], area: Real, max_distance: Real) -> Vec3 {
    let r = p.norm();
    if r > max_distance {
        return dipole_velocity(p, area, r);
    }

    let h = FD_STEP * area.sqrt();
    let phi = |dx: Real, dy: Real, dz: Real| {
        near_doublet_potential(&Vec3::new(p.x + dx, p.y + dy, p.z + dz), vertices)
    };

    let u = (phi(h, 0.0, 0.0) - phi(-h, 0.0, 0.0)) / (2.0 * h);
    let v = (phi(0.0, h, 0.0) - phi(0.0, -h, 0.0)) / (2.0 * h);
    let w = if p.z.abs() < 2.0 * h {
        let sh = side(p.z) * h;
        (-3.0 * phi(0.0, 0.0, 0.0) + 4.0 * phi(0.0, 0.0, sh) - phi(0.0, 0.0, 2.0 * sh)) / (2.0 * sh)
    } else {
        (phi(0.0, 0.0, h) - phi(0.0, 0.0, -h)) / (2.0 * h)
    };
    Vec3::new(u, v, w)
}

/// Gradient of the point-dipole potential `area·z / (4π r³)`.
fn dipole_velocity(p: &Vec3, area: Real, r: Real) -> Vec3 {
    let k = area * INV_FOUR_PI / r.powi(5);
    Vec3::new(
        -3.0 * k * p.z * p.x,
        -3.0 * k * p.z * p.y,
        k * (p.x * p.x + p.y * p.y - 2.0 * p.z * p.z),
    )
}

/// Potential of a unit-strength source panel (outflow positive).
pub fn source_potential(p: &Vec3, vertices: &[Vec2], area: Real, max_distance: Real) -> Real {
    let r = p.norm();
    if r > max_distance {
        return -area * INV_FOUR_PI / r;
    }
    let sums = edge_sums(p, vertices);
    (sums.log_r + p.z.abs() * sums.solid_angle) * INV_FOUR_PI
}

/// Velocity of a unit-strength source panel, in the panel frame.
///
/// The normal component is `±1/2` on either face of the panel.
pub fn source_velocity(p: &Vec3, vertices: &[Vec2], area: Real, max_distance: Real) -> Vec3 {
    let r = p.norm();
    if r > max_distance {
        return p * (area * INV_FOUR_PI / (r * r * r));
    }
    let sums = edge_sums(p, vertices);
    Vec3::new(
        sums.log_s * INV_FOUR_PI,
        -sums.log_c * INV_FOUR_PI,
        side(p.z) * sums.solid_angle * INV_FOUR_PI,
    )
}

/// Biot–Savart velocity of a unit-circulation straight segment `p1 -> p2` at `p`.
///
/// Zero when `p` is within [`SEGMENT_EPS`] of either endpoint or of the
/// segment's supporting line.
pub fn line_vortex_velocity(p1: &Vec3, p2: &Vec3, p: &Vec3) -> Vec3 {
    let r1 = p - p1;
    let r2 = p - p2;
    let l1 = r1.norm();
    let l2 = r2.norm();
    let cross = r1.cross(&r2);
    let cross_norm = cross.norm();
    if l1 < SEGMENT_EPS || l2 < SEGMENT_EPS || cross_norm < SEGMENT_EPS {
        return Vec3::zeros();
    }
    let r0 = p2 - p1;
    let k = INV_FOUR_PI * (r0.dot(&r1) / l1 - r0.dot(&r2) / l2) / (cross_norm * cross_norm);
    cross * k
}

/// Velocity of a closed unit vortex ring through `corners`, in order.
pub fn vortex_ring_velocity(p: &Vec3, corners: &[Vec3]) -> Vec3 {
    let n = corners.len();
    (0..n).fold(Vec3::zeros(), |acc, k| {
        acc + line_vortex_velocity(&corners[k], &corners[(k + 1) % n], p)
    })
}

/// Global-frame velocity induced at `p` by a unit doublet on `panel`.
pub fn panel_doublet_velocity(panel: &Panel, p: &Vec3) -> Vec3 {
    local_doublet_velocity(panel, &panel.to_local(p))
}

/// Global-frame velocity for a point already expressed in the panel frame.
pub fn local_doublet_velocity(panel: &Panel, local: &Vec3) -> Vec3 {
    let v = doublet_velocity(
        local,
        panel.local_vertices(),
        panel.area(),
        panel.max_distance(),
    );
    panel.frame().to_global(&v)
}

/// Global-frame velocity induced at `p` by a unit source on `panel`.
pub fn panel_source_velocity(panel: &Panel, p: &Vec3) -> Vec3 {
    local_source_velocity(panel, &panel.to_local(p))
}

pub fn local_source_velocity(panel: &Panel, local: &Vec3) -> Vec3 {
    let v = source_velocity(
        local,
        panel.local_vertices(),
        panel.area(),
        panel.max_distance(),
    );
    panel.frame().to_global(&v)
}

pub fn panel_doublet_potential(panel: &Panel, p: &Vec3) -> Real {
    doublet_potential(
        &panel.to_local(p),
        panel.local_vertices(),
        panel.area(),
        panel.max_distance(),
    )
}

pub fn panel_source_potential(panel: &Panel, p: &Vec3) -> Real {
    source_potential(
        &panel.to_local(p),
        panel.local_vertices(),
        panel.area(),
        panel.max_distance(),
    )
}
