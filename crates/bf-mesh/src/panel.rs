//! Planar panel geometry.

use bf_core::{Real, Vec2, Vec3};

use crate::error::{MeshError, MeshResult};

/// Distance of the control point above the panel centroid, along e3.
pub const CONTROL_POINT_OFFSET: Real = 1e-12;

/// Far-field switch factor: `max_distance = FAR_FIELD_FACTOR * sqrt(area)`.
///
/// Equals ten equivalent panel diameters (`10 * 2 * sqrt(area / π)`).
pub const FAR_FIELD_FACTOR: Real = 20.0 / 1.772_453_850_905_516;

/// Panels smaller than this fraction of their squared perimeter are degenerate.
const RELATIVE_AREA_EPS: Real = 1e-12;

/// Local orthonormal frame. `e3` is the outward unit normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub e1: Vec3,
    pub e2: Vec3,
    pub e3: Vec3,
}

impl Frame {
    /// Build a frame around a unit normal.
    ///
    /// `e1` comes from eliminating one component of `(1, 1, 1)` against the
    /// normal, so the frame is a deterministic function of `e3` alone.
    pub fn from_normal(e3: Vec3) -> Self {
        let mut seed = Vec3::new(1.0, 1.0, 1.0);
        if e3.x.abs() > 1e-2 {
            seed.x = -(e3.y * seed.y + e3.z * seed.z) / e3.x;
        } else if e3.y.abs() > 1e-2 {
            seed.y = -(e3.x * seed.x + e3.z * seed.z) / e3.y;
        } else {
            seed.z = -(e3.x * seed.x + e3.y * seed.y) / e3.z;
        }
        let e1 = seed.normalize();
        let e2 = e3.cross(&e1);
        Self { e1, e2, e3 }
    }

    /// Express a global vector in this frame.
    #[inline]
    pub fn to_local(&self, v: &Vec3) -> Vec3 {
        Vec3::new(v.dot(&self.e1), v.dot(&self.e2), v.dot(&self.e3))
    }

    /// Express a local vector in global coordinates.
    #[inline]
    pub fn to_global(&self, v: &Vec3) -> Vec3 {
        self.e1 * v.x + self.e2 * v.y + self.e3 * v.z
    }
}

/// One planar surface element (triangle or quadrilateral).
#[derive(Clone, Debug)]
pub struct Panel {
    vertices: Vec<usize>,
    local: Vec<Vec2>,
    frame: Frame,
    centroid: Vec3,
    control_point: Vec3,
    area: Real,
    max_distance: Real,
}

impl Panel {
    /// Compute panel geometry from its corner points.
    ///
    /// `index` is only used for error reporting.
    pub(crate) fn from_corners(
        index: usize,
        vertices: Vec<usize>,
        corners: &[Vec3],
    ) -> MeshResult<Self> {
        let n = corners.len();
        let centroid = corners.iter().fold(Vec3::zeros(), |acc, p| acc + p) / n as Real;

        let raw_normal = if n == 4 {
            (corners[1] - corners[3]).cross(&(corners[2] - corners[0]))
        } else {
            (corners[1] - corners[0]).cross(&(corners[2] - corners[0]))
        };
        let normal_len = raw_normal.norm();
        let perimeter: Real = (0..n)
            .map(|k| (corners[(k + 1) % n] - corners[k]).norm())
            .sum();
        if normal_len.is_nan() || normal_len <= RELATIVE_AREA_EPS * perimeter * perimeter {
            return Err(MeshError::ZeroArea {
                panel: index,
                area: 0.5 * normal_len,
            });
        }

        let frame = Frame::from_normal(raw_normal / normal_len);
        let local: Vec<Vec2> = corners
            .iter()
            .map(|p| {
                let d = p - centroid;
                Vec2::new(d.dot(&frame.e1), d.dot(&frame.e2))
            })
            .collect();

        // Shoelace on the projected polygon; positive for counter-clockwise order.
        let area = 0.5
            * (0..n)
                .map(|k| {
                    let a = local[k];
                    let b = local[(k + 1) % n];
                    a.x * b.y - b.x * a.y
                })
                .sum::<Real>();
        if area.is_nan() || area <= RELATIVE_AREA_EPS * perimeter * perimeter {
            return Err(MeshError::ZeroArea { panel: index, area });
        }

        Ok(Self {
            vertices,
            local,
            frame,
            centroid,
            control_point: centroid + frame.e3 * CONTROL_POINT_OFFSET,
            area,
            max_distance: FAR_FIELD_FACTOR * area.sqrt(),
        })
    }

    /// Number of sides (3 or 4).
    pub fn sides(&self) -> usize {
        self.vertices.len()
    }

    /// Ordered global vertex indices.
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Planar vertex coordinates in the (e1, e2) frame, centred on the centroid.
    pub fn local_vertices(&self) -> &[Vec2] {
        &self.local
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Outward unit normal.
    pub fn normal(&self) -> Vec3 {
        self.frame.e3
    }

    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    pub fn control_point(&self) -> Vec3 {
        self.control_point
    }

    /// Control point in the panel's own frame; exactly on the outer side.
    pub fn control_point_local(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, CONTROL_POINT_OFFSET)
    }

    pub fn area(&self) -> Real {
        self.area
    }

    /// Radius beyond which the point-singularity approximation is used.
    pub fn max_distance(&self) -> Real {
        self.max_distance
    }

    /// Position of `p` relative to the centroid, in the panel frame.
    #[inline]
    pub fn to_local(&self, p: &Vec3) -> Vec3 {
        self.frame.to_local(&(p - self.centroid))
    }

    /// Position in the vertex list of the directed edge `a -> b`, if any.
    pub fn directed_edge(&self, a: usize, b: usize) -> Option<usize> {
        let n = self.vertices.len();
        (0..n).find(|&k| self.vertices[k] == a && self.vertices[(k + 1) % n] == b)
    }

    /// True when `a` and `b` are consecutive corners in either direction.
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.directed_edge(a, b).is_some() || self.directed_edge(b, a).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn frame_is_orthonormal_and_right_handed() {
        for n in [
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.3, -0.4, 0.5).normalize(),
            Vec3::new(0.0, 0.005, -1.0).normalize(),
        ] {
            let f = Frame::from_normal(n);
            assert!((f.e1.norm() - 1.0).abs() < 1e-12);
            assert!((f.e2.norm() - 1.0).abs() < 1e-12);
            assert!(f.e1.dot(&f.e3).abs() < 1e-12);
            assert!(f.e1.dot(&f.e2).abs() < 1e-12);
            assert!((f.e1.cross(&f.e2) - f.e3).norm() < 1e-12);
        }
    }

    #[test]
    fn local_round_trip() {
        let f = Frame::from_normal(Vec3::new(0.2, 0.7, -0.1).normalize());
        let v = Vec3::new(1.5, -2.0, 0.25);
        assert!((f.to_global(&f.to_local(&v)) - v).norm() < 1e-12);
    }

    #[test]
    fn square_panel_geometry() {
        let panel = Panel::from_corners(0, vec![0, 1, 2, 3], &unit_square()).unwrap();
        assert_eq!(panel.sides(), 4);
        assert!((panel.area() - 1.0).abs() < 1e-12);
        assert!((panel.normal() - Vec3::z()).norm() < 1e-12);
        assert!((panel.centroid() - Vec3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
        assert!((panel.max_distance() - FAR_FIELD_FACTOR).abs() < 1e-12);
        assert!(panel.control_point().z > 0.0);
        let sum = panel
            .local_vertices()
            .iter()
            .fold(Vec2::zeros(), |acc, p| acc + p);
        assert!(sum.norm() < 1e-12);
    }

    #[test]
    fn triangle_panel_area() {
        let corners = vec![
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::new(0.0, 2.0, 1.0),
        ];
        let panel = Panel::from_corners(3, vec![4, 5, 6], &corners).unwrap();
        assert!((panel.area() - 2.0).abs() < 1e-12);
        assert!((panel.normal() - Vec3::z()).norm() < 1e-12);
    }

    #[test]
    fn collinear_corners_are_rejected() {
        let corners = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
        ];
        let err = Panel::from_corners(7, vec![0, 1, 2], &corners).unwrap_err();
        assert!(matches!(err, MeshError::ZeroArea { panel: 7, .. }));
    }

    #[test]
    fn directed_edges_wrap_around() {
        let panel = Panel::from_corners(0, vec![10, 11, 12, 13], &unit_square()).unwrap();
        assert_eq!(panel.directed_edge(13, 10), Some(3));
        assert_eq!(panel.directed_edge(10, 13), None);
        assert!(panel.has_edge(10, 13));
        assert!(!panel.has_edge(10, 12));
    }
}
