//! Plane representation and point classification.

use nalgebra::Vector3;

use crate::fix::FixVec;

/// Points closer than this to a plane are considered to lie on it.
pub const PLANE_EPSILON: f64 = 1e-4;

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
}

/// Classification of a face relative to a plane.
///
/// Coplanar faces never show up here: they resolve to `Front` or `Back`
/// depending on which way they face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Front,
    Back,
    /// Vertices strictly on both sides
    Spanning,
}

/// A plane given by a point on it and a normal, both in fixed point.
///
/// The fixed-point values are kept as-is so a splitter can be written to the
/// instruction stream without rounding. The normal is not required to be unit
/// length; distances are then scaled by its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plane {
    pub point: FixVec,
    pub normal: FixVec,
}

impl Plane {
    #[inline]
    pub fn new(point: FixVec, normal: FixVec) -> Self {
        Self { point, normal }
    }

    /// Returns `true` if the normal is the zero vector, in which case nothing
    /// can be classified against the plane.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.normal.is_zero()
    }

    #[inline]
    pub fn normal_vector(&self) -> Vector3<f64> {
        self.normal.to_vector()
    }

    /// `dot(point - plane.point, plane.normal)`.
    /// - Positive: point is in front (same side as normal)
    /// - Negative: point is behind
    #[inline]
    pub fn signed_distance(&self, point: &Vector3<f64>) -> f64 {
        (point - self.point.to_vector()).dot(&self.normal_vector())
    }

    /// Classifies which side of the plane a point lies on.
    pub fn classify_point(&self, point: FixVec) -> PlaneSide {
        let dist = self.signed_distance(&point.to_vector());
        if dist.abs() < PLANE_EPSILON {
            PlaneSide::OnPlane
        } else if dist > 0.0 {
            PlaneSide::Front
        } else {
            PlaneSide::Back
        }
    }

    /// Computes the intersection of the segment `start..end` with the plane.
    ///
    /// Returns the interpolation parameter `t` (0.0 = start, 1.0 = end), or
    /// `None` if the segment is parallel to the plane or the intersection
    /// falls outside the segment.
    pub fn intersect_segment(&self, start: &Vector3<f64>, end: &Vector3<f64>) -> Option<f64> {
        let normal = self.normal_vector();
        let direction = end - start;
        let denom = normal.dot(&direction);

        // Segment is parallel to plane
        if denom.abs() < f64::EPSILON {
            return None;
        }

        let t = (self.point.to_vector() - start).dot(&normal) / denom;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        Some(t)
    }
}
