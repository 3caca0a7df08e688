//! # Cutting Plane
//!
//! Oriented plane given by an origin and a normal, with point classification
//! and segment intersection.

use glam::DVec3;
use serde::{Deserialize, Serialize};

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Classification of a point relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Point is in front of the plane (positive side).
    Front,
    /// Point is behind the plane (negative side).
    Back,
    /// Point is on the plane within tolerance.
    Coplanar,
}

// =============================================================================
// PLANE
// =============================================================================

/// A plane through `origin` facing along `normal`.
///
/// The normal does not have to be unit length for side tests; distances are
/// measured in units of `|normal|`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Any point on the plane.
    pub origin: DVec3,
    /// Facing direction; the kept side for clipping.
    pub normal: DVec3,
}

impl Plane {
    /// Creates a plane from a point and a facing direction.
    pub fn new(origin: DVec3, normal: DVec3) -> Self {
        Self { origin, normal }
    }

    /// Creates a plane through three points (counter-clockwise from the front).
    ///
    /// Returns `None` when the points are collinear.
    pub fn from_points(a: DVec3, b: DVec3, c: DVec3) -> Option<Self> {
        let normal = (b - a).cross(c - a);
        if normal.length() < config::constants::EPSILON {
            return None;
        }
        Some(Self {
            origin: a,
            normal: normal.normalize(),
        })
    }

    /// Flips the facing direction.
    pub fn flip(&self) -> Plane {
        Plane {
            origin: self.origin,
            normal: -self.normal,
        }
    }

    /// Signed distance from a point. Positive = front.
    #[inline]
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point - self.origin)
    }

    /// True if the point lies on the front side or exactly on the plane.
    #[inline]
    pub fn is_front(&self, point: DVec3) -> bool {
        self.signed_distance(point) >= 0.0
    }

    /// Three-way classification with a tolerance band around the plane.
    pub fn classify(&self, point: DVec3, tolerance: f64) -> Side {
        let dist = self.signed_distance(point);
        if dist > tolerance {
            Side::Front
        } else if dist < -tolerance {
            Side::Back
        } else {
            Side::Coplanar
        }
    }

    /// Intersection of the segment `a..b` with the plane's supporting plane.
    ///
    /// Returns `None` when the segment is parallel to the plane.
    pub fn segment_hit(&self, a: DVec3, b: DVec3) -> Option<DVec3> {
        let denom = self.normal.dot(b - a);
        if denom == 0.0 {
            return None;
        }
        let t = self.normal.dot(self.origin - a) / denom;
        Some(a.lerp(b, t))
    }

    /// Projects a point onto the plane along the normal.
    pub fn project(&self, point: DVec3) -> DVec3 {
        let n2 = self.normal.length_squared();
        if n2 == 0.0 {
            return point;
        }
        point - self.normal * (self.signed_distance(point) / n2)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_plane_from_points() {
        let plane = Plane::from_points(DVec3::ZERO, DVec3::X, DVec3::Y).unwrap();
        assert_relative_eq!(plane.normal.z, 1.0, epsilon = TOL);
        assert!(Plane::from_points(DVec3::ZERO, DVec3::X, DVec3::X * 2.0).is_none());
    }

    #[test]
    fn test_plane_classify_point() {
        let plane = Plane::new(DVec3::ZERO, DVec3::Z);
        assert_eq!(plane.classify(DVec3::Z, TOL), Side::Front);
        assert_eq!(plane.classify(-DVec3::Z, TOL), Side::Back);
        assert_eq!(plane.classify(DVec3::new(1.0, 1.0, 0.0), TOL), Side::Coplanar);
        assert!(plane.is_front(DVec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_plane_flip() {
        let plane = Plane::new(DVec3::new(0.0, 0.0, 5.0), DVec3::Z).flip();
        assert!(plane.is_front(DVec3::ZERO));
        assert!(!plane.is_front(DVec3::new(0.0, 0.0, 6.0)));
    }

    #[test]
    fn test_segment_hit() {
        let plane = Plane::new(DVec3::ZERO, DVec3::X);
        let hit = plane
            .segment_hit(DVec3::new(-1.0, 2.0, 0.0), DVec3::new(3.0, 2.0, 4.0))
            .unwrap();
        assert_relative_eq!(hit.x, 0.0, epsilon = TOL);
        assert_relative_eq!(hit.z, 1.0, epsilon = TOL);
        assert!(plane.segment_hit(DVec3::Y, DVec3::Z).is_none());
    }

    #[test]
    fn test_project() {
        let plane = Plane::new(DVec3::new(0.0, 0.0, 2.0), DVec3::Z * 3.0);
        let p = plane.project(DVec3::new(1.0, 1.0, 7.0));
        assert_relative_eq!(p.z, 2.0, epsilon = TOL);
        assert_relative_eq!(p.x, 1.0, epsilon = TOL);
    }
}
