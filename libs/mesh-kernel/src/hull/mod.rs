//! # Convex Hull
//!
//! QuickHull over a point cloud. The kernel uses it to reduce a mesh to the
//! hull of a random sample of its vertices.
//!
//! ## Algorithm Overview
//!
//! 1. Pick extreme points and build an initial tetrahedron
//! 2. Give every remaining point to one face it lies in front of
//! 3. Take the farthest point of a face, remove every face it sees and
//!    close the horizon with new triangles
//! 4. Repeat until no face has points in front of it

mod quickhull;


pub use quickhull::convex_hull;

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Triangulated hull with compacted vertex ids.
///
/// Vertices keep the relative order they had in the input. Every triangle
/// winds counter-clockwise when seen from outside.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hull {
    /// Hull vertex positions
    pub points: Vec<DVec3>,
    /// Outward triangles indexing `points`
    pub triangles: Vec<[usize; 3]>,
}

impl Hull {
    /// Number of hull vertices.
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Number of hull triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Axis-aligned bounds of the hull, `None` when empty.
    pub fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }
}
