//! # Ear-Cutting Triangulation
//!
//! Splits one planar polygon into triangles that reuse the polygon's own
//! vertex ids. The polygon is given as a loop of indices into a shared
//! position buffer together with its face normal, which decides which
//! corners are convex.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use mesh_kernel::triangulate::triangulate_polygon;
//!
//! let positions = vec![
//!     DVec3::new(0.0, 0.0, 0.0),
//!     DVec3::new(1.0, 0.0, 0.0),
//!     DVec3::new(1.0, 1.0, 0.0),
//!     DVec3::new(0.0, 1.0, 0.0),
//! ];
//! let triangles: Vec<[usize; 3]> = triangulate_polygon(&positions, &[0, 1, 2, 3], DVec3::Z).collect();
//! assert_eq!(triangles.len(), 2);
//! ```

use config::constants::EPSILON;
use glam::DVec3;

/// Corner classification relative to the polygon normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexKind {
    /// Turns with the normal; candidate ear tip
    Convex,
    /// Turns against the normal
    Concave,
    /// Neighbours are collinear with the corner
    Degenerate,
}

/// Candidate ear `(prev, cur, next)` with the values the containment test
/// reuses.
struct Corner {
    kind: VertexKind,
    e0: DVec3,
    e1: DVec3,
    cross: DVec3,
    area2: f64,
    apex: DVec3,
}

impl Corner {
    fn new(prev: DVec3, cur: DVec3, next: DVec3, normal: DVec3) -> Self {
        let e0 = prev - next;
        let e1 = cur - next;
        let cross = e0.cross(e1);
        let area2 = cross.length_squared();
        let kind = if area2.abs() < EPSILON {
            VertexKind::Degenerate
        } else if cross.dot(normal) < 0.0 {
            VertexKind::Concave
        } else {
            VertexKind::Convex
        };
        Self {
            kind,
            e0,
            e1,
            cross,
            area2,
            apex: next,
        }
    }

    /// Barycentric containment. Points on an edge count as inside so that a
    /// reflex vertex touching the candidate diagonal still blocks the ear.
    fn contains(&self, point: DVec3) -> bool {
        let rel = point - self.apex;
        let b0 = self.cross.dot(rel.cross(self.e1));
        if b0 < 0.0 {
            return false;
        }
        let b1 = self.cross.dot(self.e0.cross(rel));
        if b1 < 0.0 {
            return false;
        }
        self.area2 - b0 - b1 >= 0.0
    }
}

/// Classifies corner `cur` between `prev` and `next`.
pub fn classify(prev: DVec3, cur: DVec3, next: DVec3, normal: DVec3) -> VertexKind {
    Corner::new(prev, cur, next, normal).kind
}

/// Lazy ear-cutting over one polygon.
///
/// Every call to [`triangulate_polygon`] starts from a fresh copy of the
/// loop. Self-intersecting input may leave a ring with no ear; the cutter
/// then stops early and yields fewer than `n - 2` triangles.
#[derive(Debug, Clone)]
pub struct EarCutter<'a> {
    positions: &'a [DVec3],
    ring: Vec<usize>,
    normal: DVec3,
    cursor: usize,
    passes_left: usize,
}

/// Starts an ear cutter over `indices` (a loop into `positions`).
///
/// Loops with fewer than three vertices yield nothing.
pub fn triangulate_polygon<'a>(positions: &'a [DVec3], indices: &[usize], normal: DVec3) -> EarCutter<'a> {
    let ring = if indices.len() < 3 {
        Vec::new()
    } else {
        indices.to_vec()
    };
    let passes_left = ring.len().saturating_sub(2);
    EarCutter {
        positions,
        ring,
        normal,
        cursor: 0,
        passes_left,
    }
}

impl<'a> EarCutter<'a> {
    /// Live vertices not yet cut away.
    pub fn remaining(&self) -> &[usize] {
        &self.ring
    }

    fn corner(&self, i: usize) -> Corner {
        let n = self.ring.len();
        let p = |k: usize| self.positions[self.ring[k % n]];
        Corner::new(p(i + n - 1), p(i), p(i + 1), self.normal)
    }

    fn is_ear(&self, i: usize, corner: &Corner) -> bool {
        if corner.kind != VertexKind::Convex {
            return false;
        }
        let n = self.ring.len();
        let (prev, next) = ((i + n - 1) % n, (i + 1) % n);
        let tips = [prev, i, next].map(|k| self.positions[self.ring[k]]);
        // Only reflex or flat corners can reach inside an ear
        !(0..n)
            .filter(|&j| j != i && j != prev && j != next)
            .filter(|&j| self.corner(j).kind != VertexKind::Convex)
            .map(|j| self.positions[self.ring[j]])
            .filter(|p| !tips.contains(p))
            .any(|p| corner.contains(p))
    }

    fn find_ear(&self) -> Option<usize> {
        let n = self.ring.len();
        (0..n)
            .map(|k| (self.cursor + k) % n)
            .find(|&i| self.is_ear(i, &self.corner(i)))
    }
}

impl Iterator for EarCutter<'_> {
    type Item = [usize; 3];

    fn next(&mut self) -> Option<[usize; 3]> {
        let n = self.ring.len();
        if n < 3 || self.passes_left == 0 {
            return None;
        }
        self.passes_left -= 1;

        if n == 3 {
            let tri = [self.ring[0], self.ring[1], self.ring[2]];
            self.ring.clear();
            return Some(tri);
        }

        match self.find_ear() {
            Some(i) => {
                let tri = [self.ring[(i + n - 1) % n], self.ring[i], self.ring[(i + 1) % n]];
                self.ring.remove(i);
                self.cursor = i % self.ring.len();
                Some(tri)
            }
            None => {
                log::warn!(
                    "ear cutting stopped with {} vertices left and no valid ear",
                    n
                );
                self.passes_left = 0;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.passes_left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon_area;
    use approx::assert_relative_eq;

    fn square() -> Vec<DVec3> {
        vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_square_two_triangles() {
        let positions = square();
        let tris: Vec<[usize; 3]> = triangulate_polygon(&positions, &[0, 1, 2, 3], DVec3::Z).collect();

        assert_eq!(tris.len(), 2);
        let mut used: Vec<usize> = tris.iter().flatten().copied().collect();
        used.sort_unstable();
        used.dedup();
        assert_eq!(used, vec![0, 1, 2, 3]);

        let area: f64 = tris.iter().map(|t| polygon_area(&positions, t)).sum();
        assert_relative_eq!(area, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_triangles_keep_winding() {
        let positions = square();
        for tri in triangulate_polygon(&positions, &[0, 1, 2, 3], DVec3::Z) {
            let n = crate::geometry::newell_normal(&positions, &tri);
            assert!(n.z > 0.0);
        }
    }

    #[test]
    fn test_concave_polygon() {
        // L shape
        let positions = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(2.0, 1.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(1.0, 2.0, 0.0),
            DVec3::new(0.0, 2.0, 0.0),
        ];
        let indices = [0, 1, 2, 3, 4, 5];
        let tris: Vec<[usize; 3]> = triangulate_polygon(&positions, &indices, DVec3::Z).collect();

        assert_eq!(tris.len(), 4);
        let area: f64 = tris.iter().map(|t| polygon_area(&positions, t)).sum();
        assert_relative_eq!(area, 3.0, epsilon = 1e-12);
        for tri in &tris {
            assert!(crate::geometry::newell_normal(&positions, tri).z > 0.0);
        }
    }

    #[test]
    fn test_classify() {
        let n = DVec3::Z;
        assert_eq!(classify(DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0), n), VertexKind::Convex);
        assert_eq!(classify(DVec3::new(1.0, 1.0, 0.0), DVec3::X, DVec3::ZERO, n), VertexKind::Concave);
        assert_eq!(classify(DVec3::ZERO, DVec3::X, DVec3::new(2.0, 0.0, 0.0), n), VertexKind::Degenerate);
    }

    #[test]
    fn test_too_few_points() {
        let positions = square();
        assert_eq!(triangulate_polygon(&positions, &[0, 1], DVec3::Z).count(), 0);
        assert_eq!(triangulate_polygon(&positions, &[], DVec3::Z).count(), 0);
    }

    #[test]
    fn test_triangle_passes_through() {
        let positions = square();
        let tris: Vec<[usize; 3]> = triangulate_polygon(&positions, &[2, 3, 0], DVec3::Z).collect();
        assert_eq!(tris, vec![[2, 3, 0]]);
    }

    #[test]
    fn test_restartable() {
        let positions = square();
        let a: Vec<[usize; 3]> = triangulate_polygon(&positions, &[0, 1, 2, 3], DVec3::Z).collect();
        let b: Vec<[usize; 3]> = triangulate_polygon(&positions, &[0, 1, 2, 3], DVec3::Z).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_wrong_normal_stops_early() {
        let positions = square();
        let tris: Vec<[usize; 3]> = triangulate_polygon(&positions, &[0, 1, 2, 3], -DVec3::Z).collect();
        assert!(tris.is_empty());
    }
}
