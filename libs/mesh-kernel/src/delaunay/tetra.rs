//! # Tetrahedron Cell

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::geometry::{det4, orientation_det};

/// Stable handle into the builder's tetrahedron arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TetraId(pub usize);

/// One cell of the subdivision DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tetra {
    /// Point ids into the builder's point list
    pub vertices: [usize; 4],
    /// Orientation determinant of `[p, 1]` rows, zero when flat
    pub determinant: f64,
    /// Circumsphere center; the centroid for a flat cell
    pub circumcenter: DVec3,
    /// Circumsphere radius; infinite for a flat cell
    pub circumradius: f64,
    pub centroid: DVec3,
    pub parent: Option<TetraId>,
    pub children: Vec<TetraId>,
}

impl Tetra {
    pub(crate) fn new(vertices: [usize; 4], points: &[DVec3], parent: Option<TetraId>) -> Self {
        let [p0, p1, p2, p3] = vertices.map(|i| points[i]);
        let determinant = orientation_det(p0, p1, p2, p3);
        let centroid = (p0 + p1 + p2 + p3) / 4.0;

        let (circumcenter, circumradius) = if determinant == 0.0 {
            (centroid, f64::INFINITY)
        } else {
            let center = circumcenter([p0, p1, p2, p3], determinant);
            (center, center.distance(p0))
        };

        Self {
            vertices,
            determinant,
            circumcenter,
            circumradius,
            centroid,
            parent,
            children: Vec::new(),
        }
    }

    /// True once the cell has been subdivided.
    pub fn is_split(&self) -> bool {
        !self.children.is_empty()
    }

    /// True if `point` lies strictly inside the circumsphere.
    pub fn circumsphere_contains(&self, point: DVec3) -> bool {
        point.distance(self.circumcenter) < self.circumradius
    }

    /// The three point ids opposite vertex slot `face`.
    pub fn face(&self, face: usize) -> [usize; 3] {
        let v = self.vertices;
        match face {
            0 => [v[1], v[2], v[3]],
            1 => [v[0], v[2], v[3]],
            2 => [v[0], v[1], v[3]],
            _ => [v[0], v[1], v[2]],
        }
    }
}

fn circumcenter(p: [DVec3; 4], determinant: f64) -> DVec3 {
    let sq = p.map(|v| v.length_squared());
    let row = |i: usize, a: f64, b: f64| [sq[i], a, b, 1.0];
    let dx = det4([
        row(0, p[0].y, p[0].z),
        row(1, p[1].y, p[1].z),
        row(2, p[2].y, p[2].z),
        row(3, p[3].y, p[3].z),
    ]);
    let dy = -det4([
        row(0, p[0].x, p[0].z),
        row(1, p[1].x, p[1].z),
        row(2, p[2].x, p[2].z),
        row(3, p[3].x, p[3].z),
    ]);
    let dz = det4([
        row(0, p[0].x, p[0].y),
        row(1, p[1].x, p[1].y),
        row(2, p[2].x, p[2].y),
        row(3, p[3].x, p[3].y),
    ]);
    DVec3::new(dx, dy, dz) / (2.0 * determinant)
}
