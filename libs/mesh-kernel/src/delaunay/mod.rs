//! # Incremental Delaunay Tetrahedralization
//!
//! Inserts points one at a time into a subdivision DAG that starts from a
//! single enclosing tetrahedron. Each insertion splits the leaf containing
//! the point into four children that share it; split cells stay in the
//! arena so point location can descend from the root.
//!
//! No flips are performed after an insertion, so leaves are not guaranteed
//! to satisfy the empty-circumsphere property once several points are in.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use mesh_kernel::delaunay::Delaunay;
//!
//! let delaunay = Delaunay::build(&[DVec3::new(0.1, 0.2, 0.3)], 1.0);
//! assert_eq!(delaunay.leaves().count(), 4);
//! ```

mod tetra;

#[cfg(test)]
mod tests;

pub use tetra::{Tetra, TetraId};

use config::constants::DELAUNAY_SEED_SCALE;
use glam::DVec3;

use crate::geometry::orientation_det;

/// Where a point falls relative to the subdivision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Strictly inside this leaf
    Inside(TetraId),
    /// On the face opposite vertex slot `face` of `tetra`
    OnBoundary { tetra: TetraId, face: usize },
    /// Outside the seed tetrahedron
    Outside,
    /// The cell tested is flat
    Degenerate(TetraId),
}

/// Subdivision DAG over an enclosing seed tetrahedron.
#[derive(Debug, Clone)]
pub struct Delaunay {
    points: Vec<DVec3>,
    tetras: Vec<Tetra>,
}

impl Delaunay {
    /// Creates an empty subdivision.
    ///
    /// The seed reaches `3 * scale` from the origin along +x, +y, +z and
    /// `-6 * scale` along -y. Its base lies on the z = 0 plane, so only
    /// points with positive z can be inserted.
    pub fn new(scale: f64) -> Self {
        let k = DELAUNAY_SEED_SCALE * scale;
        let points = vec![
            DVec3::new(k, 0.0, 0.0),
            DVec3::new(-k, k, 0.0),
            DVec3::new(0.0, 0.0, k),
            DVec3::new(0.0, -2.0 * k, 0.0),
        ];
        let root = Tetra::new([0, 1, 2, 3], &points, None);
        Self {
            points,
            tetras: vec![root],
        }
    }

    /// Builds the subdivision by inserting `points` in order.
    ///
    /// Points that cannot be inserted (outside the seed, on a face, or in a
    /// flat cell) are logged and skipped.
    pub fn build(points: &[DVec3], scale: f64) -> Self {
        let mut delaunay = Self::new(scale);
        let inserted = points
            .iter()
            .filter(|p| delaunay.insert(**p).is_some())
            .count();
        log::debug!(
            "delaunay: inserted {}/{} points, {} leaves",
            inserted,
            points.len(),
            delaunay.leaves().count()
        );
        delaunay
    }

    /// Seed corners followed by every inserted point.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Every cell ever created, split or not.
    pub fn tetras(&self) -> &[Tetra] {
        &self.tetras
    }

    pub fn tetra(&self, id: TetraId) -> &Tetra {
        &self.tetras[id.0]
    }

    /// Cells that have not been split.
    pub fn leaves(&self) -> impl Iterator<Item = (TetraId, &Tetra)> + '_ {
        self.tetras
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_split())
            .map(|(i, t)| (TetraId(i), t))
    }

    /// Leaves that do not touch a seed corner.
    pub fn interior_leaves(&self) -> impl Iterator<Item = (TetraId, &Tetra)> + '_ {
        self.leaves().filter(|(_, t)| t.vertices.iter().all(|&v| v >= 4))
    }

    /// Classifies `point` against a single cell.
    pub fn classify(&self, id: TetraId, point: DVec3) -> Location {
        let tetra = &self.tetras[id.0];
        let d = tetra.determinant;
        if d == 0.0 {
            return Location::Degenerate(id);
        }

        let [v0, v1, v2, v3] = tetra.vertices.map(|i| self.points[i]);
        let sub = [
            orientation_det(point, v1, v2, v3),
            orientation_det(v0, point, v2, v3),
            orientation_det(v0, v1, point, v3),
            orientation_det(v0, v1, v2, point),
        ];

        if sub.iter().all(|&s| s != 0.0 && s.signum() == d.signum()) {
            return Location::Inside(id);
        }
        // A face only counts if the point is not outside another one
        let outside = sub.iter().any(|&s| s != 0.0 && s.signum() != d.signum());
        match sub.iter().position(|&s| s == 0.0) {
            Some(face) if !outside => Location::OnBoundary { tetra: id, face },
            _ => Location::Outside,
        }
    }

    /// Finds the leaf containing `point` by descending from the root.
    pub fn locate(&self, point: DVec3) -> Location {
        let mut current = TetraId(0);
        loop {
            let location = self.classify(current, point);
            let Location::Inside(id) = location else {
                return location;
            };
            let children = &self.tetras[id.0].children;
            if children.is_empty() {
                return location;
            }

            let mut fallback = None;
            let mut next = None;
            for &child in children {
                match self.classify(child, point) {
                    Location::Inside(c) => {
                        next = Some(c);
                        break;
                    }
                    Location::Outside => {}
                    other => {
                        fallback.get_or_insert(other);
                    }
                }
            }
            match next {
                Some(c) => current = c,
                None => return fallback.unwrap_or(Location::Outside),
            }
        }
    }

    /// Inserts one point, splitting the leaf that contains it.
    ///
    /// Returns the new point id, or `None` when the point was skipped.
    pub fn insert(&mut self, point: DVec3) -> Option<usize> {
        let parent = match self.locate(point) {
            Location::Inside(id) => id,
            Location::OnBoundary { tetra, face } => {
                log::debug!("delaunay: point {point} lies on face {face} of tetra {}", tetra.0);
                return None;
            }
            Location::Outside => {
                log::debug!("delaunay: point {point} is outside the seed tetrahedron");
                return None;
            }
            Location::Degenerate(id) => {
                log::debug!("delaunay: tetra {} is degenerate", id.0);
                return None;
            }
        };

        let v = self.points.len();
        self.points.push(point);

        let [t0, t1, t2, t3] = self.tetras[parent.0].vertices;
        let split = [[t0, t1, t2, v], [t0, t1, v, t3], [t0, v, t2, t3], [v, t1, t2, t3]];
        for vertices in split {
            let id = TetraId(self.tetras.len());
            self.tetras.push(Tetra::new(vertices, &self.points, Some(parent)));
            self.tetras[parent.0].children.push(id);
        }
        log::trace!("delaunay: point {} split tetra {}", v, parent.0);
        Some(v)
    }
}
