//! # Plane Clipping
//!
//! Cuts the mesh with a plane. Every vertex is classified as front, back or
//! on the plane; faces with vertices on both sides are rebuilt from their
//! boundary on one side plus chords along the cut line.
//!
//! Vertices already on the plane take part in the cut like new cut points:
//! a chord ends at them when the boundary turns back there, and passes
//! through them otherwise. A shared edge is cut once: the new vertex is
//! cached per edge so both neighboring faces reference it.

use std::collections::HashMap;

use glam::DVec3;

use super::{rebuilt, renumbered};
use crate::cyclic::CyclicSequence;
use crate::error::MeshError;
use crate::geometry::{Plane, Side};
use crate::indices::edge_key;
use crate::mesh::selection::chain_sides;
use crate::mesh::{ChangeTag, MeshKernel};

/// Point where a face boundary meets the cut line.
#[derive(Debug, Clone, Copy)]
struct Cut {
    vertex: usize,
    /// The boundary leaves the rebuilt side here
    exit: bool,
}

impl MeshKernel {
    /// Clips the mesh against `plane`, keeping the front side.
    ///
    /// With `delete_remains` the back side is removed; otherwise faces
    /// crossing the plane are split into a front and a back part and the
    /// rest of the mesh is left alone. Cut edges get one new vertex each; no
    /// cap face is created.
    ///
    /// # Errors
    ///
    /// `DegenerateGeometry` for a zero-length plane normal.
    pub fn clip_plane(&mut self, plane: &Plane, delete_remains: bool) -> Result<Vec<ChangeTag>, MeshError> {
        let normal = plane
            .normal
            .try_normalize()
            .ok_or_else(|| MeshError::degenerate("clip plane normal has zero length"))?;
        let plane = Plane::new(plane.origin, normal);
        let band = if self.config.snap_to_plane { self.config.tolerance } else { 0.0 };

        let sides: Vec<Side> = self.positions.iter().map(|p| plane.classify(*p, band)).collect();

        let mut rejected_faces = Vec::new();
        let mut straddling = Vec::new();
        for (f, face) in self.faces.iter().enumerate() {
            let front = face.iter().any(|&v| sides[v] == Side::Front);
            let back = face.iter().any(|&v| sides[v] == Side::Back);
            match (front, back) {
                (true, true) => straddling.push(f),
                (false, true) => rejected_faces.push(f),
                _ => {}
            }
        }
        let rejected_vertices: Vec<usize> = (0..sides.len()).filter(|&v| sides[v] == Side::Back).collect();

        if straddling.is_empty() && (rejected_vertices.is_empty() || !delete_remains) {
            log::debug!("clip plane does not cross the mesh");
            return Ok(Vec::new());
        }

        let before = self.positions.len();
        let mut cut_cache: HashMap<(usize, usize), usize> = HashMap::new();
        let mut emptied = Vec::new();

        for &f in &straddling {
            let face = self.faces[f].clone();
            let n = face.len();

            let mut crossings: Vec<Option<usize>> = vec![None; n];
            for i in 0..n {
                let (a, b) = (face[i], face[(i + 1) % n]);
                if matches!((sides[a], sides[b]), (Side::Front, Side::Back) | (Side::Back, Side::Front)) {
                    crossings[i] = Some(self.cut_vertex(&plane, a, b, &mut cut_cache));
                }
            }

            let mut loops = self.side_loops(&plane, f, &sides, &crossings, Side::Front);
            if !delete_remains {
                loops.extend(self.side_loops(&plane, f, &sides, &crossings, Side::Back));
            }

            let mut loops = loops.into_iter();
            match loops.next() {
                Some(first) => self.set_face(f, first),
                None => {
                    emptied.push(f);
                    continue;
                }
            }
            for lp in loops {
                self.push_face(lp);
            }
        }

        log::debug!(
            "clip plane: {} faces cut, {} new vertices",
            straddling.len(),
            self.positions.len() - before
        );

        if delete_remains {
            rejected_faces.extend(emptied);
            self.delete_faces(&rejected_faces);
            self.delete_vertices(&rejected_vertices);
            return Ok(renumbered());
        }
        if !emptied.is_empty() {
            self.delete_faces(&emptied);
            return Ok(renumbered());
        }
        Ok(rebuilt())
    }

    /// Vertex where edge `a..b` meets the plane, created once per edge.
    fn cut_vertex(&mut self, plane: &Plane, a: usize, b: usize, cache: &mut HashMap<(usize, usize), usize>) -> usize {
        let key = edge_key(a, b);
        if let Some(&v) = cache.get(&key) {
            return v;
        }

        let (pa, pb) = (self.positions[a], self.positions[b]);
        let hit = plane.segment_hit(pa, pb).unwrap_or_else(|| pa.lerp(pb, 0.5));
        let vertex = self.add_vertex(hit);
        cache.insert(key, vertex);
        vertex
    }

    /// Rebuilds the part of face `f` lying on `side` of the plane.
    ///
    /// The boundary on that side is cut into runs that start and end on the
    /// plane. Runs are closed by chords whose interior lies on `side`, so the
    /// back part walks the cut line in the opposite direction. Sides lying in
    /// the plane are dropped and come back as chords where the face needs
    /// them.
    fn side_loops(&self, plane: &Plane, f: usize, sides: &[Side], crossings: &[Option<usize>], side: Side) -> Vec<Vec<usize>> {
        let face = &self.faces[f];
        let n = face.len();
        let inside = |v: usize| sides[v] == side;

        let mut fragments: Vec<[usize; 2]> = Vec::with_capacity(n + 2);
        let mut cuts = Vec::new();
        for i in 0..n {
            let (a, b) = (face[i], face[(i + 1) % n]);
            match (inside(a), inside(b), crossings[i]) {
                (true, true, _) => fragments.push([a, b]),
                (true, false, Some(p)) => {
                    fragments.push([a, p]);
                    cuts.push(Cut { vertex: p, exit: true });
                }
                (false, true, Some(p)) => {
                    fragments.push([p, b]);
                    cuts.push(Cut { vertex: p, exit: false });
                }
                (true, false, None) => {
                    fragments.push([a, b]);
                    cuts.push(Cut { vertex: b, exit: true });
                }
                (false, true, None) => {
                    fragments.push([a, b]);
                    cuts.push(Cut { vertex: a, exit: false });
                }
                _ => {}
            }
        }

        let on_plane: Vec<usize> = face.iter().copied().filter(|&v| sides[v] == Side::Coplanar).collect();
        for chord in self.pair_cuts(plane, f, cuts, &on_plane, side) {
            for pair in chord.windows(2) {
                if pair[0] != pair[1] {
                    fragments.push([pair[0], pair[1]]);
                }
            }
        }

        chain_sides(&fragments)
            .into_iter()
            .filter_map(|lp| {
                let mut ring = CyclicSequence::new(lp);
                ring.dedup();
                (ring.len() >= 3).then(|| ring.into_vec())
            })
            .collect()
    }

    /// Orders the cut points of a face along the cut line and pairs each exit
    /// with the following entry. The chord between them picks up every
    /// on-plane vertex of the face lying strictly in between.
    fn pair_cuts(&self, plane: &Plane, face: usize, mut cuts: Vec<Cut>, on_plane: &[usize], side: Side) -> Vec<Vec<usize>> {
        if cuts.len() < 2 {
            return Vec::new();
        }

        let mut direction = plane.normal.cross(self.normals[face]);
        if direction.length_squared() < self.config.tolerance * self.config.tolerance {
            direction = self.positions[cuts[cuts.len() - 1].vertex] - self.positions[cuts[0].vertex];
        }
        if side == Side::Back {
            direction = -direction;
        }
        let along = |p: DVec3| direction.dot(p - plane.origin);

        // Entries sort first on ties, so a boundary touching the line pairs
        // with itself.
        cuts.sort_by(|a, b| {
            along(self.positions[a.vertex])
                .total_cmp(&along(self.positions[b.vertex]))
                .then(a.exit.cmp(&b.exit))
        });
        if cuts.len() % 2 != 0 {
            log::warn!("face {} crosses the clip plane an odd number of times", face);
        }

        let mut between: Vec<(f64, usize)> = on_plane.iter().map(|&v| (along(self.positions[v]), v)).collect();
        between.sort_by(|a, b| a.0.total_cmp(&b.0));

        cuts.chunks_exact(2)
            .filter_map(|pair| match (pair[0].exit, pair[1].exit) {
                (true, false) => {
                    let (from, to) = (pair[0].vertex, pair[1].vertex);
                    let (lo, hi) = (along(self.positions[from]), along(self.positions[to]));
                    let mut chord = vec![from];
                    chord.extend(
                        between
                            .iter()
                            .filter(|&&(t, v)| t > lo && t < hi && v != from && v != to)
                            .map(|&(_, v)| v),
                    );
                    chord.push(to);
                    Some(chord)
                }
                (false, true) if pair[0].vertex == pair[1].vertex => None,
                _ => {
                    log::warn!("face {}: unmatched cut pair skipped", face);
                    None
                }
            })
            .collect()
    }
}
