//! # Connect, Split, Rip and Chamfer
//!
//! Operators that subdivide faces by inserting vertices on their boundary or
//! cutting their loops along new chords.

use std::collections::{HashMap, HashSet};

use super::{rebuilt, renumbered};
use crate::cyclic::CyclicSequence;
use crate::error::MeshError;
use crate::indices::{dedup_preserve_order, edge_key};
use crate::mesh::selection::chain_sides;
use crate::mesh::{ChangeTag, Domain, MeshKernel};

/// New vertices per cut edge, ordered from the lower to the higher vertex id.
type EdgePoints = HashMap<(usize, usize), Vec<usize>>;

impl MeshKernel {
    /// Splits faces along chords between selected vertices that share a face
    /// but not a side.
    pub fn connect_vertices(&mut self, selection: &[usize], domain: Domain) -> Result<Vec<ChangeTag>, MeshError> {
        let vertices = self.convert_selection(selection, domain, Domain::Vertex);
        let selected: HashSet<usize> = vertices.iter().copied().collect();
        let candidates = self.vertices_to_faces(&vertices);

        let mut queue = candidates;
        let mut splits = 0;
        while let Some(f) = queue.pop() {
            while let Some((i, j)) = chord(&self.faces[f], &selected) {
                let ring = CyclicSequence::new(self.faces[f].clone());
                let first = ring.slice_wrapping(j as isize, ring.len() - j + i + 1);
                let second = ring.slice_wrapping(i as isize, j - i + 1);

                self.set_face(f, first);
                queue.push(self.push_face(second));
                splits += 1;
            }
        }

        log::debug!("connect vertices: {} chords", splits);
        if splits == 0 {
            return Ok(Vec::new());
        }
        Ok(rebuilt())
    }

    /// Inserts `divisions` evenly spaced vertices on every selected edge,
    /// threading them into both neighboring faces.
    pub fn split_edges(&mut self, edges: &[usize], divisions: usize) -> Result<Vec<ChangeTag>, MeshError> {
        if divisions == 0 {
            return Ok(Vec::new());
        }
        let points = self.insert_edge_points(edges, divisions)?;
        if points.is_empty() {
            return Ok(Vec::new());
        }
        for f in self.faces_on_edges(&points) {
            let ring = thread_points(&self.faces[f], &points);
            self.set_face(f, ring);
        }
        Ok(rebuilt())
    }

    /// Inserts `connections` vertices on every selected edge and, for each
    /// face crossed by exactly two selected edges, connects the new vertices
    /// across the face.
    ///
    /// # Errors
    ///
    /// `DegenerateGeometry` if a selected edge has zero length. Nothing is
    /// modified in that case.
    pub fn connect_edges(&mut self, edges: &[usize], connections: usize) -> Result<Vec<ChangeTag>, MeshError> {
        if connections == 0 {
            return Ok(Vec::new());
        }
        let points = self.insert_edge_points(edges, connections)?;
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let mut bridged = 0;
        for f in self.faces_on_edges(&points) {
            let face = self.faces[f].clone();
            let n = face.len();
            let cut_sides: Vec<usize> = (0..n)
                .filter(|&s| points.contains_key(&edge_key(face[s], face[(s + 1) % n])))
                .collect();

            if let &[s1, s2] = cut_sides.as_slice() {
                let mut pieces = bridge(&face, s1, s2, &points).into_iter();
                if let Some(first) = pieces.next() {
                    self.set_face(f, first);
                }
                for piece in pieces {
                    self.push_face(piece);
                }
                bridged += 1;
            } else {
                let ring = thread_points(&face, &points);
                self.set_face(f, ring);
            }
        }

        log::debug!("connect edges: {} faces bridged", bridged);
        Ok(rebuilt())
    }

    /// Opens a seam along each chain of selected edges by giving every
    /// separate fan of faces around a chain vertex its own copy of the
    /// vertex.
    pub fn rip_edges(&mut self, edges: &[usize]) -> Result<Vec<ChangeTag>, MeshError> {
        let chains = self.edge_groups(edges);
        let cut: HashSet<(usize, usize)> = chains
            .iter()
            .flat_map(|c| c.segments())
            .map(|[a, b]| edge_key(a, b))
            .collect();

        let chain_vertices: Vec<usize> = dedup_preserve_order(
            &chains.iter().flat_map(|c| c.vertices.iter().copied()).collect::<Vec<_>>(),
        );
        let plan: Vec<(usize, Vec<Vec<usize>>)> = chain_vertices
            .into_iter()
            .map(|v| (v, self.fans(v, &cut)))
            .filter(|(_, fans)| fans.len() > 1)
            .collect();

        let mut added = 0;
        for (v, fans) in plan {
            for fan in fans.iter().skip(1) {
                let copy = self.add_vertex(self.positions[v]);
                for &f in fan {
                    let ring = self.faces[f].iter().map(|&u| if u == v { copy } else { u }).collect();
                    self.set_face(f, ring);
                }
                added += 1;
            }
        }

        log::debug!("rip edges: {} vertices added", added);
        if added == 0 {
            return Ok(Vec::new());
        }
        Ok(rebuilt())
    }

    /// Bevels the selected vertices: each becomes a small polygon whose
    /// corners sit `size` along every incident edge, clamped to half the
    /// edge length.
    ///
    /// # Errors
    ///
    /// `InvalidSelection` for a non-positive size.
    pub fn chamfer_vertices(&mut self, selection: &[usize], domain: Domain, size: f64) -> Result<Vec<ChangeTag>, MeshError> {
        if size <= 0.0 {
            return Err(MeshError::invalid_selection(format!("chamfer size must be positive, got {}", size)));
        }
        let vertices = self.convert_selection(selection, domain, Domain::Vertex);
        if vertices.is_empty() {
            return Ok(Vec::new());
        }
        let selected: HashSet<usize> = vertices.iter().copied().collect();

        let mut corner: HashMap<(usize, usize), usize> = HashMap::new();
        let mut cap_sides: HashMap<usize, Vec<[usize; 2]>> = HashMap::new();

        for f in self.vertices_to_faces(&vertices) {
            let face = self.faces[f].clone();
            let n = face.len();
            let mut ring = Vec::with_capacity(n + 4);
            for i in 0..n {
                let v = face[i];
                if !selected.contains(&v) {
                    ring.push(v);
                    continue;
                }
                let prev = self.chamfer_corner(v, face[(i + n - 1) % n], size, &mut corner);
                let next = self.chamfer_corner(v, face[(i + 1) % n], size, &mut corner);
                ring.push(prev);
                ring.push(next);
                cap_sides.entry(v).or_default().push([next, prev]);
            }
            self.set_face(f, ring);
        }

        for &v in &vertices {
            let Some(sides) = cap_sides.get(&v) else { continue };
            match chain_sides(sides).as_slice() {
                [ring] if ring.len() == sides.len() && ring.len() >= 3 => {
                    self.push_face(ring.clone());
                }
                _ => log::debug!("chamfer: vertex {} has an open fan, no cap", v),
            }
        }

        self.delete_vertices(&vertices);
        Ok(renumbered())
    }

    // ===== Helpers =====

    /// Creates the new vertices for every selected edge after checking all
    /// of them.
    fn insert_edge_points(&mut self, edges: &[usize], count: usize) -> Result<EdgePoints, MeshError> {
        let mut keys: Vec<(usize, usize)> = edges
            .iter()
            .filter_map(|&e| self.edges.get(e))
            .map(|&[a, b]| edge_key(a, b))
            .collect();
        keys.sort_unstable();
        keys.dedup();

        for &(a, b) in &keys {
            if self.positions[a].distance(self.positions[b]) < self.config.tolerance {
                return Err(MeshError::degenerate(format!("edge {}-{} has zero length", a, b)));
            }
        }

        let mut points = EdgePoints::new();
        for (a, b) in keys {
            let (pa, pb) = (self.positions[a], self.positions[b]);
            let ids = (1..=count)
                .map(|k| self.add_vertex(pa.lerp(pb, k as f64 / (count + 1) as f64)))
                .collect();
            points.insert((a, b), ids);
        }
        Ok(points)
    }

    /// Faces that have one of the keyed edges as a side, ascending.
    fn faces_on_edges(&self, points: &EdgePoints) -> Vec<usize> {
        let mut faces: Vec<usize> = points
            .keys()
            .flat_map(|&(a, b)| {
                self.parent_faces[a]
                    .iter()
                    .copied()
                    .filter(move |&f| self.face_has_side(f, a, b))
            })
            .collect();
        faces.sort_unstable();
        faces.dedup();
        faces
    }

    /// Faces around `v` grouped into fans connected through sides not in
    /// `cut`.
    fn fans(&self, v: usize, cut: &HashSet<(usize, usize)>) -> Vec<Vec<usize>> {
        let around = &self.parent_faces[v];
        let mut by_spoke: HashMap<usize, Vec<usize>> = HashMap::new();
        for (slot, &f) in around.iter().enumerate() {
            let face = &self.faces[f];
            let n = face.len();
            for i in (0..n).filter(|&i| face[i] == v) {
                for u in [face[(i + n - 1) % n], face[(i + 1) % n]] {
                    if !cut.contains(&edge_key(v, u)) {
                        by_spoke.entry(u).or_default().push(slot);
                    }
                }
            }
        }

        let mut label: Vec<usize> = (0..around.len()).collect();
        for slots in by_spoke.values() {
            let target = slots.iter().map(|&s| label[s]).min().unwrap_or(0);
            let merge: Vec<usize> = slots.iter().map(|&s| label[s]).collect();
            for l in label.iter_mut() {
                if merge.contains(l) {
                    *l = target;
                }
            }
        }

        let mut fans: Vec<Vec<usize>> = Vec::new();
        let mut fan_of: HashMap<usize, usize> = HashMap::new();
        for (slot, &f) in around.iter().enumerate() {
            let idx = *fan_of.entry(label[slot]).or_insert_with(|| {
                fans.push(Vec::new());
                fans.len() - 1
            });
            fans[idx].push(f);
        }
        fans
    }

    fn chamfer_corner(&mut self, v: usize, toward: usize, size: f64, cache: &mut HashMap<(usize, usize), usize>) -> usize {
        if let Some(&id) = cache.get(&(v, toward)) {
            return id;
        }
        let (from, to) = (self.positions[v], self.positions[toward]);
        let reach = size.min(from.distance(to) / 2.0);
        let id = self.add_vertex(from + (to - from).normalize_or_zero() * reach);
        cache.insert((v, toward), id);
        id
    }
}

/// First pair of selected, non-adjacent loop positions `(i, j)` with `i < j`.
fn chord(face: &[usize], selected: &HashSet<usize>) -> Option<(usize, usize)> {
    let n = face.len();
    let hits: Vec<usize> = (0..n).filter(|&i| selected.contains(&face[i])).collect();
    for (k, &i) in hits.iter().enumerate() {
        for &j in &hits[k + 1..] {
            let adjacent = j - i < 2 || (i == 0 && j == n - 1);
            if !adjacent && face[i] != face[j] {
                return Some((i, j));
            }
        }
    }
    None
}

/// Points on side `a -> b` in walking order.
fn side_points(points: &EdgePoints, a: usize, b: usize) -> Vec<usize> {
    match points.get(&edge_key(a, b)) {
        Some(ids) if a < b => ids.clone(),
        Some(ids) => ids.iter().rev().copied().collect(),
        None => Vec::new(),
    }
}

/// Face loop with the new edge points inserted on every keyed side.
fn thread_points(face: &[usize], points: &EdgePoints) -> Vec<usize> {
    let n = face.len();
    let mut ring = Vec::with_capacity(n);
    for i in 0..n {
        ring.push(face[i]);
        ring.extend(side_points(points, face[i], face[(i + 1) % n]));
    }
    ring
}

/// Splits a face cut on sides `s1 < s2` into `c + 1` pieces, where `c` is
/// the number of points on each side. The first piece holds the vertices
/// between the two cut sides.
fn bridge(face: &[usize], s1: usize, s2: usize, points: &EdgePoints) -> Vec<Vec<usize>> {
    let mut ring = CyclicSequence::new(face.to_vec());
    let (a, b) = (s1 as isize, s2 as isize);
    let x = side_points(points, ring[a], ring[a + 1]);
    let y = side_points(points, ring[b], ring[b + 1]);
    let c = x.len().min(y.len());
    if c == 0 {
        return vec![thread_points(face, points)];
    }

    // walk from the vertex after the first cut side
    ring.rotate(a + 1);
    let (inner, outer) = ring.as_slice().split_at(s2 - s1);
    let mut pieces = Vec::with_capacity(c + 1);

    let mut between = vec![x[c - 1]];
    between.extend_from_slice(inner);
    between.push(y[0]);
    pieces.push(between);

    for k in 1..c {
        pieces.push(vec![x[c - k - 1], x[c - k], y[k - 1], y[k]]);
    }

    let mut rest = vec![y[c - 1]];
    rest.extend_from_slice(outer);
    rest.push(x[0]);
    pieces.push(rest);

    pieces
}
