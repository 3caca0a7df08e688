//! # Selection
//!
//! Conversions between the vertex, edge and face domains plus the
//! connectivity queries the operators are written against. Everything here
//! is a read-only query over the current mesh state.
//!
//! Edge selections index into the materialized edge list
//! ([`MeshKernel::build_edges`]); with no edge list every edge conversion
//! yields an empty selection.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{Domain, MeshKernel};
use crate::indices::{dedup_preserve_order, edge_key, to_edges, without};

/// Boundary of a face selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceBorders {
    /// Ordered boundary loops, following the winding of the selected faces.
    pub loops: Vec<Vec<usize>>,
    /// Per loop, the selected faces touching it (ascending).
    pub groups: Vec<Vec<usize>>,
    /// Directed edges shared by exactly two selected faces.
    pub interior_edges: Vec<[usize; 2]>,
}

/// Connected run of selected edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeChain {
    pub vertices: Vec<usize>,
    /// The last vertex connects back to the first.
    pub closed: bool,
}

impl EdgeChain {
    /// Consecutive vertex pairs, including the closing pair for a loop.
    pub fn segments(&self) -> Vec<[usize; 2]> {
        let n = self.vertices.len();
        let count = if self.closed { n } else { n.saturating_sub(1) };
        (0..count)
            .map(|i| [self.vertices[i], self.vertices[(i + 1) % n]])
            .collect()
    }
}

impl MeshKernel {
    // =========================================================================
    // DOMAIN CONVERSION
    // =========================================================================

    /// Converts a selection between domains.
    ///
    /// Converting within one domain removes duplicates.
    pub fn convert_selection(&self, selection: &[usize], from: Domain, to: Domain) -> Vec<usize> {
        match (from, to) {
            (Domain::Face, Domain::Vertex) => self.faces_to_vertices(selection),
            (Domain::Face, Domain::Edge) => self.faces_to_edges(selection),
            (Domain::Vertex, Domain::Face) => self.vertices_to_faces(selection),
            (Domain::Vertex, Domain::Edge) => self.vertices_to_edges(selection),
            (Domain::Edge, Domain::Face) => self.edges_to_faces(selection),
            (Domain::Edge, Domain::Vertex) => self.edges_to_vertices(selection),
            _ => dedup_preserve_order(selection),
        }
    }

    /// Vertices of the selected faces in first-use order.
    pub fn faces_to_vertices(&self, faces: &[usize]) -> Vec<usize> {
        let all: Vec<usize> = faces.iter().flat_map(|&f| self.faces[f].iter().copied()).collect();
        dedup_preserve_order(&all)
    }

    /// Existing edges bounding the selected faces. Missing edges are not
    /// created.
    pub fn faces_to_edges(&self, faces: &[usize]) -> Vec<usize> {
        if self.edges.is_empty() {
            return Vec::new();
        }
        let lookup = self.edge_lookup();
        let found: Vec<usize> = faces
            .iter()
            .flat_map(|&f| to_edges(&self.faces[f]))
            .filter_map(|[a, b]| lookup.get(&edge_key(a, b)).copied())
            .collect();
        dedup_preserve_order(&found)
    }

    /// Faces referencing any selected vertex, ascending.
    pub fn vertices_to_faces(&self, vertices: &[usize]) -> Vec<usize> {
        let mut faces: Vec<usize> = vertices
            .iter()
            .flat_map(|&v| self.parent_faces[v].iter().copied())
            .collect();
        faces.sort_unstable();
        faces.dedup();
        faces
    }

    /// Edges with at least one endpoint in the selection, ascending.
    pub fn vertices_to_edges(&self, vertices: &[usize]) -> Vec<usize> {
        let selected: HashSet<usize> = vertices.iter().copied().collect();
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, [a, b])| selected.contains(a) || selected.contains(b))
            .map(|(i, _)| i)
            .collect()
    }

    /// Faces touching any endpoint of a selected edge, ascending.
    pub fn edges_to_faces(&self, edges: &[usize]) -> Vec<usize> {
        self.vertices_to_faces(&self.edges_to_vertices(edges))
    }

    /// Faces that contain a selected edge as one of their sides, ascending.
    pub fn edges_to_faces_adjacent(&self, edges: &[usize]) -> Vec<usize> {
        let mut faces: Vec<usize> = edges
            .iter()
            .filter_map(|&e| self.edges.get(e))
            .flat_map(|&[a, b]| {
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

    /// Endpoints of the selected edges in first-use order.
    pub fn edges_to_vertices(&self, edges: &[usize]) -> Vec<usize> {
        let all: Vec<usize> = edges
            .iter()
            .filter_map(|&e| self.edges.get(e))
            .flat_map(|pair| pair.iter().copied())
            .collect();
        dedup_preserve_order(&all)
    }

    fn edge_lookup(&self) -> HashMap<(usize, usize), usize> {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, &[a, b])| (edge_key(a, b), i))
            .collect()
    }

    /// True when `a` and `b` are consecutive in the loop of `face`, in
    /// either direction.
    pub(crate) fn face_has_side(&self, face: usize, a: usize, b: usize) -> bool {
        let key = edge_key(a, b);
        to_edges(&self.faces[face])
            .into_iter()
            .any(|[x, y]| edge_key(x, y) == key)
    }

    // =========================================================================
    // NEIGHBORHOODS
    // =========================================================================

    /// Vertices sharing a face side with `vertex`, in face order.
    pub fn vertex_neighbors(&self, vertex: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for &f in &self.parent_faces[vertex] {
            let face = &self.faces[f];
            let n = face.len();
            for (i, _) in face.iter().enumerate().filter(|(_, v)| **v == vertex) {
                out.push(face[(i + n - 1) % n]);
                out.push(face[(i + 1) % n]);
            }
        }
        dedup_preserve_order(&out)
    }

    /// Expands a selection by one ring of neighbors in its own domain.
    pub fn grow_selection(&self, selection: &[usize], domain: Domain) -> Vec<usize> {
        match domain {
            Domain::Face => self.vertices_to_faces(&self.faces_to_vertices(selection)),
            Domain::Edge => self.vertices_to_edges(&self.edges_to_vertices(selection)),
            Domain::Vertex => {
                let mut grown = selection.to_vec();
                for &v in selection {
                    grown.extend(self.vertex_neighbors(v));
                }
                dedup_preserve_order(&grown)
            }
        }
    }

    /// Faces with the same vertex count as `face`, ascending.
    pub fn select_similar_faces(&self, face: usize) -> Vec<usize> {
        let Some(arity) = self.faces.get(face).map(Vec::len) else {
            return Vec::new();
        };
        (0..self.faces.len()).filter(|&f| self.faces[f].len() == arity).collect()
    }

    /// Flood-fills from the selection across faces sharing a vertex while the
    /// normal turns by at most `max_angle` radians per step.
    pub fn select_faces_by_angle(&self, faces: &[usize], max_angle: f64) -> Vec<usize> {
        let mut grown = dedup_preserve_order(faces);
        let mut seen: HashSet<usize> = grown.iter().copied().collect();
        let mut i = 0;
        while i < grown.len() {
            let face = grown[i];
            for next in self.grow_selection(&[face], Domain::Face) {
                if seen.contains(&next) {
                    continue;
                }
                let angle = self.normals[face].angle_between(self.normals[next]);
                if angle <= max_angle {
                    seen.insert(next);
                    grown.push(next);
                }
            }
            i += 1;
        }
        grown
    }

    /// Faces whose normal matches a selected face's normal within `delta`
    /// on every axis, ascending.
    pub fn select_faces_by_normal(&self, faces: &[usize], delta: f64) -> Vec<usize> {
        let targets: Vec<_> = faces.iter().map(|&f| self.normals[f]).collect();
        (0..self.faces.len())
            .filter(|&f| {
                targets
                    .iter()
                    .any(|t| (self.normals[f] - *t).abs().max_element() <= delta)
            })
            .collect()
    }

    // =========================================================================
    // BORDERS AND GROUPS
    // =========================================================================

    /// Ordered boundary loops of a face selection.
    pub fn face_borders(&self, faces: &[usize]) -> Vec<Vec<usize>> {
        self.face_borders_ex(faces).loops
    }

    /// Boundary loops of a face selection with the faces touching each loop
    /// and the interior edges between selected faces.
    ///
    /// A directed side is interior when it and its reverse each occur
    /// exactly once among the selected faces; everything else is border.
    pub fn face_borders_ex(&self, faces: &[usize]) -> FaceBorders {
        let faces = dedup_preserve_order(faces);
        let sides: Vec<[usize; 2]> = faces.iter().flat_map(|&f| to_edges(&self.faces[f])).collect();

        let mut counts: HashMap<[usize; 2], usize> = HashMap::new();
        for side in &sides {
            *counts.entry(*side).or_default() += 1;
        }
        let count = |side: [usize; 2]| counts.get(&side).copied().unwrap_or(0);

        let (interior_edges, border): (Vec<[usize; 2]>, Vec<[usize; 2]>) = sides
            .iter()
            .partition(|&&[a, b]| count([a, b]) == 1 && count([b, a]) == 1);

        let loops = chain_sides(&border);
        let groups = loops
            .iter()
            .map(|lp| {
                let members: HashSet<usize> = lp.iter().copied().collect();
                let mut group: Vec<usize> = faces
                    .iter()
                    .copied()
                    .filter(|&f| self.faces[f].iter().any(|v| members.contains(v)))
                    .collect();
                group.sort_unstable();
                group
            })
            .collect();

        FaceBorders {
            loops,
            groups,
            interior_edges,
        }
    }

    /// Vertices of the selected faces that are not on the selection border.
    pub fn faces_interior_vertices(&self, faces: &[usize]) -> Vec<usize> {
        let border: HashSet<usize> = self.face_borders(faces).into_iter().flatten().collect();
        self.faces_to_vertices(faces)
            .into_iter()
            .filter(|v| !border.contains(v))
            .collect()
    }

    /// Splits a vertex selection into groups connected through shared
    /// faces. Groups keep selection order.
    pub fn vertex_groups(&self, vertices: &[usize]) -> Vec<Vec<usize>> {
        let vertices = dedup_preserve_order(vertices);
        let slot: HashMap<usize, usize> = vertices.iter().enumerate().map(|(i, &v)| (v, i)).collect();

        let mut parent: Vec<usize> = (0..vertices.len()).collect();
        for (i, &v) in vertices.iter().enumerate() {
            for &f in &self.parent_faces[v] {
                for u in &self.faces[f] {
                    if let Some(&j) = slot.get(u) {
                        union(&mut parent, i, j);
                    }
                }
            }
        }

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut group_of: HashMap<usize, usize> = HashMap::new();
        for (i, &v) in vertices.iter().enumerate() {
            let root = find(&mut parent, i);
            let g = *group_of.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[g].push(v);
        }
        groups
    }

    /// Splits an edge selection into connected chains. Open chains start at
    /// a free end.
    pub fn edge_groups(&self, edges: &[usize]) -> Vec<EdgeChain> {
        let pairs: Vec<[usize; 2]> = dedup_preserve_order(edges)
            .into_iter()
            .filter_map(|e| self.edges.get(e).copied())
            .collect();

        let mut incident: HashMap<usize, Vec<usize>> = HashMap::new();
        for (i, &[a, b]) in pairs.iter().enumerate() {
            incident.entry(a).or_default().push(i);
            incident.entry(b).or_default().push(i);
        }

        let free_ends = pairs
            .iter()
            .flatten()
            .copied()
            .filter(|v| incident.get(v).map_or(0, Vec::len) == 1);
        let starts: Vec<usize> = free_ends.chain(pairs.iter().map(|p| p[0])).collect();

        let mut used = vec![false; pairs.len()];
        let mut chains = Vec::new();
        for start in starts {
            let mut vertices = vec![start];
            let mut current = start;
            loop {
                let next = incident
                    .get(&current)
                    .and_then(|list| list.iter().copied().find(|&e| !used[e]));
                let Some(e) = next else { break };
                used[e] = true;
                let [a, b] = pairs[e];
                current = if a == current { b } else { a };
                vertices.push(current);
            }
            if vertices.len() < 2 {
                continue;
            }
            let closed = vertices.len() > 2 && vertices.first() == vertices.last();
            if closed {
                vertices.pop();
            }
            chains.push(EdgeChain { vertices, closed });
        }
        chains
    }

    // =========================================================================
    // EDGE LOOPS
    // =========================================================================

    /// Rungs crossing an edge chain: for every chain vertex, its neighbor on
    /// the left of the chain and its neighbor on the right.
    ///
    /// The left face of a chain side is the one that runs along it in the
    /// chain's direction. On a quad strip the rungs of consecutive vertices
    /// therefore stay on the same side. A vertex missing a face on either
    /// side yields `None`.
    pub fn loop_anchors(&self, chain: &EdgeChain) -> Vec<Option<[usize; 2]>> {
        let vs = &chain.vertices;
        let n = vs.len();
        if n < 2 {
            return vec![None; n];
        }
        (0..n)
            .map(|i| {
                let (a, b) = match (i + 1 < n, chain.closed) {
                    (true, _) => (vs[i], vs[i + 1]),
                    (false, true) => (vs[i], vs[0]),
                    (false, false) => (vs[i - 1], vs[i]),
                };
                let along = if vs[i] == a { b } else { a };
                let left = self.directed_face(a, b)?;
                let right = self.directed_face(b, a)?;
                Some([self.rung(left, vs[i], along)?, self.rung(right, vs[i], along)?])
            })
            .collect()
    }

    /// Extends an open chain by one vertex at each end where the path runs
    /// on unambiguously across the next vertex.
    pub fn grow_loop(&self, chain: &EdgeChain) -> EdgeChain {
        let mut grown = chain.clone();
        let n = chain.vertices.len();
        if chain.closed || n < 2 {
            return grown;
        }
        let vs = &chain.vertices;
        if let Some(u) = self.step_across(vs[1], vs[0]).filter(|u| !vs.contains(u)) {
            grown.vertices.insert(0, u);
        }
        if let Some(u) = self.step_across(vs[n - 2], vs[n - 1]).filter(|u| !grown.vertices.contains(u)) {
            grown.vertices.push(u);
        }
        grown
    }

    /// The single neighbor of `at` sharing no face with the side `from -> at`.
    /// On a quad mesh this continues the path `from, at` straight ahead.
    pub(crate) fn step_across(&self, from: usize, at: usize) -> Option<usize> {
        let blocked: Vec<usize> = self.parent_faces[at]
            .iter()
            .filter(|&&f| self.face_has_side(f, from, at))
            .flat_map(|&f| self.faces[f].iter().copied())
            .collect();
        if blocked.is_empty() {
            return None;
        }
        match without(&self.vertex_neighbors(at), &blocked).as_slice() {
            &[u] => Some(u),
            _ => None,
        }
    }

    /// Face whose loop walks from `a` straight to `b`.
    fn directed_face(&self, a: usize, b: usize) -> Option<usize> {
        self.parent_faces[a]
            .iter()
            .copied()
            .find(|&f| to_edges(&self.faces[f]).contains(&[a, b]))
    }

    /// Loop neighbor of `vertex` in `face` other than `along`.
    fn rung(&self, face: usize, vertex: usize, along: usize) -> Option<usize> {
        let ring = &self.faces[face];
        let n = ring.len();
        let i = ring.iter().position(|&x| x == vertex)?;
        [ring[(i + n - 1) % n], ring[(i + 1) % n]]
            .into_iter()
            .find(|&u| u != along)
    }
}

/// Joins directed sides end-to-start into loops. Sides that cannot be closed
/// still come out as a run.
pub(crate) fn chain_sides(sides: &[[usize; 2]]) -> Vec<Vec<usize>> {
    let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, side) in sides.iter().enumerate() {
        outgoing.entry(side[0]).or_default().push(i);
    }

    let mut used = vec![false; sides.len()];
    let mut loops = Vec::new();
    for first in 0..sides.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let start = sides[first][0];
        let mut ring = vec![start];
        let mut current = sides[first][1];
        while current != start {
            let next = outgoing
                .get(&current)
                .and_then(|list| list.iter().copied().find(|&s| !used[s]));
            let Some(s) = next else { break };
            used[s] = true;
            ring.push(current);
            current = sides[s][1];
        }
        if current != start {
            ring.push(current);
        }
        loops.push(ring);
    }
    loops
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}
