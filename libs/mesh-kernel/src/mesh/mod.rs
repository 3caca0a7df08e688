//! # Mesh Kernel
//!
//! Face-vertex polygon mesh with a per-vertex back-reference cache and the
//! editing operators built on top of it.
//!
//! ## Storage
//!
//! - `positions[v]`: vertex position
//! - `parent_faces[v]`: sorted ids of the faces whose loop contains `v`
//! - `faces[f]`: cyclic vertex loop, at least three ids
//! - `normals[f]`: Newell normal of `faces[f]`
//! - `edges`: explicit edge list, built on request and cleared by any
//!   topology change
//! - `uv_layer`: optional per-face UV loops in lock-step with `faces`
//!
//! Every face edit goes through [`MeshKernel::add_face`],
//! [`MeshKernel::update_face`] or [`MeshKernel::delete_faces`], which keep
//! `parent_faces` and `normals` in sync with `faces`.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use mesh_kernel::mesh::{Domain, MeshKernel};
//!
//! let mut mesh = MeshKernel::new();
//! let a = mesh.add_vertex(DVec3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex(DVec3::new(1.0, 0.0, 0.0));
//! let c = mesh.add_vertex(DVec3::new(0.0, 1.0, 0.0));
//! let face = mesh.add_face(vec![a, b, c]).unwrap();
//!
//! assert_eq!(mesh.parent_faces(a), &[face]);
//! assert_eq!(mesh.convert_selection(&[face], Domain::Face, Domain::Vertex), vec![a, b, c]);
//! ```

mod ops;
mod selection;
mod uv;


pub use ops::{ExtrudeParams, HullParams, NoiseParams, RelaxParams, SpherifyParams};
pub use selection::{EdgeChain, FaceBorders};
pub use uv::UvLayer;

use config::constants::KernelConfig;
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::MeshError;
use crate::geometry::{centroid, newell_normal};
use crate::indices::edge_key;

// =============================================================================
// TAGS
// =============================================================================

/// What a caller has to re-synchronize after an operator returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeTag {
    /// Positions moved, topology untouched
    UpdateVertex,
    /// Vertices or faces were added, removed or rewired
    UpdateMesh,
    /// Existing element ids were renumbered; stored selections are stale
    UpdateSelection,
}

/// Element domain a selection refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Vertex,
    Edge,
    Face,
}

// =============================================================================
// MESH
// =============================================================================

/// Editable polygon mesh.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshKernel {
    positions: Vec<DVec3>,
    parent_faces: Vec<Vec<usize>>,
    faces: Vec<Vec<usize>>,
    normals: Vec<DVec3>,
    edges: Vec<[usize; 2]>,
    uv_layer: Option<UvLayer>,
    #[serde(skip)]
    config: KernelConfig,
}

impl MeshKernel {
    /// Creates an empty mesh with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mesh with the given configuration.
    pub fn with_config(config: KernelConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Builds a mesh from positions and face loops.
    ///
    /// # Errors
    ///
    /// `InvalidTopology` if a loop has fewer than three ids or references a
    /// missing vertex.
    pub fn from_polygons(positions: Vec<DVec3>, faces: Vec<Vec<usize>>) -> Result<Self, MeshError> {
        let mut mesh = Self::new();
        for p in positions {
            mesh.add_vertex(p);
        }
        for face in faces {
            mesh.add_face(face)?;
        }
        Ok(mesh)
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: KernelConfig) {
        self.config = config;
    }

    // ===== Accessors =====

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// All vertex positions.
    #[inline]
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    #[inline]
    pub fn position(&self, vertex: usize) -> DVec3 {
        self.positions[vertex]
    }

    /// Faces currently referencing `vertex`, ascending.
    #[inline]
    pub fn parent_faces(&self, vertex: usize) -> &[usize] {
        &self.parent_faces[vertex]
    }

    #[inline]
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    #[inline]
    pub fn face(&self, face: usize) -> &[usize] {
        &self.faces[face]
    }

    /// Unit face normal, zero for a degenerate face.
    #[inline]
    pub fn normal(&self, face: usize) -> DVec3 {
        self.normals[face]
    }

    #[inline]
    pub fn normals(&self) -> &[DVec3] {
        &self.normals
    }

    /// The explicit edge list; empty until [`MeshKernel::build_edges`] runs.
    #[inline]
    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    pub fn uv_layer(&self) -> Option<&UvLayer> {
        self.uv_layer.as_ref()
    }

    // ===== Vertices =====

    /// Appends a vertex and returns its id.
    pub fn add_vertex(&mut self, position: DVec3) -> usize {
        self.positions.push(position);
        self.parent_faces.push(Vec::new());
        self.positions.len() - 1
    }

    /// Moves a vertex, keeping its back-references and refreshing the
    /// normals of the faces around it.
    pub fn update_vertex(&mut self, vertex: usize, position: DVec3) {
        self.positions[vertex] = position;
        let faces = self.parent_faces[vertex].clone();
        self.refresh_normals(&faces);
    }

    /// Moves a vertex without touching normals. Callers refresh once at the
    /// end of a batch.
    pub(crate) fn set_position(&mut self, vertex: usize, position: DVec3) {
        self.positions[vertex] = position;
    }

    /// Removes vertices, compacting the array by moving surviving vertices
    /// from the back into the freed slots.
    ///
    /// Faces that still reference a doomed vertex are deleted first.
    pub(crate) fn delete_vertices(&mut self, vertices: &[usize]) {
        let mut doomed: Vec<usize> = vertices.to_vec();
        doomed.sort_unstable();
        doomed.dedup();
        if doomed.is_empty() {
            return;
        }

        let referencing: Vec<usize> = doomed
            .iter()
            .flat_map(|&v| self.parent_faces[v].iter().copied())
            .collect();
        if !referencing.is_empty() {
            log::warn!(
                "deleting {} faces that still reference removed vertices",
                referencing.len()
            );
            self.delete_faces(&referencing);
        }

        let new_len = self.positions.len() - doomed.len();
        let holes = doomed.iter().copied().take_while(|&v| v < new_len);
        let movers = (new_len..self.positions.len()).filter(|v| doomed.binary_search(v).is_err());

        for (hole, mover) in holes.zip(movers) {
            self.positions[hole] = self.positions[mover];
            let faces = std::mem::take(&mut self.parent_faces[mover]);
            for &f in &faces {
                for idx in self.faces[f].iter_mut().filter(|idx| **idx == mover) {
                    *idx = hole;
                }
            }
            self.parent_faces[hole] = faces;
        }

        self.positions.truncate(new_len);
        self.parent_faces.truncate(new_len);
        self.edges.clear();
        log::trace!("deleted {} vertices", doomed.len());
    }

    // ===== Faces =====

    /// Appends a face and returns its id.
    ///
    /// # Errors
    ///
    /// `InvalidTopology` for fewer than three ids or an id out of range.
    pub fn add_face(&mut self, indices: Vec<usize>) -> Result<usize, MeshError> {
        self.check_loop(&indices)?;
        Ok(self.push_face(indices))
    }

    /// Appends a face together with its UV loop.
    ///
    /// # Errors
    ///
    /// `InvalidTopology` if the loop is malformed, there is no UV layer, or
    /// the UV loop does not match the face.
    pub fn add_face_with_uvs(&mut self, indices: Vec<usize>, uv_loop: Vec<usize>) -> Result<usize, MeshError> {
        self.check_loop(&indices)?;
        let layer = self
            .uv_layer
            .as_ref()
            .ok_or_else(|| MeshError::invalid_topology("mesh has no uv layer"))?;
        layer.check_loop(&uv_loop, indices.len())?;

        let id = self.insert_face(indices);
        if let Some(layer) = self.uv_layer.as_mut() {
            layer.face_uvs.push(uv_loop);
        }
        Ok(id)
    }

    /// Replaces a face loop in place.
    ///
    /// # Errors
    ///
    /// `InvalidTopology` for fewer than three ids or an id out of range.
    pub fn update_face(&mut self, face: usize, indices: Vec<usize>) -> Result<(), MeshError> {
        self.check_loop(&indices)?;
        self.set_face(face, indices);
        Ok(())
    }

    /// Removes faces and their normals, compacting both arrays. Face ids
    /// past a removed face shift down.
    pub fn delete_faces(&mut self, faces: &[usize]) {
        let mut doomed: Vec<usize> = faces.to_vec();
        doomed.sort_unstable();
        doomed.dedup();
        if doomed.is_empty() {
            return;
        }

        let mut remap: Vec<Option<usize>> = Vec::with_capacity(self.faces.len());
        let mut next = 0;
        for f in 0..self.faces.len() {
            if doomed.binary_search(&f).is_ok() {
                remap.push(None);
            } else {
                remap.push(Some(next));
                next += 1;
            }
        }

        let mut f = 0;
        self.faces.retain(|_| {
            f += 1;
            remap[f - 1].is_some()
        });
        let mut f = 0;
        self.normals.retain(|_| {
            f += 1;
            remap[f - 1].is_some()
        });
        if let Some(layer) = self.uv_layer.as_mut() {
            layer.retain_faces(|f| remap[f].is_some());
        }

        for refs in &mut self.parent_faces {
            refs.retain_mut(|f| match remap[*f] {
                Some(new) => {
                    *f = new;
                    true
                }
                None => false,
            });
        }
        self.edges.clear();
        log::trace!("deleted {} faces", doomed.len());
    }

    /// Appends a face without validation.
    pub(crate) fn push_face(&mut self, indices: Vec<usize>) -> usize {
        self.drop_uv_layer("face added");
        self.insert_face(indices)
    }

    fn insert_face(&mut self, indices: Vec<usize>) -> usize {
        debug_assert!(indices.len() >= 3, "face loop needs three vertices");
        let id = self.faces.len();
        let normal = self.loop_normal(&indices);
        for &v in &indices {
            add_ref(&mut self.parent_faces[v], id);
        }
        self.faces.push(indices);
        self.normals.push(normal);
        self.edges.clear();
        id
    }

    /// Replaces a face loop without validation, moving back-references from
    /// the old members to the new ones.
    pub(crate) fn set_face(&mut self, face: usize, indices: Vec<usize>) {
        debug_assert!(indices.len() >= 3, "face loop needs three vertices");
        self.drop_uv_layer("face rewired");
        for &v in &self.faces[face] {
            if let Ok(pos) = self.parent_faces[v].binary_search(&face) {
                self.parent_faces[v].remove(pos);
            }
        }
        for &v in &indices {
            add_ref(&mut self.parent_faces[v], face);
        }
        self.normals[face] = self.loop_normal(&indices);
        self.faces[face] = indices;
        self.edges.clear();
    }

    fn check_loop(&self, indices: &[usize]) -> Result<(), MeshError> {
        if indices.len() < 3 {
            return Err(MeshError::invalid_topology(format!(
                "face needs at least 3 vertices, got {}",
                indices.len()
            )));
        }
        if let Some(bad) = indices.iter().find(|&&v| v >= self.positions.len()) {
            return Err(MeshError::invalid_topology(format!(
                "vertex {} out of range ({} vertices)",
                bad,
                self.positions.len()
            )));
        }
        Ok(())
    }

    fn loop_normal(&self, indices: &[usize]) -> DVec3 {
        let normal = newell_normal(&self.positions, indices).normalize_or_zero();
        if normal == DVec3::ZERO {
            log::debug!("zero-length normal for face loop {:?}", indices);
        }
        normal
    }

    /// Recomputes the cached normals of `faces`.
    pub(crate) fn refresh_normals(&mut self, faces: &[usize]) {
        for &f in faces {
            self.normals[f] = self.loop_normal(&self.faces[f]);
        }
    }

    /// Recomputes the normals of every face touching `vertices`.
    pub(crate) fn refresh_vertex_normals(&mut self, vertices: &[usize]) {
        let mut faces: Vec<usize> = vertices
            .iter()
            .flat_map(|&v| self.parent_faces[v].iter().copied())
            .collect();
        faces.sort_unstable();
        faces.dedup();
        self.refresh_normals(&faces);
    }

    /// Recomputes every face normal.
    pub fn recompute_normals(&mut self) {
        self.normals = self.faces.iter().map(|f| self.loop_normal(f)).collect();
    }

    /// Rebuilds every back-reference list from the face array.
    pub fn rebuild_back_references(&mut self) {
        for refs in &mut self.parent_faces {
            refs.clear();
        }
        for (f, face) in self.faces.iter().enumerate() {
            for &v in face {
                add_ref(&mut self.parent_faces[v], f);
            }
        }
    }

    /// Replaces the whole mesh with new positions and faces.
    pub(crate) fn replace_all(&mut self, positions: Vec<DVec3>, faces: Vec<Vec<usize>>) {
        self.positions = positions;
        self.parent_faces = vec![Vec::new(); self.positions.len()];
        self.faces.clear();
        self.normals.clear();
        self.edges.clear();
        self.drop_uv_layer("mesh replaced");
        for face in faces {
            self.insert_face(face);
        }
    }

    // ===== Edges =====

    /// Materializes the edge list from the face loops.
    ///
    /// Each undirected edge appears once, oriented as in the first face that
    /// uses it, in face order.
    pub fn build_edges(&mut self) -> &[[usize; 2]] {
        let mut seen = std::collections::HashSet::new();
        self.edges = self
            .faces
            .iter()
            .flat_map(|face| crate::indices::to_edges(face))
            .filter(|[a, b]| seen.insert(edge_key(*a, *b)))
            .collect();
        &self.edges
    }

    /// Id of the edge between `a` and `b` in the edge list.
    pub fn find_edge(&self, a: usize, b: usize) -> Option<usize> {
        let key = edge_key(a, b);
        self.edges.iter().position(|[x, y]| edge_key(*x, *y) == key)
    }

    // ===== UVs =====

    /// Installs a UV layer.
    ///
    /// # Errors
    ///
    /// `InvalidTopology` unless there is exactly one UV loop per face, each
    /// with the face's arity and indices into `uvs`.
    pub fn set_uv_layer(&mut self, uvs: Vec<DVec2>, face_uvs: Vec<Vec<usize>>) -> Result<(), MeshError> {
        let layer = UvLayer::new(uvs, face_uvs);
        layer.check(&self.faces)?;
        self.uv_layer = Some(layer);
        Ok(())
    }

    pub fn clear_uv_layer(&mut self) {
        self.uv_layer = None;
    }

    fn drop_uv_layer(&mut self, reason: &str) {
        if self.uv_layer.take().is_some() {
            log::debug!("uv layer dropped: {}", reason);
        }
    }

    // ===== Geometry queries =====

    /// Average of a face's vertices.
    pub fn face_center(&self, face: usize) -> DVec3 {
        centroid(&self.positions, &self.faces[face]).unwrap_or(DVec3::ZERO)
    }

    /// Normalized average of the normals of the faces around `vertex`; zero
    /// for an isolated vertex or cancelling normals.
    pub fn vertex_normal(&self, vertex: usize) -> DVec3 {
        self.parent_faces[vertex]
            .iter()
            .map(|&f| self.normals[f])
            .sum::<DVec3>()
            .normalize_or_zero()
    }

    /// Axis-aligned bounds, `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }

    /// Checks every structural invariant.
    ///
    /// # Errors
    ///
    /// `InvalidTopology` describing the first violation found.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.normals.len() != self.faces.len() {
            return Err(MeshError::invalid_topology("normal count differs from face count"));
        }
        if self.parent_faces.len() != self.positions.len() {
            return Err(MeshError::invalid_topology("back-reference count differs from vertex count"));
        }
        for face in &self.faces {
            self.check_loop(face)?;
        }

        let mut expected = vec![Vec::new(); self.positions.len()];
        for (f, face) in self.faces.iter().enumerate() {
            for &v in face {
                add_ref(&mut expected[v], f);
            }
        }
        if let Some(v) = (0..self.positions.len()).find(|&v| expected[v] != self.parent_faces[v]) {
            return Err(MeshError::invalid_topology(format!(
                "vertex {} back-references {:?}, faces say {:?}",
                v, self.parent_faces[v], expected[v]
            )));
        }

        for edge in &self.edges {
            if edge.iter().any(|&v| v >= self.positions.len()) {
                return Err(MeshError::invalid_topology("edge references a missing vertex"));
            }
        }
        if let Some(layer) = &self.uv_layer {
            layer.check(&self.faces)?;
        }
        Ok(())
    }

    /// Copy of the selected faces and the vertices they use, renumbered in
    /// first-use order.
    pub fn extract(&self, faces: &[usize]) -> MeshKernel {
        let vertices = self.faces_to_vertices(faces);
        let index: std::collections::HashMap<usize, usize> =
            vertices.iter().enumerate().map(|(new, &old)| (old, new)).collect();

        let mut out = MeshKernel::with_config(self.config);
        for &v in &vertices {
            out.add_vertex(self.positions[v]);
        }
        for &f in faces {
            let face = self.faces[f].iter().map(|v| index[v]).collect();
            out.insert_face(face);
        }
        out
    }
}

/// Inserts `face` into a sorted back-reference list.
fn add_ref(refs: &mut Vec<usize>, face: usize) {
    if let Err(pos) = refs.binary_search(&face) {
        refs.insert(pos, face);
    }
}
