//! # Collapse and Dissolve
//!
//! Operators that merge vertex groups into their centroid or remove faces
//! while keeping the hole they leave covered.

use std::collections::HashSet;

use super::renumbered;
use crate::cyclic::CyclicSequence;
use crate::error::MeshError;
use crate::geometry::centroid;
use crate::mesh::{ChangeTag, Domain, MeshKernel};

impl MeshKernel {
    /// Merges the selected vertices into their centroid.
    ///
    /// With `group` each face-connected cluster collapses to its own
    /// centroid; otherwise the whole selection becomes one vertex. Faces
    /// left with fewer than three vertices are deleted.
    pub fn collapse(&mut self, selection: &[usize], domain: Domain, group: bool) -> Result<Vec<ChangeTag>, MeshError> {
        let vertices = self.convert_selection(selection, domain, Domain::Vertex);
        if vertices.is_empty() {
            return Ok(Vec::new());
        }
        let groups = if group {
            self.vertex_groups(&vertices)
        } else {
            vec![vertices]
        };
        self.merge_groups(&groups);
        Ok(renumbered())
    }

    /// Collapses each connected chain of selected edges to its centroid.
    pub fn collapse_edges(&mut self, edges: &[usize]) -> Result<Vec<ChangeTag>, MeshError> {
        let groups: Vec<Vec<usize>> = self.edge_groups(edges).into_iter().map(|c| c.vertices).collect();
        if groups.is_empty() {
            return Ok(Vec::new());
        }
        self.merge_groups(&groups);
        Ok(renumbered())
    }

    /// Removes the selected faces and covers each border loop with a single
    /// face. Vertices inside the selection that end up unused are deleted.
    pub fn dissolve(&mut self, selection: &[usize], domain: Domain) -> Result<Vec<ChangeTag>, MeshError> {
        let faces = self.convert_selection(selection, domain, Domain::Face);
        if faces.is_empty() {
            return Ok(Vec::new());
        }

        let interior = self.faces_interior_vertices(&faces);
        for ring in self.face_borders(&faces) {
            if ring.len() >= 3 {
                self.push_face(ring);
            } else {
                log::warn!("dissolve: border loop of {} vertices dropped", ring.len());
            }
        }
        self.delete_faces(&faces);

        let unused: Vec<usize> = interior
            .into_iter()
            .filter(|&v| self.parent_faces[v].is_empty())
            .collect();
        self.delete_vertices(&unused);
        Ok(renumbered())
    }

    /// Replaces every group by a new centroid vertex, then deletes the group
    /// members and any face that degenerated.
    fn merge_groups(&mut self, groups: &[Vec<usize>]) {
        let mut doomed_faces: HashSet<usize> = HashSet::new();
        let mut doomed_vertices = Vec::new();

        for group in groups {
            let Some(center) = centroid(&self.positions, group) else {
                continue;
            };
            let merged = self.add_vertex(center);
            let members: HashSet<usize> = group.iter().copied().collect();

            for f in self.vertices_to_faces(group) {
                if doomed_faces.contains(&f) {
                    continue;
                }
                let mut ring: CyclicSequence<usize> = self.faces[f]
                    .iter()
                    .map(|v| if members.contains(v) { merged } else { *v })
                    .collect::<Vec<_>>()
                    .into();
                ring.dedup();
                if ring.len() < 3 {
                    doomed_faces.insert(f);
                } else {
                    self.set_face(f, ring.into_vec());
                }
            }
            doomed_vertices.extend_from_slice(group);
        }

        let doomed_faces: Vec<usize> = doomed_faces.into_iter().collect();
        log::debug!(
            "collapse: {} groups, {} faces removed",
            groups.len(),
            doomed_faces.len()
        );
        self.delete_faces(&doomed_faces);
        self.delete_vertices(&doomed_vertices);
    }
}
