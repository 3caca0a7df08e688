//! Optional per-face UV loops kept in lock-step with the face array.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::MeshError;

/// Texture coordinates plus one UV index loop per face.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UvLayer {
    pub uvs: Vec<DVec2>,
    pub face_uvs: Vec<Vec<usize>>,
}

impl UvLayer {
    pub fn new(uvs: Vec<DVec2>, face_uvs: Vec<Vec<usize>>) -> Self {
        Self { uvs, face_uvs }
    }

    /// UV coordinates for a face, in face winding order.
    pub fn face_coords(&self, face: usize) -> Vec<DVec2> {
        self.face_uvs
            .get(face)
            .map(|lp| lp.iter().map(|&i| self.uvs[i]).collect())
            .unwrap_or_default()
    }

    pub(crate) fn check(&self, faces: &[Vec<usize>]) -> Result<(), MeshError> {
        if self.face_uvs.len() != faces.len() {
            return Err(MeshError::invalid_topology(format!(
                "{} uv loops for {} faces",
                self.face_uvs.len(),
                faces.len()
            )));
        }
        for (uv_loop, face) in self.face_uvs.iter().zip(faces) {
            self.check_loop(uv_loop, face.len())?;
        }
        Ok(())
    }

    pub(crate) fn check_loop(&self, uv_loop: &[usize], arity: usize) -> Result<(), MeshError> {
        if uv_loop.len() != arity {
            return Err(MeshError::invalid_topology(format!(
                "uv loop has {} entries, face has {}",
                uv_loop.len(),
                arity
            )));
        }
        if uv_loop.iter().any(|&i| i >= self.uvs.len()) {
            return Err(MeshError::invalid_topology("uv index out of range"));
        }
        Ok(())
    }

    /// Keeps the loops of faces for which `keep(face)` holds.
    pub(crate) fn retain_faces(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let mut f = 0;
        self.face_uvs.retain(|_| {
            f += 1;
            keep(f - 1)
        });
    }
}
