//! # Rebuild Operators
//!
//! Operators that replace large parts of the mesh: hull generation,
//! triangulation, detaching, symmetry and repeated clipping.

use std::f64::consts::PI;

use glam::DVec3;
use rand::Rng;

use super::{rebuilt, renumbered, HullParams};
use crate::error::MeshError;
use crate::geometry::{Frame, Plane};
use crate::hull::convex_hull;
use crate::indices::offset_all;
use crate::mesh::{ChangeTag, Domain, MeshKernel};
use crate::triangulate::triangulate_polygon;

impl MeshKernel {
    /// Replaces the whole mesh by the convex hull of randomly drawn vertices.
    ///
    /// `params.sample_count` indices are drawn with replacement from the
    /// current vertices; duplicates collapse before the hull is built.
    ///
    /// # Errors
    ///
    /// `InsufficientPoints` or `DegenerateGeometry` from the hull builder.
    /// The mesh is left untouched on error.
    pub fn generate_convex_hull<R: Rng>(&mut self, params: &HullParams, rng: &mut R) -> Result<Vec<ChangeTag>, MeshError> {
        let count = self.positions.len();
        if count == 0 {
            return Err(MeshError::insufficient_points(4, 0));
        }

        let mut ids: Vec<usize> = (0..params.sample_count).map(|_| rng.random_range(0..count)).collect();
        ids.sort_unstable();
        ids.dedup();
        let samples: Vec<DVec3> = ids.iter().map(|&v| self.positions[v]).collect();

        let hull = convex_hull(&samples)?;
        log::debug!(
            "convex hull from {} samples: {} vertices, {} triangles",
            samples.len(),
            hull.vertex_count(),
            hull.triangle_count()
        );
        let faces = hull.triangles.iter().map(|t| t.to_vec()).collect();
        self.replace_all(hull.points, faces);
        Ok(renumbered())
    }

    /// Replaces every selected polygon by triangles from the ear cutter.
    ///
    /// A face the ear cutter cannot fully cover is kept as it is.
    pub fn triangulate(&mut self, selection: &[usize], domain: Domain) -> Result<Vec<ChangeTag>, MeshError> {
        let faces = self.convert_selection(selection, domain, Domain::Face);
        let mut replaced = Vec::new();

        for f in faces {
            let n = self.faces[f].len();
            if n <= 3 {
                continue;
            }
            let triangles: Vec<[usize; 3]> = triangulate_polygon(&self.positions, &self.faces[f], self.normals[f]).collect();
            if triangles.len() != n - 2 {
                log::warn!("face {}: {} of {} triangles found, face kept", f, triangles.len(), n - 2);
                continue;
            }
            for tri in triangles {
                self.push_face(tri.to_vec());
            }
            replaced.push(f);
        }

        if replaced.is_empty() {
            return Ok(Vec::new());
        }
        self.delete_faces(&replaced);
        Ok(renumbered())
    }

    /// Keeps only the selected faces and the vertices they use.
    pub fn detach(&mut self, selection: &[usize], domain: Domain) -> Result<Vec<ChangeTag>, MeshError> {
        let faces = self.convert_selection(selection, domain, Domain::Face);
        *self = self.extract(&faces);
        Ok(renumbered())
    }

    /// Clips away the back of `plane` and adds the mirror image of what is
    /// left. Vertices on the plane are shared by both halves.
    ///
    /// # Errors
    ///
    /// `DegenerateGeometry` for a zero-length plane normal.
    pub fn symmetry(&mut self, plane: &Plane) -> Result<Vec<ChangeTag>, MeshError> {
        self.clip_plane(plane, true)?;
        self.mirror_welded(plane)?;
        Ok(renumbered())
    }

    /// Builds `copies` mirrored wedges around `axis` through the origin.
    ///
    /// The mesh is cut down to a wedge of `PI / copies`, mirrored into a
    /// wedge of `2 PI / copies` and then rotated into place.
    ///
    /// # Errors
    ///
    /// `InvalidSelection` for fewer than two copies, `DegenerateGeometry`
    /// for a zero-length axis.
    pub fn radial_symmetry(&mut self, copies: usize, axis: DVec3) -> Result<Vec<ChangeTag>, MeshError> {
        if copies < 2 {
            return Err(MeshError::invalid_selection(format!("radial symmetry needs at least 2 copies, got {}", copies)));
        }
        let axis = axis
            .try_normalize()
            .ok_or_else(|| MeshError::degenerate("symmetry axis has zero length"))?;
        let half = PI / copies as f64;
        let u = axis.any_orthonormal_vector();
        let w = axis.cross(u);

        self.clip_plane(&Plane::new(DVec3::ZERO, -w), true)?;
        self.clip_plane(&Plane::new(DVec3::ZERO, u + w / half.tan()), true)?;
        self.mirror_welded(&Plane::new(DVec3::ZERO, w))?;

        let wedge = self.clone();
        for i in 1..copies {
            let frame = Frame::rotation(axis, 2.0 * half * i as f64)?;
            self.merge_transformed(&wedge, &frame, true);
        }
        Ok(renumbered())
    }

    /// Appends a transformed copy of `other`. Without `with_faces` only the
    /// vertices are copied. Winding is reversed for mirroring transforms.
    pub fn merge_transformed(&mut self, other: &MeshKernel, frame: &Frame, with_faces: bool) -> Vec<ChangeTag> {
        let offset = self.positions.len();
        for &p in &other.positions {
            self.add_vertex(frame.apply(p));
        }
        if with_faces {
            let flip = frame.is_mirroring();
            for face in &other.faces {
                let mut ring = offset_all(face, offset);
                if flip {
                    ring.reverse();
                }
                self.push_face(ring);
            }
        }
        rebuilt()
    }

    /// Cuts the mesh on a regular grid of axis-aligned planes `step` apart,
    /// starting at the bounding box minimum. Nothing is removed.
    ///
    /// # Errors
    ///
    /// `InvalidSelection` for a non-positive step.
    pub fn grid_tessellate(&mut self, step: f64) -> Result<Vec<ChangeTag>, MeshError> {
        if step <= 0.0 || !step.is_finite() {
            return Err(MeshError::invalid_selection(format!("grid step must be positive, got {}", step)));
        }
        let Some((min, max)) = self.bounding_box() else {
            return Ok(Vec::new());
        };

        for axis in [DVec3::X, DVec3::Y, DVec3::Z] {
            let (lo, hi) = (min.dot(axis), max.dot(axis));
            let steps = ((hi - lo) / step).floor() as usize + 1;
            for i in 0..steps {
                let origin = axis * (lo + step * i as f64);
                self.clip_plane(&Plane::new(origin, axis), false)?;
            }
        }
        Ok(rebuilt())
    }

    /// Adds the mirror image of the mesh across `plane`, reusing vertices
    /// that lie on the plane.
    fn mirror_welded(&mut self, plane: &Plane) -> Result<(), MeshError> {
        let frame = Frame::mirror(plane)?;
        let normal = plane.normal.normalize_or_zero();
        let tolerance = self.config.tolerance;

        let count = self.positions.len();
        let mut image = Vec::with_capacity(count);
        for v in 0..count {
            let p = self.positions[v];
            if normal.dot(p - plane.origin).abs() <= tolerance {
                image.push(v);
            } else {
                image.push(self.add_vertex(frame.apply(p)));
            }
        }

        let mirrored: Vec<Vec<usize>> = self
            .faces
            .iter()
            .filter(|face| face.iter().any(|&v| image[v] != v))
            .map(|face| face.iter().rev().map(|&v| image[v]).collect())
            .collect();
        for face in mirrored {
            self.push_face(face);
        }
        Ok(())
    }
}
