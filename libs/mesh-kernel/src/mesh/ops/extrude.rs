//! # Face Extrusion
//!
//! Duplicates the border of a face selection, rewires the selected faces
//! onto the duplicates and bridges old and new borders with side quads.
//! Offsets are computed from the unmoved mesh into a side table and applied
//! in one pass at the end.

use std::collections::HashMap;

use config::constants::{HEIGHT_ANGLE_THRESHOLD, MAX_CORRECTION_ANGLE, MITER_ANGLE_THRESHOLD};
use glam::DVec3;

use super::{rebuilt, ExtrudeParams};
use crate::error::MeshError;
use crate::mesh::{ChangeTag, Domain, FaceBorders, MeshKernel};

impl MeshKernel {
    /// Extrudes the selected faces by `params.height` along their normals,
    /// insetting the new border by `params.inset`.
    ///
    /// # Errors
    ///
    /// `DegenerateGeometry` when a selected vertex has no usable normal; the
    /// mesh is left untouched in that case.
    pub fn extrude(&mut self, selection: &[usize], domain: Domain, params: &ExtrudeParams) -> Result<Vec<ChangeTag>, MeshError> {
        let faces = self.convert_selection(selection, domain, Domain::Face);
        if faces.is_empty() {
            return Ok(Vec::new());
        }

        let borders = self.face_borders_ex(&faces);
        let offsets = self.extrude_offsets(&faces, &borders, params)?;

        let mut duplicated = 0;
        for (ring, group) in borders.loops.iter().zip(&borders.groups) {
            let copies: Vec<usize> = ring.iter().map(|&v| self.add_vertex(self.positions[v])).collect();
            let copy_of: HashMap<usize, usize> = ring.iter().copied().zip(copies.iter().copied()).collect();

            for &f in group {
                let rewired = self.faces[f]
                    .iter()
                    .map(|v| copy_of.get(v).copied().unwrap_or(*v))
                    .collect();
                self.set_face(f, rewired);
            }

            let n = ring.len();
            for i in 0..n {
                let j = (i + 1) % n;
                self.push_face(vec![ring[i], ring[j], copies[j], copies[i]]);
            }

            for (&old, &new) in ring.iter().zip(&copies) {
                if let Some(offset) = offsets.border.get(&old) {
                    self.set_position(new, self.positions[new] + *offset);
                }
            }
            duplicated += n;
        }

        for (&v, offset) in &offsets.interior {
            self.set_position(v, self.positions[v] + *offset);
        }
        let moved: Vec<usize> = self.faces_to_vertices(&faces);
        self.refresh_vertex_normals(&moved);

        log::debug!(
            "extrude: {} faces, {} border vertices duplicated",
            faces.len(),
            duplicated
        );
        Ok(rebuilt())
    }

    fn extrude_offsets(&self, faces: &[usize], borders: &FaceBorders, params: &ExtrudeParams) -> Result<PendingOffsets, MeshError> {
        let mut pending = PendingOffsets::default();

        for ring in &borders.loops {
            let n = ring.len();
            for i in 0..n {
                let v = ring[i];
                let normal = self.selection_normal(v, faces)?;
                let lift = self.lift(v, faces, normal, params.height);

                let prev = self.positions[ring[(i + n - 1) % n]];
                let next = self.positions[ring[(i + 1) % n]];
                let here = self.positions[v];
                let inward = self.inset_direction(v, &borders.interior_edges, normal, prev, here, next);

                pending.border.insert(v, lift + inward * params.inset);
            }
        }

        for v in self.faces_interior_vertices(faces) {
            let normal = self.selection_normal(v, faces)?;
            pending.interior.insert(v, self.lift(v, faces, normal, params.height));
        }
        Ok(pending)
    }

    /// Average normal of the selected faces around `v`.
    fn selection_normal(&self, v: usize, faces: &[usize]) -> Result<DVec3, MeshError> {
        self.parent_faces[v]
            .iter()
            .filter(|f| faces.contains(f))
            .map(|&f| self.normals[f])
            .sum::<DVec3>()
            .try_normalize()
            .ok_or_else(|| MeshError::degenerate(format!("vertex {} has no extrusion normal", v)))
    }

    /// Height offset along `normal`, lengthened so every adjacent selected
    /// face moves by `height` along its own normal.
    fn lift(&self, v: usize, faces: &[usize], normal: DVec3, height: f64) -> DVec3 {
        let spread = self.parent_faces[v]
            .iter()
            .filter(|f| faces.contains(f))
            .map(|&f| normal.angle_between(self.normals[f]))
            .fold(0.0, f64::max);
        if spread < HEIGHT_ANGLE_THRESHOLD {
            normal * height
        } else {
            normal * (height / spread.min(MAX_CORRECTION_ANGLE).cos())
        }
    }

    /// Unit-inset displacement for a border vertex, pointing into the
    /// selection and mitered at corners.
    fn inset_direction(&self, v: usize, interior: &[[usize; 2]], normal: DVec3, prev: DVec3, here: DVec3, next: DVec3) -> DVec3 {
        let spokes: Vec<DVec3> = interior
            .iter()
            .filter(|[a, _]| *a == v)
            .filter_map(|&[a, b]| (self.positions[b] - self.positions[a]).try_normalize())
            .collect();
        if let Some(&first) = spokes.first() {
            let spread = spokes.iter().map(|s| first.angle_between(*s)).fold(0.0, f64::max);
            let dir = spokes.iter().sum::<DVec3>().normalize_or_zero();
            return miter(dir, spread);
        }

        let (Some(e_in), Some(e_out)) = ((here - prev).try_normalize(), (next - here).try_normalize()) else {
            return DVec3::ZERO;
        };
        let turn = e_in.angle_between(e_out);
        let tangent = (e_in + e_out).try_normalize().unwrap_or(e_in);
        miter(normal.cross(tangent).normalize_or_zero(), turn)
    }
}

/// Stretches a unit offset by `1 / cos(angle / 2)` past the miter threshold.
fn miter(direction: DVec3, angle: f64) -> DVec3 {
    if angle < MITER_ANGLE_THRESHOLD {
        direction
    } else {
        direction / (angle / 2.0).min(MAX_CORRECTION_ANGLE).cos()
    }
}

#[derive(Debug, Default)]
struct PendingOffsets {
    /// Keyed by original border vertex; applied to its duplicate
    border: HashMap<usize, DVec3>,
    interior: HashMap<usize, DVec3>,
}
