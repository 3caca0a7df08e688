//! # Local Frames
//!
//! Affine transforms built from a few directions: look-at frames for
//! placing planar point sets, and directional scaling about a center.

use glam::{DMat3, DMat4, DVec3};

use super::Plane;
use crate::error::MeshError;

/// Local-to-world transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    matrix: DMat4,
}

impl Frame {
    /// Identity frame.
    pub fn identity() -> Self {
        Self {
            matrix: DMat4::IDENTITY,
        }
    }

    /// Wraps an existing matrix.
    pub fn from_matrix(matrix: DMat4) -> Self {
        Self { matrix }
    }

    /// Frame at `eye` whose local +Z points from `target` toward `eye` and
    /// whose local +X is perpendicular to `up`.
    ///
    /// Local points with `z = 0` land in the plane through `eye` facing away
    /// from `target`.
    pub fn look_at(eye: DVec3, target: DVec3, up: DVec3) -> Result<Self, MeshError> {
        let z = eye - target;
        if z.length() < config::constants::EPSILON {
            return Err(MeshError::degenerate("look-at direction has zero length"));
        }
        let z = z.normalize();
        let x = up.cross(z);
        if x.length() < config::constants::EPSILON {
            return Err(MeshError::degenerate("look-at up vector is parallel to direction"));
        }
        let x = x.normalize();
        let y = z.cross(x);
        Ok(Self {
            matrix: DMat4::from_cols(x.extend(0.0), y.extend(0.0), z.extend(0.0), eye.extend(1.0)),
        })
    }

    /// Scale by `factor` along `axis` about `center`, identity across it.
    pub fn scale_along(center: DVec3, axis: DVec3, factor: f64) -> Result<Self, MeshError> {
        if axis.length() < config::constants::EPSILON {
            return Err(MeshError::degenerate("scale axis has zero length"));
        }
        let a = axis.normalize();
        let outer = DMat3::from_cols(a * a.x, a * a.y, a * a.z);
        let linear = DMat3::IDENTITY + outer * (factor - 1.0);
        let matrix = DMat4::from_translation(center)
            * DMat4::from_mat3(linear)
            * DMat4::from_translation(-center);
        Ok(Self { matrix })
    }

    /// Uniform scale about `center`.
    pub fn scale_about(center: DVec3, factor: f64) -> Self {
        Self {
            matrix: DMat4::from_translation(center)
                * DMat4::from_scale(DVec3::splat(factor))
                * DMat4::from_translation(-center),
        }
    }

    /// Reflection across `plane`.
    pub fn mirror(plane: &Plane) -> Result<Self, MeshError> {
        Self::scale_along(plane.origin, plane.normal, -1.0)
    }

    /// Rotation by `angle` radians about the line through the origin along
    /// `axis`.
    pub fn rotation(axis: DVec3, angle: f64) -> Result<Self, MeshError> {
        if axis.length() < config::constants::EPSILON {
            return Err(MeshError::degenerate("rotation axis has zero length"));
        }
        Ok(Self {
            matrix: DMat4::from_axis_angle(axis.normalize(), angle),
        })
    }

    /// Composition: `self` first, then `other`.
    pub fn then(&self, other: &Frame) -> Frame {
        Frame {
            matrix: other.matrix * self.matrix,
        }
    }

    /// Maps a point from local to world space.
    #[inline]
    pub fn apply(&self, point: DVec3) -> DVec3 {
        self.matrix.transform_point3(point)
    }

    /// Maps a direction (no translation).
    #[inline]
    pub fn apply_vector(&self, vector: DVec3) -> DVec3 {
        self.matrix.transform_vector3(vector)
    }

    /// True when the transform flips orientation.
    pub fn is_mirroring(&self) -> bool {
        self.matrix.determinant() < 0.0
    }

    /// Underlying matrix.
    pub fn matrix(&self) -> DMat4 {
        self.matrix
    }
}
