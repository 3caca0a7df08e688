//! # Kernel Errors
//!
//! Error types for mesh editing operations.
//!
//! Degeneracies found while looping over many elements (a single ear, a
//! single Delaunay insertion) are skipped and logged at the call site. The
//! variants below are reserved for failures that leave an operator without
//! any well-formed output.

use thiserror::Error;

/// Errors that can occur while editing a mesh.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// Degenerate geometry (zero-length axis, zero-area polygon, coplanar set)
    #[error("Degenerate geometry: {message}")]
    DegenerateGeometry { message: String },

    /// Topology that the operator cannot work with
    #[error("Invalid topology: {message}")]
    InvalidTopology { message: String },

    /// Selection that cannot drive the operator
    #[error("Invalid selection: {message}")]
    InvalidSelection { message: String },

    /// Not enough input points for a construction
    #[error("Insufficient points: {found} (requires {required})")]
    InsufficientPoints { required: usize, found: usize },
}

impl MeshError {
    /// Creates a degenerate geometry error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            message: message.into(),
        }
    }

    /// Creates an invalid topology error.
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Creates an invalid selection error.
    pub fn invalid_selection(message: impl Into<String>) -> Self {
        Self::InvalidSelection {
            message: message.into(),
        }
    }

    /// Creates an insufficient points error.
    pub fn insufficient_points(required: usize, found: usize) -> Self {
        Self::InsufficientPoints { required, found }
    }
}
