//! # Mesh Operators
//!
//! Every operator takes a selection with an explicit [`Domain`], converts it
//! to the domain it works in, mutates the mesh and returns the
//! [`ChangeTag`]s a caller has to act on.
//!
//! [`Domain`]: super::Domain
//! [`ChangeTag`]: super::ChangeTag

mod clip;
mod collapse;
mod connect;
mod deform;
mod extrude;
mod rebuild;

use config::constants::{
    DEFAULT_BLEND_FACTOR, DEFAULT_HULL_SAMPLES, DEFAULT_NOISE_GAIN, DEFAULT_NOISE_LACUNARITY,
    DEFAULT_NOISE_OCTAVES, DEFAULT_RELAX_ITERATIONS,
};
use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::ChangeTag;

/// Parameters for [`MeshKernel::extrude`](super::MeshKernel::extrude).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrudeParams {
    /// Offset along the averaged selection normal
    pub height: f64,
    /// Inward offset of the new border ring within the selection plane
    pub inset: f64,
}

impl Default for ExtrudeParams {
    fn default() -> Self {
        Self {
            height: 1.0,
            inset: 0.0,
        }
    }
}

/// Parameters for Laplacian smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxParams {
    pub iterations: u32,
    /// Blend toward the neighbor average; 0 leaves positions untouched
    pub factor: f64,
}

impl Default for RelaxParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_RELAX_ITERATIONS,
            factor: DEFAULT_BLEND_FACTOR,
        }
    }
}

/// Parameters for spherical projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpherifyParams {
    /// Blend toward the sphere; 1 lands exactly on it
    pub factor: f64,
    /// Sphere center, the selection centroid when unset
    pub center: Option<DVec3>,
    /// Sphere radius, the mean distance to the center when unset
    pub radius: Option<f64>,
}

impl Default for SpherifyParams {
    fn default() -> Self {
        Self {
            factor: DEFAULT_BLEND_FACTOR,
            center: None,
            radius: None,
        }
    }
}

/// Parameters for noise displacement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    /// Displacement scale
    pub amount: f64,
    pub octaves: u32,
    pub lacunarity: f64,
    pub gain: f64,
    /// Displacement direction, per component
    pub axis: DVec3,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            amount: 1.0,
            octaves: DEFAULT_NOISE_OCTAVES,
            lacunarity: DEFAULT_NOISE_LACUNARITY,
            gain: DEFAULT_NOISE_GAIN,
            axis: DVec3::Y,
        }
    }
}

/// Parameters for convex hull generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HullParams {
    /// Number of random vertex draws fed to the hull
    pub sample_count: usize,
}

impl Default for HullParams {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_HULL_SAMPLES,
        }
    }
}

/// Tags for an operator that only moved vertices.
pub(crate) fn moved() -> Vec<ChangeTag> {
    vec![ChangeTag::UpdateVertex]
}

/// Tags for an operator that only added or rewired elements.
pub(crate) fn rebuilt() -> Vec<ChangeTag> {
    vec![ChangeTag::UpdateMesh]
}

/// Tags for an operator that deleted and renumbered elements.
pub(crate) fn renumbered() -> Vec<ChangeTag> {
    vec![ChangeTag::UpdateMesh, ChangeTag::UpdateSelection]
}
