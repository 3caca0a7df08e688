//! # Configuration Constants
//!
//! Centralized constants for the mesh editing kernel. Geometry tolerances,
//! operator thresholds and parameter defaults are defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Thresholds**: Angle cut-offs used by extrude, push and chamfer
//! - **Defaults**: Parameter defaults for relax, noise and hull sampling

use std::fmt;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons inside the kernel.
///
/// Used for degenerate cross products, plane-side snapping and
/// zero-length checks.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn is_degenerate(area: f64) -> bool {
///     area.abs() < EPSILON
/// }
///
/// assert!(is_degenerate(1e-9));
/// ```
pub const EPSILON: f64 = 1e-6;

/// Scale factor applied to the caller's bounding scale when building the
/// enclosing Delaunay seed tetrahedron.
///
/// # Example
///
/// ```rust
/// use config::constants::DELAUNAY_SEED_SCALE;
///
/// let extent = DELAUNAY_SEED_SCALE * 2.0;
/// assert_eq!(extent, 6.0);
/// ```
pub const DELAUNAY_SEED_SCALE: f64 = 3.0;

// =============================================================================
// THRESHOLD CONSTANTS
// =============================================================================

/// Corner angle (radians) below which an inset offset is applied without
/// the `1 / cos(angle / 2)` miter correction.
///
/// # Example
///
/// ```rust
/// use config::constants::MITER_ANGLE_THRESHOLD;
///
/// let angle: f64 = 0.05;
/// assert!(angle < MITER_ANGLE_THRESHOLD);
/// ```
pub const MITER_ANGLE_THRESHOLD: f64 = 0.1;

/// Normal deviation (radians) below which a height offset is applied
/// without the `1 / cos(angle)` correction.
///
/// # Example
///
/// ```rust
/// use config::constants::HEIGHT_ANGLE_THRESHOLD;
///
/// assert!(HEIGHT_ANGLE_THRESHOLD < 0.1);
/// ```
pub const HEIGHT_ANGLE_THRESHOLD: f64 = 0.05;

/// Upper clamp for angle corrections, keeps `1 / cos` finite near 90°.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_CORRECTION_ANGLE;
///
/// assert!(MAX_CORRECTION_ANGLE.cos() > 0.0);
/// ```
pub const MAX_CORRECTION_ANGLE: f64 = 1.4;

// =============================================================================
// DEFAULT PARAMETERS
// =============================================================================

/// Default number of Laplacian smoothing passes.
pub const DEFAULT_RELAX_ITERATIONS: u32 = 1;

/// Default blend factor for relax and spherify.
pub const DEFAULT_BLEND_FACTOR: f64 = 1.0;

/// Default octave count for noise displacement.
pub const DEFAULT_NOISE_OCTAVES: u32 = 2;

/// Default frequency multiplier between noise octaves.
pub const DEFAULT_NOISE_LACUNARITY: f64 = 1.2;

/// Default amplitude multiplier between noise octaves.
pub const DEFAULT_NOISE_GAIN: f64 = 0.5;

/// Default seed for the gradient-noise permutation table.
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_NOISE_SEED;
///
/// let seed = DEFAULT_NOISE_SEED;
/// assert_eq!(seed, 0);
/// ```
pub const DEFAULT_NOISE_SEED: u64 = 0;

/// Size of the gradient-noise permutation table (must be a power of two).
pub const NOISE_TABLE_SIZE: usize = 256;

/// Default number of random samples drawn for convex hull generation.
pub const DEFAULT_HULL_SAMPLES: usize = 64;

// =============================================================================
// KERNEL CONFIGURATION
// =============================================================================

/// Immutable snapshot of kernel settings that a mesh instance carries.
///
/// # Examples
/// ```
/// use config::constants::KernelConfig;
/// let config = KernelConfig::default();
/// assert!(config.tolerance > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelConfig {
    /// Numeric tolerance propagated into geometry tests.
    pub tolerance: f64,
    /// Vertices within tolerance of a clip plane count as lying on it.
    pub snap_to_plane: bool,
}

impl KernelConfig {
    /// Builds a configuration, rejecting non-positive tolerances.
    ///
    /// # Examples
    /// ```
    /// use config::constants::KernelConfig;
    /// let cfg = KernelConfig::new(1.0e-5, false).expect("valid config");
    /// assert!(!cfg.snap_to_plane);
    /// ```
    pub fn new(tolerance: f64, snap_to_plane: bool) -> Result<Self, ConfigError> {
        if tolerance <= 0.0 || !tolerance.is_finite() {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        Ok(Self {
            tolerance,
            snap_to_plane,
        })
    }
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            tolerance: EPSILON,
            snap_to_plane: true,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when tolerance is zero, negative or not finite.
    InvalidTolerance(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTolerance(value) => {
                write!(f, "tolerance must be positive and finite: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
