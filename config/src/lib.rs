//! # Config Crate
//!
//! Centralized configuration constants for the mesh editing kernel.
//! All tolerances, angle thresholds and operator defaults are defined here
//! so that the kernel crates stay free of scattered literals.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{EPSILON, DELAUNAY_SEED_SCALE};
//!
//! // Use EPSILON for floating-point comparisons
//! let value: f64 = 1e-7;
//! assert!(value.abs() < EPSILON);
//!
//! // The Delaunay seed tetrahedron spans three times the requested scale
//! let extent = DELAUNAY_SEED_SCALE * 10.0;
//! assert_eq!(extent, 30.0);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Deterministic**: No platform-specific or time-derived values
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;
