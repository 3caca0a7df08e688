//! # Mesh Kernel
//!
//! Editing kernel for general polygon meshes. Faces are arbitrary vertex
//! loops; every vertex keeps a sorted list of the faces that use it so
//! operators can walk neighborhoods without a half-edge structure.
//!
//! ## Architecture
//!
//! ```text
//! selection (Domain) → MeshKernel operator → Vec<ChangeTag>
//!                            │
//!             geometry · triangulate · hull · delaunay · noise
//! ```
//!
//! ## Algorithms
//!
//! - **Clipping**: per-face plane splits with cached edge cuts
//! - **Triangulation**: ear cutting in the face plane
//! - **Hull**: QuickHull
//! - **Delaunay**: incremental 1-to-4 splits over a location DAG
//! - **Noise**: seeded gradient noise behind a pluggable evaluator
//!
//! ## Usage
//!
//! ```rust
//! use glam::DVec3;
//! use mesh_kernel::geometry::Plane;
//! use mesh_kernel::{ChangeTag, MeshKernel};
//!
//! let mut mesh = MeshKernel::from_polygons(
//!     vec![
//!         DVec3::new(-1.0, 0.0, 0.0),
//!         DVec3::new(1.0, 0.0, 0.0),
//!         DVec3::new(1.0, 1.0, 0.0),
//!         DVec3::new(-1.0, 1.0, 0.0),
//!     ],
//!     vec![vec![0, 1, 2, 3]],
//! )?;
//!
//! let tags = mesh.clip_plane(&Plane::new(DVec3::ZERO, DVec3::X), true)?;
//! assert!(tags.contains(&ChangeTag::UpdateMesh));
//! assert_eq!(mesh.vertex_count(), 4);
//! # Ok::<(), mesh_kernel::MeshError>(())
//! ```

pub mod cyclic;
pub mod delaunay;
pub mod error;
pub mod geometry;
pub mod hull;
pub mod indices;
pub mod mesh;
pub mod noise;
pub mod triangulate;

pub use error::MeshError;
pub use mesh::{ChangeTag, Domain, MeshKernel};
