//! Property-based tests for mesh operators.
//!
//! Random grids and polygons are pushed through the operators; the
//! structural invariants must hold afterwards.

use std::f64::consts::TAU;

use glam::DVec3;
use mesh_kernel::geometry::{polygon_area, Plane};
use mesh_kernel::mesh::{ExtrudeParams, RelaxParams};
use mesh_kernel::{Domain, MeshKernel};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// Quad grid of `w x h` cells in the XY plane with jittered heights.
fn arb_grid() -> impl Strategy<Value = MeshKernel> {
    (1usize..5, 1usize..5).prop_flat_map(|(w, h)| {
        prop::collection::vec(-0.2..0.2f64, (w + 1) * (h + 1)).prop_map(move |heights| {
            let mut positions = Vec::new();
            for r in 0..=h {
                for c in 0..=w {
                    positions.push(DVec3::new(c as f64, r as f64, heights[r * (w + 1) + c]));
                }
            }
            let mut faces = Vec::new();
            for r in 0..h {
                for c in 0..w {
                    let i = r * (w + 1) + c;
                    faces.push(vec![i, i + 1, i + w + 2, i + w + 1]);
                }
            }
            MeshKernel::from_polygons(positions, faces).unwrap()
        })
    })
}

/// Regular polygon with `n` corners, random size and phase.
fn arb_convex_polygon() -> impl Strategy<Value = MeshKernel> {
    (3usize..12, 0.5..10.0f64, 0.0..TAU).prop_map(|(n, radius, phase)| {
        let positions = (0..n)
            .map(|i| {
                let angle = phase + TAU * i as f64 / n as f64;
                DVec3::new(angle.cos() * radius, angle.sin() * radius, 0.0)
            })
            .collect();
        MeshKernel::from_polygons(positions, vec![(0..n).collect()]).unwrap()
    })
}

/// Vertical plane through a point inside the grid's first cell row.
fn arb_vertical_plane() -> impl Strategy<Value = Plane> {
    (0.0..1.0f64, 0.0..1.0f64, 0.0..TAU).prop_map(|(x, y, angle)| {
        Plane::new(DVec3::new(x, y, 0.0), DVec3::new(angle.cos(), angle.sin(), 0.0))
    })
}

fn total_area(mesh: &MeshKernel) -> f64 {
    mesh.faces().iter().map(|f| polygon_area(mesh.positions(), f)).sum()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn clip_keeps_structure(mut mesh in arb_grid(), plane in arb_vertical_plane(), delete in any::<bool>()) {
        mesh.clip_plane(&plane, delete).unwrap();
        prop_assert!(mesh.validate().is_ok());
        prop_assert!(mesh.faces().iter().all(|f| f.len() >= 3));
        if delete {
            for p in mesh.positions() {
                prop_assert!(plane.signed_distance(*p) >= -1e-6);
            }
        }
    }

    #[test]
    fn clip_without_delete_preserves_projected_area(mut mesh in arb_grid(), plane in arb_vertical_plane()) {
        let flat: Vec<DVec3> = mesh.positions().iter().map(|p| p.truncate().extend(0.0)).collect();
        let before: f64 = mesh.faces().iter().map(|f| polygon_area(&flat, f)).sum();

        mesh.clip_plane(&plane, false).unwrap();
        let flat: Vec<DVec3> = mesh.positions().iter().map(|p| p.truncate().extend(0.0)).collect();
        let after: f64 = mesh.faces().iter().map(|f| polygon_area(&flat, f)).sum();
        prop_assert!((before - after).abs() < 1e-6, "{} vs {}", before, after);
    }

    #[test]
    fn relax_with_zero_factor_is_identity(mut mesh in arb_grid(), iterations in 1u32..4) {
        let before = mesh.positions().to_vec();
        let all: Vec<usize> = (0..mesh.vertex_count()).collect();
        let params = RelaxParams { iterations, factor: 0.0 };
        mesh.relax(&all, Domain::Vertex, &params).unwrap();
        prop_assert_eq!(mesh.positions(), before.as_slice());
    }

    #[test]
    fn convex_polygon_triangulates_fully(mut mesh in arb_convex_polygon()) {
        let n = mesh.vertex_count();
        let area = total_area(&mesh);
        mesh.triangulate(&[0], Domain::Face).unwrap();

        prop_assert_eq!(mesh.face_count(), n - 2);
        prop_assert_eq!(mesh.vertex_count(), n);
        prop_assert!(mesh.faces().iter().all(|f| f.len() == 3 && f.iter().all(|&v| v < n)));
        prop_assert!((total_area(&mesh) - area).abs() < 1e-6 * area.max(1.0));
        prop_assert!(mesh.validate().is_ok());
    }

    #[test]
    fn extrude_single_face_adds_ring(mut mesh in arb_grid(), pick in any::<prop::sample::Index>(), height in 0.1..2.0f64) {
        let face = pick.index(mesh.face_count());
        let (vertices, faces) = (mesh.vertex_count(), mesh.face_count());
        let params = ExtrudeParams { height, inset: 0.0 };
        mesh.extrude(&[face], Domain::Face, &params).unwrap();

        prop_assert_eq!(mesh.vertex_count(), vertices + 4);
        prop_assert_eq!(mesh.face_count(), faces + 4);
        prop_assert!(mesh.validate().is_ok());
    }

    #[test]
    fn face_vertex_round_trip_covers_selection(mesh in arb_grid(), pick in any::<prop::sample::Index>()) {
        let face = pick.index(mesh.face_count());
        let vertices = mesh.convert_selection(&[face], Domain::Face, Domain::Vertex);
        let faces = mesh.convert_selection(&vertices, Domain::Vertex, Domain::Face);
        prop_assert!(faces.contains(&face));
        prop_assert!(faces.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn dissolve_whole_grid_leaves_one_face(mut mesh in arb_grid()) {
        let all: Vec<usize> = (0..mesh.face_count()).collect();
        mesh.dissolve(&all, Domain::Face).unwrap();

        prop_assert_eq!(mesh.face_count(), 1);
        prop_assert!(mesh.vertex_count() == mesh.face(0).len());
        prop_assert!(mesh.validate().is_ok());
    }
}
