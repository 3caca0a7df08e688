//! # Delaunay Tests

use super::*;
use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seed_points(scale: f64) -> Vec<DVec3> {
    Delaunay::new(scale).points().to_vec()
}

fn leaf_volume(d: &Delaunay) -> f64 {
    d.leaves().map(|(_, t)| t.determinant.abs() / 6.0).sum()
}

#[test]
fn test_seed_points_leave_single_tetra() {
    let seeds = seed_points(2.0);
    let d = Delaunay::build(&seeds, 2.0);

    assert_eq!(d.tetras().len(), 1);
    assert_eq!(d.points().len(), 4);
    for p in &seeds {
        assert!(matches!(d.locate(*p), Location::OnBoundary { tetra: TetraId(0), .. }));
    }
}

#[test]
fn test_seed_orientation_consistent_for_centroid() {
    let d = Delaunay::new(1.0);
    let root = d.tetra(TetraId(0));
    assert!(root.determinant != 0.0);
    assert_eq!(d.classify(TetraId(0), root.centroid), Location::Inside(TetraId(0)));
}

#[test]
fn test_single_insert_splits_root() {
    let mut d = Delaunay::new(1.0);
    let id = d.insert(DVec3::new(0.1, -0.2, 0.3));

    assert_eq!(id, Some(4));
    assert_eq!(d.tetras().len(), 5);
    assert_eq!(d.leaves().count(), 4);
    assert_eq!(d.tetra(TetraId(0)).children.len(), 4);
    for (_, leaf) in d.leaves() {
        assert_eq!(leaf.parent, Some(TetraId(0)));
        assert!(leaf.vertices.contains(&4));
        assert_eq!(leaf.determinant.signum(), d.tetra(TetraId(0)).determinant.signum());
    }
}

#[test]
fn test_split_preserves_volume() {
    let mut rng = StdRng::seed_from_u64(42);
    let points: Vec<DVec3> = (0..25)
        .map(|_| {
            DVec3::new(
                rng.random_range(-0.5..0.5),
                rng.random_range(-0.5..0.5),
                rng.random_range(0.1..1.0),
            )
        })
        .collect();
    let d = Delaunay::build(&points, 1.0);

    let root_volume = d.tetra(TetraId(0)).determinant.abs() / 6.0;
    assert_relative_eq!(leaf_volume(&d), root_volume, max_relative = 1e-9);
    assert_eq!(d.points().len(), 4 + 25);
    assert_eq!(d.leaves().count(), 1 + 3 * 25);
}

#[test]
fn test_locate_finds_leaf() {
    let d = Delaunay::build(&[DVec3::new(0.2, 0.1, 0.3), DVec3::new(-0.4, 0.2, 0.1)], 1.0);
    let Location::Inside(id) = d.locate(DVec3::new(0.05, 0.05, 0.05)) else {
        panic!("expected interior point");
    };
    assert!(!d.tetra(id).is_split());
}

#[test]
fn test_outside_point_skipped() {
    let mut d = Delaunay::new(1.0);
    assert_eq!(d.locate(DVec3::splat(100.0)), Location::Outside);
    assert_eq!(d.insert(DVec3::splat(100.0)), None);
    // Below the seed's base plane
    assert_eq!(d.insert(DVec3::new(0.0, 0.0, -0.5)), None);
    assert_eq!(d.tetras().len(), 1);
}

#[test]
fn test_duplicate_point_skipped() {
    let p = DVec3::new(0.3, 0.1, 0.2);
    let d = Delaunay::build(&[p, p], 1.0);
    assert_eq!(d.points().len(), 5);
    assert_eq!(d.leaves().count(), 4);
}

#[test]
fn test_circumsphere_of_unit_corner() {
    let points = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z];
    let t = Tetra::new([0, 1, 2, 3], &points, None);

    assert_relative_eq!(t.circumcenter.x, 0.5, epsilon = 1e-12);
    assert_relative_eq!(t.circumcenter.y, 0.5, epsilon = 1e-12);
    assert_relative_eq!(t.circumcenter.z, 0.5, epsilon = 1e-12);
    assert_relative_eq!(t.circumradius, 0.75f64.sqrt(), epsilon = 1e-12);
    assert!(t.circumsphere_contains(DVec3::splat(0.5)));
    assert!(!t.circumsphere_contains(DVec3::splat(2.0)));
}

#[test]
fn test_flat_tetra_is_degenerate() {
    let points = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(1.0, 1.0, 0.0)];
    let t = Tetra::new([0, 1, 2, 3], &points, None);
    assert_eq!(t.determinant, 0.0);
    assert!(t.circumradius.is_infinite());
}

#[test]
fn test_interior_leaves_exclude_seed() {
    let d = Delaunay::build(&[DVec3::new(0.1, 0.1, 0.1)], 1.0);
    assert_eq!(d.interior_leaves().count(), 0);
}
