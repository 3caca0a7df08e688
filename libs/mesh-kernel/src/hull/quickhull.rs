//! # QuickHull Algorithm
//!
//! 3D convex hull after Barber, Dobkin and Huhdanpaa.

use std::collections::HashMap;

use config::constants::EPSILON;
use glam::DVec3;

use super::Hull;
use crate::error::MeshError;
use crate::indices::edge_key;

/// Computes the convex hull of a set of 3D points.
///
/// # Errors
///
/// `InsufficientPoints` for fewer than 4 distinct points,
/// `DegenerateGeometry` when every point is collinear or coplanar.
///
/// # Example
///
/// ```rust
/// use glam::DVec3;
/// use mesh_kernel::hull::convex_hull;
///
/// let hull = convex_hull(&[
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(1.0, 0.0, 0.0),
///     DVec3::new(0.0, 1.0, 0.0),
///     DVec3::new(0.0, 0.0, 1.0),
/// ])
/// .unwrap();
/// assert_eq!(hull.triangle_count(), 4);
/// ```
pub fn convex_hull(points: &[DVec3]) -> Result<Hull, MeshError> {
    let unique = remove_duplicates(points);
    if unique.len() < 4 {
        return Err(MeshError::insufficient_points(4, unique.len()));
    }

    let faces = build_initial_simplex(&unique)?;
    let faces = expand(faces, &unique);

    log::debug!(
        "convex hull: {} input points, {} hull triangles",
        points.len(),
        faces.len()
    );
    Ok(compact(&faces, &unique))
}

/// Triangle of the hull under construction.
#[derive(Debug, Clone)]
struct HullFace {
    vertices: [usize; 3],
    normal: DVec3,
    offset: f64,
    /// Points in front of this face
    outside: Vec<usize>,
}

impl HullFace {
    fn new(v0: usize, v1: usize, v2: usize, points: &[DVec3]) -> Self {
        let normal = (points[v1] - points[v0])
            .cross(points[v2] - points[v0])
            .normalize_or_zero();
        Self {
            vertices: [v0, v1, v2],
            normal,
            offset: normal.dot(points[v0]),
            outside: Vec::new(),
        }
    }

    /// Builds the face, flipping its winding if it faces `interior`.
    fn facing_away(v0: usize, v1: usize, v2: usize, interior: DVec3, points: &[DVec3]) -> Self {
        let face = Self::new(v0, v1, v2, points);
        let center = (points[v0] + points[v1] + points[v2]) / 3.0;
        if face.normal.dot(interior - center) > 0.0 {
            Self::new(v0, v2, v1, points)
        } else {
            face
        }
    }

    fn distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.offset
    }

    fn sees(&self, point: DVec3) -> bool {
        self.distance(point) > EPSILON
    }

    fn farthest(&self, points: &[DVec3]) -> Option<usize> {
        self.outside
            .iter()
            .copied()
            .max_by(|&a, &b| self.distance(points[a]).total_cmp(&self.distance(points[b])))
    }
}

fn remove_duplicates(points: &[DVec3]) -> Vec<DVec3> {
    let mut unique: Vec<DVec3> = Vec::with_capacity(points.len());
    for p in points {
        if !unique.iter().any(|u| u.distance(*p) < EPSILON) {
            unique.push(*p);
        }
    }
    unique
}

fn build_initial_simplex(points: &[DVec3]) -> Result<Vec<HullFace>, MeshError> {
    let mut extremes = [0usize; 6];
    for (i, p) in points.iter().enumerate() {
        for axis in 0..3 {
            if p[axis] < points[extremes[axis * 2]][axis] {
                extremes[axis * 2] = i;
            }
            if p[axis] > points[extremes[axis * 2 + 1]][axis] {
                extremes[axis * 2 + 1] = i;
            }
        }
    }

    let (p0, p1) = farthest_pair(&extremes, points);
    if points[p0].distance(points[p1]) < EPSILON {
        return Err(MeshError::degenerate("all hull points coincide"));
    }
    let p2 = farthest_from_line(p0, p1, points)?;
    let p3 = farthest_from_plane(p0, p1, p2, points)?;

    let interior = (points[p0] + points[p1] + points[p2] + points[p3]) / 4.0;
    let mut faces = vec![
        HullFace::facing_away(p0, p1, p2, interior, points),
        HullFace::facing_away(p0, p2, p3, interior, points),
        HullFace::facing_away(p0, p3, p1, interior, points),
        HullFace::facing_away(p1, p3, p2, interior, points),
    ];

    let seeds = [p0, p1, p2, p3];
    let rest: Vec<usize> = (0..points.len()).filter(|i| !seeds.contains(i)).collect();
    assign(&mut faces, &rest, points);
    Ok(faces)
}

fn farthest_pair(candidates: &[usize], points: &[DVec3]) -> (usize, usize) {
    let mut best = (candidates[0], candidates[1]);
    let mut best_dist = -1.0;
    for (i, &a) in candidates.iter().enumerate() {
        for &b in &candidates[i + 1..] {
            let d = points[a].distance_squared(points[b]);
            if d > best_dist {
                best_dist = d;
                best = (a, b);
            }
        }
    }
    best
}

fn farthest_from_line(p0: usize, p1: usize, points: &[DVec3]) -> Result<usize, MeshError> {
    let dir = (points[p1] - points[p0]).normalize();
    let mut best = None;
    let mut best_dist = EPSILON;
    for (i, p) in points.iter().enumerate() {
        let v = *p - points[p0];
        let d = (v - v.dot(dir) * dir).length();
        if d > best_dist {
            best_dist = d;
            best = Some(i);
        }
    }
    best.ok_or_else(|| MeshError::degenerate("hull points are collinear"))
}

fn farthest_from_plane(p0: usize, p1: usize, p2: usize, points: &[DVec3]) -> Result<usize, MeshError> {
    let normal = (points[p1] - points[p0])
        .cross(points[p2] - points[p0])
        .normalize();
    let mut best = None;
    let mut best_dist = EPSILON;
    for (i, p) in points.iter().enumerate() {
        let d = normal.dot(*p - points[p0]).abs();
        if d > best_dist {
            best_dist = d;
            best = Some(i);
        }
    }
    best.ok_or_else(|| MeshError::degenerate("hull points are coplanar"))
}

fn assign(faces: &mut [HullFace], candidates: &[usize], points: &[DVec3]) {
    for &idx in candidates {
        if let Some(face) = faces.iter_mut().find(|f| f.sees(points[idx])) {
            face.outside.push(idx);
        }
    }
}

fn expand(mut faces: Vec<HullFace>, points: &[DVec3]) -> Vec<HullFace> {
    // Each point is consumed at most once, so this bound is never reached on
    // well-formed input.
    let max_rounds = points.len() * 2;

    for _ in 0..max_rounds {
        let Some(apex) = faces
            .iter()
            .find(|f| !f.outside.is_empty())
            .and_then(|f| f.farthest(points))
        else {
            break;
        };

        let visible: Vec<usize> = faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.sees(points[apex]))
            .map(|(i, _)| i)
            .collect();
        if visible.is_empty() {
            log::warn!("convex hull: apex {} sees no face", apex);
            for face in &mut faces {
                face.outside.retain(|&p| p != apex);
            }
            continue;
        }

        let horizon = horizon_edges(&faces, &visible);

        let mut orphans: Vec<usize> = visible
            .iter()
            .flat_map(|&i| faces[i].outside.iter().copied())
            .filter(|&p| p != apex)
            .collect();
        orphans.sort_unstable();
        orphans.dedup();

        for &i in visible.iter().rev() {
            faces.swap_remove(i);
        }

        let interior = hull_centroid(&faces, points);
        let start = faces.len();
        for (a, b) in horizon {
            faces.push(HullFace::facing_away(a, b, apex, interior, points));
        }
        assign(&mut faces[start..], &orphans, points);
    }

    faces
}

/// Edges used by exactly one visible face, in that face's winding.
fn horizon_edges(faces: &[HullFace], visible: &[usize]) -> Vec<(usize, usize)> {
    let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
    let edges_of = |i: usize| {
        let [a, b, c] = faces[i].vertices;
        [(a, b), (b, c), (c, a)]
    };
    for &i in visible {
        for (a, b) in edges_of(i) {
            *counts.entry(edge_key(a, b)).or_insert(0) += 1;
        }
    }
    visible
        .iter()
        .flat_map(|&i| edges_of(i))
        .filter(|&(a, b)| counts[&edge_key(a, b)] == 1)
        .collect()
}

fn hull_centroid(faces: &[HullFace], points: &[DVec3]) -> DVec3 {
    let mut used: Vec<usize> = faces.iter().flat_map(|f| f.vertices).collect();
    used.sort_unstable();
    used.dedup();
    if used.is_empty() {
        return DVec3::ZERO;
    }
    used.iter().map(|&i| points[i]).sum::<DVec3>() / used.len() as f64
}

fn compact(faces: &[HullFace], points: &[DVec3]) -> Hull {
    let mut used: Vec<usize> = faces.iter().flat_map(|f| f.vertices).collect();
    used.sort_unstable();
    used.dedup();

    let remap: HashMap<usize, usize> = used.iter().enumerate().map(|(new, &old)| (old, new)).collect();
    Hull {
        points: used.iter().map(|&i| points[i]).collect(),
        triangles: faces
            .iter()
            .map(|f| f.vertices.map(|v| remap[&v]))
            .collect(),
    }
}
