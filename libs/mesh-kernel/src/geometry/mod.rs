//! # Geometry Helpers
//!
//! The thin layer the kernel adds on top of `glam`: oriented planes,
//! look-at frames, Newell normals, barycentric containment and 4x4
//! determinants.

mod frame;
mod plane;

pub use frame::Frame;
pub use plane::{Plane, Side};

use glam::DVec3;

/// Unnormalized Newell normal of a closed loop.
///
/// The length equals twice the polygon's area for planar loops.
pub fn newell_normal(positions: &[DVec3], indices: &[usize]) -> DVec3 {
    let n = indices.len();
    let mut normal = DVec3::ZERO;
    for i in 0..n {
        let a = positions[indices[i]];
        let b = positions[indices[(i + 1) % n]];
        normal += a.cross(b);
    }
    normal
}

/// Area of a planar loop.
pub fn polygon_area(positions: &[DVec3], indices: &[usize]) -> f64 {
    newell_normal(positions, indices).length() * 0.5
}

/// Average of the indexed positions, `None` for an empty list.
pub fn centroid(positions: &[DVec3], indices: &[usize]) -> Option<DVec3> {
    if indices.is_empty() {
        return None;
    }
    let sum: DVec3 = indices.iter().map(|&i| positions[i]).sum();
    Some(sum / indices.len() as f64)
}

/// Strict barycentric containment of `point` in triangle `(a, b, c)`.
///
/// Points on an edge or a vertex are outside. Degenerate triangles contain
/// nothing.
pub fn point_in_triangle(point: DVec3, a: DVec3, b: DVec3, c: DVec3) -> bool {
    let e0 = a - c;
    let e1 = b - c;
    let normal = e0.cross(e1);
    let area2 = normal.length_squared();
    if area2 == 0.0 {
        return false;
    }
    let pc = point - c;
    let b0 = normal.dot(pc.cross(e1));
    if b0 <= 0.0 {
        return false;
    }
    let b1 = normal.dot(e0.cross(pc));
    if b1 <= 0.0 {
        return false;
    }
    area2 - b0 - b1 > 0.0
}

/// Determinant of the 4x4 matrix whose rows are `[p.x, p.y, p.z, 1]`.
///
/// Its sign gives the orientation of the tetrahedron `(p0, p1, p2, p3)`.
pub fn orientation_det(p0: DVec3, p1: DVec3, p2: DVec3, p3: DVec3) -> f64 {
    det4([
        [p0.x, p0.y, p0.z, 1.0],
        [p1.x, p1.y, p1.z, 1.0],
        [p2.x, p2.y, p2.z, 1.0],
        [p3.x, p3.y, p3.z, 1.0],
    ])
}

/// Determinant of a row-major 4x4 matrix by cofactor expansion.
pub fn det4(m: [[f64; 4]; 4]) -> f64 {
    let det3 = |a: [[f64; 3]; 3]| {
        a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
            - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
            + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0])
    };
    let minor = |skip: usize| {
        let mut rows = [[0.0; 3]; 3];
        let mut r = 0;
        for (i, row) in m.iter().enumerate() {
            if i == skip {
                continue;
            }
            rows[r] = [row[1], row[2], row[3]];
            r += 1;
        }
        det3(rows)
    };
    m[0][0] * minor(0) - m[1][0] * minor(1) + m[2][0] * minor(2) - m[3][0] * minor(3)
}

/// Unsigned angle between two vectors, zero if either has no length.
pub fn angle_between(a: DVec3, b: DVec3) -> f64 {
    if a.length_squared() == 0.0 || b.length_squared() == 0.0 {
        return 0.0;
    }
    a.angle_between(b)
}
