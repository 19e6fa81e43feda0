// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Great circles and the half-spaces they bound.
//
// A directed edge a→b of a contour bounds the half-space on the positive side
// of b × a. Contour interiors lie on that side of every edge.

use crate::cap::SphericalCap;
use crate::vector::Vec3d;

/// Point pairs closer than this cosine have no reliable great circle.
const NEAR_COINCIDENT: f64 = 1.0 - 1e-10;

/// Intersection of the great circle through `p1`,`p2` with the one through
/// `p3`,`p4`, picking the candidate nearer the midpoint of `p1`,`p2`.
pub fn great_circle_intersection(p1: &Vec3d, p2: &Vec3d, p3: &Vec3d, p4: &Vec3d) -> Option<Vec3d> {
    if p3.dot(p4) > NEAR_COINCIDENT {
        return None;
    }
    let n2 = p3.cross(p4).normalize();
    great_circle_intersection_with_normal(p1, p2, &n2)
}

/// Intersection of the great circle through `p1`,`p2` with the plane of unit
/// normal `n2`. `None` when `p1` and `p2` nearly coincide or the two planes
/// are parallel.
pub fn great_circle_intersection_with_normal(p1: &Vec3d, p2: &Vec3d, n2: &Vec3d) -> Option<Vec3d> {
    if p1.dot(p2) > NEAR_COINCIDENT {
        return None;
    }
    debug_assert!((n2.norm_squared() - 1.0).abs() < 1e-8);
    let n1 = p1.cross(p2).normalize();
    let u = n1.cross(n2);
    if u.norm() < 1e-7 {
        return None;
    }
    let u = u.normalize();
    if (p1 + p2).dot(&u) > 0.0 {
        Some(u)
    } else {
        Some(-u)
    }
}

/// The two points where the boundary circles of `h1` and `h2` cross.
///
/// The planes `n·p = d` meet in a line which is intersected with the unit
/// sphere. `None` when the caps do not intersect, the planes are parallel or
/// the circles only touch.
pub fn plane_intersect2(h1: &SphericalCap, h2: &SphericalCap) -> Option<(Vec3d, Vec3d)> {
    if !h1.intersects_cap(h2) {
        return None;
    }
    let (n1, n2) = (&h1.n, &h2.n);
    let (d1, d2) = (-h1.d, -h2.d);
    let u = n1.cross(n2);
    if u == Vec3d::zeros() {
        return None;
    }
    let u = u.normalize();

    // Start the line where it crosses the coordinate plane it is most
    // perpendicular to.
    let (ax, ay, az) = (u.x.abs(), u.y.abs(), u.z.abs());
    let max_i = if ax >= ay {
        if ax >= az {
            0
        } else {
            2
        }
    } else if az > ay {
        2
    } else {
        1
    };
    let mut p0 = Vec3d::zeros();
    match max_i {
        0 => {
            let denom = n1.y * n2.z - n2.y * n1.z;
            p0.y = (d2 * n1.z - d1 * n2.z) / denom;
            p0.z = (d1 * n2.y - d2 * n1.y) / denom;
        }
        1 => {
            let denom = n1.x * n2.z - n2.x * n1.z;
            p0.x = (n1.z * d2 - n2.z * d1) / denom;
            p0.z = (n2.x * d1 - d2 * n1.x) / denom;
        }
        _ => {
            let denom = n1.x * n2.y - n2.x * n1.y;
            p0.x = (n1.y * d2 - n2.y * d1) / denom;
            p0.y = (n2.x * d1 - n1.x * d2) / denom;
        }
    }

    // |p0 + t u|² = 1
    let b = 2.0 * p0.dot(&u);
    let c = p0.norm_squared() - 1.0;
    let disc = b * b - 4.0 * c;
    if disc <= 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    Some((p0 + u * ((-b + sqrt_disc) / 2.0), p0 + u * ((-b - sqrt_disc) / 2.0)))
}

/// Whether `p` lies in the half-space bounded by the directed edge `v2`→`v1`.
#[inline]
pub fn side_half_space_contains(v1: &Vec3d, v2: &Vec3d, p: &Vec3d) -> bool {
    v1.cross(v2).dot(p) >= -1e-17
}

pub fn side_half_space_contains_cap(v1: &Vec3d, v2: &Vec3d, cap: &SphericalCap) -> bool {
    SphericalCap::new(v1.cross(v2).normalize(), 0.0).contains_cap(cap)
}

pub fn side_half_space_intersects(v1: &Vec3d, v2: &Vec3d, cap: &SphericalCap) -> bool {
    cap.intersects_cap(&SphericalCap::new(v1.cross(v2).normalize(), 0.0))
}

/// Largest `n·p` over the minor great-circle arc from `a` to `b`.
pub fn arc_max_dot(n: &Vec3d, a: &Vec3d, b: &Vec3d) -> f64 {
    let ends = n.dot(a).max(n.dot(b));
    let c = a.cross(b);
    let c_len2 = c.norm_squared();
    if c_len2 < 1e-30 {
        return ends;
    }
    // Projection of n on the arc's plane; its direction is where n·p peaks.
    let q = n - c * (n.dot(&c) / c_len2);
    if q.norm_squared() < 1e-30 {
        return ends;
    }
    let inside_arc = a.cross(&q).dot(&c) >= 0.0 && q.cross(b).dot(&c) >= 0.0;
    if inside_arc {
        ends.max(q.norm())
    } else {
        ends
    }
}

/// Smallest `n·p` over the minor great-circle arc from `a` to `b`.
#[inline]
pub fn arc_min_dot(n: &Vec3d, a: &Vec3d, b: &Vec3d) -> f64 {
    -arc_max_dot(&-n, a, b)
}

/// Whether `p` is inside the convex contour given by its vertices.
pub fn convex_contour_contains(contour: &[Vec3d], p: &Vec3d) -> bool {
    contour
        .iter()
        .zip(contour.iter().cycle().skip(1))
        .all(|(a, b)| side_half_space_contains(b, a, p))
}
