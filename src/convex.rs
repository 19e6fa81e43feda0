// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Convex spherical polygons, tested edge by edge without tessellation.

use std::f64::consts::PI;

use crate::cap::SphericalCap;
use crate::great_circle::{
    arc_min_dot, convex_contour_contains, side_half_space_contains, side_half_space_contains_cap,
};
use crate::octahedron::OctahedronPolygon;
use crate::vector::{angle_between, normalized_or, Vec3d};

/// Directed edges `(a, b)` of a closed contour, the last one wrapping around.
fn edges(contour: &[Vec3d]) -> impl Iterator<Item = (&Vec3d, &Vec3d)> {
    contour.iter().zip(contour.iter().cycle().skip(1))
}

/// A convex polygon given by its vertices, interior on the positive side of
/// every `c[i+1] × c[i]`.
///
/// Validity (every angle below 180°, at least 3 vertices) is a precondition
/// that [`check_valid`](Self::check_valid) can verify but nothing enforces.
#[derive(Clone, Debug, PartialEq)]
pub struct SphericalConvexPolygon {
    contour: Vec<Vec3d>,
    cached_bounding_cap: SphericalCap,
}

impl SphericalConvexPolygon {
    pub fn new(contour: Vec<Vec3d>) -> Self {
        let cached_bounding_cap = bounding_cap_of_contour(&contour);
        SphericalConvexPolygon {
            contour,
            cached_bounding_cap,
        }
    }

    pub fn from_triangle(a: Vec3d, b: Vec3d, c: Vec3d) -> Self {
        Self::new(vec![a, b, c])
    }

    pub fn contour(&self) -> &[Vec3d] {
        &self.contour
    }

    pub fn check_valid(&self) -> bool {
        Self::check_valid_contour(&self.contour)
    }

    /// Whether every vertex lies inside the half-space of every edge it is
    /// not an end of.
    pub fn check_valid_contour(contour: &[Vec3d]) -> bool {
        let n = contour.len();
        if n < 3 {
            return false;
        }
        (0..n).all(|i| {
            let (a, b) = (&contour[i], &contour[(i + 1) % n]);
            (2..n).all(|k| side_half_space_contains(b, a, &contour[(i + k) % n]))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.contour.is_empty()
    }

    /// Area in steradians, summed over a fan of triangles from vertex 0.
    pub fn get_area(&self) -> f64 {
        let c = &self.contour;
        if c.len() < 3 {
            return 0.0;
        }
        (1..c.len() - 1)
            .map(|i| {
                let v1 = c[0].cross(&c[i]);
                let v2 = c[i].cross(&c[i + 1]);
                let v3 = c[i + 1].cross(&c[0]);
                2.0 * PI - angle_between(&v1, &v2) - angle_between(&v2, &v3) - angle_between(&v3, &v1)
            })
            .sum()
    }

    /// A point inside the first three vertices.
    pub fn get_point_inside(&self) -> Option<Vec3d> {
        match self.contour.as_slice() {
            [a, b, c, ..] => Some((a + b + c).normalize()),
            _ => None,
        }
    }

    pub fn get_bounding_cap(&self) -> SphericalCap {
        self.cached_bounding_cap
    }

    /// The hemispheres whose intersection is the polygon, one per edge.
    pub fn get_bounding_spherical_caps(&self) -> Vec<SphericalCap> {
        edges(&self.contour)
            .map(|(a, b)| SphericalCap::new(b.cross(a), 0.0))
            .collect()
    }

    pub fn contains_point(&self, p: &Vec3d) -> bool {
        self.cached_bounding_cap.contains(p) && convex_contour_contains(&self.contour, p)
    }

    pub fn contains_cap(&self, c: &SphericalCap) -> bool {
        self.cached_bounding_cap.contains_cap(c)
            && edges(&self.contour).all(|(a, b)| side_half_space_contains_cap(b, a, c))
    }

    /// Whether all the given vertices are inside. For a convex contour this
    /// is containment of the contour.
    pub fn contains_convex_contour(&self, vertices: &[Vec3d]) -> bool {
        vertices.iter().all(|v| self.contains_point(v))
    }

    pub fn contains_convex(&self, other: &SphericalConvexPolygon) -> bool {
        self.cached_bounding_cap.intersects_cap(&other.cached_bounding_cap)
            && self.contains_convex_contour(&other.contour)
    }

    /// Containment of a triangle soup, as produced by a polygon fill array.
    pub fn contains_triangles(&self, cap: &SphericalCap, triangles: &[Vec3d]) -> bool {
        self.cached_bounding_cap.intersects_cap(cap)
            && triangles.chunks_exact(3).all(|t| self.contains_convex_contour(t))
    }

    /// Whether one edge of `contour` has every point strictly outside.
    pub fn are_all_points_outside_one_side(contour: &[Vec3d], points: &[Vec3d]) -> bool {
        edges(contour).any(|(a, b)| points.iter().all(|p| !side_half_space_contains(b, a, p)))
    }

    pub fn intersects_convex(&self, other: &SphericalConvexPolygon) -> bool {
        self.cached_bounding_cap.intersects_cap(&other.cached_bounding_cap)
            && !Self::are_all_points_outside_one_side(&self.contour, &other.contour)
            && !Self::are_all_points_outside_one_side(&other.contour, &self.contour)
    }

    pub fn intersects_triangles(&self, cap: &SphericalCap, triangles: &[Vec3d]) -> bool {
        self.cached_bounding_cap.intersects_cap(cap)
            && triangles.chunks_exact(3).any(|t| {
                !Self::are_all_points_outside_one_side(&self.contour, t)
                    && !Self::are_all_points_outside_one_side(t, &self.contour)
            })
    }

    pub fn get_octahedron_polygon(&self) -> OctahedronPolygon {
        OctahedronPolygon::from_contour(&self.contour)
    }
}

/// Cap around the vertex mean whose radius reaches the farthest point of
/// any edge.
fn bounding_cap_of_contour(contour: &[Vec3d]) -> SphericalCap {
    if contour.is_empty() {
        return SphericalCap::new(Vec3d::x(), 2.0);
    }
    let n = normalized_or(contour.iter().sum::<Vec3d>(), Vec3d::x());
    let mut d = if convex_contour_contains(contour, &-n) {
        -1.0
    } else {
        edges(contour)
            .map(|(a, b)| arc_min_dot(&n, a, b))
            .fold(1.0, f64::min)
    };
    d *= if d > 0.0 { 0.9999999 } else { 1.0000001 };
    SphericalCap::new(n, d)
}
