// Copyright 2025 Lars Brubaker
// Shared test utilities for spherical-regions tests.

#![allow(dead_code)]

use spherical_regions::vector::radec_deg_to_vec;
use spherical_regions::{
    SphericalCap, SphericalConvexPolygon, SphericalPolygon, SphericalRegion, TessVertex, Vec3d,
};

/// Square in ra/dec degrees centred on `(ra, dec)`, wound with its interior
/// on the positive side of every edge.
pub fn square(ra: f64, dec: f64, half: f64) -> Vec<Vec3d> {
    vec![
        radec_deg_to_vec(ra - half, dec - half),
        radec_deg_to_vec(ra - half, dec + half),
        radec_deg_to_vec(ra + half, dec + half),
        radec_deg_to_vec(ra + half, dec - half),
    ]
}

pub fn polygon_square(ra: f64, dec: f64, half: f64) -> SphericalRegion {
    SphericalPolygon::new(&square(ra, dec, half)).into()
}

pub fn convex_square(ra: f64, dec: f64, half: f64) -> SphericalRegion {
    SphericalConvexPolygon::new(square(ra, dec, half)).into()
}

pub fn cap(ra: f64, dec: f64, radius_deg: f64) -> SphericalRegion {
    SphericalCap::from_radius(radec_deg_to_vec(ra, dec), radius_deg.to_radians()).into()
}

/// A spread of region kinds and sizes for property tests.
pub fn sample_regions() -> Vec<(&'static str, SphericalRegion)> {
    vec![
        ("small polygon", polygon_square(0.0, 0.0, 5.0)),
        ("shifted polygon", polygon_square(4.0, 3.0, 4.0)),
        ("polygon across faces", polygon_square(89.0, 1.0, 6.0)),
        ("convex", convex_square(-3.0, -2.0, 6.0)),
        ("small cap", cap(2.0, 1.0, 4.0)),
        ("large cap", cap(30.0, 60.0, 50.0)),
        ("far polygon", polygon_square(180.0, 0.0, 5.0)),
    ]
}

/// Grid of directions on the sky, offset so that no point lies on the
/// integer-degree boundaries used by the test shapes.
pub fn test_grid(step_deg: f64) -> Vec<Vec3d> {
    let mut points = Vec::new();
    let mut dec = -84.63;
    while dec < 85.0 {
        let mut ra = 0.37;
        while ra < 360.0 {
            points.push(radec_deg_to_vec(ra, dec));
            ra += step_deg;
        }
        dec += step_deg;
    }
    points
}

/// Asserts that two regions agree on every grid point.
pub fn assert_same_membership(a: &SphericalRegion, b: &SphericalRegion, grid: &[Vec3d], label: &str) {
    for p in grid {
        assert_eq!(
            a.contains_point(p),
            b.contains_point(p),
            "{label}: membership differs at {p:?}"
        );
    }
}

/// Planar contour in the z = 0 plane, every segment on the boundary.
pub fn planar_contour(points: &[(f64, f64)]) -> Vec<TessVertex> {
    points
        .iter()
        .map(|&(x, y)| TessVertex::new([x, y, 0.0], true))
        .collect()
}

/// Signed area of a triangle in the xy plane.
pub fn triangle_area(t: &[TessVertex; 3]) -> f64 {
    let [a, b, c] = t.map(|v| v.coords);
    0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1]))
}

pub fn total_signed_area(triangles: &[[TessVertex; 3]]) -> f64 {
    triangles.iter().map(triangle_area).sum()
}

pub fn total_area(triangles: &[[TessVertex; 3]]) -> f64 {
    triangles.iter().map(|t| triangle_area(t).abs()).sum()
}

/// Every output vertex is finite and every triangle has some area.
pub fn verify_valid_output(triangles: &[[TessVertex; 3]]) {
    for (i, t) in triangles.iter().enumerate() {
        for v in t {
            assert!(
                v.coords.iter().all(|c| c.is_finite()),
                "triangle {i} has a non-finite vertex {:?}",
                v.coords
            );
        }
        assert!(triangle_area(t).abs() > 1e-12, "triangle {i} is degenerate: {t:?}");
    }
}
