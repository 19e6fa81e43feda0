// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Spherical caps: the part of the sphere on one side of a plane.

use std::f64::consts::PI;

use crate::great_circle::{arc_max_dot, arc_min_dot, convex_contour_contains, plane_intersect2};
use crate::octahedron::OctahedronPolygon;
use crate::vector::{angle_between, rotate, Vec3d};

/// Number of vertices of the polygon standing in for a cap boundary.
const OUTLINE_STEPS: usize = 40;

/// The points `p` of the unit sphere with `p·n >= d`.
///
/// `n` is a unit vector and `d` the cosine of the angular radius. `d <= -1`
/// covers the whole sphere; `d > 1` is empty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphericalCap {
    pub n: Vec3d,
    pub d: f64,
}

impl Default for SphericalCap {
    /// The full sphere.
    fn default() -> Self {
        SphericalCap { n: Vec3d::x(), d: -1.0 }
    }
}

impl SphericalCap {
    pub fn new(n: Vec3d, d: f64) -> Self {
        SphericalCap { n, d }
    }

    /// Cap of angular `radius` (radians) around `n`.
    pub fn from_radius(n: Vec3d, radius: f64) -> Self {
        SphericalCap { n, d: radius.cos() }
    }

    #[inline]
    pub fn contains(&self, p: &Vec3d) -> bool {
        p.dot(&self.n) >= self.d
    }

    pub fn contains_cap(&self, h: &SphericalCap) -> bool {
        if self.is_full() || h.is_empty() {
            return true;
        }
        let a = self.n.dot(&h.n) - self.d * h.d;
        self.d <= h.d && (a >= 1.0 || (a >= 0.0 && a * a >= (1.0 - self.d * self.d) * (1.0 - h.d * h.d)))
    }

    pub fn intersects_cap(&self, h: &SphericalCap) -> bool {
        if self.is_empty() || h.is_empty() {
            return false;
        }
        let a = self.d * h.d - self.n.dot(&h.n);
        self.d + h.d <= 0.0 || a <= 0.0 || (a <= 1.0 && a * a < (1.0 - self.d * self.d) * (1.0 - h.d * h.d))
    }

    /// Solid angle in steradians.
    pub fn get_area(&self) -> f64 {
        2.0 * PI * (1.0 - self.d)
    }

    /// Angular radius in radians.
    pub fn get_radius(&self) -> f64 {
        self.d.clamp(-1.0, 1.0).acos()
    }

    pub fn is_empty(&self) -> bool {
        self.d > 1.0
    }

    pub fn is_full(&self) -> bool {
        self.d <= -1.0
    }

    /// The same cap with its radius grown by `margin` radians, at most to the
    /// whole sphere.
    pub fn get_enlarged(&self, margin: f64) -> SphericalCap {
        let radius = (self.get_radius() + margin).min(PI);
        SphericalCap::new(self.n, radius.cos())
    }

    /// Overlap of two caps relative to their sizes: 0 when disjoint, the
    /// ratio of the radii when one contains the other.
    pub fn relative_diameter_overlap(c1: &SphericalCap, c2: &SphericalCap) -> f64 {
        if !c1.intersects_cap(c2) {
            return 0.0;
        }
        if c1.contains_cap(c2) {
            return c2.get_radius() / c1.get_radius();
        }
        if c2.contains_cap(c1) {
            return c1.get_radius() / c2.get_radius();
        }
        let r1 = c1.get_radius();
        let r2 = c2.get_radius();
        let a = angle_between(&c1.n, &c2.n);
        let overlap = (a - r1 - r2) / ((r1 - r2).abs() - r1 - r2);
        debug_assert!(overlap >= 0.0);
        overlap * (r1 / r2).min(r2 / r1)
    }

    /// Clips the great-circle arc `v1`→`v2` to the cap. Returns the clipped
    /// endpoints, or `None` when no part of the arc is inside.
    pub fn clip_great_circle(&self, v1: Vec3d, v2: Vec3d) -> Option<(Vec3d, Vec3d)> {
        if v1 == v2 {
            return self.contains(&v1).then_some((v1, v2));
        }
        let (in1, in2) = (self.contains(&v1), self.contains(&v2));
        if in1 && in2 {
            return Some((v1, v2));
        }
        let plane = SphericalCap::new(v1.cross(&v2).normalize(), 0.0);
        let (p, pp) = plane_intersect2(self, &plane)?;
        let cos_dist = v1.dot(&v2);
        let on_arc = |q: &Vec3d| v1.dot(q) >= cos_dist && v2.dot(q) >= cos_dist;
        match (in1, in2) {
            (true, false) => Some((v1, if on_arc(&p) { p } else { pp })),
            (false, true) => Some((if on_arc(&p) { p } else { pp }, v2)),
            _ => (on_arc(&p) && on_arc(&pp)).then_some((p, pp)),
        }
    }

    /// Closed polygon approximating the boundary circle, wound so that the
    /// cap is its interior.
    pub fn get_closed_outline_contour(&self) -> Vec<Vec3d> {
        let mut axis = self.n.cross(&Vec3d::x());
        if axis.norm_squared() < 0.1 {
            axis = self.n.cross(&Vec3d::y());
        }
        let mut p = rotate(&self.n, &axis, self.get_radius());
        let step = -2.0 * PI / OUTLINE_STEPS as f64;
        let mut contour = Vec::with_capacity(OUTLINE_STEPS);
        for _ in 0..OUTLINE_STEPS {
            contour.push(p);
            p = rotate(&p, &self.n, step);
        }
        contour
    }

    /// Tessellated form of the cap. Caps larger than a hemisphere are built
    /// as the whole sky minus the complementary cap.
    pub fn get_octahedron_polygon(&self) -> OctahedronPolygon {
        if self.is_empty() {
            return OctahedronPolygon::new();
        }
        if self.d >= 0.0 {
            return OctahedronPolygon::from_contour(&self.get_closed_outline_contour());
        }
        let mut poly = OctahedronPolygon::all_sky();
        if !self.is_full() {
            let complement = SphericalCap::new(-self.n, -self.d);
            poly.in_place_subtraction(&complement.get_octahedron_polygon());
        }
        poly
    }

    /// Whether the cap meets the convex contour. Exact: either a vertex is in
    /// the cap, the contour surrounds the centre, or an edge passes within
    /// the radius.
    pub fn intersects_convex_contour(&self, contour: &[Vec3d]) -> bool {
        if self.is_empty() || contour.is_empty() {
            return false;
        }
        if contour.iter().any(|v| self.contains(v)) {
            return true;
        }
        if convex_contour_contains(contour, &self.n) {
            return true;
        }
        contour
            .iter()
            .zip(contour.iter().cycle().skip(1))
            .any(|(a, b)| arc_max_dot(&self.n, a, b) >= self.d)
    }

    /// Whether the whole convex contour and its interior are in the cap.
    pub fn contains_convex_contour(&self, contour: &[Vec3d]) -> bool {
        if self.is_full() {
            return true;
        }
        let boundary_inside = contour
            .iter()
            .zip(contour.iter().cycle().skip(1))
            .all(|(a, b)| arc_min_dot(&self.n, a, b) >= self.d);
        // With the boundary inside, the interior could still wrap around the
        // far side, which then holds -n.
        boundary_inside && !convex_contour_contains(contour, &-self.n)
    }

    /// Whether the cap meets any of the triangles of a flat triangle list.
    pub fn intersects_triangles(&self, triangles: &[Vec3d]) -> bool {
        triangles.chunks_exact(3).any(|t| self.intersects_convex_contour(t))
    }

    pub fn contains_triangles(&self, triangles: &[Vec3d]) -> bool {
        triangles.chunks_exact(3).all(|t| self.contains_convex_contour(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::radec_deg_to_vec;
    use approx::assert_abs_diff_eq;

    fn cap_deg(ra: f64, dec: f64, aperture: f64) -> SphericalCap {
        SphericalCap::from_radius(radec_deg_to_vec(ra, dec), aperture.to_radians())
    }

    #[test]
    fn point_containment() {
        let c = cap_deg(0.0, 0.0, 10.0);
        assert!(c.contains(&radec_deg_to_vec(5.0, 5.0)));
        assert!(!c.contains(&radec_deg_to_vec(11.0, 0.0)));
    }

    #[test]
    fn cap_pairs() {
        let big = cap_deg(0.0, 0.0, 20.0);
        let small = cap_deg(5.0, 0.0, 5.0);
        let far = cap_deg(60.0, 0.0, 5.0);
        assert!(big.contains_cap(&small));
        assert!(!small.contains_cap(&big));
        assert!(big.intersects_cap(&small));
        assert!(!big.intersects_cap(&far));
        assert!(cap_deg(0.0, 0.0, 56.0).intersects_cap(&far));
    }

    #[test]
    fn zero_aperture_cap_behaves_like_its_centre() {
        let query = cap_deg(10.0, 10.0, 10.0);
        let inside = cap_deg(12.0, 8.0, 0.0);
        let outside = cap_deg(40.0, 8.0, 0.0);
        assert!(query.intersects_cap(&inside));
        assert!(!query.intersects_cap(&outside));
        assert!(!inside.is_empty());
        assert!(inside.contains(&inside.n));
    }

    #[test]
    fn area_and_enlargement() {
        let hemisphere = SphericalCap::new(Vec3d::z(), 0.0);
        assert_abs_diff_eq!(hemisphere.get_area(), 2.0 * PI);
        let grown = hemisphere.get_enlarged(PI);
        assert_abs_diff_eq!(grown.d, -1.0);
        assert!(grown.is_full());
    }

    #[test]
    fn outline_is_on_the_boundary_and_wraps_the_cap() {
        let c = cap_deg(30.0, 40.0, 10.0);
        let contour = c.get_closed_outline_contour();
        assert_eq!(contour.len(), 40);
        for v in &contour {
            assert_abs_diff_eq!(v.dot(&c.n), c.d, epsilon = 1e-12);
        }
        assert!(convex_contour_contains(&contour, &c.n));
    }

    #[test]
    fn clipping_an_arc_through_the_cap() {
        let c = cap_deg(0.0, 0.0, 10.0);
        let (a, b) = c
            .clip_great_circle(radec_deg_to_vec(-30.0, 0.0), radec_deg_to_vec(30.0, 0.0))
            .unwrap();
        assert_abs_diff_eq!(a.dot(&c.n), c.d, epsilon = 1e-9);
        assert_abs_diff_eq!(b.dot(&c.n), c.d, epsilon = 1e-9);
        assert!(c
            .clip_great_circle(radec_deg_to_vec(-30.0, 40.0), radec_deg_to_vec(30.0, 40.0))
            .is_none());
    }

    #[test]
    fn clipping_keeps_the_inside_endpoint() {
        let c = cap_deg(0.0, 0.0, 10.0);
        let start = radec_deg_to_vec(0.0, 0.0);
        let (a, b) = c.clip_great_circle(start, radec_deg_to_vec(30.0, 0.0)).unwrap();
        assert_eq!(a, start);
        assert_abs_diff_eq!(b, radec_deg_to_vec(10.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn relative_overlap() {
        let a = cap_deg(0.0, 0.0, 10.0);
        assert_abs_diff_eq!(SphericalCap::relative_diameter_overlap(&a, &a), 1.0, epsilon = 1e-12);
        let b = cap_deg(0.0, 0.0, 5.0);
        assert_abs_diff_eq!(SphericalCap::relative_diameter_overlap(&a, &b), 0.5, epsilon = 1e-12);
        let far = cap_deg(90.0, 0.0, 5.0);
        assert_eq!(SphericalCap::relative_diameter_overlap(&a, &far), 0.0);
        let partial = cap_deg(12.0, 0.0, 5.0);
        let r = SphericalCap::relative_diameter_overlap(&a, &partial);
        assert!(r > 0.0 && r < 1.0);
    }

    #[test]
    fn cap_against_a_triangle() {
        let tri = [Vec3d::z(), Vec3d::y(), Vec3d::x()];
        let centre = Vec3d::new(1.0, 1.0, 1.0).normalize();
        // Entirely inside the triangle, no vertex in the cap.
        let inner = SphericalCap::from_radius(centre, 0.1);
        assert!(inner.intersects_convex_contour(&tri));
        assert!(!inner.contains_convex_contour(&tri));
        // Grazing an edge from outside.
        let grazing = SphericalCap::from_radius(radec_deg_to_vec(45.0, -5.0), 6f64.to_radians());
        assert!(grazing.intersects_convex_contour(&tri));
        let beside = SphericalCap::from_radius(radec_deg_to_vec(45.0, -5.0), 4f64.to_radians());
        assert!(!beside.intersects_convex_contour(&tri));
        // A big cap swallowing it.
        assert!(SphericalCap::new(centre, 0.5).contains_convex_contour(&tri));
    }
}
