// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Arbitrary spherical polygons stored as triangles on the 8 faces of an
// octahedron.
//
// Contours are cut along the three coordinate planes, centrally projected on
// the face planes and tessellated there one face at a time. Great circles
// project to straight lines, so the planar triangulation is exact on the
// sphere. Boolean operations concatenate the per-face triangle sets and run
// the tessellator again with the matching winding rule.

mod split;

use std::cell::OnceCell;
use std::f64::consts::PI;

use log::{trace, warn};

use crate::cap::SphericalCap;
use crate::great_circle::arc_min_dot;
use crate::tess::{TessVertex, Tessellator, WindingRule};
use crate::vector::{angle_between, normalized_or, Vec3d};

pub use split::get_side_number;
use split::{project, project_sides, split_into_sides, unproject};

/// Below this area difference one polygon counts as containing another.
const CONTAINS_AREA_EPSILON: f64 = 1e-11;

/// Projected triangles whose doubled area is at most this are slivers left
/// by the splitting nudges and are dropped.
const MIN_TRIANGLE_AREA_2D: f64 = 1e-20;

/// Slack for projected points lying on a triangle edge.
const ON_EDGE_EPSILON: f64 = 1e-15;

/// Outward normal of octahedron face `side`, as `(±1, ±1, ±1)`.
pub(crate) fn side_direction(side: usize) -> Vec3d {
    let sign = |bit: usize| if side & bit == 0 { 1.0 } else { -1.0 };
    Vec3d::new(sign(2), sign(4), sign(1))
}

/// A contour vertex. `edge_flag` tells whether the segment starting here is
/// part of the polygon boundary rather than a cut added by the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeVertex {
    pub vertex: Vec3d,
    pub edge_flag: bool,
}

impl EdgeVertex {
    pub fn new(vertex: Vec3d, edge_flag: bool) -> Self {
        EdgeVertex { vertex, edge_flag }
    }
}

pub type SubContour = Vec<EdgeVertex>;

/// Builds a contour from bare vertices. An open contour has no boundary
/// segment between its last and first vertex.
pub fn sub_contour(vertices: &[Vec3d], closed: bool) -> SubContour {
    let mut contour: SubContour = vertices.iter().map(|v| EdgeVertex::new(*v, true)).collect();
    if !closed {
        if let Some(last) = contour.last_mut() {
            last.edge_flag = false;
        }
    }
    contour
}

fn reversed(contour: &SubContour) -> SubContour {
    // The flag belongs to the segment, which now starts at the other end.
    let n = contour.len();
    (0..n)
        .rev()
        .map(|i| EdgeVertex::new(contour[i].vertex, contour[(i + n - 1) % n].edge_flag))
        .collect()
}

/// Vertex arrays derived from the side triangles, rebuilt after mutation.
#[derive(Clone, Debug)]
pub(crate) struct VertexCache {
    pub fill: Vec<Vec3d>,
    pub outline: Vec<Vec3d>,
    pub cap: SphericalCap,
}

impl VertexCache {
    fn build(sides: &[Vec<SubContour>; 8]) -> Self {
        let mut fill = Vec::new();
        let mut outline = Vec::new();
        for (side, triangles) in sides.iter().enumerate() {
            for tri in triangles {
                debug_assert_eq!(tri.len(), 3);
                let verts: Vec<Vec3d> = tri.iter().map(|v| unproject(&v.vertex, side)).collect();
                for (i, v) in tri.iter().enumerate() {
                    if v.edge_flag {
                        outline.push(verts[i]);
                        outline.push(verts[(i + 1) % verts.len()]);
                    }
                }
                fill.extend(verts);
            }
        }
        let cap = bounding_cap_of_triangles(sides, &fill);
        VertexCache { fill, outline, cap }
    }
}

/// A cap holding every triangle of the flat list.
///
/// The centre is the area-weighted mean direction. The radius comes from the
/// exact minimum of `centre·p` over every edge, or covers the whole sphere
/// when the polygon holds the antipode. The result is loosened by a hair
/// so that boundary vertices pass `contains` despite rounding.
fn bounding_cap_of_triangles(sides: &[Vec<SubContour>; 8], fill: &[Vec3d]) -> SphericalCap {
    if fill.is_empty() {
        return SphericalCap::new(Vec3d::x(), 2.0);
    }
    let mut centre = Vec3d::zeros();
    for t in fill.chunks_exact(3) {
        centre += (t[0] + t[1] + t[2]) * spherical_triangle_area(&t[0], &t[1], &t[2]);
    }
    let n = normalized_or(centre, Vec3d::x());
    let mut d: f64 = 1.0;
    if sides_contain_point(sides, &-n) {
        d = -1.0;
    } else {
        for t in fill.chunks_exact(3) {
            for i in 0..3 {
                d = d.min(arc_min_dot(&n, &t[i], &t[(i + 1) % 3]));
            }
        }
    }
    d *= if d > 0.0 { 0.9999999 } else { 1.0000001 };
    SphericalCap::new(n, d)
}

/// Area in steradians of the spherical triangle `a b c`, from its spherical
/// excess.
pub fn spherical_triangle_area(a: &Vec3d, b: &Vec3d, c: &Vec3d) -> f64 {
    let angle_at = |p: &Vec3d, q: &Vec3d, r: &Vec3d| angle_between(&p.cross(q), &p.cross(r));
    (angle_at(a, b, c) + angle_at(b, c, a) + angle_at(c, a, b) - PI).max(0.0)
}

/// Twice the signed area of `a b c` on the x and y coordinates,
/// positive when counter-clockwise.
#[inline]
fn orient_2d(a: &Vec3d, b: &Vec3d, c: &Vec3d) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// 2D test on the x and y coordinates: `a b c` is counter-clockwise and not
/// a sliver.
pub fn is_triangle_convex_positive_2d(a: &Vec3d, b: &Vec3d, c: &Vec3d) -> bool {
    orient_2d(a, b, c) > MIN_TRIANGLE_AREA_2D
        && orient_2d(b, c, a) > MIN_TRIANGLE_AREA_2D
        && orient_2d(c, a, b) > MIN_TRIANGLE_AREA_2D
}

/// Whether the projected triangle of face `side` holds the projected point.
fn side_triangle_contains(side: usize, triangle: &[EdgeVertex], q: &Vec3d) -> bool {
    let [a, b, c] = triangle else {
        return false;
    };
    // Even faces are wound clockwise in the plane.
    let sign = if side % 2 == 0 { -1.0 } else { 1.0 };
    [(a, b), (b, c), (c, a)]
        .iter()
        .all(|(u, v)| sign * orient_2d(&u.vertex, &v.vertex, q) >= -ON_EDGE_EPSILON)
}

/// Point test against the triangles of the face holding `p`, in that face's
/// projection.
fn sides_contain_point(sides: &[Vec<SubContour>; 8], p: &Vec3d) -> bool {
    let side = get_side_number(p);
    let triangles = &sides[side];
    if triangles.is_empty() {
        return false;
    }
    let q = project(p, side);
    triangles.iter().any(|t| side_triangle_contains(side, t, &q))
}

/// Tessellates the projected contours of one face into triangles with the
/// face's orientation. Even faces look down the -z axis.
fn tessellate_side(side: usize, contours: &[SubContour], rule: WindingRule) -> Vec<SubContour> {
    let mut tess = Tessellator::new();
    for contour in contours {
        let verts: Vec<TessVertex> = contour
            .iter()
            .map(|v| TessVertex::new([v.vertex.x, v.vertex.y, v.vertex.z], v.edge_flag))
            .collect();
        if let Err(e) = tess.add_contour(&verts) {
            warn!("dropping octahedron side {side}: {e}");
            return Vec::new();
        }
    }
    let normal = if side % 2 == 0 { [0.0, 0.0, -1.0] } else { [0.0, 0.0, 1.0] };
    let triangles = tess.tessellate(rule, Some(normal));
    let before = triangles.len();
    let kept: Vec<SubContour> = triangles
        .into_iter()
        .map(|tri| tri.map(|v| EdgeVertex::new(Vec3d::from(v.coords), v.edge_flag)))
        .filter(|[a, b, c]| {
            if side % 2 == 0 {
                is_triangle_convex_positive_2d(&c.vertex, &b.vertex, &a.vertex)
            } else {
                is_triangle_convex_positive_2d(&a.vertex, &b.vertex, &c.vertex)
            }
        })
        .map(|tri| tri.to_vec())
        .collect();
    if kept.len() != before {
        trace!("side {side}: dropped {} degenerate triangles", before - kept.len());
    }
    kept
}

/// A spherical polygon of any shape, as triangles on the octahedron faces.
///
/// Outside of a boolean operation in progress, every side holds a set of
/// non-overlapping triangles in projected coordinates, each wound with
/// positive winding for its face. The fill and outline arrays and the
/// bounding cap are derived lazily and dropped on mutation.
#[derive(Clone, Debug, Default)]
pub struct OctahedronPolygon {
    pub(crate) sides: [Vec<SubContour>; 8],
    cache: OnceCell<VertexCache>,
}

impl OctahedronPolygon {
    /// The empty polygon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Polygon bounded by one closed contour whose interior is on the
    /// positive side of every edge plane `c[i+1] × c[i]`.
    pub fn from_contour(contour: &[Vec3d]) -> Self {
        Self::from_sub_contour(&sub_contour(contour, true))
    }

    /// Union of several contours, combined with the positive winding rule.
    pub fn from_contours<C: AsRef<[Vec3d]>>(contours: &[C]) -> Self {
        let mut poly = Self::new();
        for c in contours {
            poly.append_sub_contour(&sub_contour(c.as_ref(), true));
        }
        poly.tessellate(WindingRule::Positive);
        poly
    }

    pub fn from_sub_contour(contour: &SubContour) -> Self {
        let mut poly = Self::new();
        poly.append_sub_contour(contour);
        poly.tessellate(WindingRule::Positive);
        poly
    }

    /// Union of a list of polygons in a single tessellation pass.
    pub fn from_polygons<'a, I>(polygons: I) -> Self
    where
        I: IntoIterator<Item = &'a OctahedronPolygon>,
    {
        let mut poly = Self::new();
        for other in polygons {
            poly.append(other);
        }
        poly.tessellate(WindingRule::Positive);
        poly
    }

    /// Rebuilds a polygon from stored parts, trusting them as they are.
    pub(crate) fn from_raw_parts(sides: [Vec<SubContour>; 8], cache: VertexCache) -> Self {
        OctahedronPolygon {
            sides,
            cache: OnceCell::from(cache),
        }
    }

    /// The whole sphere: each face is its own triangle.
    pub fn all_sky() -> Self {
        const VERTICES: [[f64; 3]; 6] = [
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, -1.0],
        ];
        const FACES: [[usize; 3]; 8] = [
            [0, 2, 1],
            [5, 1, 2],
            [0, 3, 2],
            [5, 2, 3],
            [0, 1, 4],
            [5, 4, 1],
            [0, 4, 3],
            [5, 3, 4],
        ];
        let mut sides: [Vec<SubContour>; 8] = Default::default();
        for (side, face) in FACES.iter().enumerate() {
            sides[side].push(
                face.iter()
                    .map(|&i| EdgeVertex::new(Vec3d::from(VERTICES[i]), false))
                    .collect(),
            );
        }
        project_sides(&mut sides);
        let mut cache = VertexCache::build(&sides);
        cache.cap.d = -2.0;
        let poly = Self::from_raw_parts(sides, cache);
        debug_assert!((poly.get_area() - 4.0 * PI).abs() < 1e-7);
        poly
    }

    /// Adds a contour without tessellating; the caller tessellates after.
    fn append_sub_contour(&mut self, contour: &SubContour) {
        let mut pieces = split_into_sides(contour);
        project_sides(&mut pieces);
        for (side, p) in self.sides.iter_mut().zip(pieces) {
            side.extend(p);
        }
        self.cache = OnceCell::new();
    }

    fn append(&mut self, other: &OctahedronPolygon) {
        for (side, o) in self.sides.iter_mut().zip(&other.sides) {
            side.extend(o.iter().cloned());
        }
        self.cache = OnceCell::new();
    }

    fn append_reversed(&mut self, other: &OctahedronPolygon) {
        for (side, o) in self.sides.iter_mut().zip(&other.sides) {
            side.extend(o.iter().map(reversed));
        }
        self.cache = OnceCell::new();
    }

    fn tessellate(&mut self, rule: WindingRule) {
        for (side, contours) in self.sides.iter_mut().enumerate() {
            if contours.is_empty() {
                continue;
            }
            *contours = tessellate_side(side, contours, rule);
        }
        self.cache = OnceCell::new();
    }

    fn cache(&self) -> &VertexCache {
        self.cache.get_or_init(|| VertexCache::build(&self.sides))
    }

    /// Unprojected triangle vertices, three per triangle.
    pub fn fill_vertex_array(&self) -> &[Vec3d] {
        &self.cache().fill
    }

    /// Unprojected boundary segments, two vertices per segment.
    pub fn outline_vertex_array(&self) -> &[Vec3d] {
        &self.cache().outline
    }

    pub fn bounding_cap(&self) -> SphericalCap {
        self.cache().cap
    }

    /// The triangles of the fill array, one contour each.
    pub fn triangles(&self) -> impl Iterator<Item = &[Vec3d]> {
        self.fill_vertex_array().chunks_exact(3)
    }

    pub fn is_empty(&self) -> bool {
        self.sides.iter().all(Vec::is_empty)
    }

    pub fn get_area(&self) -> f64 {
        self.triangles()
            .map(|t| spherical_triangle_area(&t[0], &t[1], &t[2]))
            .sum()
    }

    /// A point of the first triangle, `None` when empty.
    pub fn get_point_inside(&self) -> Option<Vec3d> {
        let t = self.triangles().next()?;
        Some((t[0] + t[1] + t[2]).normalize())
    }

    pub fn contains_point(&self, p: &Vec3d) -> bool {
        sides_contain_point(&self.sides, p)
    }

    pub fn in_place_intersection(&mut self, other: &OctahedronPolygon) {
        if self.is_empty() {
            return;
        }
        if other.is_empty() || !self.bounding_cap().intersects_cap(&other.bounding_cap()) {
            *self = Self::new();
            return;
        }
        self.append(other);
        self.tessellate(WindingRule::AbsGeqTwo);
    }

    pub fn in_place_union(&mut self, other: &OctahedronPolygon) {
        if other.is_empty() {
            return;
        }
        // Triangle sets with disjoint caps cannot overlap and are kept as is.
        let overlap = !self.is_empty() && self.bounding_cap().intersects_cap(&other.bounding_cap());
        self.append(other);
        if overlap {
            self.tessellate(WindingRule::Positive);
        }
    }

    pub fn in_place_subtraction(&mut self, other: &OctahedronPolygon) {
        if self.is_empty() || other.is_empty() || !self.bounding_cap().intersects_cap(&other.bounding_cap()) {
            return;
        }
        self.append_reversed(other);
        self.tessellate(WindingRule::Positive);
    }

    pub fn intersects(&self, other: &OctahedronPolygon) -> bool {
        if self.is_empty() || other.is_empty() || !self.bounding_cap().intersects_cap(&other.bounding_cap()) {
            return false;
        }
        let mut res = self.clone();
        res.in_place_intersection(other);
        !res.is_empty()
    }

    pub fn contains(&self, other: &OctahedronPolygon) -> bool {
        if other.is_empty() {
            return true;
        }
        if self.is_empty() {
            return false;
        }
        // Every vertex of a contained polygon is inside our bounding cap.
        let cap = self.bounding_cap();
        if !other.fill_vertex_array().iter().all(|v| cap.contains(v)) {
            return false;
        }
        let mut res = self.clone();
        res.in_place_union(other);
        res.get_area() - self.get_area() < CONTAINS_AREA_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::radec_deg_to_vec;
    use approx::assert_abs_diff_eq;

    /// Square in ra/dec degrees, wound for a positive interior.
    fn square(ra0: f64, dec0: f64, ra1: f64, dec1: f64) -> Vec<Vec3d> {
        vec![
            radec_deg_to_vec(ra0, dec0),
            radec_deg_to_vec(ra0, dec1),
            radec_deg_to_vec(ra1, dec1),
            radec_deg_to_vec(ra1, dec0),
        ]
    }

    fn contour_area(c: &[Vec3d]) -> f64 {
        (1..c.len() - 1)
            .map(|i| spherical_triangle_area(&c[0], &c[i], &c[i + 1]))
            .sum()
    }

    #[test]
    fn side_directions_match_side_numbers() {
        assert_eq!(side_direction(0), Vec3d::new(1.0, 1.0, 1.0));
        assert_eq!(side_direction(1), Vec3d::new(1.0, 1.0, -1.0));
        assert_eq!(side_direction(2), Vec3d::new(-1.0, 1.0, 1.0));
        assert_eq!(side_direction(4), Vec3d::new(1.0, -1.0, 1.0));
        assert_eq!(side_direction(7), Vec3d::new(-1.0, -1.0, -1.0));
    }

    #[test]
    fn octant_triangle_area() {
        assert_abs_diff_eq!(
            spherical_triangle_area(&Vec3d::z(), &Vec3d::y(), &Vec3d::x()),
            PI / 2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn all_sky_covers_everything() {
        let sky = OctahedronPolygon::all_sky();
        assert_abs_diff_eq!(sky.get_area(), 4.0 * PI, epsilon = 1e-9);
        assert_eq!(sky.bounding_cap().d, -2.0);
        assert!(sky.outline_vertex_array().is_empty());
        for p in [Vec3d::x(), -Vec3d::z(), Vec3d::new(-1.0, 2.0, -3.0).normalize()] {
            assert!(sky.contains_point(&p));
        }
    }

    #[test]
    fn empty_polygon() {
        let empty = OctahedronPolygon::new();
        assert!(empty.is_empty());
        assert_eq!(empty.get_area(), 0.0);
        assert!(empty.get_point_inside().is_none());
        assert!(!empty.contains_point(&Vec3d::x()));
        assert_eq!(empty.bounding_cap().d, 2.0);
    }

    #[test]
    fn square_on_one_face() {
        let c = square(10.0, 10.0, 30.0, 30.0);
        let poly = OctahedronPolygon::from_contour(&c);
        assert!(!poly.is_empty());
        assert_abs_diff_eq!(poly.get_area(), contour_area(&c), epsilon = 1e-10);
        assert!(poly.contains_point(&radec_deg_to_vec(20.0, 20.0)));
        assert!(!poly.contains_point(&radec_deg_to_vec(40.0, 20.0)));
        // Four boundary segments, however they were triangulated.
        assert_eq!(poly.outline_vertex_array().len(), 8);
        let inside = poly.get_point_inside().unwrap();
        assert!(poly.contains_point(&inside));
    }

    #[test]
    fn square_across_faces_keeps_its_area() {
        let c = square(-20.0, -20.0, 20.0, 20.0);
        let poly = OctahedronPolygon::from_contour(&c);
        assert_eq!(poly.sides.iter().filter(|s| !s.is_empty()).count(), 4);
        assert_abs_diff_eq!(poly.get_area(), contour_area(&c), epsilon = 1e-10);
        assert!(poly.contains_point(&Vec3d::x()));
        // Each edge is cut once by a face boundary; the cuts are not outline.
        let outline = poly.outline_vertex_array();
        assert_eq!(outline.len(), 16);
        let planes: Vec<Vec3d> = (0..4).map(|i| c[i].cross(&c[(i + 1) % 4]).normalize()).collect();
        for pair in outline.chunks_exact(2) {
            assert!(planes
                .iter()
                .any(|n| n.dot(&pair[0]).abs() < 1e-9 && n.dot(&pair[1]).abs() < 1e-9));
        }
    }

    #[test]
    fn contour_around_the_pole() {
        let c: Vec<Vec3d> = (0..8).rev().map(|i| radec_deg_to_vec(i as f64 * 45.0, 60.0)).collect();
        let poly = OctahedronPolygon::from_contour(&c);
        assert!(poly.contains_point(&Vec3d::z()));
        assert!(!poly.contains_point(&-Vec3d::z()));
        assert_abs_diff_eq!(poly.get_area(), contour_area(&c), epsilon = 1e-9);
    }

    fn ring(count: usize, dec: f64) -> Vec<Vec3d> {
        (0..count)
            .rev()
            .map(|i| radec_deg_to_vec(i as f64 * 360.0 / count as f64, dec))
            .collect()
    }

    fn assert_no_slivers(poly: &OctahedronPolygon) {
        for (side, triangles) in poly.sides.iter().enumerate() {
            for t in triangles {
                let (a, b, c) = (&t[0].vertex, &t[1].vertex, &t[2].vertex);
                let positive = if side % 2 == 0 {
                    is_triangle_convex_positive_2d(c, b, a)
                } else {
                    is_triangle_convex_positive_2d(a, b, c)
                };
                assert!(positive, "side {side}: {t:?}");
            }
        }
    }

    #[test]
    fn square_with_a_hole_excludes_the_hole_and_the_outside() {
        let mut holy = OctahedronPolygon::from_contour(&square(-5.0, -5.0, 5.0, 5.0));
        holy.in_place_subtraction(&OctahedronPolygon::from_contour(&square(-2.0, -2.0, 2.0, 2.0)));
        assert_no_slivers(&holy);
        for (ra, dec) in [(3.0, 0.0), (-4.0, 0.0), (0.0, 3.0), (0.0, -4.5), (3.0, 3.0)] {
            assert!(holy.contains_point(&radec_deg_to_vec(ra, dec)), "({ra}, {dec})");
        }
        for (ra, dec) in [(0.0, 0.0), (1.0, -1.0), (7.0, 0.0), (90.0, 0.0), (180.0, 0.0), (0.0, 90.0), (0.0, -90.0)] {
            assert!(!holy.contains_point(&radec_deg_to_vec(ra, dec)), "({ra}, {dec})");
        }
        assert!(holy.bounding_cap().d > 0.99);
    }

    #[test]
    fn intersection_of_polar_rings_keeps_only_the_overlap() {
        let mut inter = OctahedronPolygon::from_contour(&ring(6, 45.0));
        inter.in_place_intersection(&OctahedronPolygon::from_contour(&ring(8, 75.0)));
        assert_no_slivers(&inter);
        assert!(inter.contains_point(&Vec3d::z()));
        assert!(inter.contains_point(&radec_deg_to_vec(10.0, 80.0)));
        assert!(inter.contains_point(&radec_deg_to_vec(200.0, 80.0)));
        for (ra, dec) in [(10.0, 60.0), (10.0, 3.0), (10.0, 0.0), (250.0, -30.0), (0.0, -90.0)] {
            assert!(!inter.contains_point(&radec_deg_to_vec(ra, dec)), "({ra}, {dec})");
        }
        assert_abs_diff_eq!(inter.get_area(), contour_area(&ring(8, 75.0)), epsilon = 1e-9);
        assert!(inter.bounding_cap().d > 0.9);
    }

    #[test]
    fn large_cap_leaves_out_its_far_side() {
        let poly = SphericalCap::from_radius(Vec3d::x(), 100f64.to_radians()).get_octahedron_polygon();
        assert_no_slivers(&poly);
        for p in [Vec3d::x(), Vec3d::z(), -Vec3d::z(), radec_deg_to_vec(95.0, 0.0)] {
            assert!(poly.contains_point(&p), "{p:?}");
        }
        for (ra, dec) in [(180.0, 0.0), (120.0, 30.0), (240.0, -30.0)] {
            assert!(!poly.contains_point(&radec_deg_to_vec(ra, dec)), "({ra}, {dec})");
        }
    }

    #[test]
    fn small_polygons_have_tight_bounding_caps() {
        for c in [square(10.0, 10.0, 30.0, 30.0), square(-5.0, -5.0, 5.0, 5.0), square(170.0, -50.0, 190.0, -30.0)] {
            let cap = OctahedronPolygon::from_contour(&c).bounding_cap();
            assert!(cap.d > 0.9, "{cap:?}");
        }
    }

    #[test]
    fn bounding_cap_holds_the_fill() {
        let poly = OctahedronPolygon::from_contour(&square(-50.0, -10.0, 100.0, 40.0));
        let cap = poly.bounding_cap();
        for v in poly.fill_vertex_array() {
            assert!(cap.contains(v));
        }
    }

    #[test]
    fn boolean_operations_on_squares() {
        // Shared meridians; the overlap is bounded by a's top and b's bottom arcs.
        let a = OctahedronPolygon::from_contour(&square(0.0, 0.0, 20.0, 20.0));
        let b = OctahedronPolygon::from_contour(&square(0.0, 10.0, 20.0, 30.0));
        let far = OctahedronPolygon::from_contour(&square(100.0, 0.0, 120.0, 20.0));

        let mut inter = a.clone();
        inter.in_place_intersection(&b);
        let expected = contour_area(&square(0.0, 10.0, 20.0, 20.0));
        assert_abs_diff_eq!(inter.get_area(), expected, epsilon = 1e-9);

        let mut union = a.clone();
        union.in_place_union(&b);
        assert_abs_diff_eq!(
            union.get_area(),
            a.get_area() + b.get_area() - expected,
            epsilon = 1e-9
        );

        let mut diff = a.clone();
        diff.in_place_subtraction(&b);
        assert_abs_diff_eq!(diff.get_area(), a.get_area() - expected, epsilon = 1e-9);
        assert!(diff.contains_point(&radec_deg_to_vec(10.0, 5.0)));
        assert!(!diff.contains_point(&radec_deg_to_vec(10.0, 15.0)));

        assert!(a.intersects(&b));
        assert!(!a.intersects(&far));
        let mut none = a.clone();
        none.in_place_intersection(&far);
        assert!(none.is_empty());
    }

    #[test]
    fn containment_between_polygons() {
        let big = OctahedronPolygon::from_contour(&square(0.0, 0.0, 40.0, 40.0));
        let small = OctahedronPolygon::from_contour(&square(10.0, 10.0, 20.0, 20.0));
        assert!(big.contains(&small));
        assert!(!small.contains(&big));
        assert!(big.contains(&OctahedronPolygon::new()));
    }

    #[test]
    fn sky_minus_square() {
        let c = square(10.0, 10.0, 30.0, 30.0);
        let mut sky = OctahedronPolygon::all_sky();
        sky.in_place_subtraction(&OctahedronPolygon::from_contour(&c));
        assert_abs_diff_eq!(sky.get_area(), 4.0 * PI - contour_area(&c), epsilon = 1e-9);
        assert!(!sky.contains_point(&radec_deg_to_vec(20.0, 20.0)));
        assert!(sky.contains_point(&radec_deg_to_vec(200.0, -20.0)));
        assert_eq!(sky.outline_vertex_array().len(), 8);
    }

    #[test]
    fn reversing_moves_flags_with_their_segments() {
        let c = vec![
            EdgeVertex::new(Vec3d::x(), true),
            EdgeVertex::new(Vec3d::y(), false),
            EdgeVertex::new(Vec3d::z(), true),
        ];
        let r = reversed(&c);
        assert_eq!(r.iter().map(|v| v.vertex).collect::<Vec<_>>(), vec![Vec3d::z(), Vec3d::y(), Vec3d::x()]);
        // Segment y→z was unflagged; reversed it is z→y and starts at index 0.
        assert_eq!(r.iter().map(|v| v.edge_flag).collect::<Vec<_>>(), vec![false, true, true]);
    }
}
