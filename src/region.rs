// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

//! A closed set of sky region shapes behind one interface.
//!
//! Binary operations are resolved by matching on both operands. Pairs with a
//! dedicated exact test (caps against convex polygons, convex polygons
//! against each other...) use it; every other pair goes through the
//! [`OctahedronPolygon`] form of both regions after a bounding cap check.

mod binary;
mod json;

use std::borrow::Cow;
use std::f64::consts::PI;
use std::rc::Rc;

use crate::cap::SphericalCap;
use crate::convex::SphericalConvexPolygon;
use crate::octahedron::OctahedronPolygon;
use crate::polygon::SphericalPolygon;
use crate::vector::Vec3d;

/// Shared handle on an immutable region.
pub type SphericalRegionP = Rc<SphericalRegion>;

/// A single direction on the sky.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphericalPoint {
    pub n: Vec3d,
}

impl SphericalPoint {
    pub fn new(n: Vec3d) -> Self {
        SphericalPoint { n }
    }
}

/// Type tag of a region, as written in the binary stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RegionType {
    Point = 0,
    Cap = 1,
    AllSky = 2,
    Polygon = 3,
    ConvexPolygon = 4,
    Empty = 5,
}

impl RegionType {
    pub fn from_tag(tag: u8) -> Option<RegionType> {
        Some(match tag {
            0 => RegionType::Point,
            1 => RegionType::Cap,
            2 => RegionType::AllSky,
            3 => RegionType::Polygon,
            4 => RegionType::ConvexPolygon,
            5 => RegionType::Empty,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug)]
pub enum SphericalRegion {
    Empty,
    AllSky,
    Point(SphericalPoint),
    Cap(SphericalCap),
    ConvexPolygon(SphericalConvexPolygon),
    Polygon(SphericalPolygon),
}

impl From<SphericalCap> for SphericalRegion {
    fn from(cap: SphericalCap) -> Self {
        SphericalRegion::Cap(cap)
    }
}

impl From<SphericalConvexPolygon> for SphericalRegion {
    fn from(convex: SphericalConvexPolygon) -> Self {
        SphericalRegion::ConvexPolygon(convex)
    }
}

impl From<SphericalPolygon> for SphericalRegion {
    fn from(polygon: SphericalPolygon) -> Self {
        SphericalRegion::Polygon(polygon)
    }
}

impl From<SphericalPoint> for SphericalRegion {
    fn from(point: SphericalPoint) -> Self {
        SphericalRegion::Point(point)
    }
}

impl SphericalRegion {
    pub fn get_type(&self) -> RegionType {
        match self {
            SphericalRegion::Empty => RegionType::Empty,
            SphericalRegion::AllSky => RegionType::AllSky,
            SphericalRegion::Point(_) => RegionType::Point,
            SphericalRegion::Cap(_) => RegionType::Cap,
            SphericalRegion::ConvexPolygon(_) => RegionType::ConvexPolygon,
            SphericalRegion::Polygon(_) => RegionType::Polygon,
        }
    }

    /// Area in steradians.
    pub fn get_area(&self) -> f64 {
        match self {
            SphericalRegion::Empty | SphericalRegion::Point(_) => 0.0,
            SphericalRegion::AllSky => 4.0 * PI,
            SphericalRegion::Cap(c) => c.get_area(),
            SphericalRegion::ConvexPolygon(c) => c.get_area(),
            SphericalRegion::Polygon(p) => p.get_area(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SphericalRegion::Empty => true,
            SphericalRegion::AllSky | SphericalRegion::Point(_) => false,
            SphericalRegion::Cap(c) => c.is_empty(),
            SphericalRegion::ConvexPolygon(c) => c.is_empty(),
            SphericalRegion::Polygon(p) => p.is_empty(),
        }
    }

    pub fn get_point_inside(&self) -> Option<Vec3d> {
        match self {
            SphericalRegion::Empty => None,
            SphericalRegion::AllSky => Some(Vec3d::x()),
            SphericalRegion::Point(p) => Some(p.n),
            SphericalRegion::Cap(c) => (!c.is_empty()).then_some(c.n),
            SphericalRegion::ConvexPolygon(c) => c.get_point_inside(),
            SphericalRegion::Polygon(p) => p.get_point_inside(),
        }
    }

    /// A cap containing the whole region.
    pub fn get_bounding_cap(&self) -> SphericalCap {
        match self {
            SphericalRegion::Empty => SphericalCap::new(Vec3d::x(), 2.0),
            SphericalRegion::AllSky => SphericalCap::new(Vec3d::x(), -2.0),
            SphericalRegion::Point(p) => SphericalCap::new(p.n, 1.0),
            SphericalRegion::Cap(c) => *c,
            SphericalRegion::ConvexPolygon(c) => c.get_bounding_cap(),
            SphericalRegion::Polygon(p) => p.get_bounding_cap(),
        }
    }

    /// Caps whose intersection contains the region.
    pub fn get_bounding_spherical_caps(&self) -> Vec<SphericalCap> {
        match self {
            SphericalRegion::Empty => Vec::new(),
            SphericalRegion::ConvexPolygon(c) => c.get_bounding_spherical_caps(),
            _ => vec![self.get_bounding_cap()],
        }
    }

    /// A cap-shaped region containing everything within `margin` radians
    /// of this one.
    pub fn get_enlarged(&self, margin: f64) -> SphericalRegion {
        if self.is_empty() {
            return SphericalRegion::Empty;
        }
        if margin >= PI {
            return SphericalRegion::AllSky;
        }
        let cap = self.get_bounding_cap();
        let radius = cap.get_radius() + margin;
        if cap.is_full() || radius >= PI {
            return SphericalRegion::AllSky;
        }
        SphericalRegion::Cap(SphericalCap::from_radius(cap.n, radius))
    }

    /// The region as an octahedron polygon, borrowed when it already is one.
    pub fn get_octahedron_polygon(&self) -> Cow<'_, OctahedronPolygon> {
        match self {
            SphericalRegion::Empty => Cow::Owned(OctahedronPolygon::new()),
            SphericalRegion::AllSky => Cow::Owned(OctahedronPolygon::all_sky()),
            SphericalRegion::Point(p) => Cow::Owned(OctahedronPolygon::from_contour(&[p.n, p.n, p.n])),
            SphericalRegion::Cap(c) => Cow::Owned(c.get_octahedron_polygon()),
            SphericalRegion::ConvexPolygon(c) => Cow::Owned(c.get_octahedron_polygon()),
            SphericalRegion::Polygon(p) => Cow::Borrowed(p.octahedron()),
        }
    }

    /// Triangle list covering the region, three vertices per triangle.
    pub fn get_fill_vertex_array(&self) -> Cow<'_, [Vec3d]> {
        match self {
            SphericalRegion::Polygon(p) => Cow::Borrowed(p.fill_vertex_array()),
            other => Cow::Owned(other.get_octahedron_polygon().fill_vertex_array().to_vec()),
        }
    }

    /// Boundary segments, two vertices per segment.
    pub fn get_outline_vertex_array(&self) -> Cow<'_, [Vec3d]> {
        match self {
            SphericalRegion::Polygon(p) => Cow::Borrowed(p.outline_vertex_array()),
            other => Cow::Owned(other.get_octahedron_polygon().outline_vertex_array().to_vec()),
        }
    }

    /// Contours whose positive-winding union is the region: the fill
    /// triangles, or the contour itself for a convex polygon.
    pub fn get_simplified_contours(&self) -> Vec<Vec<Vec3d>> {
        match self {
            SphericalRegion::ConvexPolygon(c) => vec![c.contour().to_vec()],
            other => other
                .get_fill_vertex_array()
                .chunks_exact(3)
                .map(<[Vec3d]>::to_vec)
                .collect(),
        }
    }

    pub fn contains_point(&self, p: &Vec3d) -> bool {
        match self {
            SphericalRegion::Empty => false,
            SphericalRegion::AllSky => true,
            SphericalRegion::Point(q) => q.n == *p,
            SphericalRegion::Cap(c) => c.contains(p),
            SphericalRegion::ConvexPolygon(c) => c.contains_point(p),
            SphericalRegion::Polygon(poly) => poly.contains_point(p),
        }
    }

    pub fn contains(&self, other: &SphericalRegion) -> bool {
        use SphericalRegion::*;
        match (self, other) {
            (_, Empty) | (Empty, _) => false,
            (_, Point(p)) => self.contains_point(&p.n),
            (AllSky, _) => true,
            (_, AllSky) => self.get_bounding_cap().is_full() && self.contains_default(other),
            (Cap(a), Cap(b)) => a.contains_cap(b),
            (Cap(a), ConvexPolygon(b)) => a.contains_convex_contour(b.contour()),
            (Cap(a), Polygon(b)) => a.contains_cap(&b.get_bounding_cap()) || a.contains_triangles(b.fill_vertex_array()),
            (ConvexPolygon(a), Cap(b)) => a.contains_cap(b),
            (ConvexPolygon(a), ConvexPolygon(b)) => a.contains_convex(b),
            (ConvexPolygon(a), Polygon(b)) => a.contains_triangles(&b.get_bounding_cap(), b.fill_vertex_array()),
            (Polygon(a), ConvexPolygon(b)) => a.octahedron().contains(&b.get_octahedron_polygon()),
            _ => self.contains_default(other),
        }
    }

    pub fn intersects(&self, other: &SphericalRegion) -> bool {
        use SphericalRegion::*;
        match (self, other) {
            (_, Empty) | (Empty, _) => false,
            (_, Point(p)) => self.contains_point(&p.n),
            (Point(p), _) => other.contains_point(&p.n),
            (_, AllSky) => !self.is_empty(),
            (AllSky, _) => !other.is_empty(),
            (Cap(a), Cap(b)) => a.intersects_cap(b),
            (Cap(a), ConvexPolygon(b)) | (ConvexPolygon(b), Cap(a)) => a.intersects_convex_contour(b.contour()),
            (Cap(a), Polygon(b)) | (Polygon(b), Cap(a)) => {
                a.intersects_cap(&b.get_bounding_cap()) && a.intersects_triangles(b.fill_vertex_array())
            }
            (ConvexPolygon(a), ConvexPolygon(b)) => a.intersects_convex(b),
            (ConvexPolygon(a), Polygon(b)) | (Polygon(b), ConvexPolygon(a)) => {
                a.intersects_triangles(&b.get_bounding_cap(), b.fill_vertex_array())
            }
            _ => self.intersects_default(other),
        }
    }

    pub fn get_intersection(&self, other: &SphericalRegion) -> SphericalRegion {
        use SphericalRegion::*;
        match (self, other) {
            (_, Empty) | (Empty, _) => Empty,
            (AllSky, _) => other.clone(),
            (_, AllSky) => self.clone(),
            (_, Point(p)) => self.point_if_contained(p),
            (Point(p), _) => other.point_if_contained(p),
            _ => self.get_intersection_default(other),
        }
    }

    pub fn get_union(&self, other: &SphericalRegion) -> SphericalRegion {
        use SphericalRegion::*;
        match (self, other) {
            (AllSky, _) | (_, AllSky) => AllSky,
            (_, Empty) => self.clone(),
            (Empty, _) => other.clone(),
            _ => self.get_union_default(other),
        }
    }

    pub fn get_subtraction(&self, other: &SphericalRegion) -> SphericalRegion {
        use SphericalRegion::*;
        match (self, other) {
            (_, AllSky) | (Empty, _) => Empty,
            (Point(p), _) if other.contains_point(&p.n) => Empty,
            (Point(_), _) => self.clone(),
            // Removing a set of zero area changes nothing.
            (_, Empty) | (_, Point(_)) => self.clone(),
            _ => self.get_subtraction_default(other),
        }
    }

    fn point_if_contained(&self, p: &SphericalPoint) -> SphericalRegion {
        if self.contains_point(&p.n) {
            SphericalRegion::Point(*p)
        } else {
            SphericalRegion::Empty
        }
    }

    fn contains_default(&self, other: &SphericalRegion) -> bool {
        self.get_bounding_cap().intersects_cap(&other.get_bounding_cap())
            && self.get_octahedron_polygon().contains(&other.get_octahedron_polygon())
    }

    fn intersects_default(&self, other: &SphericalRegion) -> bool {
        self.get_bounding_cap().intersects_cap(&other.get_bounding_cap())
            && self.get_octahedron_polygon().intersects(&other.get_octahedron_polygon())
    }

    fn get_intersection_default(&self, other: &SphericalRegion) -> SphericalRegion {
        if !self.get_bounding_cap().intersects_cap(&other.get_bounding_cap()) {
            return SphericalRegion::Empty;
        }
        let mut oct = self.get_octahedron_polygon().into_owned();
        oct.in_place_intersection(&other.get_octahedron_polygon());
        SphericalRegion::Polygon(SphericalPolygon::from_octahedron(oct))
    }

    fn get_union_default(&self, other: &SphericalRegion) -> SphericalRegion {
        let mut oct = self.get_octahedron_polygon().into_owned();
        oct.in_place_union(&other.get_octahedron_polygon());
        SphericalRegion::Polygon(SphericalPolygon::from_octahedron(oct))
    }

    fn get_subtraction_default(&self, other: &SphericalRegion) -> SphericalRegion {
        let mut oct = self.get_octahedron_polygon().into_owned();
        oct.in_place_subtraction(&other.get_octahedron_polygon());
        SphericalRegion::Polygon(SphericalPolygon::from_octahedron(oct))
    }
}
