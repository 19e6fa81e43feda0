// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

//! Multi-scale spatial index of sky objects.
//!
//! Objects are filed by the size of their bounding cap into one of
//! [`MAX_INDEX_LEVEL`] trees, and within a tree by the position of the cap
//! centre in a hierarchy of spherical triangles: the 8 octahedron faces,
//! each split in 4 at its edge midpoints when it holds too many objects.
//! Since every object of tree `i` lies within `radius(i)` of its node
//! triangle, a query only descends into triangles meeting the query region
//! enlarged by that radius.

use std::rc::Rc;

use log::{debug, trace};

use crate::cap::SphericalCap;
use crate::config::IndexConfig;
use crate::convex::SphericalConvexPolygon;
use crate::octahedron::side_direction;
use crate::region::{SphericalRegion, SphericalRegionP};
use crate::vector::Vec3d;

/// Number of trees, from the finest to the one holding all large objects.
pub const MAX_INDEX_LEVEL: usize = 8;

/// Largest bounding-cap radius of the finest tree, in degrees.
const FINEST_RADIUS_DEG: f64 = 1.0;

/// Radius ratio between consecutive trees.
const RADIUS_STEP: f64 = 1.4;

/// Anything with a sky footprint.
pub trait RegionObject {
    fn region(&self) -> SphericalRegionP;
}

struct Entry<T> {
    object: Rc<T>,
    region: SphericalRegionP,
    cap: SphericalCap,
}

struct Node<T> {
    triangle: SphericalRegion,
    entries: Vec<Entry<T>>,
    children: Vec<Node<T>>,
}

/// Spherical triangle `a, b, c`, reordered if needed so its interior is on
/// the positive side of every edge.
fn triangle(a: Vec3d, b: Vec3d, c: Vec3d) -> SphericalRegion {
    let polygon = if b.cross(&a).dot(&c) >= 0.0 {
        SphericalConvexPolygon::from_triangle(a, b, c)
    } else {
        SphericalConvexPolygon::from_triangle(b, a, c)
    };
    SphericalRegion::ConvexPolygon(polygon)
}

impl<T> Node<T> {
    fn face(side: usize) -> Self {
        let dir = side_direction(side);
        Node::new(triangle(
            Vec3d::z() * dir.z,
            Vec3d::y() * dir.y,
            Vec3d::x() * dir.x,
        ))
    }

    fn new(triangle: SphericalRegion) -> Self {
        Node {
            triangle,
            entries: Vec::new(),
            children: Vec::new(),
        }
    }

    fn contains_center(&self, p: &Vec3d) -> bool {
        self.triangle.contains_point(p)
    }

    fn insert(&mut self, entry: Entry<T>, level: usize, config: &IndexConfig) {
        if self.children.is_empty() {
            self.entries.push(entry);
            if self.entries.len() > config.max_objects_per_node && level < config.max_level {
                self.split(level, config);
            }
            return;
        }
        match self.children.iter_mut().find(|c| c.contains_center(&entry.cap.n)) {
            Some(child) => child.insert(entry, level + 1, config),
            // Centre on no child within rounding: keep it here.
            None => self.entries.push(entry),
        }
    }

    fn split(&mut self, level: usize, config: &IndexConfig) {
        let SphericalRegion::ConvexPolygon(tri) = &self.triangle else {
            return;
        };
        let &[a, b, c] = tri.contour() else {
            return;
        };
        let ab = (a + b).normalize();
        let bc = (b + c).normalize();
        let ca = (c + a).normalize();
        self.children = vec![
            Node::new(triangle(a, ab, ca)),
            Node::new(triangle(ab, b, bc)),
            Node::new(triangle(ca, bc, c)),
            Node::new(triangle(ab, bc, ca)),
        ];
        trace!("index node split at level {level}");
        for entry in std::mem::take(&mut self.entries) {
            self.insert(entry, level, config);
        }
    }

    fn visit_all(&self, f: &mut impl FnMut(&Rc<T>)) {
        for e in &self.entries {
            f(&e.object);
        }
        for child in &self.children {
            child.visit_all(f);
        }
    }

    fn visit_intersecting(&self, region: &SphericalRegion, enlarged: &SphericalRegion, f: &mut impl FnMut(&Rc<T>)) {
        if !enlarged.intersects(&self.triangle) {
            return;
        }
        if region.contains(&self.triangle) {
            self.visit_all(f);
            return;
        }
        for e in &self.entries {
            if region.intersects(&e.region) {
                f(&e.object);
            }
        }
        for child in &self.children {
            child.visit_intersecting(region, enlarged, f);
        }
    }
}

/// Tree of objects up to a given bounding radius.
struct RootNode<T> {
    /// Query margin in radians.
    margin: f64,
    faces: Vec<Node<T>>,
    /// Objects whose centre matched no face within rounding.
    entries: Vec<Entry<T>>,
}

impl<T> RootNode<T> {
    fn new(margin: f64) -> Self {
        RootNode {
            margin,
            faces: (0..8).map(Node::face).collect(),
            entries: Vec::new(),
        }
    }

    fn insert(&mut self, entry: Entry<T>, config: &IndexConfig) {
        match self.faces.iter_mut().find(|f| f.contains_center(&entry.cap.n)) {
            Some(face) => face.insert(entry, 0, config),
            None => self.entries.push(entry),
        }
    }

    fn visit_all(&self, f: &mut impl FnMut(&Rc<T>)) {
        for e in &self.entries {
            f(&e.object);
        }
        for face in &self.faces {
            face.visit_all(f);
        }
    }

    fn visit_intersecting(&self, region: &SphericalRegion, f: &mut impl FnMut(&Rc<T>)) {
        for e in &self.entries {
            if region.intersects(&e.region) {
                f(&e.object);
            }
        }
        let enlarged = region.get_enlarged(self.margin);
        for face in &self.faces {
            face.visit_intersecting(region, &enlarged, f);
        }
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.faces.iter().all(|f| f.entries.is_empty() && f.children.is_empty())
    }
}

/// Spatial index answering "which objects meet this region".
///
/// An object is found by a query when its region intersects the query
/// region, or when its bounding cap centre lies in a part of the sky the
/// query region fully contains.
pub struct SphericalIndex<T: RegionObject> {
    config: IndexConfig,
    trees: Vec<RootNode<T>>,
    len: usize,
}

impl<T: RegionObject> Default for SphericalIndex<T> {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

/// Largest bounding radius, in radians, of the objects in tree `i`.
fn tree_radius(i: usize) -> f64 {
    (FINEST_RADIUS_DEG * RADIUS_STEP.powi(i as i32)).to_radians()
}

impl<T: RegionObject> SphericalIndex<T> {
    pub fn new(config: IndexConfig) -> Self {
        let trees = (0..MAX_INDEX_LEVEL)
            .map(|i| {
                if i + 1 == MAX_INDEX_LEVEL {
                    RootNode::new(std::f64::consts::PI)
                } else {
                    RootNode::new(tree_radius(i))
                }
            })
            .collect();
        SphericalIndex { config, trees, len: 0 }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn insert(&mut self, object: Rc<T>) {
        let region = object.region();
        let cap = region.get_bounding_cap();
        let radius = cap.get_radius();
        let tree = (0..MAX_INDEX_LEVEL - 1)
            .find(|&i| radius <= tree_radius(i))
            .unwrap_or(MAX_INDEX_LEVEL - 1);
        self.trees[tree].insert(Entry { object, region, cap }, &self.config);
        self.len += 1;
    }

    /// Calls `f` on every object reached by `region`.
    pub fn process_intersecting_regions<F: FnMut(&Rc<T>)>(&self, region: &SphericalRegion, mut f: F) {
        if region.is_empty() {
            return;
        }
        for tree in self.trees.iter().filter(|t| !t.is_empty()) {
            tree.visit_intersecting(region, &mut f);
        }
    }

    pub fn process_all<F: FnMut(&Rc<T>)>(&self, mut f: F) {
        for tree in &self.trees {
            tree.visit_all(&mut f);
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        debug!("clearing spherical index of {} objects", self.len);
        *self = Self::new(self.config);
    }
}
