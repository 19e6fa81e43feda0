// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)

use std::rc::Rc;

use log::debug;

use crate::cap::SphericalCap;
use crate::octahedron::OctahedronPolygon;
use crate::region::{SphericalRegion, SphericalRegionP};
use crate::vector::Vec3d;

/// Bounding caps must overlap by this much to be unioned in the same group.
const MIN_GROUP_OVERLAP: f64 = 0.2;

/// A spherical polygon of any shape: holes, several pieces, self-overlapping
/// input contours. Contours are combined with the positive winding rule.
#[derive(Clone, Debug, Default)]
pub struct SphericalPolygon {
    octahedron: OctahedronPolygon,
}

impl SphericalPolygon {
    /// Polygon bounded by a single contour.
    pub fn new(contour: &[Vec3d]) -> Self {
        Self::from_octahedron(OctahedronPolygon::from_contour(contour))
    }

    pub fn from_contours<C: AsRef<[Vec3d]>>(contours: &[C]) -> Self {
        Self::from_octahedron(OctahedronPolygon::from_contours(contours))
    }

    pub fn from_octahedron(octahedron: OctahedronPolygon) -> Self {
        SphericalPolygon { octahedron }
    }

    pub fn set_contour(&mut self, contour: &[Vec3d]) {
        self.octahedron = OctahedronPolygon::from_contour(contour);
    }

    pub fn set_contours<C: AsRef<[Vec3d]>>(&mut self, contours: &[C]) {
        self.octahedron = OctahedronPolygon::from_contours(contours);
    }

    pub fn octahedron(&self) -> &OctahedronPolygon {
        &self.octahedron
    }

    pub fn get_area(&self) -> f64 {
        self.octahedron.get_area()
    }

    pub fn is_empty(&self) -> bool {
        self.octahedron.is_empty()
    }

    pub fn get_point_inside(&self) -> Option<Vec3d> {
        self.octahedron.get_point_inside()
    }

    pub fn get_bounding_cap(&self) -> SphericalCap {
        self.octahedron.bounding_cap()
    }

    pub fn contains_point(&self, p: &Vec3d) -> bool {
        self.octahedron.contains_point(p)
    }

    pub fn fill_vertex_array(&self) -> &[Vec3d] {
        self.octahedron.fill_vertex_array()
    }

    pub fn outline_vertex_array(&self) -> &[Vec3d] {
        self.octahedron.outline_vertex_array()
    }

    /// Union of many regions at once.
    ///
    /// With `optimize_by_pregrouping`, regions whose bounding caps clearly
    /// overlap are unioned in small groups first, so that each tessellation
    /// only sees geometry that interacts. Near-full-sky regions are never
    /// grouped.
    pub fn multi_union(regions: &[SphericalRegionP], optimize_by_pregrouping: bool) -> SphericalRegionP {
        match regions {
            [] => return Rc::new(SphericalRegion::Empty),
            [single] => return Rc::clone(single),
            _ => {}
        }
        if !optimize_by_pregrouping {
            let octahedra: Vec<_> = regions.iter().map(|r| r.get_octahedron_polygon()).collect();
            let union = OctahedronPolygon::from_polygons(octahedra.iter().map(|o| o.as_ref()));
            return Rc::new(SphericalRegion::Polygon(SphericalPolygon::from_octahedron(union)));
        }

        let mut groups: Vec<(SphericalCap, Vec<SphericalRegionP>)> = Vec::new();
        for region in regions {
            let cap = region.get_bounding_cap();
            let group = groups.iter_mut().find(|(reference, _)| {
                SphericalCap::relative_diameter_overlap(&cap, reference) > MIN_GROUP_OVERLAP && cap.d > -0.9
            });
            match group {
                Some((_, members)) => members.push(Rc::clone(region)),
                None => groups.push((cap, vec![Rc::clone(region)])),
            }
        }
        debug!("multi_union: {} regions in {} groups", regions.len(), groups.len());
        let merged: Vec<SphericalRegionP> = groups
            .iter()
            .map(|(_, members)| Self::multi_union(members, false))
            .collect();
        Self::multi_union(&merged, false)
    }

    /// Intersection of all the regions, folded left to right.
    pub fn multi_intersection(regions: &[SphericalRegionP]) -> SphericalRegionP {
        let Some((first, rest)) = regions.split_first() else {
            return Rc::new(SphericalRegion::Empty);
        };
        rest.iter().fold(Rc::clone(first), |acc, r| Rc::new(acc.get_intersection(r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::radec_deg_to_vec;
    use approx::assert_abs_diff_eq;

    fn square(ra: f64, dec: f64, half: f64) -> Vec<Vec3d> {
        vec![
            radec_deg_to_vec(ra - half, dec - half),
            radec_deg_to_vec(ra - half, dec + half),
            radec_deg_to_vec(ra + half, dec + half),
            radec_deg_to_vec(ra + half, dec - half),
        ]
    }

    fn shared(contour: Vec<Vec3d>) -> SphericalRegionP {
        Rc::new(SphericalRegion::Polygon(SphericalPolygon::new(&contour)))
    }

    #[test]
    fn overlapping_contours_combine_positively() {
        let a = square(0.0, 0.0, 5.0);
        let b = square(3.0, 0.0, 5.0);
        let both = SphericalPolygon::from_contours(&[a.clone(), b.clone()]);
        let pa = SphericalPolygon::new(&a);
        assert!(both.get_area() > pa.get_area());
        assert!(both.get_area() < 2.0 * pa.get_area());
        assert!(both.contains_point(&radec_deg_to_vec(7.0, 0.0)));
        assert!(both.contains_point(&radec_deg_to_vec(-4.0, 0.0)));
    }

    #[test]
    fn set_contour_replaces_the_shape() {
        let mut p = SphericalPolygon::new(&square(0.0, 0.0, 5.0));
        p.set_contour(&square(90.0, 0.0, 5.0));
        assert!(!p.contains_point(&Vec3d::x()));
        assert!(p.contains_point(&Vec3d::y()));
    }

    #[test]
    fn multi_union_with_and_without_grouping() {
        let regions = vec![
            shared(square(0.0, 0.0, 5.0)),
            shared(square(2.0, 0.0, 5.0)),
            shared(square(120.0, 30.0, 5.0)),
            shared(square(121.0, 30.0, 4.0)),
        ];
        let plain = SphericalPolygon::multi_union(&regions, false);
        let grouped = SphericalPolygon::multi_union(&regions, true);
        assert_abs_diff_eq!(plain.get_area(), grouped.get_area(), epsilon = 1e-9);
        for p in [radec_deg_to_vec(6.0, 0.0), radec_deg_to_vec(124.0, 30.0)] {
            assert!(plain.contains_point(&p));
            assert!(grouped.contains_point(&p));
        }
    }

    #[test]
    fn multi_union_edge_cases() {
        assert!(SphericalPolygon::multi_union(&[], true).is_empty());
        let one = shared(square(0.0, 0.0, 5.0));
        assert!(Rc::ptr_eq(&SphericalPolygon::multi_union(&[one.clone()], true), &one));
    }

    #[test]
    fn multi_intersection_folds() {
        let regions = vec![
            shared(square(0.0, 0.0, 5.0)),
            shared(square(3.0, 0.0, 5.0)),
            shared(square(0.0, 3.0, 5.0)),
        ];
        let inter = SphericalPolygon::multi_intersection(&regions);
        assert!(inter.contains_point(&radec_deg_to_vec(1.0, 1.0)));
        assert!(!inter.contains_point(&radec_deg_to_vec(-3.0, 0.0)));
        assert!(SphericalPolygon::multi_intersection(&[]).is_empty());
    }
}
