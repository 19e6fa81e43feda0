// Copyright 2025 Lars Brubaker
// Round trips through the JSON and binary region formats.

mod helpers;

use bytes::{BufMut, Bytes, BytesMut};
use spherical_regions::vector::radec_deg_to_vec;
use spherical_regions::{RegionError, RegionType, SphericalPoint, SphericalRegion, Vec3d};

use helpers::{assert_same_membership, sample_regions, test_grid};

fn every_kind() -> Vec<(&'static str, SphericalRegion)> {
    let mut regions = sample_regions();
    regions.push(("empty", SphericalRegion::Empty));
    regions.push(("all sky", SphericalRegion::AllSky));
    regions.push(("point", SphericalPoint::new(radec_deg_to_vec(12.0, -7.0)).into()));
    let holed = helpers::polygon_square(0.0, 0.0, 5.0).get_subtraction(&helpers::polygon_square(0.0, 0.0, 2.0));
    regions.push(("polygon with a hole", holed));
    regions
}

#[test]
fn json_round_trip_keeps_membership() {
    let grid = test_grid(2.5);
    for (name, region) in every_kind() {
        let text = region.to_json();
        let back = SphericalRegion::load_from_json(&text).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(back.is_empty(), region.is_empty(), "{name}");
        assert_same_membership(&region, &back, &grid, name);
    }
}

#[test]
fn json_round_trip_keeps_the_kind() {
    for (name, region) in every_kind() {
        let back = SphericalRegion::load_from_qvariant(&region.to_qvariant()).unwrap();
        match (&region, &back) {
            // An empty polygon is written as an empty list.
            (SphericalRegion::Polygon(p), SphericalRegion::Empty) => assert!(p.is_empty(), "{name}"),
            _ => assert_eq!(region.get_type(), back.get_type(), "{name}"),
        }
    }
}

#[test]
fn binary_round_trip_is_exact() {
    let grid = test_grid(2.5);
    for (name, region) in every_kind() {
        let mut bytes = region.to_bytes();
        let back = SphericalRegion::deserialize(&mut bytes).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(bytes.is_empty(), "{name}: trailing bytes");
        assert_eq!(region.get_type(), back.get_type(), "{name}");
        assert_eq!(region.get_area(), back.get_area(), "{name}");
        assert_eq!(region.get_bounding_cap(), back.get_bounding_cap(), "{name}");
        assert_same_membership(&region, &back, &grid, name);
    }
}

#[test]
fn world_coords_files_load() {
    let text = r#"{
        "worldCoords": [
            [[10, -10], [10, 10], [30, 10], [30, -10]],
            [[20, -5], [20, 20], [40, 20], [40, -5]]
        ],
        "textureCoords": [
            [[0, 0], [0, 1], [1, 1], [1, 0]],
            [[0, 0], [0, 1], [1, 1], [1, 0]]
        ]
    }"#;
    let region = SphericalRegion::load_from_json(text).unwrap();
    for (ra, dec, inside) in [(15.0, 0.0, true), (35.0, 15.0, true), (15.0, 15.0, false), (0.0, 0.0, false)] {
        assert_eq!(region.contains_point(&radec_deg_to_vec(ra, dec)), inside, "({ra}, {dec})");
    }
}

#[test]
fn paths_match_the_regions_they_trace() {
    // Four great-circle steps around a square.
    let path = SphericalRegion::load_from_json(
        r#"["PATH", [-5, -5], ["greatCircleTo", [-5, 5]], ["greatCircleTo", [5, 5]], ["greatCircleTo", [5, -5]]]"#,
    )
    .unwrap();
    assert_same_membership(&path, &helpers::polygon_square(0.0, 0.0, 5.0), &test_grid(1.0), "square path");

    // A half turn around a point, closed by a great circle through it.
    let half_disc = SphericalRegion::load_from_json(r#"["PATH", [30, 30], ["smallCircle", [30, 20], -180]]"#).unwrap();
    let east = half_disc.contains_point(&radec_deg_to_vec(35.0, 20.5));
    let west = half_disc.contains_point(&radec_deg_to_vec(25.0, 20.5));
    assert!(east != west);
    assert!(!half_disc.contains_point(&Vec3d::y()));
    assert!(!half_disc.contains_point(&radec_deg_to_vec(30.0, 35.0)));
}

fn put_vec3(out: &mut BytesMut, v: Vec3d) {
    out.put_f64(v.x);
    out.put_f64(v.y);
    out.put_f64(v.z);
}

/// A polygon stream with one sub-contour on the first side.
fn polygon_stream(contour_len: usize, fill_len: usize) -> Bytes {
    let mut out = BytesMut::new();
    out.put_u8(RegionType::Polygon as u8);
    out.put_u32(1);
    out.put_u32(contour_len as u32);
    for i in 0..contour_len {
        put_vec3(&mut out, Vec3d::new(0.1 * i as f64, 0.2, 0.0));
        out.put_u8(1);
    }
    for _ in 1..8 {
        out.put_u32(0);
    }
    out.put_u32(fill_len as u32);
    for _ in 0..fill_len {
        put_vec3(&mut out, Vec3d::x());
    }
    out.put_u32(0);
    put_vec3(&mut out, Vec3d::x());
    out.put_f64(0.9);
    out.freeze()
}

#[test]
fn malformed_binary_polygons_are_rejected() {
    assert!(SphericalRegion::deserialize(&mut polygon_stream(3, 3)).is_ok());
    assert!(matches!(
        SphericalRegion::deserialize(&mut polygon_stream(4, 3)),
        Err(RegionError::MalformedStream { what: "sub-contour", count: 4, .. })
    ));
    assert!(matches!(
        SphericalRegion::deserialize(&mut polygon_stream(2, 3)),
        Err(RegionError::MalformedStream { what: "sub-contour", count: 2, .. })
    ));
    assert!(matches!(
        SphericalRegion::deserialize(&mut polygon_stream(3, 4)),
        Err(RegionError::MalformedStream { what: "fill vertex array", count: 4, .. })
    ));
}

#[test]
fn malformed_binary_convex_polygons_are_rejected() {
    for len in [0, 1, 2] {
        let mut out = BytesMut::new();
        out.put_u8(RegionType::ConvexPolygon as u8);
        out.put_u32(len as u32);
        for _ in 0..len {
            put_vec3(&mut out, Vec3d::z());
        }
        let result = SphericalRegion::deserialize(&mut out.freeze());
        assert!(matches!(result, Err(RegionError::ContourTooShort(n)) if n == len), "{len} vertices");
    }
}
