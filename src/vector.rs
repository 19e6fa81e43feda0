// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Positions on the unit sphere and the conversions to sky coordinates.

use nalgebra::{Rotation3, Unit, Vector3};

/// A direction in space; positions on the sphere are unit length.
pub type Vec3d = Vector3<f64>;

/// Unit vector for a longitude and latitude in radians.
pub fn sphe_to_rect(lng: f64, lat: f64) -> Vec3d {
    let cos_lat = lat.cos();
    Vec3d::new(lng.cos() * cos_lat, lng.sin() * cos_lat, lat.sin())
}

/// Longitude in (-π, π] and latitude in [-π/2, π/2] of a non-zero vector.
pub fn rect_to_sphe(v: &Vec3d) -> (f64, f64) {
    let r = v.norm();
    let lat = (v.z / r).clamp(-1.0, 1.0).asin();
    (v.y.atan2(v.x), lat)
}

pub fn radec_deg_to_vec(ra: f64, dec: f64) -> Vec3d {
    sphe_to_rect(ra.to_radians(), dec.to_radians())
}

pub fn vec_to_radec_deg(v: &Vec3d) -> (f64, f64) {
    let (ra, dec) = rect_to_sphe(v);
    (ra.to_degrees(), dec.to_degrees())
}

/// Right-handed rotation of `v` about `axis` by `angle` radians.
pub fn rotate(v: &Vec3d, axis: &Vec3d, angle: f64) -> Vec3d {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle) * v
}

/// Angle between two unit vectors, stable for nearly parallel inputs.
pub fn angle_between(a: &Vec3d, b: &Vec3d) -> f64 {
    a.cross(b).norm().atan2(a.dot(b))
}

/// Normalised copy of `v`, or `fallback` when `v` is (nearly) zero.
pub fn normalized_or(v: Vec3d, fallback: Vec3d) -> Vec3d {
    v.try_normalize(f64::MIN_POSITIVE).unwrap_or(fallback)
}
