// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Text interchange of regions as JSON trees of ra/dec pairs in degrees.

use std::f64::consts::PI;

use log::warn;
use serde_json::{json, Map, Value};

use super::{SphericalPoint, SphericalRegion};
use crate::cap::SphericalCap;
use crate::convex::SphericalConvexPolygon;
use crate::error::{RegionError, Result};
use crate::polygon::SphericalPolygon;
use crate::vector::{radec_deg_to_vec, rotate, vec_to_radec_deg, Vec3d};

/// Vertices per full turn when a PATH small circle is turned into arcs.
const SMALL_CIRCLE_STEPS_PER_TURN: f64 = 75.0;

fn ra_dec(v: &Vec3d) -> Value {
    let (ra, dec) = vec_to_radec_deg(v);
    json!([ra, dec])
}

fn ra_dec_list(vertices: &[Vec3d]) -> Value {
    Value::Array(vertices.iter().map(ra_dec).collect())
}

fn parse_ra_dec(v: &Value) -> Result<Vec3d> {
    match v.as_array().map(Vec::as_slice) {
        Some([ra, dec]) => match (ra.as_f64(), dec.as_f64()) {
            (Some(ra), Some(dec)) => Ok(radec_deg_to_vec(ra, dec)),
            _ => Err(RegionError::InvalidRaDec(v.to_string())),
        },
        _ => Err(RegionError::InvalidRaDec(v.to_string())),
    }
}

fn single_contour(list: &[Value]) -> Result<Vec<Vec3d>> {
    if list.len() < 3 {
        return Err(RegionError::ContourTooShort(list.len()));
    }
    list.iter().map(parse_ra_dec).collect()
}

fn as_list(v: &Value) -> Result<&[Value]> {
    v.as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| RegionError::InvalidRegion(v.to_string()))
}

fn cap_from_list(list: &[Value]) -> Result<SphericalRegion> {
    let [_, center, aperture] = list else {
        return Err(RegionError::InvalidCap(Value::from(list.to_vec()).to_string()));
    };
    let n = parse_ra_dec(center)?;
    let aperture = aperture
        .as_f64()
        .ok_or_else(|| RegionError::InvalidAperture(aperture.to_string()))?;
    Ok(SphericalRegion::Cap(SphericalCap::from_radius(n, aperture.to_radians())))
}

/// Contour of a PATH: a start point followed by great-circle and
/// small-circle steps from the last vertex.
fn path_from_list(list: &[Value]) -> Result<Vec<Vec3d>> {
    let start = list
        .get(1)
        .ok_or_else(|| RegionError::InvalidPath(Value::from(list.to_vec()).to_string()))?;
    let mut contour = vec![parse_ra_dec(start)?];
    for step in &list[2..] {
        let invalid = || RegionError::InvalidPath(step.to_string());
        let parts = step.as_array().ok_or_else(invalid)?;
        match parts.first().and_then(Value::as_str) {
            Some("greatCircleTo") => {
                let target = parts.get(1).ok_or_else(invalid)?;
                contour.push(parse_ra_dec(target)?);
            }
            Some("smallCircle") => {
                let axis = parse_ra_dec(parts.get(1).ok_or_else(invalid)?)?;
                let angle_deg = parts.get(2).and_then(Value::as_f64).ok_or_else(invalid)?;
                let angle = angle_deg.to_radians();
                if angle.abs() > 2.0 * PI {
                    return Err(RegionError::InvalidSmallCircleAngle(angle_deg));
                }
                let steps = 1 + (angle.abs() / (2.0 * PI) * SMALL_CIRCLE_STEPS_PER_TURN) as usize;
                let mut v = *contour.last().ok_or_else(invalid)?;
                for _ in 0..steps {
                    v = rotate(&v, &axis, angle / steps as f64);
                    contour.push(v);
                }
            }
            _ => return Err(invalid()),
        }
    }
    if contour.len() < 3 {
        return Err(RegionError::ContourTooShort(contour.len()));
    }
    Ok(contour)
}

fn load_from_list(list: &[Value]) -> Result<SphericalRegion> {
    let Some(first) = list.first() else {
        return Ok(SphericalRegion::Empty);
    };

    if first.is_array() {
        // A bare contour, or a list of contours and regions.
        if parse_ra_dec(first).is_ok() {
            return Ok(SphericalPolygon::new(&single_contour(list)?).into());
        }
        let mut contours: Vec<Vec<Vec3d>> = Vec::new();
        for item in list {
            let sub = as_list(item)?;
            match sub.first() {
                None => return Err(RegionError::InvalidRegion(item.to_string())),
                Some(head) if head.is_array() => contours.push(single_contour(sub)?),
                Some(_) => {
                    let region = load_from_list(sub)?;
                    if !region.is_empty() {
                        contours.extend(region.get_simplified_contours());
                    }
                }
            }
        }
        return Ok(SphericalPolygon::from_contours(&contours).into());
    }

    let tag = first
        .as_str()
        .ok_or_else(|| RegionError::InvalidRegion(first.to_string()))?;
    let invalid = || RegionError::InvalidRegion(Value::from(list.to_vec()).to_string());
    match tag {
        "CAP" => cap_from_list(list),
        "INTERSECTION" => {
            let (head, rest) = list[1..].split_first().ok_or_else(invalid)?;
            rest.iter().try_fold(load_from_qvariant(head)?, |acc, v| -> Result<SphericalRegion> {
                Ok(acc.get_intersection(&load_from_qvariant(v)?))
            })
        }
        "SUBTRACTION" => {
            let [_, a, b] = list else {
                return Err(invalid());
            };
            let a = load_from_qvariant(a)?;
            let b = load_from_qvariant(b)?;
            Ok(a.get_subtraction(&a.get_intersection(&b)))
        }
        "PATH" => Ok(SphericalPolygon::new(&path_from_list(list)?).into()),
        "CONVEX_POLYGON" => {
            let [_, contour] = list else {
                return Err(invalid());
            };
            Ok(SphericalConvexPolygon::new(single_contour(as_list(contour)?)?).into())
        }
        "POINT" => {
            let [_, p] = list else {
                return Err(invalid());
            };
            Ok(SphericalPoint::new(parse_ra_dec(p)?).into())
        }
        "EMPTY" => Ok(SphericalRegion::Empty),
        "ALLSKY" => Ok(SphericalRegion::AllSky),
        other => Err(RegionError::UnknownRegionType(other.to_string())),
    }
}

fn non_empty_list<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a [Value]> {
    map.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .filter(|l| !l.is_empty())
}

/// Checks one contour's texture coordinates against its vertices.
fn check_texture_coords(index: usize, vertices: usize, textures: &Value) -> Result<()> {
    let textures = textures
        .as_array()
        .ok_or_else(|| RegionError::InvalidTextureCoord(textures.to_string()))?;
    if textures.len() != vertices {
        return Err(RegionError::TextureVertexMismatch {
            index,
            vertices,
            textures: textures.len(),
        });
    }
    for tc in textures {
        let ok = matches!(tc.as_array().map(Vec::as_slice), Some([u, v]) if u.is_number() && v.is_number());
        if !ok {
            return Err(RegionError::InvalidTextureCoord(tc.to_string()));
        }
    }
    Ok(())
}

/// The map form: `worldCoords` contours, optionally with matching
/// `textureCoords`. Texture coordinates are validated, then dropped.
fn load_from_map(map: &Map<String, Value>) -> Result<SphericalRegion> {
    let contours = match non_empty_list(map, "skyConvexPolygons") {
        Some(c) => {
            warn!("skyConvexPolygons is deprecated, use worldCoords instead");
            c
        }
        None => non_empty_list(map, "worldCoords").ok_or(RegionError::MissingContours)?,
    };

    let Some(textures) = non_empty_list(map, "textureCoords") else {
        return load_from_list(contours);
    };
    if textures.len() != contours.len() {
        return Err(RegionError::TextureCountMismatch {
            contours: contours.len(),
            textures: textures.len(),
        });
    }
    let mut vertices = Vec::with_capacity(contours.len());
    for (index, (contour, tex)) in contours.iter().zip(textures).enumerate() {
        let contour = single_contour(as_list(contour)?)?;
        check_texture_coords(index, contour.len(), tex)?;
        vertices.push(contour);
    }
    Ok(SphericalPolygon::from_contours(&vertices).into())
}

/// Builds a region from its JSON tree.
///
/// Regions carry no texture data: `textureCoords` in the map form are
/// checked against `worldCoords` and then discarded, so a textured file
/// loads as the plain polygon of its contours.
pub fn load_from_qvariant(v: &Value) -> Result<SphericalRegion> {
    match v {
        Value::Array(list) => load_from_list(list),
        Value::Object(map) => load_from_map(map),
        other => Err(RegionError::InvalidRegion(other.to_string())),
    }
}

impl SphericalRegion {
    /// The region as a JSON tree that [`load_from_qvariant`](Self::load_from_qvariant)
    /// reads back.
    pub fn to_qvariant(&self) -> Value {
        match self {
            SphericalRegion::Empty => json!(["EMPTY"]),
            SphericalRegion::AllSky => json!(["ALLSKY"]),
            SphericalRegion::Point(p) => json!(["POINT", ra_dec(&p.n)]),
            SphericalRegion::Cap(c) => json!(["CAP", ra_dec(&c.n), c.get_radius().to_degrees()]),
            SphericalRegion::ConvexPolygon(c) => json!(["CONVEX_POLYGON", ra_dec_list(c.contour())]),
            SphericalRegion::Polygon(p) => Value::Array(p.octahedron().triangles().map(ra_dec_list).collect()),
        }
    }

    pub fn to_json(&self) -> String {
        self.to_qvariant().to_string()
    }

    /// Texture coordinates are validated and dropped.
    pub fn load_from_qvariant(v: &Value) -> Result<SphericalRegion> {
        load_from_qvariant(v)
    }

    pub fn load_from_json(text: &str) -> Result<SphericalRegion> {
        let v: Value = serde_json::from_str(text)?;
        load_from_qvariant(&v)
    }
}
