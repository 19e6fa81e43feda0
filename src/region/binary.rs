// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Tagged big-endian binary stream of regions.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{RegionType, SphericalPoint, SphericalRegion};
use crate::cap::SphericalCap;
use crate::convex::SphericalConvexPolygon;
use crate::error::{RegionError, Result};
use crate::octahedron::{EdgeVertex, OctahedronPolygon, SubContour, VertexCache};
use crate::polygon::SphericalPolygon;
use crate::vector::Vec3d;

const VEC3_SIZE: usize = 24;
const EDGE_VERTEX_SIZE: usize = VEC3_SIZE + 1;

fn put_vec3(out: &mut impl BufMut, v: &Vec3d) {
    out.put_f64(v.x);
    out.put_f64(v.y);
    out.put_f64(v.z);
}

fn put_count(out: &mut impl BufMut, n: usize) {
    // Larger arrays cannot be built in memory on any supported target.
    out.put_u32(n as u32);
}

fn put_vec3_list(out: &mut impl BufMut, vertices: &[Vec3d]) {
    put_count(out, vertices.len());
    for v in vertices {
        put_vec3(out, v);
    }
}

fn put_octahedron(out: &mut impl BufMut, oct: &OctahedronPolygon) {
    for side in &oct.sides {
        put_count(out, side.len());
        for contour in side {
            put_count(out, contour.len());
            for v in contour {
                put_vec3(out, &v.vertex);
                out.put_u8(u8::from(v.edge_flag));
            }
        }
    }
    put_vec3_list(out, oct.fill_vertex_array());
    put_vec3_list(out, oct.outline_vertex_array());
    let cap = oct.bounding_cap();
    put_vec3(out, &cap.n);
    out.put_f64(cap.d);
}

fn need(input: &impl Buf, len: usize, what: &'static str) -> Result<()> {
    if input.remaining() < len {
        return Err(RegionError::UnexpectedEof(what));
    }
    Ok(())
}

fn get_f64(input: &mut impl Buf, what: &'static str) -> Result<f64> {
    need(input, 8, what)?;
    Ok(input.get_f64())
}

fn get_vec3(input: &mut impl Buf, what: &'static str) -> Result<Vec3d> {
    need(input, VEC3_SIZE, what)?;
    Ok(Vec3d::new(input.get_f64(), input.get_f64(), input.get_f64()))
}

/// Reads an item count and checks that the stream can hold that many items
/// of at least `item_size` bytes.
fn get_count(input: &mut impl Buf, item_size: usize, what: &'static str) -> Result<usize> {
    need(input, 4, what)?;
    let n = input.get_u32() as usize;
    need(input, n.saturating_mul(item_size), what)?;
    Ok(n)
}

fn get_vec3_list(input: &mut impl Buf, what: &'static str) -> Result<Vec<Vec3d>> {
    let n = get_count(input, VEC3_SIZE, what)?;
    (0..n).map(|_| get_vec3(input, what)).collect()
}

fn malformed(what: &'static str, count: usize, expected: &'static str) -> RegionError {
    RegionError::MalformedStream { what, count, expected }
}

/// Side contours are stored triangles; the fill holds three vertices for
/// each of them and the outline two per segment.
fn get_octahedron(input: &mut impl Buf) -> Result<OctahedronPolygon> {
    let mut sides: [Vec<SubContour>; 8] = Default::default();
    for side in sides.iter_mut() {
        let contours = get_count(input, 4, "octahedron side")?;
        for _ in 0..contours {
            let n = get_count(input, EDGE_VERTEX_SIZE, "sub-contour")?;
            if n != 3 {
                return Err(malformed("sub-contour", n, "3"));
            }
            let mut contour = SubContour::with_capacity(n);
            for _ in 0..n {
                let vertex = get_vec3(input, "sub-contour")?;
                let edge_flag = input.get_u8() != 0;
                contour.push(EdgeVertex::new(vertex, edge_flag));
            }
            side.push(contour);
        }
    }
    let fill = get_vec3_list(input, "fill vertex array")?;
    let triangles: usize = sides.iter().map(Vec::len).sum();
    if fill.len() != 3 * triangles {
        return Err(malformed("fill vertex array", fill.len(), "three per side triangle"));
    }
    let outline = get_vec3_list(input, "outline vertex array")?;
    if outline.len() % 2 != 0 {
        return Err(malformed("outline vertex array", outline.len(), "an even count"));
    }
    let n = get_vec3(input, "bounding cap")?;
    let d = get_f64(input, "bounding cap")?;
    let cache = VertexCache {
        fill,
        outline,
        cap: SphericalCap::new(n, d),
    };
    Ok(OctahedronPolygon::from_raw_parts(sides, cache))
}

impl SphericalRegion {
    /// Writes the type tag and the payload of the region.
    pub fn serialize(&self, out: &mut impl BufMut) {
        out.put_u8(self.get_type() as u8);
        match self {
            SphericalRegion::Empty | SphericalRegion::AllSky => {}
            SphericalRegion::Point(p) => put_vec3(out, &p.n),
            SphericalRegion::Cap(c) => {
                put_vec3(out, &c.n);
                out.put_f64(c.d);
            }
            SphericalRegion::ConvexPolygon(c) => put_vec3_list(out, c.contour()),
            SphericalRegion::Polygon(p) => put_octahedron(out, p.octahedron()),
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut out = BytesMut::new();
        self.serialize(&mut out);
        out.freeze()
    }

    /// Reads one region written by [`serialize`](Self::serialize).
    pub fn deserialize(input: &mut impl Buf) -> Result<SphericalRegion> {
        need(input, 1, "region type")?;
        let tag = input.get_u8();
        let kind = RegionType::from_tag(tag).ok_or_else(|| RegionError::UnknownRegionType(tag.to_string()))?;
        Ok(match kind {
            RegionType::Empty => SphericalRegion::Empty,
            RegionType::AllSky => SphericalRegion::AllSky,
            RegionType::Point => SphericalPoint::new(get_vec3(input, "point")?).into(),
            RegionType::Cap => {
                let n = get_vec3(input, "cap")?;
                let d = get_f64(input, "cap")?;
                SphericalCap::new(n, d).into()
            }
            RegionType::ConvexPolygon => {
                let contour = get_vec3_list(input, "convex contour")?;
                if contour.len() < 3 {
                    return Err(RegionError::ContourTooShort(contour.len()));
                }
                SphericalConvexPolygon::new(contour).into()
            }
            RegionType::Polygon => SphericalPolygon::from_octahedron(get_octahedron(input)?).into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::radec_deg_to_vec;

    #[test]
    fn tags_come_first() {
        assert_eq!(SphericalRegion::Empty.to_bytes().as_ref(), &[5]);
        assert_eq!(SphericalRegion::AllSky.to_bytes().as_ref(), &[2]);
        let cap = SphericalRegion::Cap(SphericalCap::new(Vec3d::z(), 0.5)).to_bytes();
        assert_eq!(cap.len(), 1 + 32);
        assert_eq!(cap[0], 1);
        // Big-endian z = 1.0.
        assert_eq!(&cap[17..25], &1.0f64.to_be_bytes());
    }

    #[test]
    fn polygon_keeps_its_cache() {
        let contour = [
            radec_deg_to_vec(-5.0, -5.0),
            radec_deg_to_vec(-5.0, 5.0),
            radec_deg_to_vec(5.0, 5.0),
            radec_deg_to_vec(5.0, -5.0),
        ];
        let poly = SphericalRegion::Polygon(SphericalPolygon::new(&contour));
        let mut bytes = poly.to_bytes();
        let back = SphericalRegion::deserialize(&mut bytes).unwrap();
        assert!(!bytes.has_remaining());
        assert_eq!(back.get_fill_vertex_array(), poly.get_fill_vertex_array());
        assert_eq!(back.get_outline_vertex_array(), poly.get_outline_vertex_array());
        assert_eq!(back.get_bounding_cap(), poly.get_bounding_cap());
    }

    #[test]
    fn several_regions_in_one_stream() {
        let mut out = BytesMut::new();
        SphericalRegion::Point(SphericalPoint::new(Vec3d::y())).serialize(&mut out);
        SphericalRegion::Empty.serialize(&mut out);
        let mut input = out.freeze();
        assert!(matches!(SphericalRegion::deserialize(&mut input).unwrap(), SphericalRegion::Point(p) if p.n == Vec3d::y()));
        assert!(matches!(SphericalRegion::deserialize(&mut input).unwrap(), SphericalRegion::Empty));
        assert!(matches!(SphericalRegion::deserialize(&mut input), Err(RegionError::UnexpectedEof(_))));
    }

    #[test]
    fn bad_streams_are_rejected() {
        let mut unknown: &[u8] = &[9];
        assert!(matches!(SphericalRegion::deserialize(&mut unknown), Err(RegionError::UnknownRegionType(_))));
        let mut truncated: &[u8] = &[1, 0, 0, 0];
        assert!(matches!(SphericalRegion::deserialize(&mut truncated), Err(RegionError::UnexpectedEof("cap"))));
        // A count far beyond the stream length fails before allocating.
        let mut huge: &[u8] = &[4, 0xff, 0xff, 0xff, 0xff];
        assert!(matches!(
            SphericalRegion::deserialize(&mut huge),
            Err(RegionError::UnexpectedEof("convex contour"))
        ));
    }

    #[test]
    fn short_convex_contours_are_rejected() {
        let mut out = BytesMut::new();
        out.put_u8(RegionType::ConvexPolygon as u8);
        put_vec3_list(&mut out, &[Vec3d::x(), Vec3d::y()]);
        let mut input = out.freeze();
        assert!(matches!(SphericalRegion::deserialize(&mut input), Err(RegionError::ContourTooShort(2))));
    }
}
