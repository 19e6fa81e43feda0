// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Planar predicates of the sweep tessellator.
//
// Every function works on the projected (s, t) coordinates of a vertex. The
// sweep line moves in increasing s; ties are broken by t.

pub type Real = f64;

/// A point in the projected sweep plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coord {
    pub s: Real,
    pub t: Real,
}

impl Coord {
    #[inline]
    pub fn new(s: Real, t: Real) -> Self {
        Coord { s, t }
    }

    /// The same point with s and t exchanged.
    #[inline]
    pub fn transposed(self) -> Self {
        Coord { s: self.t, t: self.s }
    }
}

/// Sweep order: u is at or before v (s first, then t).
#[inline]
pub fn vert_leq(u: Coord, v: Coord) -> bool {
    u.s < v.s || (u.s == v.s && u.t <= v.t)
}

#[inline]
pub fn vert_eq(u: Coord, v: Coord) -> bool {
    u.s == v.s && u.t == v.t
}

/// Given `vert_leq(u, v) && vert_leq(v, w)`, returns the signed t-distance
/// from the segment uw to v, evaluated at v.s. Zero when uw is vertical.
///
/// The result is interpolated from the nearer endpoint, which keeps it exact
/// when v coincides with u or w.
pub fn edge_eval(u: Coord, v: Coord, w: Coord) -> Real {
    let gap_l = v.s - u.s;
    let gap_r = w.s - v.s;
    if gap_l + gap_r <= 0.0 {
        return 0.0;
    }
    if gap_l < gap_r {
        (v.t - u.t) + (u.t - w.t) * (gap_l / (gap_l + gap_r))
    } else {
        (v.t - w.t) + (w.t - u.t) * (gap_r / (gap_l + gap_r))
    }
}

/// Same sign as [`edge_eval`]. The cheaper product form loses the sign on
/// nearly-vertical edges, so the full evaluation is used.
#[inline]
pub fn edge_sign(u: Coord, v: Coord, w: Coord) -> Real {
    edge_eval(u, v, w)
}

/// Returns `(b*x + a*y) / (a + b)` clamped between x and y, or the midpoint
/// when both weights vanish. Negative weights are treated as zero.
#[inline]
pub fn interpolate(a: Real, x: Real, b: Real, y: Real) -> Real {
    let a = a.max(0.0);
    let b = b.max(0.0);
    if a <= b {
        if b == 0.0 {
            x / 2.0 + y / 2.0
        } else {
            x + (y - x) * (a / (a + b))
        }
    } else {
        y + (x - y) * (b / (a + b))
    }
}

/// Intersection of the segments (o1,d1) and (o2,d2).
///
/// Each coordinate is computed independently in the sweep order of that axis,
/// so the result always lies inside the bounding boxes of both segments, even
/// when the segments only touch or barely miss.
pub fn edge_intersect(o1: Coord, d1: Coord, o2: Coord, d2: Coord) -> Coord {
    let s = intersect_along_s(o1, d1, o2, d2);
    let t = intersect_along_s(o1.transposed(), d1.transposed(), o2.transposed(), d2.transposed());
    Coord { s, t }
}

fn intersect_along_s(mut o1: Coord, mut d1: Coord, mut o2: Coord, mut d2: Coord) -> Real {
    if !vert_leq(o1, d1) {
        std::mem::swap(&mut o1, &mut d1);
    }
    if !vert_leq(o2, d2) {
        std::mem::swap(&mut o2, &mut d2);
    }
    if !vert_leq(o1, o2) {
        std::mem::swap(&mut o1, &mut o2);
        std::mem::swap(&mut d1, &mut d2);
    }

    if !vert_leq(o2, d1) {
        // No overlap in s: pick the middle of the gap.
        return (o2.s + d1.s) / 2.0;
    }
    let (mut z1, mut z2, far) = if vert_leq(d1, d2) {
        (edge_eval(o1, o2, d1), edge_eval(o2, d1, d2), d1)
    } else {
        (edge_sign(o1, o2, d1), -edge_sign(o1, d2, d1), d2)
    };
    if z1 + z2 < 0.0 {
        z1 = -z1;
        z2 = -z2;
    }
    interpolate(z1, o2.s, z2, far.s)
}
