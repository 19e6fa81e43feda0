// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Cutting spherical contours along the coordinate planes so that every piece
// lies on a single face of the octahedron.

use super::{side_direction, EdgeVertex, SubContour};
use crate::great_circle::great_circle_intersection_with_normal;
use crate::vector::Vec3d;

/// Coordinate given to vertices lying exactly on a splitting plane.
const ON_PLANE_NUDGE: f64 = 1e-98;

/// Coordinate given to the two copies of a crossing point.
const CROSSING_NUDGE: f64 = 1e-99;

/// Which half of the splitting plane `v` is on: 0 for `v[axis] >= 0`, else 1.
#[inline]
fn get_side(v: &Vec3d, axis: usize) -> usize {
    if v[axis] >= 0.0 {
        0
    } else {
        1
    }
}

/// Face of the octahedron holding `p`.
pub fn get_side_number(p: &Vec3d) -> usize {
    4 * get_side(p, 1) + 2 * get_side(p, 0) + get_side(p, 2)
}

/// The crossing of the arc `prev`→`cur` with the plane, once per half.
fn crossing_copies(prev: &Vec3d, cur: &Vec3d, plane: &Vec3d, axis: usize) -> Option<[Vec3d; 2]> {
    let p = great_circle_intersection_with_normal(prev, cur, plane)?;
    let mut copies = [p, p];
    copies[0][axis] = CROSSING_NUDGE;
    copies[1][axis] = -CROSSING_NUDGE;
    debug_assert!(get_side(&copies[0], axis) == 0 && get_side(&copies[1], axis) == 1);
    Some(copies)
}

fn nudged(v: &EdgeVertex, axis: usize) -> EdgeVertex {
    let mut v = *v;
    if v.vertex[axis] == 0.0 {
        v.vertex[axis] = ON_PLANE_NUDGE;
    }
    v
}

/// Splits a closed contour by the plane `v[axis] = 0`, appending the pieces
/// to `result[0]` (non-negative half) and `result[1]`.
///
/// Each piece is closed along the plane: the crossing points are inserted in
/// both pieces. Edge flags describe the segment starting at a vertex, so the
/// copy ending a piece is unflagged (its segment runs along the cut) and the
/// copy starting one inherits the flag of the segment it splits. When a
/// crossing cannot be computed the two vertices are kept on their own sides
/// and the open end is flagged, which later stops the pole closing.
pub fn split_contour_by_plane(axis: usize, input: &[EdgeVertex], result: &mut [Vec<SubContour>]) {
    debug_assert!(axis < 3 && result.len() == 2);
    let Some(first) = input.first() else {
        return;
    };
    let mut plane = Vec3d::zeros();
    plane[axis] = 1.0;

    let mut current: SubContour = Vec::new();
    let mut unfinished: SubContour = Vec::new();
    let mut prev_quad = get_side(&first.vertex, axis);
    let mut cur_quad = prev_quad;
    let mut prev = *first;

    // The piece before the first crossing is completed by the wrap-around.
    let mut i = 0;
    while i < input.len() {
        let cur = nudged(&input[i], axis);
        cur_quad = get_side(&cur.vertex, axis);
        if cur_quad != prev_quad {
            if let Some(sides) = crossing_copies(&prev.vertex, &cur.vertex, &plane, axis) {
                unfinished.push(EdgeVertex::new(sides[prev_quad], false));
                current.push(EdgeVertex::new(sides[cur_quad], prev.edge_flag));
            }
            prev_quad = cur_quad;
            prev = cur;
            break;
        }
        unfinished.push(cur);
        prev = cur;
        i += 1;
    }

    while i < input.len() {
        let cur = nudged(&input[i], axis);
        cur_quad = get_side(&cur.vertex, axis);
        if cur_quad != prev_quad {
            match crossing_copies(&prev.vertex, &cur.vertex, &plane, axis) {
                None => {
                    if let Some(last) = current.last_mut() {
                        last.edge_flag = true;
                    }
                    result[prev_quad].push(std::mem::take(&mut current));
                    current.push(EdgeVertex::new(cur.vertex, true));
                }
                Some(sides) => {
                    current.push(EdgeVertex::new(sides[prev_quad], false));
                    result[prev_quad].push(std::mem::take(&mut current));
                    current.push(EdgeVertex::new(sides[cur_quad], prev.edge_flag));
                    current.push(cur);
                }
            }
            prev_quad = cur_quad;
        } else {
            current.push(cur);
        }
        prev = cur;
        i += 1;
    }

    // Closing segment from the last vertex back to the first.
    let prev_quad = cur_quad;
    let cur_quad = get_side(&first.vertex, axis);
    if cur_quad != prev_quad {
        match crossing_copies(&prev.vertex, &first.vertex, &plane, axis) {
            None => {
                if let Some(last) = current.last_mut() {
                    last.edge_flag = true;
                }
                result[prev_quad].push(std::mem::take(&mut current));
            }
            Some(sides) => {
                current.push(EdgeVertex::new(sides[prev_quad], false));
                result[prev_quad].push(std::mem::take(&mut current));
                current.push(EdgeVertex::new(sides[cur_quad], prev.edge_flag));
            }
        }
    }

    current.extend(unfinished);
    if !current.is_empty() {
        result[cur_quad].push(current);
    }
}

/// Closes a quadrant piece that was cut open by the Y and X splits by
/// routing it over the pole it has to wrap around.
fn close_with_pole(contour: &mut SubContour) {
    let (Some(first), Some(last)) = (contour.first(), contour.last()) else {
        return;
    };
    if last.edge_flag {
        return;
    }
    let v = first.vertex.cross(&last.vertex);
    if v.z > 1e-8 {
        contour.push(EdgeVertex::new(-Vec3d::z(), false));
    } else if v.z < -1e-7 {
        contour.push(EdgeVertex::new(Vec3d::z(), false));
    } else {
        // Both ends are on the same meridian.
        debug_assert!(v.x.abs() < 1e-7 || v.y.abs() < 1e-7);
    }
}

/// Splits a contour into the 8 octahedron faces, still on the sphere.
pub fn split_into_sides(contour: &[EdgeVertex]) -> [Vec<SubContour>; 8] {
    let mut by_y: [Vec<SubContour>; 2] = Default::default();
    split_contour_by_plane(1, contour, &mut by_y);

    let mut quadrants: [Vec<SubContour>; 4] = Default::default();
    for (half, pieces) in by_y.iter().enumerate() {
        for piece in pieces {
            split_contour_by_plane(0, piece, &mut quadrants[2 * half..2 * half + 2]);
        }
    }

    let mut sides: [Vec<SubContour>; 8] = Default::default();
    for (q, pieces) in quadrants.iter_mut().enumerate() {
        for piece in pieces.iter_mut() {
            close_with_pole(piece);
            split_contour_by_plane(2, piece, &mut sides[2 * q..2 * q + 2]);
        }
    }
    sides
}

/// Central projection of a sphere point onto the plane of face `side`,
/// keeping the x and y coordinates only.
#[inline]
pub fn project(v: &Vec3d, side: usize) -> Vec3d {
    let mut p = v / side_direction(side).dot(v);
    p.z = 0.0;
    p
}

/// Inverse of [`project`].
#[inline]
pub fn unproject(v: &Vec3d, side: usize) -> Vec3d {
    let dir = side_direction(side);
    let mut p = *v;
    p.z = (1.0 - dir.dot(v)) / dir.z;
    p.normalize()
}

pub fn project_sides(sides: &mut [Vec<SubContour>; 8]) {
    for (side, contours) in sides.iter_mut().enumerate() {
        for v in contours.iter_mut().flatten() {
            v.vertex = project(&v.vertex, side);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::radec_deg_to_vec;
    use approx::assert_abs_diff_eq;

    fn contour(points: &[(f64, f64)]) -> SubContour {
        points
            .iter()
            .map(|&(ra, dec)| EdgeVertex::new(radec_deg_to_vec(ra, dec), true))
            .collect()
    }

    #[test]
    fn side_numbers_follow_the_octants() {
        assert_eq!(get_side_number(&Vec3d::new(1.0, 1.0, 1.0)), 0);
        assert_eq!(get_side_number(&Vec3d::new(1.0, 1.0, -1.0)), 1);
        assert_eq!(get_side_number(&Vec3d::new(-1.0, 1.0, 1.0)), 2);
        assert_eq!(get_side_number(&Vec3d::new(1.0, -1.0, 1.0)), 4);
        assert_eq!(get_side_number(&Vec3d::new(-1.0, -1.0, -1.0)), 7);
        for side in 0..8 {
            assert_eq!(get_side_number(&side_direction(side)), side);
        }
    }

    #[test]
    fn contour_on_one_side_is_untouched() {
        let c = contour(&[(10.0, 10.0), (20.0, 10.0), (15.0, 20.0)]);
        let mut halves: [Vec<SubContour>; 2] = Default::default();
        split_contour_by_plane(1, &c, &mut halves);
        assert!(halves[1].is_empty());
        assert_eq!(halves[0], vec![c]);
    }

    #[test]
    fn contour_across_the_plane_is_cut_in_two() {
        let c = contour(&[(-10.0, 10.0), (10.0, 10.0), (10.0, -10.0), (-10.0, -10.0)]);
        let mut halves: [Vec<SubContour>; 2] = Default::default();
        split_contour_by_plane(1, &c, &mut halves);
        assert_eq!(halves[0].len(), 1);
        assert_eq!(halves[1].len(), 1);
        for piece in halves.iter().flatten() {
            assert_eq!(piece.len(), 4);
            // Starts on the cut with a boundary segment, ends with the cut itself.
            assert!(piece[0].edge_flag);
            assert!(!piece[3].edge_flag);
            assert_eq!(piece.iter().filter(|v| !v.edge_flag).count(), 1);
            assert!(piece[0].vertex.y.abs() <= 1e-99);
            assert!(piece[3].vertex.y.abs() <= 1e-99);
        }
    }

    #[test]
    fn every_piece_lands_on_its_face() {
        let c = contour(&[(-30.0, 20.0), (120.0, 30.0), (200.0, -40.0)]);
        let sides = split_into_sides(&c);
        assert!(sides.iter().filter(|s| !s.is_empty()).count() > 2);
        for (side, pieces) in sides.iter().enumerate() {
            // Poles sit on every quadrant and are skipped.
            for v in pieces.iter().flatten().filter(|v| v.vertex.x != 0.0 || v.vertex.y != 0.0) {
                assert_eq!(get_side_number(&v.vertex), side);
            }
        }
    }

    #[test]
    fn projection_round_trips() {
        let v = radec_deg_to_vec(200.0, -35.0);
        let side = get_side_number(&v);
        let p = project(&v, side);
        assert_eq!(p.z, 0.0);
        assert_abs_diff_eq!(unproject(&p, side), v, epsilon = 1e-12);
    }
}
