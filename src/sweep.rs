// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Sweep-line pass of the tessellator.
//
// Vertices are processed in (s, t) order. The edges crossing the sweep line
// are kept in the edge dictionary, bottom to top; the space between two
// consecutive edges is an active region carrying the winding number of that
// strip. When a region closes, its face is marked inside or outside. Crossing
// edges are split at their intersection and coincident geometry is merged,
// so the finished mesh is a planar subdivision whose inside faces are
// x-monotone.

use crate::dict::{NodeIdx, DICT_HEAD};
use crate::geom::{edge_eval, edge_intersect, edge_sign, vert_eq, vert_leq, Coord};
use crate::mesh::{EdgeIdx, Mesh, VertIdx, INVALID};
use crate::tess::Tessellator;

pub type RegionIdx = u32;

/// The strip between an edge crossing the sweep line and the next edge below.
#[derive(Clone, Debug)]
pub struct ActiveRegion {
    /// Upper edge, directed right to left.
    pub e_up: EdgeIdx,
    pub node_up: NodeIdx,
    pub winding_number: i32,
    pub inside: bool,
    /// Fake edge at t = ±infinity.
    pub sentinel: bool,
    /// Upper or lower edge changed; check the pair for intersection.
    pub dirty: bool,
    /// Temporary edge added for a vertex with no right-going edge.
    pub fix_upper_edge: bool,
}

impl ActiveRegion {
    fn new(e_up: EdgeIdx) -> Self {
        ActiveRegion {
            e_up,
            node_up: INVALID,
            winding_number: 0,
            inside: false,
            sentinel: false,
            dirty: false,
            fix_upper_edge: false,
        }
    }
}

/// Sweep order of two dictionary edges at the current event: true when e1 is
/// at or below e2.
pub(crate) fn edge_leq(mesh: &Mesh, event: VertIdx, e1: EdgeIdx, e2: EdgeIdx) -> bool {
    let ev = mesh.st(event);
    let (o1, d1) = (mesh.st(mesh.org(e1)), mesh.st(mesh.dst(e1)));
    let (o2, d2) = (mesh.st(mesh.org(e2)), mesh.st(mesh.dst(e2)));

    if mesh.dst(e1) == event {
        if mesh.dst(e2) == event {
            // Both edges end at the event: order by slope.
            if vert_leq(o1, o2) {
                return edge_sign(d2, o1, o2) <= 0.0;
            }
            return edge_sign(d1, o2, o1) >= 0.0;
        }
        return edge_sign(d2, ev, o2) <= 0.0;
    }
    if mesh.dst(e2) == event {
        return edge_sign(d1, ev, o1) >= 0.0;
    }
    edge_eval(d1, ev, o1) >= edge_eval(d2, ev, o2)
}

impl Tessellator {
    // ─────────────────────────── Regions ───────────────────────────

    #[inline]
    fn e_up(&self, reg: RegionIdx) -> EdgeIdx {
        self.regions[reg as usize].e_up
    }

    #[inline]
    fn region_above(&self, reg: RegionIdx) -> RegionIdx {
        let node = self.regions[reg as usize].node_up;
        self.dict.key(self.dict.succ(node))
    }

    #[inline]
    fn region_below(&self, reg: RegionIdx) -> RegionIdx {
        let node = self.regions[reg as usize].node_up;
        self.dict.key(self.dict.pred(node))
    }

    #[inline]
    fn is_dirty(&self, reg: RegionIdx) -> bool {
        reg != INVALID && self.regions[reg as usize].dirty
    }

    fn set_dirty(&mut self, reg: RegionIdx) {
        if reg != INVALID {
            self.regions[reg as usize].dirty = true;
        }
    }

    #[inline]
    fn event_st(&self) -> Coord {
        self.mesh.st(self.event)
    }

    fn is_winding_inside(&self, n: i32) -> bool {
        self.winding_rule.is_inside(n)
    }

    fn delete_region(&mut self, reg: RegionIdx) {
        let r = &self.regions[reg as usize];
        debug_assert!(!r.fix_upper_edge || self.mesh.edges[r.e_up as usize].winding == 0);
        let (e_up, node) = (r.e_up, r.node_up);
        self.mesh.edges[e_up as usize].active_region = INVALID;
        self.dict.delete(node);
    }

    fn fix_upper_edge(&mut self, reg: RegionIdx, new_edge: EdgeIdx) {
        debug_assert!(self.regions[reg as usize].fix_upper_edge);
        let old = self.e_up(reg);
        self.mesh.delete_edge(old);
        let r = &mut self.regions[reg as usize];
        r.fix_upper_edge = false;
        r.e_up = new_edge;
        self.mesh.edges[new_edge as usize].active_region = reg;
    }

    /// Inserts a region whose upper edge is `e_new_up` just below `reg_above`.
    fn add_region_below(&mut self, reg_above: RegionIdx, e_new_up: EdgeIdx) -> RegionIdx {
        let reg_new = self.regions.len() as RegionIdx;
        self.regions.push(ActiveRegion::new(e_new_up));
        let hint = self.regions[reg_above as usize].node_up;
        let mesh = &self.mesh;
        let regions = &self.regions;
        let event = self.event;
        let node = self.dict.insert_before(hint, reg_new, |k| {
            edge_leq(mesh, event, regions[k as usize].e_up, e_new_up)
        });
        self.regions[reg_new as usize].node_up = node;
        self.mesh.edges[e_new_up as usize].active_region = reg_new;
        reg_new
    }

    fn compute_winding(&mut self, reg: RegionIdx) {
        let above = self.region_above(reg);
        let n = self.regions[above as usize].winding_number + self.mesh.edges[self.e_up(reg) as usize].winding;
        let inside = self.is_winding_inside(n);
        let r = &mut self.regions[reg as usize];
        r.winding_number = n;
        r.inside = inside;
    }

    /// Marks the face left of the region's upper edge and drops the region.
    fn finish_region(&mut self, reg: RegionIdx) {
        let e = self.e_up(reg);
        let f = self.mesh.lface(e);
        self.mesh.faces[f as usize].inside = self.regions[reg as usize].inside;
        self.mesh.faces[f as usize].an_edge = e;
        self.delete_region(reg);
    }

    /// Region above the uppermost edge that shares reg's origin, repairing
    /// a temporary edge found there.
    fn top_left_region(&mut self, mut reg: RegionIdx) -> RegionIdx {
        let org = self.mesh.org(self.e_up(reg));
        loop {
            reg = self.region_above(reg);
            if self.mesh.org(self.e_up(reg)) != org {
                break;
            }
        }
        if self.regions[reg as usize].fix_upper_edge {
            let below = self.region_below(reg);
            let from = self.e_up(below) ^ 1;
            let to = self.mesh.lnext(self.e_up(reg));
            let e = self.mesh.connect(from, to);
            self.fix_upper_edge(reg, e);
            reg = self.region_above(reg);
        }
        reg
    }

    fn top_right_region(&self, mut reg: RegionIdx) -> RegionIdx {
        let dst = self.mesh.dst(self.e_up(reg));
        loop {
            reg = self.region_above(reg);
            if self.mesh.dst(self.e_up(reg)) != dst {
                return reg;
            }
        }
    }

    /// Closes every region from `reg_first` down to (not including)
    /// `reg_last` whose edges end at the event, relinking the left-going
    /// edges to match dictionary order. Returns the lowest left-going edge.
    fn finish_left_regions(&mut self, reg_first: RegionIdx, reg_last: RegionIdx) -> EdgeIdx {
        let mut reg_prev = reg_first;
        let mut e_prev = self.e_up(reg_first);
        while reg_prev != reg_last {
            self.regions[reg_prev as usize].fix_upper_edge = false;
            let reg = self.region_below(reg_prev);
            let mut e = self.e_up(reg);
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                if !self.regions[reg as usize].fix_upper_edge {
                    self.finish_region(reg_prev);
                    break;
                }
                let from = self.mesh.lprev(e_prev);
                e = self.mesh.connect(from, e ^ 1);
                self.fix_upper_edge(reg, e);
            }

            if self.mesh.onext(e_prev) != e {
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e);
                self.mesh.splice(e_prev, e);
            }
            self.finish_region(reg_prev);
            e_prev = self.e_up(reg);
            reg_prev = reg;
        }
        e_prev
    }

    /// Adds the right-going edges e_first..e_last (in Onext order) below
    /// `reg_up`, then fixes windings and mesh order for every right-going
    /// edge of the vertex.
    fn add_right_edges(
        &mut self,
        reg_up: RegionIdx,
        e_first: EdgeIdx,
        e_last: EdgeIdx,
        e_top_left: EdgeIdx,
        clean_up: bool,
    ) {
        let mut e = e_first;
        loop {
            debug_assert!(vert_leq(self.mesh.st(self.mesh.org(e)), self.mesh.st(self.mesh.dst(e))));
            self.add_region_below(reg_up, e ^ 1);
            e = self.mesh.onext(e);
            if e == e_last {
                break;
            }
        }

        let e_top_left = if e_top_left == INVALID {
            self.mesh.rprev(self.e_up(self.region_below(reg_up)))
        } else {
            e_top_left
        };

        let mut reg_prev = reg_up;
        let mut e_prev = e_top_left;
        let mut first_time = true;
        loop {
            let reg = self.region_below(reg_prev);
            let e = self.e_up(reg) ^ 1;
            if self.mesh.org(e) != self.mesh.org(e_prev) {
                break;
            }
            if self.mesh.onext(e) != e_prev {
                let oprev = self.mesh.oprev(e);
                self.mesh.splice(oprev, e);
                let prev_oprev = self.mesh.oprev(e_prev);
                self.mesh.splice(prev_oprev, e);
            }
            let n = self.regions[reg_prev as usize].winding_number - self.mesh.edges[e as usize].winding;
            let inside = self.is_winding_inside(n);
            self.regions[reg as usize].winding_number = n;
            self.regions[reg as usize].inside = inside;

            // Two outgoing edges with the same slope are merged before any
            // intersection test sees them.
            self.regions[reg_prev as usize].dirty = true;
            if !first_time && self.check_for_right_splice(reg_prev) {
                self.mesh.add_winding(e, e_prev);
                self.delete_region(reg_prev);
                self.mesh.delete_edge(e_prev);
            }
            first_time = false;
            reg_prev = reg;
            e_prev = e;
        }
        self.regions[reg_prev as usize].dirty = true;

        if clean_up {
            self.walk_dirty_regions(reg_prev);
        }
    }

    /// Places a vertex created where (org_up, dst_up) crosses (org_lo,
    /// dst_lo) in 3D: each edge contributes the point at the crossing's
    /// parameter along it, weighted by L1 distance in (s, t).
    fn set_intersection_coords(&mut self, v: VertIdx, ends: [VertIdx; 4]) {
        let isect = self.mesh.st(v);
        let mut c = [0.0; 3];
        for pair in ends.chunks(2) {
            let (org, dst) = (&self.mesh.verts[pair[0] as usize], &self.mesh.verts[pair[1] as usize]);
            let t1 = (org.s - isect.s).abs() + (org.t - isect.t).abs();
            let t2 = (dst.s - isect.s).abs() + (dst.t - isect.t).abs();
            let (w0, w1) = if t1 + t2 > 0.0 {
                (0.5 * t2 / (t1 + t2), 0.5 * t1 / (t1 + t2))
            } else {
                (0.25, 0.25)
            };
            for (i, ci) in c.iter_mut().enumerate() {
                *ci += w0 * org.coords[i] + w1 * dst.coords[i];
            }
        }
        self.mesh.verts[v as usize].coords = c;
    }

    fn move_to_event(&mut self, v: VertIdx) {
        let ev = self.event;
        let src = self.mesh.verts[ev as usize].clone();
        let dst = &mut self.mesh.verts[v as usize];
        dst.s = src.s;
        dst.t = src.t;
        dst.coords = src.coords;
    }

    /// Checks the right (origin) endpoints of the region's edges against each
    /// other and splices one into the other when the ordering is violated.
    fn check_for_right_splice(&mut self, reg_up: RegionIdx) -> bool {
        let reg_lo = self.region_below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let org_up = self.mesh.st(self.mesh.org(e_up));
        let org_lo = self.mesh.st(self.mesh.org(e_lo));

        if vert_leq(org_up, org_lo) {
            if edge_sign(self.mesh.st(self.mesh.dst(e_lo)), org_up, org_lo) > 0.0 {
                return false;
            }
            if !vert_eq(org_up, org_lo) {
                // Splice e_up->Org into e_lo.
                self.mesh.split_edge(e_lo ^ 1);
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(e_up, oprev);
                self.regions[reg_up as usize].dirty = true;
                self.regions[reg_lo as usize].dirty = true;
            } else if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                // Merge the two vertices, discarding e_up->Org.
                let handle = self.mesh.verts[self.mesh.org(e_up) as usize].pq_handle;
                self.pq.delete(handle);
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(oprev, e_up);
            }
        } else {
            if edge_sign(self.mesh.st(self.mesh.dst(e_up)), org_lo, org_up) < 0.0 {
                return false;
            }
            // Splice e_lo->Org into e_up.
            let above = self.region_above(reg_up);
            self.set_dirty(above);
            self.regions[reg_up as usize].dirty = true;
            self.mesh.split_edge(e_up ^ 1);
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(oprev, e_up);
        }
        true
    }

    /// Same as the right splice check, for the left (destination) endpoints.
    fn check_for_left_splice(&mut self, reg_up: RegionIdx) -> bool {
        let reg_lo = self.region_below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let dst_up = self.mesh.st(self.mesh.dst(e_up));
        let dst_lo = self.mesh.st(self.mesh.dst(e_lo));
        debug_assert!(!vert_eq(dst_up, dst_lo));

        if vert_leq(dst_up, dst_lo) {
            if edge_sign(dst_up, dst_lo, self.mesh.st(self.mesh.org(e_up))) < 0.0 {
                return false;
            }
            // e_lo->Dst is above e_up: splice it into e_up.
            let above = self.region_above(reg_up);
            self.set_dirty(above);
            self.regions[reg_up as usize].dirty = true;
            let e = self.mesh.split_edge(e_up);
            self.mesh.splice(e_lo ^ 1, e);
            let f = self.mesh.lface(e);
            self.mesh.faces[f as usize].inside = self.regions[reg_up as usize].inside;
        } else {
            if edge_sign(dst_lo, dst_up, self.mesh.st(self.mesh.org(e_lo))) > 0.0 {
                return false;
            }
            // e_up->Dst is below e_lo: splice it into e_lo.
            self.regions[reg_up as usize].dirty = true;
            self.regions[reg_lo as usize].dirty = true;
            let e = self.mesh.split_edge(e_lo);
            let lnext = self.mesh.lnext(e_up);
            self.mesh.splice(lnext, e_lo ^ 1);
            let f = self.mesh.rface(e);
            self.mesh.faces[f as usize].inside = self.regions[reg_up as usize].inside;
        }
        true
    }

    /// Splits the region's upper and lower edges at their crossing, if any.
    /// Returns true when it recursed into `walk_dirty_regions` itself.
    fn check_for_intersect(&mut self, mut reg_up: RegionIdx) -> bool {
        let mut reg_lo = self.region_below(reg_up);
        let e_up = self.e_up(reg_up);
        let mut e_lo = self.e_up(reg_lo);
        let (org_up_v, org_lo_v) = (self.mesh.org(e_up), self.mesh.org(e_lo));
        let (dst_up_v, dst_lo_v) = (self.mesh.dst(e_up), self.mesh.dst(e_lo));
        let (org_up, org_lo) = (self.mesh.st(org_up_v), self.mesh.st(org_lo_v));
        let (dst_up, dst_lo) = (self.mesh.st(dst_up_v), self.mesh.st(dst_lo_v));
        let event = self.event_st();

        debug_assert!(!vert_eq(dst_lo, dst_up));
        debug_assert!(
            !self.regions[reg_up as usize].fix_upper_edge && !self.regions[reg_lo as usize].fix_upper_edge
        );

        if org_up_v == org_lo_v {
            return false;
        }
        let t_min_up = org_up.t.min(dst_up.t);
        let t_max_lo = org_lo.t.max(dst_lo.t);
        if t_min_up > t_max_lo {
            return false;
        }
        if vert_leq(org_up, org_lo) {
            if edge_sign(dst_lo, org_up, org_lo) > 0.0 {
                return false;
            }
        } else if edge_sign(dst_up, org_lo, org_up) < 0.0 {
            return false;
        }

        // The edges intersect, at least marginally.
        let mut isect = edge_intersect(dst_up, org_up, dst_lo, org_lo);
        if vert_leq(isect, event) {
            // Numerical noise put it left of the sweep line.
            isect = event;
        }
        let org_min = if vert_leq(org_up, org_lo) { org_up } else { org_lo };
        if vert_leq(org_min, isect) {
            isect = org_min;
        }

        if vert_eq(isect, org_up) || vert_eq(isect, org_lo) {
            // Intersection at one of the right endpoints.
            self.check_for_right_splice(reg_up);
            return false;
        }

        let up_wrong = !vert_eq(dst_up, event) && edge_sign(dst_up, event, isect) >= 0.0;
        let lo_wrong = !vert_eq(dst_lo, event) && edge_sign(dst_lo, event, isect) <= 0.0;
        if up_wrong || lo_wrong {
            // The new edges would pass on the wrong side of the event.
            if dst_lo_v == self.event {
                // Splice dst_lo into e_up and process the new regions.
                self.mesh.split_edge(e_up ^ 1);
                self.mesh.splice(e_lo ^ 1, e_up);
                reg_up = self.top_left_region(reg_up);
                let below = self.region_below(reg_up);
                let e_up2 = self.e_up(below);
                self.finish_left_regions(below, reg_lo);
                let first = self.mesh.oprev(e_up2);
                self.add_right_edges(reg_up, first, e_up2, e_up2, true);
                return true;
            }
            if dst_up_v == self.event {
                // Splice dst_up into e_lo and process the new regions.
                self.mesh.split_edge(e_lo ^ 1);
                let lnext = self.mesh.lnext(e_up);
                let oprev = self.mesh.oprev(e_lo);
                self.mesh.splice(lnext, oprev);
                reg_lo = reg_up;
                reg_up = self.top_right_region(reg_up);
                let e = self.mesh.rprev(self.e_up(self.region_below(reg_up)));
                self.regions[reg_lo as usize].e_up = self.mesh.oprev(e_lo);
                e_lo = self.finish_left_regions(reg_lo, INVALID);
                let first = self.mesh.onext(e_lo);
                let last = self.mesh.rprev(e_up);
                self.add_right_edges(reg_up, first, last, e, true);
                return true;
            }
            // Called from connect_right_vertex: split the offending edge at
            // the event and leave the splicing to the caller.
            if edge_sign(dst_up, event, isect) >= 0.0 {
                let above = self.region_above(reg_up);
                self.set_dirty(above);
                self.regions[reg_up as usize].dirty = true;
                self.mesh.split_edge(e_up ^ 1);
                let v = self.mesh.org(e_up);
                self.move_to_event(v);
            }
            if edge_sign(dst_lo, event, isect) <= 0.0 {
                self.regions[reg_up as usize].dirty = true;
                self.regions[reg_lo as usize].dirty = true;
                self.mesh.split_edge(e_lo ^ 1);
                let v = self.mesh.org(e_lo);
                self.move_to_event(v);
            }
            return false;
        }

        // General case: split both edges and join them at a new vertex.
        self.mesh.split_edge(e_up ^ 1);
        self.mesh.split_edge(e_lo ^ 1);
        let oprev = self.mesh.oprev(e_lo);
        self.mesh.splice(oprev, e_up);
        let v = self.mesh.org(e_up);
        self.mesh.verts[v as usize].s = isect.s;
        self.mesh.verts[v as usize].t = isect.t;
        self.set_intersection_coords(v, [org_up_v, dst_up_v, org_lo_v, dst_lo_v]);
        self.mesh.verts[v as usize].pq_handle = self.pq.insert(isect, v);
        let above = self.region_above(reg_up);
        self.set_dirty(above);
        self.regions[reg_up as usize].dirty = true;
        self.regions[reg_lo as usize].dirty = true;
        false
    }

    /// Restores the dictionary invariants for every dirty region, starting
    /// from `reg_up` and walking bottom-up.
    fn walk_dirty_regions(&mut self, mut reg_up: RegionIdx) {
        let mut reg_lo = self.region_below(reg_up);
        loop {
            while self.is_dirty(reg_lo) {
                reg_up = reg_lo;
                reg_lo = self.region_below(reg_lo);
            }
            if !self.is_dirty(reg_up) {
                reg_lo = reg_up;
                reg_up = self.region_above(reg_up);
                if !self.is_dirty(reg_up) {
                    return;
                }
            }
            self.regions[reg_up as usize].dirty = false;
            let mut e_up = self.e_up(reg_up);
            let mut e_lo = self.e_up(reg_lo);

            if self.mesh.dst(e_up) != self.mesh.dst(e_lo) && self.check_for_left_splice(reg_up) {
                // Temporary edges are no longer needed once the vertex has
                // another right-going edge.
                if self.regions[reg_lo as usize].fix_upper_edge {
                    self.delete_region(reg_lo);
                    self.mesh.delete_edge(e_lo);
                    reg_lo = self.region_below(reg_up);
                    e_lo = self.e_up(reg_lo);
                } else if self.regions[reg_up as usize].fix_upper_edge {
                    self.delete_region(reg_up);
                    self.mesh.delete_edge(e_up);
                    reg_up = self.region_above(reg_lo);
                    e_up = self.e_up(reg_up);
                }
            }
            if self.mesh.org(e_up) != self.mesh.org(e_lo) {
                let dst_differs = self.mesh.dst(e_up) != self.mesh.dst(e_lo);
                let no_fix = !self.regions[reg_up as usize].fix_upper_edge
                    && !self.regions[reg_lo as usize].fix_upper_edge;
                let touches_event = self.mesh.dst(e_up) == self.event || self.mesh.dst(e_lo) == self.event;
                if dst_differs && no_fix && touches_event {
                    if self.check_for_intersect(reg_up) {
                        return;
                    }
                } else {
                    self.check_for_right_splice(reg_up);
                }
            }
            if self.mesh.org(e_up) == self.mesh.org(e_lo) && self.mesh.dst(e_up) == self.mesh.dst(e_lo) {
                // A two-edge loop: fold it away.
                self.mesh.add_winding(e_lo, e_up);
                self.delete_region(reg_up);
                self.mesh.delete_edge(e_up);
                reg_up = self.region_above(reg_lo);
            }
        }
    }

    /// The event has left-going edges only. Connect it to the rest of the
    /// mesh with a temporary edge so the face to its right is closed later.
    fn connect_right_vertex(&mut self, mut reg_up: RegionIdx, mut e_bottom_left: EdgeIdx) {
        let mut e_top_left = self.mesh.onext(e_bottom_left);
        let reg_lo = self.region_below(reg_up);
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);
        let mut degenerate = false;

        if self.mesh.dst(e_up) != self.mesh.dst(e_lo) {
            self.check_for_intersect(reg_up);
        }

        let event = self.event_st();
        if vert_eq(self.mesh.st(self.mesh.org(e_up)), event) {
            let oprev = self.mesh.oprev(e_top_left);
            self.mesh.splice(oprev, e_up);
            reg_up = self.top_left_region(reg_up);
            let below = self.region_below(reg_up);
            e_top_left = self.e_up(below);
            self.finish_left_regions(below, reg_lo);
            degenerate = true;
        }
        if vert_eq(self.mesh.st(self.mesh.org(e_lo)), event) {
            let oprev = self.mesh.oprev(e_lo);
            self.mesh.splice(e_bottom_left, oprev);
            e_bottom_left = self.finish_left_regions(reg_lo, INVALID);
            degenerate = true;
        }
        if degenerate {
            let first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, first, e_top_left, e_top_left, true);
            return;
        }

        // Connect to the closer of e_lo->Org and e_up->Org.
        let target = if vert_leq(self.mesh.st(self.mesh.org(e_lo)), self.mesh.st(self.mesh.org(e_up))) {
            self.mesh.oprev(e_lo)
        } else {
            e_up
        };
        let from = self.mesh.lprev(e_bottom_left);
        let e_new = self.mesh.connect(from, target);

        // No cleanup yet: e_new must be marked temporary first.
        let next = self.mesh.onext(e_new);
        self.add_right_edges(reg_up, e_new, next, next, false);
        let reg_new = self.mesh.edges[(e_new ^ 1) as usize].active_region;
        self.regions[reg_new as usize].fix_upper_edge = true;
        self.walk_dirty_regions(reg_up);
    }

    /// The event lies exactly on the upper edge of its region.
    fn connect_left_degenerate(&mut self, mut reg_up: RegionIdx, v_event: VertIdx) {
        let e = self.e_up(reg_up);
        let ev = self.mesh.st(v_event);
        if vert_eq(self.mesh.st(self.mesh.org(e)), ev) {
            // Unprocessed vertex: merge and wait for it to leave the queue.
            let an = self.mesh.verts[v_event as usize].an_edge;
            self.mesh.splice(e, an);
            return;
        }

        if !vert_eq(self.mesh.st(self.mesh.dst(e)), ev) {
            // Splice the event into the edge passing through it.
            self.mesh.split_edge(e ^ 1);
            if self.regions[reg_up as usize].fix_upper_edge {
                let onext = self.mesh.onext(e);
                self.mesh.delete_edge(onext);
                self.regions[reg_up as usize].fix_upper_edge = false;
            }
            let an = self.mesh.verts[v_event as usize].an_edge;
            self.mesh.splice(an, e);
            self.sweep_event(v_event);
            return;
        }

        // The event coincides with e->Dst, which was already processed:
        // splice in the additional right-going edges.
        reg_up = self.top_right_region(reg_up);
        let reg = self.region_below(reg_up);
        let mut e_top_right = self.e_up(reg) ^ 1;
        let e_last = self.mesh.onext(e_top_right);
        let mut e_top_left = e_last;
        if self.regions[reg as usize].fix_upper_edge {
            debug_assert!(e_top_left != e_top_right);
            self.delete_region(reg);
            self.mesh.delete_edge(e_top_right);
            e_top_right = self.mesh.oprev(e_top_left);
        }
        let an = self.mesh.verts[v_event as usize].an_edge;
        self.mesh.splice(an, e_top_right);
        if !self.mesh.edge_goes_left(e_top_left) {
            e_top_left = INVALID;
        }
        let first = self.mesh.onext(e_top_right);
        self.add_right_edges(reg_up, first, e_last, e_top_left, true);
    }

    /// The event has only right-going edges and is not connected to anything
    /// processed so far.
    fn connect_left_vertex(&mut self, v_event: VertIdx) {
        let probe = self.mesh.verts[v_event as usize].an_edge ^ 1;
        let mesh = &self.mesh;
        let regions = &self.regions;
        let event = self.event;
        let node = self
            .dict
            .search(|k| edge_leq(mesh, event, probe, regions[k as usize].e_up));
        let reg_up = self.dict.key(node);
        if reg_up == INVALID {
            return;
        }
        let reg_lo = self.region_below(reg_up);
        if reg_lo == INVALID {
            return;
        }
        let e_up = self.e_up(reg_up);
        let e_lo = self.e_up(reg_lo);

        let ev = self.mesh.st(v_event);
        if edge_sign(self.mesh.st(self.mesh.dst(e_up)), ev, self.mesh.st(self.mesh.org(e_up))) == 0.0 {
            self.connect_left_degenerate(reg_up, v_event);
            return;
        }

        // Connect the event into whichever region the new edge falls in.
        let reg = if vert_leq(self.mesh.st(self.mesh.dst(e_lo)), self.mesh.st(self.mesh.dst(e_up))) {
            reg_up
        } else {
            reg_lo
        };

        if self.regions[reg_up as usize].inside || self.regions[reg as usize].fix_upper_edge {
            let an = self.mesh.verts[v_event as usize].an_edge;
            let e_new = if reg == reg_up {
                let lnext = self.mesh.lnext(e_up);
                self.mesh.connect(an ^ 1, lnext)
            } else {
                let dnext = self.mesh.dnext(e_lo);
                self.mesh.connect(dnext, an) ^ 1
            };
            if self.regions[reg as usize].fix_upper_edge {
                self.fix_upper_edge(reg, e_new);
            } else {
                let r = self.add_region_below(reg_up, e_new);
                self.compute_winding(r);
            }
            self.sweep_event(v_event);
        } else {
            // The event is outside the polygon; nothing to connect.
            let an = self.mesh.verts[v_event as usize].an_edge;
            self.add_right_edges(reg_up, an, an, INVALID, true);
        }
    }

    /// Processes one vertex: closes the regions ending here and opens the
    /// regions for its right-going edges.
    pub(crate) fn sweep_event(&mut self, v_event: VertIdx) {
        self.event = v_event;

        let start = self.mesh.verts[v_event as usize].an_edge;
        let mut e = start;
        while self.mesh.edges[e as usize].active_region == INVALID {
            e = self.mesh.onext(e);
            if e == start {
                // Not incident to any processed edge.
                self.connect_left_vertex(v_event);
                return;
            }
        }

        let reg_up = self.top_left_region(self.mesh.edges[e as usize].active_region);
        let reg = self.region_below(reg_up);
        let e_top_left = self.e_up(reg);
        let e_bottom_left = self.finish_left_regions(reg, INVALID);

        if self.mesh.onext(e_bottom_left) == e_top_left {
            // No right-going edges.
            self.connect_right_vertex(reg_up, e_bottom_left);
        } else {
            let first = self.mesh.onext(e_bottom_left);
            self.add_right_edges(reg_up, first, e_top_left, e_top_left, true);
        }
    }

    // ─────────────────────────── Dictionary setup ───────────────────────────

    fn add_sentinel(&mut self, smin: f64, smax: f64, t: f64) {
        let e = self.mesh.make_edge();
        let (org, dst) = (self.mesh.org(e), self.mesh.dst(e));
        self.mesh.verts[org as usize].s = smax;
        self.mesh.verts[org as usize].t = t;
        self.mesh.verts[dst as usize].s = smin;
        self.mesh.verts[dst as usize].t = t;
        self.event = dst;

        let reg = self.regions.len() as RegionIdx;
        let mut region = ActiveRegion::new(e);
        region.sentinel = true;
        self.regions.push(region);
        let mesh = &self.mesh;
        let regions = &self.regions;
        let event = self.event;
        let node = self.dict.insert_before(DICT_HEAD, reg, |k| {
            edge_leq(mesh, event, regions[k as usize].e_up, e)
        });
        self.regions[reg as usize].node_up = node;
    }

    pub(crate) fn init_edge_dict(&mut self) {
        let w = (self.bmax[0] - self.bmin[0]) + 0.01;
        let h = (self.bmax[1] - self.bmin[1]) + 0.01;
        let smin = self.bmin[0] - w;
        let smax = self.bmax[0] + w;
        self.add_sentinel(smin, smax, self.bmin[1] - h);
        self.add_sentinel(smin, smax, self.bmax[1] + h);
    }

    pub(crate) fn done_edge_dict(&mut self) {
        loop {
            let reg = self.dict.key(self.dict.min());
            if reg == INVALID {
                break;
            }
            debug_assert!(self.regions[reg as usize].sentinel || self.regions[reg as usize].fix_upper_edge);
            self.delete_region(reg);
        }
    }
}
