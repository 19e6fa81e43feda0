// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Half-edge mesh used by the sweep tessellator.
//
// Layout:
//   - INVALID (u32::MAX) stands for a missing link.
//   - Half-edges come in pairs: edges[e] and edges[e ^ 1] are the two
//     orientations of one edge.
//   - verts[0], faces[0] and edges[0..2] are list-head sentinels.
//   - Removed elements keep their slot and are only unlinked from the lists.
//
// Besides connectivity every half-edge carries a winding delta and the
// boundary flag of the input segment it was created from.

use crate::geom::{edge_sign, vert_leq, Coord, Real};

pub const INVALID: u32 = u32::MAX;

pub type VertIdx = u32;
pub type FaceIdx = u32;
pub type EdgeIdx = u32;

pub const V_HEAD: VertIdx = 0;
pub const F_HEAD: FaceIdx = 0;
pub const E_HEAD: EdgeIdx = 0;

#[derive(Clone, Debug)]
pub struct Vertex {
    pub next: VertIdx,
    pub prev: VertIdx,
    pub an_edge: EdgeIdx,
    pub coords: [Real; 3],
    pub s: Real,
    pub t: Real,
    pub pq_handle: i32,
}

impl Default for Vertex {
    fn default() -> Self {
        Vertex {
            next: INVALID,
            prev: INVALID,
            an_edge: INVALID,
            coords: [0.0; 3],
            s: 0.0,
            t: 0.0,
            pq_handle: crate::priorityq::NOT_QUEUED,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Face {
    pub next: FaceIdx,
    pub prev: FaceIdx,
    pub an_edge: EdgeIdx,
    pub inside: bool,
}

impl Default for Face {
    fn default() -> Self {
        Face {
            next: INVALID,
            prev: INVALID,
            an_edge: INVALID,
            inside: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HalfEdge {
    /// Global edge list. Even halves link to even halves, odd to odd.
    pub next: EdgeIdx,
    /// Next edge counter-clockwise around the origin.
    pub onext: EdgeIdx,
    /// Next edge counter-clockwise around the left face.
    pub lnext: EdgeIdx,
    pub org: VertIdx,
    pub lface: FaceIdx,
    /// Region of the sweep dictionary whose upper edge this is.
    pub active_region: u32,
    /// Change in winding number when crossing from right to left.
    pub winding: i32,
    /// Whether this edge lies on an original input segment.
    pub flag: bool,
}

impl Default for HalfEdge {
    fn default() -> Self {
        HalfEdge {
            next: INVALID,
            onext: INVALID,
            lnext: INVALID,
            org: INVALID,
            lface: INVALID,
            active_region: INVALID,
            winding: 0,
            flag: false,
        }
    }
}

pub struct Mesh {
    pub verts: Vec<Vertex>,
    pub faces: Vec<Face>,
    pub edges: Vec<HalfEdge>,
}

impl Mesh {
    pub fn new() -> Self {
        let v_head = Vertex {
            next: V_HEAD,
            prev: V_HEAD,
            ..Vertex::default()
        };
        let f_head = Face {
            next: F_HEAD,
            prev: F_HEAD,
            ..Face::default()
        };
        let e_head = HalfEdge {
            next: E_HEAD,
            ..HalfEdge::default()
        };
        let e_head_sym = HalfEdge {
            next: E_HEAD ^ 1,
            ..HalfEdge::default()
        };
        Mesh {
            verts: vec![v_head],
            faces: vec![f_head],
            edges: vec![e_head, e_head_sym],
        }
    }

    // ─────────────────────────── Navigation ───────────────────────────

    #[inline]
    pub fn org(&self, e: EdgeIdx) -> VertIdx {
        self.edges[e as usize].org
    }

    #[inline]
    pub fn dst(&self, e: EdgeIdx) -> VertIdx {
        self.edges[(e ^ 1) as usize].org
    }

    #[inline]
    pub fn onext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].onext
    }

    #[inline]
    pub fn lnext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].lnext
    }

    #[inline]
    pub fn lface(&self, e: EdgeIdx) -> FaceIdx {
        self.edges[e as usize].lface
    }

    #[inline]
    pub fn rface(&self, e: EdgeIdx) -> FaceIdx {
        self.edges[(e ^ 1) as usize].lface
    }

    /// Sym->Lnext
    #[inline]
    pub fn oprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[(e ^ 1) as usize].lnext
    }

    /// Onext->Sym
    #[inline]
    pub fn lprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[e as usize].onext ^ 1
    }

    /// Sym->Onext
    #[inline]
    pub fn rprev(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[(e ^ 1) as usize].onext
    }

    /// Rprev->Sym
    #[inline]
    pub fn dnext(&self, e: EdgeIdx) -> EdgeIdx {
        self.edges[(e ^ 1) as usize].onext ^ 1
    }

    /// Projected position of a vertex.
    #[inline]
    pub fn st(&self, v: VertIdx) -> Coord {
        let v = &self.verts[v as usize];
        Coord::new(v.s, v.t)
    }

    #[inline]
    pub fn edge_goes_left(&self, e: EdgeIdx) -> bool {
        vert_leq(self.st(self.dst(e)), self.st(self.org(e)))
    }

    #[inline]
    pub fn edge_goes_right(&self, e: EdgeIdx) -> bool {
        vert_leq(self.st(self.org(e)), self.st(self.dst(e)))
    }

    /// Adds the winding and flag of `src` onto `dst` (both orientations).
    pub fn add_winding(&mut self, dst: EdgeIdx, src: EdgeIdx) {
        let w = self.edges[src as usize].winding;
        let ws = self.edges[(src ^ 1) as usize].winding;
        let flag = self.edges[src as usize].flag;
        let d = &mut self.edges[dst as usize];
        d.winding += w;
        d.flag |= flag;
        let ds = &mut self.edges[(dst ^ 1) as usize];
        ds.winding += ws;
        ds.flag |= flag;
    }

    // ─────────────────────────── Allocation ───────────────────────────

    /// Creates an edge pair and links it into the global list before `e_next`.
    fn make_edge_pair(&mut self, e_next: EdgeIdx) -> EdgeIdx {
        let e_next = e_next & !1;
        let e_new = self.edges.len() as EdgeIdx;
        let e_sym = e_new ^ 1;
        let e_prev = self.edges[(e_next ^ 1) as usize].next;

        self.edges.push(HalfEdge {
            next: e_next,
            onext: e_new,
            lnext: e_sym,
            ..HalfEdge::default()
        });
        self.edges.push(HalfEdge {
            next: e_prev,
            onext: e_sym,
            lnext: e_new,
            ..HalfEdge::default()
        });
        self.edges[(e_prev ^ 1) as usize].next = e_new;
        self.edges[(e_next ^ 1) as usize].next = e_sym;
        e_new
    }

    fn make_vertex(&mut self, e_orig: EdgeIdx, v_next: VertIdx) -> VertIdx {
        let v_new = self.verts.len() as VertIdx;
        let v_prev = self.verts[v_next as usize].prev;
        self.verts.push(Vertex {
            next: v_next,
            prev: v_prev,
            an_edge: e_orig,
            ..Vertex::default()
        });
        self.verts[v_prev as usize].next = v_new;
        self.verts[v_next as usize].prev = v_new;

        let mut e = e_orig;
        loop {
            self.edges[e as usize].org = v_new;
            e = self.edges[e as usize].onext;
            if e == e_orig {
                break;
            }
        }
        v_new
    }

    fn make_face(&mut self, e_orig: EdgeIdx, f_next: FaceIdx) -> FaceIdx {
        let f_new = self.faces.len() as FaceIdx;
        let f_prev = self.faces[f_next as usize].prev;
        // A face split off an existing one starts with the same inside flag.
        let inside = self.faces[f_next as usize].inside;
        self.faces.push(Face {
            next: f_next,
            prev: f_prev,
            an_edge: e_orig,
            inside,
        });
        self.faces[f_prev as usize].next = f_new;
        self.faces[f_next as usize].prev = f_new;

        let mut e = e_orig;
        loop {
            self.edges[e as usize].lface = f_new;
            e = self.edges[e as usize].lnext;
            if e == e_orig {
                break;
            }
        }
        f_new
    }

    fn kill_vertex(&mut self, v_del: VertIdx, new_org: VertIdx) {
        let e_start = self.verts[v_del as usize].an_edge;
        let mut e = e_start;
        loop {
            self.edges[e as usize].org = new_org;
            e = self.edges[e as usize].onext;
            if e == e_start {
                break;
            }
        }
        let (prev, next) = (self.verts[v_del as usize].prev, self.verts[v_del as usize].next);
        self.verts[prev as usize].next = next;
        self.verts[next as usize].prev = prev;
        let v = &mut self.verts[v_del as usize];
        v.next = INVALID;
        v.prev = INVALID;
        v.an_edge = INVALID;
    }

    fn kill_face(&mut self, f_del: FaceIdx, new_lface: FaceIdx) {
        let e_start = self.faces[f_del as usize].an_edge;
        let mut e = e_start;
        loop {
            self.edges[e as usize].lface = new_lface;
            e = self.edges[e as usize].lnext;
            if e == e_start {
                break;
            }
        }
        let (prev, next) = (self.faces[f_del as usize].prev, self.faces[f_del as usize].next);
        self.faces[prev as usize].next = next;
        self.faces[next as usize].prev = prev;
        let f = &mut self.faces[f_del as usize];
        f.next = INVALID;
        f.prev = INVALID;
        f.an_edge = INVALID;
    }

    fn kill_edge(&mut self, e_del: EdgeIdx) {
        let e_del = e_del & !1;
        let e_next = self.edges[e_del as usize].next;
        let e_prev = self.edges[(e_del ^ 1) as usize].next;
        self.edges[(e_next ^ 1) as usize].next = e_prev;
        self.edges[(e_prev ^ 1) as usize].next = e_next;
        self.edges[e_del as usize].next = INVALID;
        self.edges[(e_del ^ 1) as usize].next = INVALID;
    }

    /// Exchanges a->Onext and b->Onext.
    fn raw_splice(&mut self, a: EdgeIdx, b: EdgeIdx) {
        let a_onext = self.edges[a as usize].onext;
        let b_onext = self.edges[b as usize].onext;
        self.edges[(a_onext ^ 1) as usize].lnext = b;
        self.edges[(b_onext ^ 1) as usize].lnext = a;
        self.edges[a as usize].onext = b_onext;
        self.edges[b as usize].onext = a_onext;
    }

    // ─────────────────────────── Operations ───────────────────────────

    /// One edge, two vertices and a single loop.
    pub fn make_edge(&mut self) -> EdgeIdx {
        let e = self.make_edge_pair(E_HEAD);
        self.make_vertex(e, V_HEAD);
        self.make_vertex(e ^ 1, V_HEAD);
        self.make_face(e, F_HEAD);
        e
    }

    /// Exchanges e_org->Onext and e_dst->Onext, joining or splitting the
    /// vertices and face loops involved.
    pub fn splice(&mut self, e_org: EdgeIdx, e_dst: EdgeIdx) {
        if e_org == e_dst {
            return;
        }
        let org = self.org(e_org);
        let dst_org = self.org(e_dst);
        let lface = self.lface(e_org);
        let dst_lface = self.lface(e_dst);

        let joining_vertices = dst_org != org;
        if joining_vertices {
            self.kill_vertex(dst_org, org);
        }
        let joining_loops = dst_lface != lface;
        if joining_loops {
            self.kill_face(dst_lface, lface);
        }

        self.raw_splice(e_org, e_dst);

        if !joining_vertices {
            self.make_vertex(e_dst, org);
            self.verts[org as usize].an_edge = e_org;
        }
        if !joining_loops {
            self.make_face(e_dst, lface);
            self.faces[lface as usize].an_edge = e_org;
        }
    }

    /// Removes an edge, joining or splitting the faces on either side.
    pub fn delete_edge(&mut self, e_del: EdgeIdx) {
        let e_del_sym = e_del ^ 1;
        let lface = self.lface(e_del);
        let rface = self.rface(e_del);
        let joining_loops = lface != rface;
        if joining_loops {
            self.kill_face(lface, rface);
        }

        if self.onext(e_del) == e_del {
            self.kill_vertex(self.org(e_del), INVALID);
        } else {
            let rf = self.rface(e_del);
            self.faces[rf as usize].an_edge = self.oprev(e_del);
            let org = self.org(e_del);
            self.verts[org as usize].an_edge = self.onext(e_del);
            let oprev = self.oprev(e_del);
            self.raw_splice(e_del, oprev);
            if !joining_loops {
                let lf = self.lface(e_del);
                self.make_face(e_del, lf);
            }
        }

        if self.onext(e_del_sym) == e_del_sym {
            self.kill_vertex(self.org(e_del_sym), INVALID);
            self.kill_face(self.lface(e_del_sym), INVALID);
        } else {
            let lf = self.lface(e_del);
            self.faces[lf as usize].an_edge = self.oprev(e_del_sym);
            let org = self.org(e_del_sym);
            self.verts[org as usize].an_edge = self.onext(e_del_sym);
            let oprev = self.oprev(e_del_sym);
            self.raw_splice(e_del_sym, oprev);
        }

        self.kill_edge(e_del);
    }

    /// New edge e_new = e_org->Lnext whose destination is a new vertex.
    pub fn add_edge_vertex(&mut self, e_org: EdgeIdx) -> EdgeIdx {
        let e_new = self.make_edge_pair(e_org);
        let lnext = self.lnext(e_org);
        self.raw_splice(e_new, lnext);
        let org = self.dst(e_org);
        self.edges[e_new as usize].org = org;
        self.make_vertex(e_new ^ 1, org);
        let lface = self.lface(e_org);
        self.edges[e_new as usize].lface = lface;
        self.edges[(e_new ^ 1) as usize].lface = lface;
        e_new
    }

    /// Splits e_org in two; the returned half is e_org->Lnext. Both halves
    /// keep the winding and flag of the original edge.
    pub fn split_edge(&mut self, e_org: EdgeIdx) -> EdgeIdx {
        let e_new = self.add_edge_vertex(e_org) ^ 1;
        let e_org_sym = e_org ^ 1;

        let oprev = self.oprev(e_org_sym);
        self.raw_splice(e_org_sym, oprev);
        self.raw_splice(e_org_sym, e_new);

        let mid = self.org(e_new);
        self.edges[e_org_sym as usize].org = mid;
        let far = self.dst(e_new);
        self.verts[far as usize].an_edge = e_new ^ 1;
        let rface = self.rface(e_org);
        self.edges[(e_new ^ 1) as usize].lface = rface;

        let w = self.edges[e_org as usize].winding;
        let ws = self.edges[e_org_sym as usize].winding;
        let flag = self.edges[e_org as usize].flag;
        self.edges[e_new as usize].winding = w;
        self.edges[(e_new ^ 1) as usize].winding = ws;
        self.edges[e_new as usize].flag = flag;
        self.edges[(e_new ^ 1) as usize].flag = flag;
        e_new
    }

    /// New edge from e_org->Dst to e_dst->Org. If both share a face loop the
    /// loop is split in two, otherwise the loops are joined.
    pub fn connect(&mut self, e_org: EdgeIdx, e_dst: EdgeIdx) -> EdgeIdx {
        let e_new = self.make_edge_pair(e_org);
        let e_new_sym = e_new ^ 1;
        let org_lface = self.lface(e_org);
        let dst_lface = self.lface(e_dst);
        let joining_loops = dst_lface != org_lface;
        if joining_loops {
            self.kill_face(dst_lface, org_lface);
        }

        let lnext = self.lnext(e_org);
        self.raw_splice(e_new, lnext);
        self.raw_splice(e_new_sym, e_dst);

        let from = self.dst(e_org);
        let to = self.org(e_dst);
        self.edges[e_new as usize].org = from;
        self.edges[e_new_sym as usize].org = to;
        self.edges[e_new as usize].lface = org_lface;
        self.edges[e_new_sym as usize].lface = org_lface;
        self.faces[org_lface as usize].an_edge = e_new_sym;

        if !joining_loops {
            self.make_face(e_new, org_lface);
        }
        e_new
    }

    /// Triangulates one x-monotone face by zig-zagging between its upper and
    /// lower chains. The face must be counter-clockwise in (s, t).
    pub fn tessellate_mono_region(&mut self, face: FaceIdx) {
        let mut up = self.faces[face as usize].an_edge;
        debug_assert!(self.lnext(up) != up && self.lnext(self.lnext(up)) != up);

        while vert_leq(self.st(self.dst(up)), self.st(self.org(up))) {
            up = self.lprev(up);
        }
        while vert_leq(self.st(self.org(up)), self.st(self.dst(up))) {
            up = self.lnext(up);
        }
        let mut lo = self.lprev(up);

        while self.lnext(up) != lo {
            if vert_leq(self.st(self.dst(up)), self.st(self.org(lo))) {
                // up->Dst is leftmost: fan triangles out of lo->Org.
                while self.lnext(lo) != up {
                    let next = self.lnext(lo);
                    let reflex = !self.edge_goes_left(next)
                        && edge_sign(
                            self.st(self.org(lo)),
                            self.st(self.dst(lo)),
                            self.st(self.dst(next)),
                        ) > 0.0;
                    if reflex {
                        break;
                    }
                    lo = self.connect(next, lo) ^ 1;
                }
                lo = self.lprev(lo);
            } else {
                // lo->Org is leftmost: fan triangles out of up->Dst.
                while self.lnext(lo) != up {
                    let prev = self.lprev(up);
                    let reflex = !self.edge_goes_right(prev)
                        && edge_sign(
                            self.st(self.dst(up)),
                            self.st(self.org(up)),
                            self.st(self.org(prev)),
                        ) < 0.0;
                    if reflex {
                        break;
                    }
                    up = self.connect(up, prev) ^ 1;
                }
                up = self.lnext(up);
            }
        }

        debug_assert!(self.lnext(lo) != up);
        while self.lnext(self.lnext(lo)) != up {
            let next = self.lnext(lo);
            lo = self.connect(next, lo) ^ 1;
        }
    }

    /// Triangulates every face marked inside.
    pub fn tessellate_interior(&mut self) {
        let mut f = self.faces[F_HEAD as usize].next;
        while f != F_HEAD {
            // Triangulation only inserts new faces before `f`.
            let next = self.faces[f as usize].next;
            if self.faces[f as usize].inside {
                self.tessellate_mono_region(f);
            }
            f = next;
        }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_live_verts(mesh: &Mesh) -> usize {
        let mut n = 0;
        let mut v = mesh.verts[V_HEAD as usize].next;
        while v != V_HEAD {
            n += 1;
            v = mesh.verts[v as usize].next;
        }
        n
    }

    fn face_len(mesh: &Mesh, f: FaceIdx) -> usize {
        let start = mesh.faces[f as usize].an_edge;
        let mut e = start;
        let mut n = 0;
        loop {
            n += 1;
            e = mesh.lnext(e);
            if e == start {
                break;
            }
        }
        n
    }

    /// Closed loop of `n` edges, built the way the tessellator feeds contours.
    fn ring(mesh: &mut Mesh, n: usize) -> EdgeIdx {
        let e = mesh.make_edge();
        mesh.splice(e, e ^ 1);
        let mut last = e;
        for _ in 1..n {
            mesh.split_edge(last);
            last = mesh.lnext(last);
        }
        last
    }

    #[test]
    fn make_edge_creates_two_distinct_vertices() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge();
        assert_eq!(mesh.verts.len(), 3);
        assert_eq!(mesh.faces.len(), 2);
        assert_eq!(mesh.edges.len(), 4);
        assert_ne!(mesh.org(e), mesh.dst(e));
        assert_eq!(mesh.lface(e), mesh.rface(e));
    }

    #[test]
    fn ring_has_two_faces_of_n_edges() {
        let mut mesh = Mesh::new();
        let e = ring(&mut mesh, 4);
        assert_eq!(count_live_verts(&mesh), 4);
        assert_ne!(mesh.lface(e), mesh.rface(e));
        assert_eq!(face_len(&mesh, mesh.lface(e)), 4);
        assert_eq!(face_len(&mesh, mesh.rface(e)), 4);
    }

    #[test]
    fn split_edge_copies_flag_and_winding() {
        let mut mesh = Mesh::new();
        let e = mesh.make_edge();
        mesh.edges[e as usize].flag = true;
        mesh.edges[e as usize].winding = 1;
        mesh.edges[(e ^ 1) as usize].winding = -1;
        let e_new = mesh.split_edge(e);
        assert!(mesh.edges[e_new as usize].flag);
        assert_eq!(mesh.edges[e_new as usize].winding, 1);
        assert_eq!(mesh.edges[(e_new ^ 1) as usize].winding, -1);
        assert_eq!(mesh.dst(e), mesh.org(e_new));
    }

    #[test]
    fn connect_splits_face_and_carries_no_flag() {
        let mut mesh = Mesh::new();
        let e = ring(&mut mesh, 4);
        let opposite = mesh.lnext(mesh.lnext(mesh.lnext(e)));
        let diag = mesh.connect(e, opposite);
        assert!(!mesh.edges[diag as usize].flag);
        assert_ne!(mesh.lface(diag), mesh.rface(diag));
        let total = face_len(&mesh, mesh.lface(diag)) + face_len(&mesh, mesh.rface(diag));
        assert_eq!(total, 6);
    }

    #[test]
    fn delete_edge_rejoins_faces() {
        let mut mesh = Mesh::new();
        let e = ring(&mut mesh, 4);
        let opposite = mesh.lnext(mesh.lnext(mesh.lnext(e)));
        let diag = mesh.connect(e, opposite);
        mesh.delete_edge(diag);
        assert_eq!(face_len(&mesh, mesh.lface(e)), 4);
        assert_eq!(count_live_verts(&mesh), 4);
    }

    #[test]
    fn add_winding_merges_flags() {
        let mut mesh = Mesh::new();
        let a = mesh.make_edge();
        let b = mesh.make_edge();
        mesh.edges[b as usize].flag = true;
        mesh.edges[b as usize].winding = 2;
        mesh.add_winding(a, b);
        assert!(mesh.edges[a as usize].flag);
        assert!(mesh.edges[(a ^ 1) as usize].flag);
        assert_eq!(mesh.edges[a as usize].winding, 2);
    }
}
