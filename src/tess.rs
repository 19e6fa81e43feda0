// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Planar polygon tessellator.
//
// Contours are projected onto a plane, swept into a planar subdivision whose
// faces are classified by a winding rule, and the inside faces are split into
// triangles. The sweep itself lives in `sweep.rs`; this module owns the
// public entry points, the projection and the pre/post passes.

use log::{debug, trace};
use nalgebra::Vector3;

use crate::dict::Dict;
use crate::error::TessError;
use crate::geom::{vert_eq, Real};
use crate::mesh::{EdgeIdx, Mesh, VertIdx, E_HEAD, F_HEAD, INVALID, V_HEAD};
use crate::priorityq::{PriorityQ, NOT_QUEUED};
use crate::sweep::ActiveRegion;

/// Inputs beyond this magnitude would overflow the sweep arithmetic.
const MAX_COORD: Real = 1e150;

/// Which winding numbers count as inside.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WindingRule {
    Odd,
    NonZero,
    Positive,
    Negative,
    AbsGeqTwo,
}

impl WindingRule {
    #[inline]
    pub fn is_inside(self, n: i32) -> bool {
        match self {
            WindingRule::Odd => n & 1 != 0,
            WindingRule::NonZero => n != 0,
            WindingRule::Positive => n > 0,
            WindingRule::Negative => n < 0,
            WindingRule::AbsGeqTwo => n.abs() >= 2,
        }
    }
}

/// A contour or output vertex. `edge_flag` tells whether the segment starting
/// at this vertex lies on an input boundary.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TessVertex {
    pub coords: [Real; 3],
    pub edge_flag: bool,
}

impl TessVertex {
    pub fn new(coords: [Real; 3], edge_flag: bool) -> Self {
        TessVertex { coords, edge_flag }
    }
}

pub struct Tessellator {
    pub(crate) mesh: Mesh,
    pub(crate) dict: Dict,
    pub(crate) pq: PriorityQ,
    pub(crate) event: VertIdx,
    pub(crate) regions: Vec<ActiveRegion>,
    pub(crate) winding_rule: WindingRule,
    pub(crate) bmin: [Real; 2],
    pub(crate) bmax: [Real; 2],
    contour_count: usize,
}

impl Tessellator {
    pub fn new() -> Self {
        Tessellator {
            mesh: Mesh::new(),
            dict: Dict::new(),
            pq: PriorityQ::new(),
            event: INVALID,
            regions: Vec::new(),
            winding_rule: WindingRule::Odd,
            bmin: [0.0; 2],
            bmax: [0.0; 2],
            contour_count: 0,
        }
    }

    /// Adds one closed contour. Contours with fewer than three vertices are
    /// accepted and vanish in the degenerate-edge pass.
    pub fn add_contour(&mut self, vertices: &[TessVertex]) -> Result<(), TessError> {
        if let Some(bad) = vertices
            .iter()
            .find(|v| v.coords.iter().any(|c| !c.is_finite() || c.abs() > MAX_COORD))
        {
            return Err(TessError::InvalidCoordinate(bad.coords));
        }
        if vertices.is_empty() {
            return Ok(());
        }

        let mut e: EdgeIdx = INVALID;
        for v in vertices {
            if e == INVALID {
                // A single self-loop.
                e = self.mesh.make_edge();
                self.mesh.splice(e, e ^ 1);
            } else {
                // Lengthen the loop by one vertex; e becomes the new edge.
                self.mesh.split_edge(e);
                e = self.mesh.lnext(e);
            }
            let org = self.mesh.org(e);
            self.mesh.verts[org as usize].coords = v.coords;

            // The contour runs along e; its interior is on the left.
            let (fwd, back) = (&mut self.mesh.edges[e as usize], e ^ 1);
            fwd.winding = 1;
            fwd.flag = v.edge_flag;
            let back = &mut self.mesh.edges[back as usize];
            back.winding = -1;
            back.flag = v.edge_flag;
        }
        self.contour_count += 1;
        Ok(())
    }

    /// Runs the tessellation and returns the inside triangles, counter-clockwise
    /// around `normal`. Without a normal one is estimated from the input and
    /// the triangles are oriented like the contours with positive winding.
    pub fn tessellate(
        mut self,
        winding_rule: WindingRule,
        normal: Option<[Real; 3]>,
    ) -> Vec<[TessVertex; 3]> {
        self.winding_rule = winding_rule;
        if self.mesh.verts[V_HEAD as usize].next == V_HEAD {
            return Vec::new();
        }
        self.project_polygon(normal);
        self.compute_interior();
        let triangles = self.output_triangles();
        debug!(
            "tessellated {} contours into {} triangles ({:?})",
            self.contour_count,
            triangles.len(),
            winding_rule
        );
        triangles
    }

    // ─────────────────────────── Projection ───────────────────────────

    fn project_polygon(&mut self, normal: Option<[Real; 3]>) {
        let (norm, computed) = match normal {
            Some(n) if n != [0.0; 3] => (Vector3::from(n), false),
            _ => (compute_normal(&self.mesh), true),
        };

        let i = long_axis(&norm);
        let mut s_unit = Vector3::zeros();
        let mut t_unit = Vector3::zeros();
        s_unit[(i + 1) % 3] = 1.0;
        t_unit[(i + 2) % 3] = if norm[i] > 0.0 { 1.0 } else { -1.0 };

        let mut v = self.mesh.verts[V_HEAD as usize].next;
        while v != V_HEAD {
            let vert = &mut self.mesh.verts[v as usize];
            let c = Vector3::from(vert.coords);
            vert.s = c.dot(&s_unit);
            vert.t = c.dot(&t_unit);
            v = vert.next;
        }
        if computed {
            check_orientation(&mut self.mesh);
        }

        let mut bmin = [Real::INFINITY; 2];
        let mut bmax = [Real::NEG_INFINITY; 2];
        let mut v = self.mesh.verts[V_HEAD as usize].next;
        while v != V_HEAD {
            let vert = &self.mesh.verts[v as usize];
            bmin = [bmin[0].min(vert.s), bmin[1].min(vert.t)];
            bmax = [bmax[0].max(vert.s), bmax[1].max(vert.t)];
            v = vert.next;
        }
        self.bmin = bmin;
        self.bmax = bmax;
        trace!("projected on axis {i}, bounds {bmin:?} {bmax:?}");
    }

    // ─────────────────────────── Sweep driver ───────────────────────────

    fn compute_interior(&mut self) {
        self.remove_degenerate_edges();

        let mut v = self.mesh.verts[V_HEAD as usize].next;
        while v != V_HEAD {
            let key = self.mesh.st(v);
            self.mesh.verts[v as usize].pq_handle = self.pq.insert(key, v);
            v = self.mesh.verts[v as usize].next;
        }
        self.pq.init();
        self.init_edge_dict();

        while let Some(v) = self.pq.extract_min() {
            self.mesh.verts[v as usize].pq_handle = NOT_QUEUED;
            // Merge every vertex at the same position into v.
            while let Some(next) = self.pq.minimum() {
                if !vert_eq(self.mesh.st(next), self.mesh.st(v)) {
                    break;
                }
                self.pq.extract_min();
                self.mesh.verts[next as usize].pq_handle = NOT_QUEUED;
                let (a, b) = (
                    self.mesh.verts[v as usize].an_edge,
                    self.mesh.verts[next as usize].an_edge,
                );
                self.mesh.splice(a, b);
            }
            self.sweep_event(v);
        }

        self.done_edge_dict();
        self.remove_degenerate_faces();
        self.mesh.tessellate_interior();
    }

    /// Drops zero-length edges and contours of one or two edges.
    fn remove_degenerate_edges(&mut self) {
        let mesh = &mut self.mesh;
        let mut e = mesh.edges[E_HEAD as usize].next;
        while e != E_HEAD {
            let mut e_next = mesh.edges[e as usize].next;
            let mut e_lnext = mesh.lnext(e);

            if vert_eq(mesh.st(mesh.org(e)), mesh.st(mesh.dst(e))) && mesh.lnext(e_lnext) != e {
                // Zero-length edge in a contour of three or more edges.
                mesh.splice(e_lnext, e);
                mesh.delete_edge(e);
                e = e_lnext;
                e_lnext = mesh.lnext(e);
            }
            if mesh.lnext(e_lnext) == e {
                if e_lnext != e {
                    if e_lnext == e_next || e_lnext == (e_next ^ 1) {
                        e_next = mesh.edges[e_next as usize].next;
                    }
                    mesh.delete_edge(e_lnext);
                }
                if e == e_next || e == (e_next ^ 1) {
                    e_next = mesh.edges[e_next as usize].next;
                }
                mesh.delete_edge(e);
            }
            e = e_next;
        }
    }

    /// Removes faces with only two edges, keeping their winding on the
    /// surviving edge.
    fn remove_degenerate_faces(&mut self) {
        let mesh = &mut self.mesh;
        let mut f = mesh.faces[F_HEAD as usize].next;
        while f != F_HEAD {
            let f_next = mesh.faces[f as usize].next;
            let e = mesh.faces[f as usize].an_edge;
            if mesh.lnext(mesh.lnext(e)) == e {
                let survivor = mesh.onext(e);
                mesh.add_winding(survivor, e);
                mesh.delete_edge(e);
            }
            f = f_next;
        }
    }

    // ─────────────────────────── Output ───────────────────────────

    fn output_triangles(&self) -> Vec<[TessVertex; 3]> {
        let mesh = &self.mesh;
        let mut out = Vec::new();
        let mut f = mesh.faces[F_HEAD as usize].next;
        while f != F_HEAD {
            let face = &mesh.faces[f as usize];
            if face.inside {
                let e0 = face.an_edge;
                let e1 = mesh.lnext(e0);
                let e2 = mesh.lnext(e1);
                debug_assert_eq!(mesh.lnext(e2), e0, "inside face is not a triangle");
                out.push([self.output_vertex(e0), self.output_vertex(e1), self.output_vertex(e2)]);
            }
            f = face.next;
        }
        out
    }

    fn output_vertex(&self, e: EdgeIdx) -> TessVertex {
        let mesh = &self.mesh;
        let rface = mesh.rface(e);
        let outside = rface == INVALID || !mesh.faces[rface as usize].inside;
        TessVertex {
            coords: mesh.verts[mesh.org(e) as usize].coords,
            edge_flag: mesh.edges[e as usize].flag && outside,
        }
    }
}

impl Default for Tessellator {
    fn default() -> Self {
        Self::new()
    }
}

fn long_axis(v: &Vector3<Real>) -> usize {
    let mut i = 0;
    if v[1].abs() > v[0].abs() {
        i = 1;
    }
    if v[2].abs() > v[i].abs() {
        i = 2;
    }
    i
}

fn short_axis(v: &Vector3<Real>) -> usize {
    let mut i = 0;
    if v[1].abs() < v[0].abs() {
        i = 1;
    }
    if v[2].abs() < v[i].abs() {
        i = 2;
    }
    i
}

/// Normal of the plane through the input: the cross product of the longest
/// extent with the vertex making the largest triangle with it.
fn compute_normal(mesh: &Mesh) -> Vector3<Real> {
    let coords = |v: VertIdx| Vector3::from(mesh.verts[v as usize].coords);
    let first = mesh.verts[V_HEAD as usize].next;
    let mut min_vert = [first; 3];
    let mut max_vert = [first; 3];
    let mut v = first;
    while v != V_HEAD {
        let c = coords(v);
        for i in 0..3 {
            if c[i] < coords(min_vert[i])[i] {
                min_vert[i] = v;
            }
            if c[i] > coords(max_vert[i])[i] {
                max_vert[i] = v;
            }
        }
        v = mesh.verts[v as usize].next;
    }

    let extent = |i: usize| coords(max_vert[i])[i] - coords(min_vert[i])[i];
    let mut i = 0;
    if extent(1) > extent(0) {
        i = 1;
    }
    if extent(2) > extent(i) {
        i = 2;
    }
    if extent(i) <= 0.0 {
        // All vertices coincide.
        return Vector3::z();
    }

    let base = coords(max_vert[i]);
    let d1 = coords(min_vert[i]) - base;
    let mut best = Vector3::zeros();
    let mut best_len2 = 0.0;
    let mut v = first;
    while v != V_HEAD {
        let n = d1.cross(&(coords(v) - base));
        if n.norm_squared() > best_len2 {
            best_len2 = n.norm_squared();
            best = n;
        }
        v = mesh.verts[v as usize].next;
    }
    if best_len2 <= 0.0 {
        // Collinear input: any normal perpendicular to the line will do.
        best = Vector3::zeros();
        best[short_axis(&d1)] = 1.0;
    }
    best
}

/// Flips t when the positively wound contours have negative area, so that
/// an estimated normal agrees with the contour orientation.
fn check_orientation(mesh: &mut Mesh) {
    let mut area = 0.0;
    let mut f = mesh.faces[F_HEAD as usize].next;
    while f != F_HEAD {
        let start = mesh.faces[f as usize].an_edge;
        if mesh.edges[start as usize].winding > 0 {
            let mut e = start;
            loop {
                let (o, d) = (mesh.st(mesh.org(e)), mesh.st(mesh.dst(e)));
                area += (o.s - d.s) * (o.t + d.t);
                e = mesh.lnext(e);
                if e == start {
                    break;
                }
            }
        }
        f = mesh.faces[f as usize].next;
    }
    if area < 0.0 {
        let mut v = mesh.verts[V_HEAD as usize].next;
        while v != V_HEAD {
            mesh.verts[v as usize].t = -mesh.verts[v as usize].t;
            v = mesh.verts[v as usize].next;
        }
    }
}
