use log::warn;

use crate::error::MeshError;
use crate::geom::{angle_deg, dist, iv2, midpoint, centroid3, Iv2};
use crate::im::Lum8Im;

pub mod span;
pub use span::{scan_mean, tri_probe_err, tri_spans, Span};

pub mod relocate;

pub mod ops;

pub mod border;
pub use border::BorderLoop;

pub mod refine;
pub use refine::{refine, RefineStats};

macro_rules! newtype {
    ($name:ident($inner:ty)) => {
        #[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
        pub struct $name(pub $inner);
    };
}

newtype!(VertI(u32));
newtype!(EdgeI(u32));
newtype!(TriI(u32));

#[derive(Debug, Clone)]
pub struct Vertex {
    pub pos: Iv2,
    pub edges: Vec<EdgeI>, // outgoing half-edges
    pub err: f64,
    pub movement: Vec<Iv2>, // allowed unit moves
    pub mov_dir: Iv2,       // chosen move, (0,0) = stay
    pub broken: bool,
}

#[derive(Debug, Clone)]
pub struct HEdge {
    pub start: VertI,
    pub end: VertI,
    pub twin: Option<EdgeI>,
    pub tri: Option<TriI>,
    pub prev: Option<EdgeI>,
    pub next: Option<EdgeI>,
    pub is_border: bool,
}

#[derive(Debug, Clone)]
pub struct Tri {
    pub edges: [EdgeI; 3],
    pub spans: Vec<Span>,
    pub avg: f64,
    pub err: f64,
    pub new: bool, // true until the error has first been computed
}

/// Half-edge mesh over a two-tone reference raster.
///
/// Elements live in parallel arenas addressed by index newtypes. Removal
/// tombstones the slot; slots are never reused within a run, so a pass may
/// capture `arr.len()` up front, skip dead slots as it goes, and be certain
/// that elements created mid-pass (always appended past the captured
/// length) are not revisited. Every mutating pass below relies on this.
pub struct Mesh<'im> {
    pub bw: &'im Lum8Im,
    pub min_e_len: f64,
    pub verts: Vec<Option<Vertex>>,
    pub edges: Vec<Option<HEdge>>,
    pub tris: Vec<Option<Tri>>,
    pub t_area: f64,
}

impl<'im> Mesh<'im> {
    pub fn new(bw: &'im Lum8Im, min_e_len: f64) -> Self {
        Self {
            bw,
            min_e_len,
            verts: Vec::new(),
            edges: Vec::new(),
            tris: Vec::new(),
            t_area: 0.0,
        }
    }

    // Accessors
    // -------------------------------------------------------------------------
    // Indexing a dead slot is a bug in the caller; panic with the index
    // rather than limping on with stale geometry.

    #[inline]
    pub fn v(&self, vi: VertI) -> &Vertex {
        self.verts[vi.0 as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("vertex {} is removed", vi.0))
    }

    #[inline]
    pub fn v_mut(&mut self, vi: VertI) -> &mut Vertex {
        self.verts[vi.0 as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("vertex {} is removed", vi.0))
    }

    #[inline]
    pub fn e(&self, ei: EdgeI) -> &HEdge {
        self.edges[ei.0 as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("half-edge {} is removed", ei.0))
    }

    #[inline]
    pub fn e_mut(&mut self, ei: EdgeI) -> &mut HEdge {
        self.edges[ei.0 as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("half-edge {} is removed", ei.0))
    }

    #[inline]
    pub fn t(&self, ti: TriI) -> &Tri {
        self.tris[ti.0 as usize]
            .as_ref()
            .unwrap_or_else(|| panic!("triangle {} is removed", ti.0))
    }

    #[inline]
    pub fn t_mut(&mut self, ti: TriI) -> &mut Tri {
        self.tris[ti.0 as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("triangle {} is removed", ti.0))
    }

    pub fn live_vert_count(&self) -> usize {
        self.verts.iter().flatten().count()
    }

    pub fn live_edge_count(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    pub fn live_tri_count(&self) -> usize {
        self.tris.iter().flatten().count()
    }

    // Makers
    // -------------------------------------------------------------------------

    pub fn make_vertex(&mut self, pos: Iv2) -> VertI {
        let vi = VertI(self.verts.len() as u32);
        self.verts.push(Some(Vertex {
            pos,
            edges: Vec::new(),
            err: 0.0,
            movement: Vec::new(),
            mov_dir: iv2(0, 0),
            broken: false,
        }));
        vi
    }

    /// New half-edge from `start` to `end`, registered on `start`'s
    /// outgoing list. If `end` already has an outgoing edge back to
    /// `start`, the two become twins (coincident geometry is always
    /// paired).
    pub fn make_edge(&mut self, start: VertI, end: VertI) -> EdgeI {
        let ei = EdgeI(self.edges.len() as u32);
        self.edges.push(Some(HEdge {
            start,
            end,
            twin: None,
            tri: None,
            prev: None,
            next: None,
            is_border: false,
        }));

        self.v_mut(start).edges.push(ei);

        let opp = self
            .v(end)
            .edges
            .iter()
            .copied()
            .find(|&oe| self.e(oe).end == start);
        if let Some(oe) = opp {
            self.e_mut(ei).twin = Some(oe);
            self.e_mut(oe).twin = Some(ei);
        }

        ei
    }

    /// New triangle over three half-edges forming a closed 3-cycle; wires
    /// the edges' prev/next/tri links.
    pub fn make_triangle(&mut self, edge_list: [EdgeI; 3]) -> TriI {
        for i in 0..3 {
            debug_assert_eq!(
                self.e(edge_list[i]).end,
                self.e(edge_list[(i + 1) % 3]).start,
                "edges do not form a closed loop"
            );
        }

        let ti = TriI(self.tris.len() as u32);
        self.tris.push(Some(Tri {
            edges: edge_list,
            spans: Vec::new(),
            avg: 255.0,
            err: 0.0,
            new: true,
        }));

        for i in 0..3 {
            let e = self.e_mut(edge_list[i]);
            e.tri = Some(ti);
            e.prev = Some(edge_list[(i + 2) % 3]);
            e.next = Some(edge_list[(i + 1) % 3]);
        }

        ti
    }

    /// Edges plus triangle from three vertices in order.
    pub fn connect_3(&mut self, v_list: [VertI; 3]) -> TriI {
        let mut e_list = [EdgeI(0); 3];
        for i in 0..3 {
            e_list[i] = self.make_edge(v_list[i], v_list[(i + 1) % 3]);
        }
        self.make_triangle(e_list)
    }

    // Removers
    // -------------------------------------------------------------------------

    /// Unlink a half-edge and tombstone its slot. Neighboring prev/next and
    /// the twin lose their reference; the start vertex drops it from its
    /// outgoing list.
    pub fn remove_edge(&mut self, ei: EdgeI) {
        let e = self.edges[ei.0 as usize]
            .take()
            .unwrap_or_else(|| panic!("half-edge {} removed twice", ei.0));

        let start = self.v_mut(e.start);
        start.edges.retain(|&x| x != ei);

        if let Some(p) = e.prev {
            if let Some(pe) = self.edges[p.0 as usize].as_mut() {
                pe.next = None;
            }
        }
        if let Some(n) = e.next {
            if let Some(ne) = self.edges[n.0 as usize].as_mut() {
                ne.prev = None;
            }
        }
        if let Some(t) = e.twin {
            if let Some(te) = self.edges[t.0 as usize].as_mut() {
                te.twin = None;
            }
        }
    }

    /// Remove a triangle and its three half-edges; the corner vertices
    /// remain.
    pub fn remove_triangle(&mut self, ti: TriI) {
        let t = self.tris[ti.0 as usize]
            .take()
            .unwrap_or_else(|| panic!("triangle {} removed twice", ti.0));
        for ei in t.edges {
            self.remove_edge(ei);
        }
    }

    pub fn remove_vertex(&mut self, vi: VertI) {
        let v = self.verts[vi.0 as usize]
            .take()
            .unwrap_or_else(|| panic!("vertex {} removed twice", vi.0));
        debug_assert!(v.edges.is_empty(), "removing a vertex with live edges");
    }

    // Grid construction
    // -------------------------------------------------------------------------

    /// `(hn+1) x (vn+1)` grid of vertices over the raster, two triangles
    /// per cell. Corner vertices are pinned, edge vertices slide along
    /// their edge, interior vertices move both ways. Each cell picks the
    /// diagonal whose two triangles score the smaller summed error.
    pub fn make_grid(&mut self, hn: usize, vn: usize) {
        let w = self.bw.w;
        let h = self.bw.h;

        let step_h = (w as f64 - 1.0) / hn as f64;
        let step_v = (h as f64 - 1.0) / vn as f64;

        self.t_area = step_h * step_v;

        let mut grid: Vec<Vec<VertI>> = Vec::with_capacity(vn + 1);
        for j in 0..=vn {
            let mut row = Vec::with_capacity(hn + 1);
            for i in 0..=hn {
                let pos = iv2(
                    (i as f64 * step_h).round() as i32,
                    (j as f64 * step_v).round() as i32,
                );
                let vi = self.make_vertex(pos);

                let h_mov = !(i == 0 || i == hn);
                let v_mov = !(j == 0 || j == vn);

                if h_mov {
                    self.v_mut(vi).movement.extend([iv2(1, 0), iv2(-1, 0)]);
                }
                if v_mov {
                    self.v_mut(vi).movement.extend([iv2(0, 1), iv2(0, -1)]);
                }

                row.push(vi);
            }
            grid.push(row);
        }

        for y in 0..vn {
            for x in 0..hn {
                // a b
                // c d
                let a = grid[y][x];
                let b = grid[y][x + 1];
                let c = grid[y + 1][x];
                let d = grid[y + 1][x + 1];

                let pa = self.v(a).pos;
                let pb = self.v(b).pos;
                let pc = self.v(c).pos;
                let pd = self.v(d).pos;

                // [/] split
                let flip_false =
                    tri_probe_err(self.bw, [pa, pc, pb]) + tri_probe_err(self.bw, [pb, pc, pd]);
                // [\] split
                let flip_true =
                    tri_probe_err(self.bw, [pa, pc, pd]) + tri_probe_err(self.bw, [pa, pd, pb]);

                if flip_true < flip_false {
                    self.connect_3([a, c, d]);
                    self.connect_3([a, d, b]);
                } else {
                    self.connect_3([a, c, b]);
                    self.connect_3([b, c, d]);
                }
            }
        }
    }

    // Geometry queries
    // -------------------------------------------------------------------------

    pub fn edge_len(&self, ei: EdgeI) -> f64 {
        let e = self.e(ei);
        dist(self.v(e.start).pos, self.v(e.end).pos)
    }

    pub fn edge_midpoint(&self, ei: EdgeI) -> Iv2 {
        let e = self.e(ei);
        midpoint(self.v(e.start).pos, self.v(e.end).pos)
    }

    /// Interior angle opposite this edge (at the third corner of its
    /// triangle).
    pub fn opp_angle(&self, ei: EdgeI) -> i32 {
        let next = self.next_of(ei);
        let v = self.v(self.e(next).end).pos;
        let a = self.v(self.e(ei).start).pos;
        let b = self.v(self.e(ei).end).pos;
        angle_deg(v, a, v, b)
    }

    pub fn opp_angle_sum(&self, ei: EdgeI) -> Option<i32> {
        let twin = self.e(ei).twin?;
        Some(self.opp_angle(ei) + self.opp_angle(twin))
    }

    /// Quad-corner angle at this edge's start vertex, spanning both
    /// triangles adjacent to the edge. Reflex corners report as > 180.
    pub fn adj_angle(&self, ei: EdgeI) -> i32 {
        let Some(twin) = self.e(ei).twin else {
            return 0;
        };

        let v = self.v(self.e(ei).start).pos;
        let a = self.v(self.e(self.next_of(twin)).end).pos;
        let b = self.v(self.e(self.prev_of(ei)).start).pos;

        let angle = angle_deg(v, a, v, b);
        let cr = crate::geom::cross(v.sub(b), a.sub(v));

        if cr < 0 { angle } else { 360 - angle }
    }

    pub fn tri_verts(&self, ti: TriI) -> [VertI; 3] {
        let t = self.t(ti);
        [
            self.e(t.edges[0]).start,
            self.e(t.edges[1]).start,
            self.e(t.edges[2]).start,
        ]
    }

    pub fn tri_positions(&self, ti: TriI) -> [Iv2; 3] {
        let vs = self.tri_verts(ti);
        [self.v(vs[0]).pos, self.v(vs[1]).pos, self.v(vs[2]).pos]
    }

    pub fn tri_centroid(&self, ti: TriI) -> Iv2 {
        let p = self.tri_positions(ti);
        centroid3(p[0], p[1], p[2])
    }

    pub fn tri_bb_area(&self, ti: TriI) -> f64 {
        let p = self.tri_positions(ti);
        let min_x = p[0].x.min(p[1].x).min(p[2].x);
        let max_x = p[0].x.max(p[1].x).max(p[2].x);
        let min_y = p[0].y.min(p[1].y).min(p[2].y);
        let max_y = p[0].y.max(p[1].y).max(p[2].y);
        ((max_x - min_x) as f64) * ((max_y - min_y) as f64)
    }

    pub fn tri_shortest_edge(&self, ti: TriI) -> EdgeI {
        let t = self.t(ti);
        let mut best = t.edges[0];
        let mut best_len = self.edge_len(best);
        for &ei in &t.edges[1..] {
            let l = self.edge_len(ei);
            if l < best_len {
                best = ei;
                best_len = l;
            }
        }
        best
    }

    pub fn tri_longest_edge(&self, ti: TriI) -> EdgeI {
        let t = self.t(ti);
        let mut best = t.edges[0];
        let mut best_len = self.edge_len(best);
        for &ei in &t.edges[1..] {
            let l = self.edge_len(ei);
            if l >= best_len {
                best = ei;
                best_len = l;
            }
        }
        best
    }

    pub fn tri_largest_angle(&self, ti: TriI) -> i32 {
        let t = self.t(ti);
        t.edges.iter().map(|&e| self.opp_angle(e)).max().unwrap_or(0)
    }

    pub fn tri_smallest_angle(&self, ti: TriI) -> i32 {
        let t = self.t(ti);
        t.edges.iter().map(|&e| self.opp_angle(e)).min().unwrap_or(0)
    }

    pub fn adjacent_tris(&self, vi: VertI) -> Vec<TriI> {
        self.v(vi)
            .edges
            .iter()
            .filter_map(|&ei| self.e(ei).tri)
            .collect()
    }

    /// Incident triangle with the highest error (first wins on ties).
    pub fn highest_err_tri(&self, vi: VertI) -> Option<TriI> {
        let mut best: Option<(TriI, f64)> = None;
        for ti in self.adjacent_tris(vi) {
            let err = self.t(ti).err;
            match best {
                Some((_, b)) if err <= b => {}
                _ => best = Some((ti, err)),
            }
        }
        best.map(|(ti, _)| ti)
    }

    // Scoring
    // -------------------------------------------------------------------------

    /// Recompute a triangle's spans, mean intensity and error. A triangle
    /// whose spans cover no pixel is degenerate; the best-effort repair is
    /// collapsing its shortest edge (which may remove this very triangle).
    pub fn score_triangle(&mut self, ti: TriI) -> Result<(), MeshError> {
        let spans = tri_spans(self.tri_positions(ti));

        match scan_mean(self.bw, &spans) {
            Some(avg) => {
                let t = self.t_mut(ti);
                t.spans = spans;
                t.avg = avg;
                t.err = span::err_from_mean(avg);
                t.new = false;
            }
            None => {
                let short = self.tri_shortest_edge(ti);
                let removed = self.collapse_edge(short, false)?;
                if self.tris[ti.0 as usize].is_some() {
                    if removed == 0 {
                        // Repair refused; flag the corners so the state is
                        // visible in debug runs.
                        for vi in self.tri_verts(ti) {
                            self.v_mut(vi).broken = true;
                        }
                    }
                    let t = self.t_mut(ti);
                    t.spans = spans;
                    t.new = false;
                }
            }
        }

        Ok(())
    }

    /// Vertex error: each incident triangle contributes a third of its own.
    pub fn vertex_err(&self, vi: VertI) -> f64 {
        self.adjacent_tris(vi)
            .iter()
            .map(|&ti| (self.t(ti).err / 3.0).floor())
            .sum()
    }

    pub fn update_vertex_err(&mut self, vi: VertI) {
        let err = self.vertex_err(vi);
        self.v_mut(vi).err = err;
    }

    /// Rescore every triangle. The arena may shrink mid-pass (degenerate
    /// repair) and grow past the captured bound (fan rebuild); the loop
    /// re-reads the length so repaired fans are scored too.
    pub fn update_triangles(&mut self) -> Result<(), MeshError> {
        let mut i = 0;
        while i < self.tris.len() {
            if self.tris[i].is_some() {
                self.score_triangle(TriI(i as u32))?;
            }
            i += 1;
        }
        Ok(())
    }

    pub fn update_vertices(&mut self) {
        for i in 0..self.verts.len() {
            if self.verts[i].is_some() {
                self.update_vertex_err(VertI(i as u32));
            }
        }
    }

    pub fn update_all(&mut self) -> Result<(), MeshError> {
        self.update_triangles()?;
        self.update_vertices();
        Ok(())
    }

    pub fn error_totals(&self) -> (f64, f64) {
        let v_err = self.verts.iter().flatten().map(|v| v.err).sum();
        let t_err = self.tris.iter().flatten().map(|t| t.err).sum();
        (v_err, t_err)
    }

    // Integrity check
    // -------------------------------------------------------------------------

    /// Walk every element and verify the half-edge invariants: triangle
    /// edge triples form 3-cycles and point back at their triangle, twins
    /// are symmetric with mirrored endpoints, prev/next share the joining
    /// vertex, and vertex outgoing lists hold exactly the edges starting
    /// there. Findings are logged; nothing is repaired. Debug aid.
    pub fn health_check(&self) -> (usize, usize, usize) {
        let mut broken_t = 0;
        let mut broken_e = 0;
        let mut broken_v = 0;

        for (i, t) in self.tris.iter().enumerate() {
            let Some(t) = t else { continue };
            let mut bad = false;

            for k in 0..3 {
                let e = t.edges[k];
                let e_next = t.edges[(k + 1) % 3];

                if self.edges[e.0 as usize].is_none() {
                    warn!("triangle {i}: edge {} is removed", e.0);
                    bad = true;
                    continue;
                }
                if self.e(e).end != self.e(e_next).start {
                    warn!("triangle {i}: edges do not form a closed cycle");
                    bad = true;
                }
                if self.e(e).tri != Some(TriI(i as u32)) {
                    warn!("triangle {i}: edge {} does not point back", e.0);
                    bad = true;
                }
                if self.e(e).next != Some(e_next) {
                    warn!("triangle {i}: edge {} has wrong next", e.0);
                    bad = true;
                }
            }

            if bad {
                broken_t += 1;
            }
        }

        for (i, e) in self.edges.iter().enumerate() {
            let Some(e) = e else { continue };
            let ei = EdgeI(i as u32);
            let mut bad = false;

            if self.verts[e.start.0 as usize].is_none() || self.verts[e.end.0 as usize].is_none() {
                warn!("edge {i}: endpoint vertex is removed");
                bad = true;
            } else if !self.v(e.start).edges.contains(&ei) {
                let p = self.v(e.start).pos;
                warn!("edge {i}: missing from start vertex ({}, {})", p.x, p.y);
                bad = true;
            }

            if let Some(t) = e.twin {
                match self.edges[t.0 as usize].as_ref() {
                    None => {
                        warn!("edge {i}: twin {} is removed", t.0);
                        bad = true;
                    }
                    Some(te) => {
                        if te.twin != Some(ei) || te.start != e.end || te.end != e.start {
                            warn!("edge {i}: twin {} is not symmetric", t.0);
                            bad = true;
                        }
                    }
                }
            }

            match e.tri {
                None => {
                    warn!("edge {i}: belongs to no triangle");
                    bad = true;
                }
                Some(ti) => {
                    if self.tris[ti.0 as usize].is_none() {
                        warn!("edge {i}: triangle {} is removed", ti.0);
                        bad = true;
                    } else if !self.t(ti).edges.contains(&ei) {
                        warn!("edge {i}: not in triangle {}'s edge triple", ti.0);
                        bad = true;
                    }
                }
            }

            if let Some(p) = e.prev {
                if self.edges[p.0 as usize].is_none() || self.e(p).end != e.start {
                    warn!("edge {i}: prev does not share the joining vertex");
                    bad = true;
                }
            }
            if let Some(n) = e.next {
                if self.edges[n.0 as usize].is_none() || self.e(n).start != e.end {
                    warn!("edge {i}: next does not share the joining vertex");
                    bad = true;
                }
            }

            if bad {
                broken_e += 1;
            }
        }

        for (i, v) in self.verts.iter().enumerate() {
            let Some(v) = v else { continue };
            let mut bad = false;

            for &ei in &v.edges {
                match self.edges[ei.0 as usize].as_ref() {
                    None => {
                        warn!("vertex {i}: outgoing edge {} is removed", ei.0);
                        bad = true;
                    }
                    Some(e) => {
                        if e.start != VertI(i as u32) {
                            warn!("vertex {i}: edge {} does not start here", ei.0);
                            bad = true;
                        }
                    }
                }
            }

            if bad {
                broken_v += 1;
            }
        }

        (broken_t, broken_e, broken_v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{euler_characteristic, lum_from_ascii};

    fn grid_mesh(bw: &Lum8Im, hn: usize, vn: usize) -> Mesh<'_> {
        let mut mesh = Mesh::new(bw, 3.0);
        mesh.make_grid(hn, vn);
        mesh
    }

    #[test]
    fn grid_counts_match_dimensions() {
        let bw = lum_from_ascii(
            "
            ........
            ..####..
            ..####..
            ........
            ",
        );
        let mesh = grid_mesh(&bw, 4, 4);

        assert_eq!(mesh.live_vert_count(), 25);
        assert_eq!(mesh.live_tri_count(), 32);
        // 3 half-edges per triangle.
        assert_eq!(mesh.live_edge_count(), 96);
        assert_eq!(euler_characteristic(&mesh), 1);
    }

    #[test]
    fn grid_twin_pairing_is_symmetric() {
        let bw = lum_from_ascii(
            "
            ....
            .##.
            .##.
            ....
            ",
        );
        let mesh = grid_mesh(&bw, 2, 2);

        for (i, e) in mesh.edges.iter().enumerate() {
            let Some(e) = e else { continue };
            if let Some(t) = e.twin {
                let te = mesh.e(t);
                assert_eq!(te.twin, Some(EdgeI(i as u32)));
                assert_eq!(te.start, e.end);
                assert_eq!(te.end, e.start);
            }
        }

        let (bt, be, bv) = mesh.health_check();
        assert_eq!((bt, be, bv), (0, 0, 0));
    }

    #[test]
    fn corner_vertices_are_pinned_and_interior_free() {
        let bw = Lum8Im::new_filled(9, 9, 255);
        let mesh = grid_mesh(&bw, 2, 2);

        // Corner (0,0).
        assert!(mesh.v(VertI(0)).movement.is_empty());
        // Top edge midpoint: horizontal only.
        assert_eq!(mesh.v(VertI(1)).movement, vec![iv2(1, 0), iv2(-1, 0)]);
        // Center: both axes.
        assert_eq!(mesh.v(VertI(4)).movement.len(), 4);
    }

    #[test]
    fn scoring_solid_regions() {
        let bw = lum_from_ascii(
            "
            ####....
            ####....
            ####....
            ####....
            ####....
            ####....
            ####....
            ####....
            ",
        );
        let mut mesh = grid_mesh(&bw, 2, 2);
        mesh.update_all().unwrap();

        for (i, t) in mesh.tris.iter().enumerate() {
            let Some(t) = t else { continue };
            assert!(!t.new, "triangle {i} still unscored");
            assert!((0.0..=255.0).contains(&t.avg));
        }

        let (v_err, t_err) = mesh.error_totals();
        assert!(v_err >= 0.0 && t_err >= 0.0);
    }

    #[test]
    fn update_vertex_err_sums_thirds() {
        let bw = Lum8Im::new_filled(9, 9, 0);
        let mut mesh = grid_mesh(&bw, 2, 2);
        mesh.update_all().unwrap();

        // Uniform black raster: every triangle err 0, every vertex err 0.
        for v in mesh.verts.iter().flatten() {
            assert_eq!(v.err, 0.0);
        }
    }
}
