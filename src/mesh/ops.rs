//! Local refinement operators. Every operator either commits a full local
//! rewrite or refuses without touching the mesh; refusals are `Ok` with a
//! zero/false payload, `Err` is reserved for detected structural breakage.
//!
//! Passes iterate the arenas against a length captured at entry: slots
//! removed mid-pass are skipped as tombstones, and elements created
//! mid-pass land past the captured bound, so a pass never operates on its
//! own products.

use crate::error::MeshError;
use crate::geom::{dist, iv2, Iv2};
use crate::mesh::span::tri_probe_err;
use crate::mesh::{EdgeI, Mesh, TriI, VertI};

const FULL_MOVEMENT: [Iv2; 4] = [iv2(1, 0), iv2(-1, 0), iv2(0, 1), iv2(0, -1)];

impl Mesh<'_> {
    #[inline]
    pub(crate) fn next_of(&self, ei: EdgeI) -> EdgeI {
        self.e(ei)
            .next
            .unwrap_or_else(|| panic!("half-edge {} has no next", ei.0))
    }

    #[inline]
    pub(crate) fn prev_of(&self, ei: EdgeI) -> EdgeI {
        self.e(ei)
            .prev
            .unwrap_or_else(|| panic!("half-edge {} has no prev", ei.0))
    }

    #[inline]
    pub(crate) fn tri_of(&self, ei: EdgeI) -> TriI {
        self.e(ei)
            .tri
            .unwrap_or_else(|| panic!("half-edge {} has no triangle", ei.0))
    }

    // Edge flip
    // -------------------------------------------------------------------------

    /// Replace the diagonal shared by this edge's two triangles with the
    /// other quad diagonal. Refuses on boundary edges and on unscored
    /// neighbors.
    pub fn flip_edge(&mut self, ei: EdgeI) -> Result<bool, MeshError> {
        let Some(twin) = self.e(ei).twin else {
            return Ok(false);
        };

        let t1 = self.tri_of(ei);
        let t2 = self.tri_of(twin);
        if self.t(t1).new || self.t(t2).new {
            return Ok(false);
        }

        // a b      [\] acd, adb becomes
        // c d      [/] acb, bcd
        let va = self.e(ei).end;
        let vb = self.e(self.next_of(twin)).end;
        let vc = self.e(self.next_of(ei)).end;
        let vd = self.e(ei).start;

        self.remove_triangle(t1);
        self.remove_triangle(t2);

        let n1 = self.connect_3([va, vc, vb]);
        let n2 = self.connect_3([vb, vc, vd]);

        self.score_triangle(n1)?;
        self.score_triangle(n2)?;

        for vi in [va, vb, vc, vd] {
            self.update_vertex_err(vi);
        }

        Ok(true)
    }

    /// Trial the flipped pair's summed error against the current pair
    /// without touching the arena; commit only on a strict improvement.
    pub fn flip_edge_if_better(&mut self, ei: EdgeI) -> Result<bool, MeshError> {
        let Some(twin) = self.e(ei).twin else {
            return Ok(false);
        };

        let t1 = self.tri_of(ei);
        let t2 = self.tri_of(twin);
        if self.t(t2).new {
            return Ok(false);
        }

        let curr_err = self.t(t1).err + self.t(t2).err;

        let pa = self.v(self.e(ei).end).pos;
        let pb = self.v(self.e(self.next_of(twin)).end).pos;
        let pc = self.v(self.e(self.next_of(ei)).end).pos;
        let pd = self.v(self.e(ei).start).pos;

        let new_err =
            tri_probe_err(self.bw, [pa, pc, pb]) + tri_probe_err(self.bw, [pb, pc, pd]);

        if new_err < curr_err {
            self.flip_edge(ei)
        } else {
            Ok(false)
        }
    }

    // Edge collapse
    // -------------------------------------------------------------------------

    /// Collapse refuses at the image boundary: edges without a twin and
    /// edges with an endpoint on the canvas rim stay put.
    pub fn can_collapse(&self, ei: EdgeI) -> bool {
        let e = self.e(ei);
        if e.twin.is_none() {
            return false;
        }

        let s = self.v(e.start).pos;
        let t = self.v(e.end).pos;
        let max_x = self.bw.w as i32 - 1;
        let max_y = self.bw.h as i32 - 1;

        if s.x == 0 || s.y == 0 || t.x == 0 || t.y == 0 {
            return false;
        }
        if s.x == max_x || t.x == max_x {
            return false;
        }
        if s.y == max_y || t.y == max_y {
            return false;
        }

        true
    }

    /// Delete the start vertex, drop every triangle around it, and
    /// re-triangulate its 1-ring as a fan from the end vertex. Returns the
    /// number of removed triangles (0 = refused).
    ///
    /// A quad corner at the start vertex above 175 degrees would leave a
    /// sliver; in that case the collapse is retried once from the twin
    /// side. The ring walk is bounded by the start vertex's outgoing-edge
    /// count; exceeding it means the fan is not simple and the mesh is
    /// broken.
    pub fn collapse_edge(&mut self, ei: EdgeI, retry: bool) -> Result<u32, MeshError> {
        if !self.can_collapse(ei) {
            return Ok(0);
        }

        let del_v = self.e(ei).start;
        let end_v = self.e(ei).end;
        let Some(twin) = self.e(ei).twin else {
            return Ok(0);
        };

        let Some(prev_e) = self.e(self.next_of(twin)).twin else {
            return Ok(0);
        };
        let next_e = self.prev_of(ei);

        if self.adj_angle(prev_e) > 175 || self.adj_angle(next_e) > 175 {
            if !retry {
                return self.collapse_edge(twin, true);
            }
            return Ok(0);
        }

        // Collect the 1-ring (excluding the collapse target), refusing on
        // unscored triangles.
        let bound = self.v(del_v).edges.len();
        let mut ring: Vec<VertI> = Vec::new();
        let mut curr = ei;
        let mut steps = 0usize;
        loop {
            if self.t(self.tri_of(curr)).new {
                return Ok(0);
            }

            let Some(pt) = self.e(self.prev_of(curr)).twin else {
                return Ok(0);
            };
            curr = pt;

            steps += 1;
            if steps > bound {
                let pos = self.v(del_v).pos;
                return Err(MeshError::RingWalk { x: pos.x, y: pos.y });
            }

            let c_end = self.e(curr).end;
            if c_end != end_v {
                ring.push(c_end);
            } else {
                break;
            }
        }

        // Point of no return: drop the star of del_v, then the vertex.
        let mut removed_t = 0u32;
        while let Some(&first) = self.v(del_v).edges.first() {
            let ti = self.tri_of(first);
            self.remove_triangle(ti);
            removed_t += 1;
        }
        self.remove_vertex(del_v);

        // Fan rebuild with end_v as apex.
        for i in 0..ring.len().saturating_sub(1) {
            let ti = self.connect_3([ring[i], ring[i + 1], end_v]);
            self.score_triangle(ti)?;
        }

        for &vi in &ring {
            self.update_vertex_err(vi);
        }
        self.update_vertex_err(end_v);

        Ok(removed_t)
    }

    // Point insertion
    // -------------------------------------------------------------------------

    /// Split a triangle at its centroid into three. The new vertex is free
    /// to move in all four directions.
    pub fn insert_point_centroid(&mut self, ti: TriI) -> Result<bool, MeshError> {
        let c = self.tri_centroid(ti);
        let [v1, v2, v3] = self.tri_verts(ti);

        let new_v = self.make_vertex(c);
        self.v_mut(new_v).movement.extend(FULL_MOVEMENT);

        self.remove_triangle(ti);

        let t1 = self.connect_3([v1, v2, new_v]);
        let t2 = self.connect_3([v2, v3, new_v]);
        let t3 = self.connect_3([v3, v1, new_v]);

        self.score_triangle(t1)?;
        self.score_triangle(t2)?;
        self.score_triangle(t3)?;

        for vi in [v1, v2, v3, new_v] {
            self.update_vertex_err(vi);
        }

        Ok(true)
    }

    /// Centroid insertion, vetoed when any spoke would fall below
    /// `min_e_len`. The probe is allocation-free.
    pub fn try_insert_centroid(&mut self, ti: TriI) -> Result<bool, MeshError> {
        let c = self.tri_centroid(ti);
        let ps = self.tri_positions(ti);

        let min_d = ps
            .iter()
            .map(|&p| dist(c, p))
            .fold(f64::INFINITY, f64::min);

        if min_d > self.min_e_len {
            self.insert_point_centroid(ti)
        } else {
            Ok(false)
        }
    }

    /// Split the two triangles sharing this edge at its midpoint into
    /// four. Refuses on boundary edges and unscored far triangles.
    pub fn insert_point_midpoint(&mut self, ei: EdgeI) -> Result<bool, MeshError> {
        let Some(twin) = self.e(ei).twin else {
            return Ok(false);
        };
        let twin_tri = self.tri_of(twin);
        if self.t(twin_tri).new {
            return Ok(false);
        }

        let m = self.edge_midpoint(ei);

        // a b      [\] acd, adb becomes
        // c d      [X] around the midpoint (self is "da")
        let va = self.e(ei).end;
        let vb = self.e(self.next_of(twin)).end;
        let vc = self.e(self.next_of(ei)).end;
        let vd = self.e(ei).start;
        let e_tri = self.tri_of(ei);

        let new_v = self.make_vertex(m);
        self.v_mut(new_v).movement.extend(FULL_MOVEMENT);

        self.remove_triangle(twin_tri);
        self.remove_triangle(e_tri);

        let t1 = self.connect_3([va, vc, new_v]);
        let t2 = self.connect_3([vc, vd, new_v]);
        let t3 = self.connect_3([vd, vb, new_v]);
        let t4 = self.connect_3([vb, va, new_v]);

        self.score_triangle(t1)?;
        self.score_triangle(t2)?;
        self.score_triangle(t3)?;
        self.score_triangle(t4)?;

        for vi in [va, vb, vc, vd, new_v] {
            self.update_vertex_err(vi);
        }

        Ok(true)
    }

    /// Midpoint insertion, vetoed when any new edge would fall below
    /// `min_e_len`.
    pub fn try_insert_midpoint(&mut self, ei: EdgeI) -> Result<bool, MeshError> {
        let Some(twin) = self.e(ei).twin else {
            return Ok(false);
        };

        let m = self.edge_midpoint(ei);
        let corners = [
            self.v(self.e(ei).end).pos,
            self.v(self.e(self.next_of(twin)).end).pos,
            self.v(self.e(self.next_of(ei)).end).pos,
            self.v(self.e(ei).start).pos,
        ];

        let min_d = corners
            .iter()
            .map(|&p| dist(m, p))
            .fold(f64::INFINITY, f64::min);

        if min_d > self.min_e_len {
            self.insert_point_midpoint(ei)
        } else {
            Ok(false)
        }
    }

    // Passes
    // -------------------------------------------------------------------------

    /// Flip every interior edge whose two opposite interior angles sum
    /// past 240 degrees. Straightens triangles with an over-wide base.
    pub fn flip_by_angle(&mut self) -> Result<u32, MeshError> {
        let mut flips = 0;
        let end = self.edges.len();

        for i in 0..end {
            if self.edges[i].is_none() {
                continue;
            }
            let ei = EdgeI(i as u32);
            if let Some(angle) = self.opp_angle_sum(ei) {
                if angle > 240 && self.flip_edge(ei)? {
                    flips += 1;
                }
            }
        }

        Ok(flips)
    }

    /// Flip interior edges wherever the trial strictly lowers the summed
    /// approximation error, skipping reflex-ish quads.
    pub fn flip_by_error(&mut self) -> Result<u32, MeshError> {
        let mut flips = 0;
        let end = self.edges.len();

        for i in 0..end {
            if self.edges[i].is_none() {
                continue;
            }
            let ei = EdgeI(i as u32);
            let Some(twin) = self.e(ei).twin else { continue };

            if self.adj_angle(ei) < 135
                && self.adj_angle(twin) < 135
                && self.flip_edge_if_better(ei)?
            {
                flips += 1;
            }
        }

        Ok(flips)
    }

    /// Two collapse sweeps: edges below `min_e_len`, then the shortest
    /// edge of every triangle whose bounding box dropped below 20% of the
    /// initial cell area.
    pub fn collapse(&mut self) -> Result<u32, MeshError> {
        let mut collapses = 0;

        let end = self.edges.len();
        for i in 0..end {
            if self.edges[i].is_none() {
                continue;
            }
            let ei = EdgeI(i as u32);
            if self.edge_len(ei) < self.min_e_len && self.collapse_edge(ei, false)? > 0 {
                collapses += 1;
            }
        }

        let end = self.tris.len();
        for j in 0..end {
            if self.tris[j].is_none() {
                continue;
            }
            let ti = TriI(j as u32);
            if self.tri_bb_area(ti) < self.t_area * 0.2 {
                let short = self.tri_shortest_edge(ti);
                if self.collapse_edge(short, false)? > 0 {
                    collapses += 1;
                }
            }
        }

        Ok(collapses)
    }

    /// Point insertion: triangles grown past 3x the initial cell area, or
    /// near-full-size ones still scoring badly, get a centroid point when
    /// roughly equilateral and a longest-edge midpoint otherwise. Returns
    /// (centroid, midpoint) insert counts.
    pub fn insert_points(&mut self) -> Result<(u32, u32), MeshError> {
        let mut t_inserts = 0;
        let mut e_inserts = 0;
        let end = self.tris.len();

        for i in 0..end {
            if self.tris[i].is_none() {
                continue;
            }
            let ti = TriI(i as u32);
            if self.t(ti).new {
                continue;
            }

            let bb = self.tri_bb_area(ti);
            let cond_1 = bb > self.t_area * 3.0;
            let cond_2 = bb >= self.t_area * 0.9 && self.t(ti).err > 100.0;
            if !(cond_1 || cond_2) {
                continue;
            }

            if self.tri_largest_angle(ti) > 90 || self.tri_smallest_angle(ti) < 45 {
                let longest = self.tri_longest_edge(ti);
                if self.try_insert_midpoint(longest)? {
                    e_inserts += 1;
                }
            } else if self.try_insert_centroid(ti)? {
                t_inserts += 1;
            }
        }

        Ok((t_inserts, e_inserts))
    }

    /// A vertex that wants to move nowhere but still carries error above
    /// `min_err` is stuck; split its worst incident triangle, provided the
    /// triangle kept most of its initial size.
    pub fn insert_points_at_stuck_vertex(&mut self, min_err: f64) -> Result<u32, MeshError> {
        let mut inserts = 0;
        let end = self.verts.len();

        for i in 0..end {
            let Some(v) = self.verts[i].as_ref() else {
                continue;
            };
            if v.mov_dir != iv2(0, 0) || v.err <= min_err {
                continue;
            }

            if let Some(ti) = self.highest_err_tri(VertI(i as u32)) {
                if self.tri_bb_area(ti) >= self.t_area * 0.7 && self.try_insert_centroid(ti)? {
                    inserts += 1;
                }
            }
        }

        Ok(inserts)
    }
}
