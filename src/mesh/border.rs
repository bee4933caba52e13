//! Border extraction. A half-edge is a border iff its own triangle is dark
//! (mean <= 127) and its twin's triangle is light, so walking borders
//! always keeps the dark side on the left.

use crate::geom::cross;
use crate::mesh::{EdgeI, Mesh, VertI};
use crate::poly::PolyPath;

/// One closed run of border half-edges.
pub type BorderLoop = Vec<EdgeI>;

impl Mesh<'_> {
    /// Re-flag every interior edge from the current triangle means.
    pub fn border_update(&mut self) {
        for i in 0..self.edges.len() {
            let Some(e) = self.edges[i].as_ref() else {
                continue;
            };
            let Some(twin) = e.twin else { continue };

            let ei = EdgeI(i as u32);
            let self_avg = self.t(self.tri_of(ei)).avg;
            let twin_avg = self.t(self.tri_of(twin)).avg;

            self.e_mut(ei).is_border = twin_avg > 127.0 && self_avg <= 127.0;
        }
    }

    /// First border half-edge leaving this vertex, in outgoing-list order.
    fn vertex_border_edge(&self, vi: VertI) -> Option<EdgeI> {
        self.v(vi)
            .edges
            .iter()
            .copied()
            .find(|&ei| self.e(ei).is_border)
    }

    /// Walk the loop starting at a border edge, consuming flags as it goes
    /// so every border edge is visited exactly once across all loops.
    fn border_loop(&mut self, ei: EdgeI) -> BorderLoop {
        if !self.e(ei).is_border {
            return Vec::new();
        }

        let mut lp = vec![ei];
        let mut curr = ei;
        loop {
            let next_border = self.vertex_border_edge(self.e(curr).end);
            self.e_mut(curr).is_border = false;
            match next_border {
                Some(nb) => {
                    lp.push(nb);
                    curr = nb;
                }
                None => break,
            }
        }

        lp
    }

    /// All border loops, in arena order of their starting edges.
    pub fn border_loops(&mut self) -> Vec<BorderLoop> {
        let mut loops = Vec::new();
        for i in 0..self.edges.len() {
            if self.edges[i].is_some() {
                let lp = self.border_loop(EdgeI(i as u32));
                if !lp.is_empty() {
                    loops.push(lp);
                }
            }
        }
        loops
    }

    /// Convert the border loops into oriented polygons with hole markers.
    ///
    /// The turn at a loop's lowest (minimum-y) vertex tells outer from
    /// inner: an inner loop gets a marker at the centroid of the triangle
    /// across its first border edge, which lies on the light side inside
    /// the hole. A zero cross (collinear turn) falls back to comparing the
    /// previous vertex's x against the lowest vertex's.
    pub fn border_paths(&mut self) -> Vec<PolyPath> {
        let loops = self.border_loops();
        let mut out = Vec::with_capacity(loops.len());

        for lp in loops {
            let points: Vec<_> = lp.iter().map(|&ei| self.v(self.e(ei).end).pos).collect();
            let n = points.len();
            if n == 0 {
                continue;
            }

            let mut low_i = 0;
            for (i, p) in points.iter().enumerate() {
                if p.y < points[low_i].y {
                    low_i = i;
                }
            }

            let low = points[low_i];
            let prev = points[(low_i + n - 1) % n];
            let next = points[(low_i + 1) % n];

            let cr = cross(next.sub(low), prev.sub(low));

            let hole = if cr > 0 || (cr == 0 && prev.x < low.x) {
                self.e(lp[0])
                    .twin
                    .map(|t| self.tri_centroid(self.tri_of(t)))
            } else {
                None
            };

            out.push(PolyPath { points, hole });
        }

        out
    }
}
