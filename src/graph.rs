//! Contour path assembly: raw pixel-adjacency segments from the edge
//! raster, greedily chained into polyline paths by angular continuation,
//! then cleaned as a set and classified into outer boundaries and holes.

use crate::geom::{angle_deg, iv2, midpoint, Iv2};
use crate::im::Lum8Im;
use crate::path::{seg, Path, Seg};
use crate::poly::PolyPath;

/// Directed segments between adjacent lit pixels. Right and down
/// neighbors always connect; a diagonal connects only when the two
/// cardinal steps that would cover it are not both present, so a
/// staircase is not double-covered.
pub fn make_segs(edge_im: &Lum8Im) -> Vec<Seg> {
    let w = edge_im.w;
    let h = edge_im.h;
    let mut segs = Vec::new();

    for i in 0..h {
        for j in 0..w {
            if edge_im.at(j, i) == 0 {
                continue;
            }

            let x = j as i32;
            let y = i as i32;

            let r = j + 1 < w && edge_im.at(j + 1, i) > 0;
            let b = i + 1 < h && edge_im.at(j, i + 1) > 0;
            let br = j + 1 < w && i + 1 < h && edge_im.at(j + 1, i + 1) > 0;
            let bl = j > 0 && i + 1 < h && edge_im.at(j - 1, i + 1) > 0;
            let l = j > 0 && edge_im.at(j - 1, i) > 0;

            if r {
                segs.push(seg(iv2(x, y), iv2(x + 1, y)));
            }
            if b {
                segs.push(seg(iv2(x, y), iv2(x, y + 1)));
            }
            if br && !b && !r {
                segs.push(seg(iv2(x, y), iv2(x + 1, y + 1)));
            }
            if bl && !b && !l {
                segs.push(seg(iv2(x, y), iv2(x - 1, y + 1)));
            }
        }
    }

    segs
}

// The "tangent" at a path end is the compound vector of its last (or
// first) up-to-5 edges; candidates are ranked by their angle against it.
fn head_tangent(path: &Path) -> Seg {
    let n = path.len();
    let k = if n >= 5 { 4 } else { n - 1 };
    seg(path.first().a, path.edges[k].b)
}

fn tail_tangent(path: &Path) -> Seg {
    let n = path.len();
    let k = if n >= 5 { 5 } else { n };
    seg(path.edges[n - k].a, path.last().b)
}

fn best_by_angle(pool: &[Seg], candidates: &[usize], against: Seg) -> usize {
    let mut best_angle = 360;
    let mut best = 0usize;

    for (slot, &k) in candidates.iter().enumerate() {
        let cand = pool[k];
        let a = angle_deg(against.a, against.b, cand.a, cand.b);
        if a < best_angle {
            best_angle = a;
            best = slot;
        }
    }

    best
}

/// Greedy assembly. The current path grows at both ends each round: every
/// pool segment touching the head or tail vertex is flipped into a
/// consistent direction and the best angular continuation at each end is
/// consumed. An end that finds no candidate stops searching; when both
/// ends have stopped the path is emitted and a new one starts from the
/// next unused segment. Single-segment leftovers are dropped.
pub fn assemble_paths(mut pool: Vec<Seg>) -> Vec<Path> {
    let mut path_list: Vec<Path> = Vec::new();

    let mut curr: Option<Path> = None;
    let mut search_start = true;
    let mut search_end = true;

    loop {
        if pool.is_empty() {
            if let Some(p) = curr.take() {
                path_list.push(p);
            }
            break;
        }

        let path = curr.get_or_insert_with(|| {
            search_start = true;
            search_end = true;
            Path::from_edges(vec![pool.remove(0)])
        });

        let mut found_start: Vec<usize> = Vec::new();
        let mut found_end: Vec<usize> = Vec::new();

        for k in 0..pool.len() {
            if search_start {
                let head = path.first().a;
                if pool[k].a == head || pool[k].b == head {
                    if pool[k].a == head {
                        pool[k].flip();
                    }
                    found_start.push(k);
                }
            }

            if search_end {
                let tail = path.last().b;
                if (pool[k].a == tail || pool[k].b == tail) && !found_start.contains(&k) {
                    if pool[k].b == tail {
                        pool[k].flip();
                    }
                    found_end.push(k);
                }
            }
        }

        if found_start.is_empty() && found_end.is_empty() {
            if let Some(p) = curr.take() {
                path_list.push(p);
            }
            continue;
        }

        if !found_start.is_empty() {
            let slot = best_by_angle(&pool, &found_start, head_tangent(path));
            let k = found_start[slot];
            let winner = pool.remove(k);
            path.edges.insert(0, winner);

            // Pool shrank; later candidate indices shift down.
            for fe in &mut found_end {
                if *fe > k {
                    *fe -= 1;
                }
            }
        } else {
            search_start = false;
        }

        if !found_end.is_empty() {
            let slot = best_by_angle(&pool, &found_end, tail_tangent(path));
            let k = found_end[slot];
            let winner = pool.remove(k);
            path.edges.push(winner);
        } else {
            search_end = false;
        }
    }

    path_list.retain(|p| p.len() > 1);
    path_list
}

// Set-level post-processing
// -----------------------------------------------------------------------------

/// Merge paths whose endpoints come within `max_dist` of each other,
/// end-to-end, flipping the absorbed path when directions disagree; the
/// join vertex is the midpoint of the two near endpoints. After a merge
/// the scan restarts right past the grown path.
pub fn fuse_ends(paths: &mut Vec<Path>, max_dist: f64) {
    let mut i = 0usize;

    while i < paths.len() {
        let mut j = i + 1;

        while j < paths.len() {
            let first_curr = paths[i].first().a;
            let last_curr = paths[i].last().b;
            let first_comp = paths[j].first().a;
            let last_comp = paths[j].last().b;

            let c1 = crate::geom::dist(first_curr, last_comp) < max_dist;
            let c2 = crate::geom::dist(first_curr, first_comp) < max_dist;
            let c3 = crate::geom::dist(first_comp, last_curr) < max_dist;
            let c4 = crate::geom::dist(last_comp, last_curr) < max_dist;

            if c1 || c2 {
                // comp joins in front of curr.
                let join = if c2 {
                    paths[j].change_orientation();
                    midpoint(first_curr, first_comp)
                } else {
                    midpoint(first_curr, last_comp)
                };

                paths[i].edges[0].a = join;
                let comp_last = paths[j].len() - 1;
                paths[j].edges[comp_last].b = join;

                let mut merged = paths.remove(j);
                merged.edges.extend(std::mem::take(&mut paths[i].edges));
                paths[i] = merged;

                j = i + 1;
            } else if c3 || c4 {
                // comp joins behind curr.
                let join = if c4 {
                    paths[j].change_orientation();
                    midpoint(last_comp, last_curr)
                } else {
                    midpoint(first_comp, last_curr)
                };

                paths[j].edges[0].a = join;
                let curr_last = paths[i].len() - 1;
                paths[i].edges[curr_last].b = join;

                let tail = paths.remove(j);
                paths[i].edges.extend(tail.edges);

                j = i + 1;
            } else {
                j += 1;
            }
        }

        i += 1;
    }
}

pub fn close_loops(paths: &mut [Path], max_dist: f64) {
    for p in paths.iter_mut() {
        p.close_loops(max_dist);
    }
}

/// Only closed loops with at least 3 edges survive.
pub fn keep_loops(paths: &mut Vec<Path>) {
    paths.retain(|p| p.is_closed() && p.len() > 2);
}

pub fn fuse_points(paths: &mut [Path], max_dist: f64) {
    for p in paths.iter_mut() {
        p.fuse_points(max_dist);
    }
}

/// Drop noise polygons: at most 4 edges, all no longer than `2 * max_dist`.
pub fn remove_small_polygons(paths: &mut Vec<Path>, max_dist: f64) {
    paths.retain(|p| p.len() > 4 || p.edges.iter().any(|e| e.len() > max_dist * 2.0));
}

/// Count containments for every ordered pair, then normalize orientation
/// and assign hole markers by parity.
pub fn classify(paths: &mut [Path]) {
    let firsts: Vec<Iv2> = paths.iter().map(|p| p.first().a).collect();

    for i in 0..paths.len() {
        for j in 0..paths.len() {
            if i != j && paths[j].contains(firsts[i]) {
                paths[i].containers += 1;
            }
        }
    }

    for p in paths.iter_mut() {
        p.update_hole_point();
    }
}

/// Collapse each path into the vertex-list form the writer consumes.
pub fn format_paths(paths: &[Path]) -> Vec<PolyPath> {
    paths
        .iter()
        .map(|p| PolyPath {
            points: p.edges.iter().map(|e| e.a).collect(),
            hole: p.hole_point,
        })
        .collect()
}
