//! Refinement driver: `iterations + 1` passes over the mesh, the last one
//! doing only bookkeeping and border extraction. Within a pass the steps
//! always run in the same order, so results are deterministic for a given
//! raster and grid.

use log::{debug, info};

use crate::error::MeshError;
use crate::mesh::Mesh;
use crate::poly::PolyPath;

#[derive(Debug, Clone, Default)]
pub struct RefineStats {
    pub collapses: u32,
    pub flips: u32,
    pub t_inserts: u32,
    pub e_inserts: u32,
    /// Mean vertex / triangle error per iteration, for convergence logs.
    pub v_errs: Vec<f64>,
    pub t_errs: Vec<f64>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Run the refinement loop and extract the border polygons.
///
/// `frame_cb` is invoked once per pass with the mesh in its settled state
/// for that iteration; the caller decides whether to capture anything.
/// An `Err` means an operator found the mesh structurally broken; the
/// caller maps that to an empty result, the mesh itself is abandoned.
pub fn refine<F>(
    mesh: &mut Mesh<'_>,
    iterations: u32,
    mut frame_cb: F,
) -> Result<(Vec<PolyPath>, RefineStats), MeshError>
where
    F: FnMut(&Mesh<'_>, u32),
{
    let mut stats = RefineStats::default();
    let mut borders = Vec::new();

    mesh.update_all()?;

    let mut counter: u32 = 0;
    loop {
        // Border classification only makes sense on the settled mesh.
        if counter == iterations {
            mesh.border_update();
        }

        frame_cb(&*mesh, counter);

        if counter == iterations {
            borders = mesh.border_paths();
        }

        let (v_err, t_err) = mesh.error_totals();
        let nv = mesh.live_vert_count().max(1) as f64;
        let nt = mesh.live_tri_count().max(1) as f64;
        stats.v_errs.push(round2(v_err / nv));
        stats.t_errs.push(round2(t_err / nt));

        counter += 1;
        if counter >= iterations + 1 {
            break;
        }

        info!("iteration {counter} / {iterations}");

        // A. Improve the approximation.
        if counter < 15 {
            mesh.relocate_all(1);
        } else {
            mesh.relocate_seq(1);
        }

        mesh.update_all()?;

        stats.flips += mesh.flip_by_error()?;

        if counter > 5 && counter + 5 < iterations {
            if counter % 2 == 0 {
                let (t, e) = mesh.insert_points()?;
                stats.t_inserts += t;
                stats.e_inserts += e;
            } else {
                stats.e_inserts += mesh.insert_points_at_stuck_vertex(10.0)?;
            }
        }

        // B. Restore triangulation quality.
        stats.flips += mesh.flip_by_angle()?;
        stats.collapses += mesh.collapse()?;

        debug!(
            "pass {counter}: {} verts, {} tris, mean t_err {:.2}",
            mesh.live_vert_count(),
            mesh.live_tri_count(),
            stats.t_errs.last().copied().unwrap_or(0.0)
        );
    }

    info!(
        "refinement done: {} collapses, {} flips, {} centroid inserts, {} midpoint inserts",
        stats.collapses, stats.flips, stats.t_inserts, stats.e_inserts
    );

    Ok((borders, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::dist;
    use crate::test_helpers::{annulus_raster, disc_raster, euler_characteristic};

    #[test]
    fn all_white_input_yields_no_borders() {
        let bw = crate::im::Lum8Im::new_filled(41, 41, 255);
        let mut mesh = Mesh::new(&bw, 3.0);
        mesh.make_grid(8, 8);

        let (paths, stats) = refine(&mut mesh, 6, |_, _| {}).unwrap();
        assert!(paths.is_empty());
        assert_eq!(stats.v_errs.len(), 7);
        assert!(stats.v_errs.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn frame_callback_sees_every_pass() {
        let bw = disc_raster(33, 16, 16, 10);
        let mut mesh = Mesh::new(&bw, 3.0);
        mesh.make_grid(6, 6);

        let mut seen = Vec::new();
        refine(&mut mesh, 4, |_, i| seen.push(i)).unwrap();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn disc_refines_to_one_tight_loop() {
        // Solid disc of radius 40 on a 100x100 canvas; 20x20 grid, 40
        // iterations, min edge 3.
        let bw = disc_raster(100, 50, 50, 40);
        let mut mesh = Mesh::new(&bw, 3.0);
        mesh.make_grid(20, 20);

        let (paths, _) = refine(&mut mesh, 40, |_, _| {}).unwrap();

        assert_eq!(paths.len(), 1, "expected a single border loop");
        assert!(paths[0].hole.is_none());

        // Every border vertex ends up within a couple of pixels of the
        // ideal circle.
        for p in &paths[0].points {
            let r = dist(*p, crate::geom::iv2(50, 50));
            assert!(
                (r - 40.0).abs() <= 2.0,
                "border vertex ({}, {}) at radius {r:.2}",
                p.x,
                p.y
            );
        }

        // The mesh survives the whole run intact.
        assert_eq!(mesh.health_check(), (0, 0, 0));
        assert_eq!(euler_characteristic(&mesh), 1);
    }

    #[test]
    fn annulus_refines_to_outer_and_hole_loops() {
        // Outer radius 40, inner radius 15.
        let bw = annulus_raster(100, 50, 50, 40, 15);
        let mut mesh = Mesh::new(&bw, 3.0);
        mesh.make_grid(20, 20);

        let (paths, _) = refine(&mut mesh, 40, |_, _| {}).unwrap();

        assert_eq!(paths.len(), 2, "expected outer + inner loops");

        let hole_paths: Vec<_> = paths.iter().filter(|p| p.hole.is_some()).collect();
        assert_eq!(hole_paths.len(), 1);

        let marker = hole_paths[0].hole.unwrap();
        let r = dist(marker, crate::geom::iv2(50, 50));
        assert!(r < 15.0, "hole marker at radius {r:.2} is outside the hole");
    }

    #[test]
    fn short_runs_skip_insertion_window() {
        // With 6 iterations the insertion window (5 < i < N-5) is empty;
        // the run must still settle and extract borders.
        let bw = disc_raster(49, 24, 24, 16);
        let mut mesh = Mesh::new(&bw, 3.0);
        mesh.make_grid(8, 8);

        let (paths, stats) = refine(&mut mesh, 6, |_, _| {}).unwrap();
        assert_eq!(stats.t_inserts + stats.e_inserts, 0);
        assert!(!paths.is_empty());
    }
}
