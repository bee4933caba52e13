//! The two extraction pipelines, canvas in, oriented polygons out.

use log::{error, info};

use crate::config::{ContourParams, MeshParams, Reduction};
use crate::draw;
use crate::graph;
use crate::im::{canny, Canvas, RGBAIm};
use crate::mesh::{refine, Mesh};
use crate::poly::PolyPath;

// Canny thresholds for the (two-tone) canvas; step edges are far above
// both so the exact values only matter for anti-aliased sources.
const CANNY_LOWER: f32 = 60.0;
const CANNY_UPPER: f32 = 150.0;

/// Contour pipeline: edge raster, path assembly, reduction, cleanup,
/// classification.
pub fn contour_pipeline(canvas: &Canvas, p: &ContourParams) -> Vec<PolyPath> {
    let edge_im = canny(&canvas.bw, CANNY_LOWER, CANNY_UPPER);

    let segs = graph::make_segs(&edge_im);
    info!("{} raw pixel edges", segs.len());

    let mut paths = graph::assemble_paths(segs);
    info!("{} assembled paths", paths.len());

    match p.reduction {
        Reduction::Fixed => {
            for path in &mut paths {
                path.reduce_fixed(p.r_len);
            }
        }
        Reduction::Variable => {
            if p.r_max_dist >= 1.0 {
                for path in &mut paths {
                    path.reduce_variable(p.r_max_dist);
                }
            }
        }
        Reduction::Hybrid => {
            for path in &mut paths {
                path.reduce_hybrid(p.r_len, p.r_max_dist);
            }
        }
    }

    graph::fuse_ends(&mut paths, p.path_fuse_dist);
    graph::close_loops(&mut paths, p.path_fuse_dist);
    graph::keep_loops(&mut paths);
    graph::fuse_points(&mut paths, p.point_fuse_dist);
    graph::remove_small_polygons(&mut paths, p.point_fuse_dist);
    graph::classify(&mut paths);

    info!("{} polygons after cleanup", paths.len());
    graph::format_paths(&paths)
}

/// Mesh pipeline: refine a triangle grid against the reference raster and
/// extract border loops. Returns the polygons plus any captured frames
/// (one per pass when `timelapse` is on, just the final state otherwise).
///
/// A structural failure mid-refinement yields an empty polygon list
/// rather than a torn result; the writer still emits a valid empty file.
pub fn mesh_pipeline(canvas: &Canvas, p: &MeshParams) -> (Vec<PolyPath>, Vec<RGBAIm>) {
    let mut mesh = Mesh::new(&canvas.bw, p.min_e_len);
    mesh.make_grid(p.grid_h, p.grid_v);

    let mut frames: Vec<RGBAIm> = Vec::new();

    let result = refine(&mut mesh, p.iterations, |m, i| {
        if p.timelapse || i == p.iterations {
            frames.push(draw::draw_full(canvas, m, p.lapse_source));
        }
    });

    match result {
        Ok((paths, _stats)) => {
            info!("{} border polygons", paths.len());
            (paths, frames)
        }
        Err(e) => {
            error!("refinement failed ({e}); retry with other parameters");
            (Vec::new(), frames)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContourParams, MeshParams};
    use crate::geom::iv2;
    use crate::im::Lum8Im;
    use crate::test_helpers::disc_raster;

    fn solid_square_canvas(dim: usize, x0: usize, side: usize) -> Canvas {
        let mut grey = Lum8Im::new_filled(dim, dim, 255);
        for y in x0..x0 + side {
            for x in x0..x0 + side {
                grey.set(x, y, 0);
            }
        }
        Canvas::build(&grey, None, 254)
    }

    #[test]
    fn contour_solid_square_gives_one_outer_polygon() {
        let canvas = solid_square_canvas(64, 16, 32);
        let p = ContourParams::default();

        let paths = contour_pipeline(&canvas, &p);

        assert_eq!(paths.len(), 1);
        assert!(paths[0].hole.is_none());
        // After reduction the square collapses to a handful of vertices
        // (corners, plus budget splits along the 32px sides).
        assert!(paths[0].points.len() >= 4);
        assert!(paths[0].points.len() <= 12);
    }

    #[test]
    fn contour_square_with_hole_gives_outer_and_marker() {
        let mut grey = Lum8Im::new_filled(64, 64, 255);
        for y in 12..52 {
            for x in 12..52 {
                grey.set(x, y, 0);
            }
        }
        for y in 25..39 {
            for x in 25..39 {
                grey.set(x, y, 255);
            }
        }
        let canvas = Canvas::build(&grey, None, 254);

        let paths = contour_pipeline(&canvas, &ContourParams::default());

        assert_eq!(paths.len(), 2);
        let holes: Vec<_> = paths.iter().filter(|p| p.hole.is_some()).collect();
        assert_eq!(holes.len(), 1);
    }

    #[test]
    fn contour_two_squares_give_two_outers() {
        let mut grey = Lum8Im::new_filled(96, 64, 255);
        for y in 16..48 {
            for x in 8..40 {
                grey.set(x, y, 0);
            }
            for x in 56..88 {
                grey.set(x, y, 0);
            }
        }
        let canvas = Canvas::build(&grey, None, 254);

        let paths = contour_pipeline(&canvas, &ContourParams::default());

        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.hole.is_none()));
    }

    #[test]
    fn contour_empty_input_gives_no_paths() {
        let grey = Lum8Im::new_filled(48, 48, 255);
        let canvas = Canvas::build(&grey, None, 254);

        let paths = contour_pipeline(&canvas, &ContourParams::default());
        assert!(paths.is_empty());
    }

    #[test]
    fn mesh_pipeline_captures_final_frame_only_without_timelapse() {
        let bw = disc_raster(60, 30, 30, 20);
        let canvas = Canvas {
            color: crate::im::lum_to_rgba(&bw),
            bw,
            dim: 60,
        };

        let p = MeshParams {
            grid_h: 10,
            grid_v: 10,
            iterations: 8,
            ..MeshParams::default()
        };

        let (paths, frames) = mesh_pipeline(&canvas, &p);
        assert_eq!(frames.len(), 1);
        assert_eq!(paths.len(), 1);
        assert!(paths[0].points.iter().all(|q| {
            let d = crate::geom::dist(*q, iv2(30, 30));
            d > 10.0 && d < 30.0
        }));
    }

    #[test]
    fn mesh_pipeline_timelapse_captures_every_pass() {
        let bw = disc_raster(40, 20, 20, 12);
        let canvas = Canvas {
            color: crate::im::lum_to_rgba(&bw),
            bw,
            dim: 40,
        };

        let p = MeshParams {
            grid_h: 8,
            grid_v: 8,
            iterations: 5,
            timelapse: true,
            ..MeshParams::default()
        };

        let (_, frames) = mesh_pipeline(&canvas, &p);
        assert_eq!(frames.len(), 6);
    }
}
