//! Overlay drawing for previews and timelapse frames.

use crate::config::LapseSource;
use crate::geom::Iv2;
use crate::im::{lum_to_rgba, Canvas, RGBAIm};
use crate::mesh::Mesh;
use crate::path::Path;

const BORDER_RGBA: [u8; 4] = [255, 0, 0, 255];
const EDGE_RGBA: [u8; 4] = [0, 255, 0, 255];

/// Plot a segment with Bresenham's line algorithm, clipping to the image.
pub fn draw_seg(im: &mut RGBAIm, p0: Iv2, p1: Iv2, rgba: [u8; 4]) {
    let dx = (p1.x - p0.x).abs();
    let dy = -(p1.y - p0.y).abs();
    let sx = if p0.x < p1.x { 1 } else { -1 };
    let sy = if p0.y < p1.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut x = p0.x;
    let mut y = p0.y;

    loop {
        if x >= 0 && x < im.w as i32 && y >= 0 && y < im.h as i32 {
            im.set_px(x as usize, y as usize, rgba);
        }
        if x == p1.x && y == p1.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Filled disc of radius `r`, clipped to the image.
pub fn draw_disc(im: &mut RGBAIm, c: Iv2, r: i32, rgba: [u8; 4]) {
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let x = c.x + dx;
            let y = c.y + dy;
            if x >= 0 && x < im.w as i32 && y >= 0 && y < im.h as i32 {
                im.set_px(x as usize, y as usize, rgba);
            }
        }
    }
}

/// Mesh edges: borders in red, the rest in green. The green pass skips
/// edges whose twin is a border so it does not overdraw the red line.
pub fn draw_mesh_edges(im: &mut RGBAIm, mesh: &Mesh<'_>) {
    for e in mesh.edges.iter().flatten() {
        let p1 = mesh.v(e.start).pos;
        let p2 = mesh.v(e.end).pos;

        if e.is_border {
            draw_seg(im, p1, p2, BORDER_RGBA);
        } else {
            let twin_is_border = e
                .twin
                .is_some_and(|t| mesh.edges[t.0 as usize].as_ref().is_some_and(|te| te.is_border));
            if !twin_is_border {
                draw_seg(im, p1, p2, EDGE_RGBA);
            }
        }
    }
}

/// Mesh vertices as dots shaded by approximation error.
pub fn draw_mesh_vertices(im: &mut RGBAIm, mesh: &Mesh<'_>) {
    for v in mesh.verts.iter().flatten() {
        let c = (v.err * 6.0).min(255.0) as u8;
        draw_disc(im, v.pos, 2, [0, 0, c, 255]);
    }
}

/// One full frame: the chosen canvas with the mesh drawn over it.
pub fn draw_full(canvas: &Canvas, mesh: &Mesh<'_>, source: LapseSource) -> RGBAIm {
    let mut img = match source {
        LapseSource::Color => canvas.color.clone(),
        LapseSource::Bw => lum_to_rgba(&canvas.bw),
    };
    draw_mesh_edges(&mut img, mesh);
    draw_mesh_vertices(&mut img, mesh);
    img
}

fn index_to_color(i: usize) -> [u8; 4] {
    let mut col = [100u8, 100, 100, 255];
    if i == 5 || i <= 1 {
        col[0] = 255;
    }
    if (1..=3).contains(&i) {
        col[1] = 255;
    }
    if (3..=5).contains(&i) {
        col[2] = 255;
    }
    col
}

/// Contour paths in rotating colors, with vertex dots and red hole
/// markers.
pub fn draw_paths(im: &mut RGBAIm, paths: &[Path]) {
    for (i, path) in paths.iter().enumerate() {
        let col = index_to_color(i % 6);
        for e in &path.edges {
            draw_seg(im, e.a, e.b, col);
            draw_disc(im, e.a, 1, [0, 0, 0, 255]);
            draw_disc(im, e.b, 1, [0, 0, 0, 255]);
        }
        if let Some(hp) = path.hole_point {
            draw_disc(im, hp, 2, [255, 0, 0, 255]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::iv2;

    #[test]
    fn seg_endpoints_are_plotted() {
        let mut im = RGBAIm::new(16, 16);
        draw_seg(&mut im, iv2(1, 1), iv2(12, 7), [255, 0, 0, 255]);

        assert_eq!(im.px(1, 1), [255, 0, 0, 255]);
        assert_eq!(im.px(12, 7), [255, 0, 0, 255]);
    }

    #[test]
    fn seg_clips_outside_geometry() {
        let mut im = RGBAIm::new(8, 8);
        // Must not panic even when the segment leaves the canvas.
        draw_seg(&mut im, iv2(-5, -5), iv2(12, 12), [0, 255, 0, 255]);
        assert_eq!(im.px(3, 3), [0, 255, 0, 255]);
    }

    #[test]
    fn disc_stays_within_radius() {
        let mut im = RGBAIm::new(16, 16);
        draw_disc(&mut im, iv2(8, 8), 2, [9, 9, 9, 255]);

        assert_eq!(im.px(8, 8), [9, 9, 9, 255]);
        assert_eq!(im.px(8, 10), [9, 9, 9, 255]);
        assert_eq!(im.px(11, 8), [0, 0, 0, 0]);
    }
}
