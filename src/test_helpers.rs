use crate::im::Lum8Im;
use crate::mesh::Mesh;

/// Build a two-tone raster from an ascii grid: `#` is dark (0), anything
/// else is light (255). Leading/trailing blank lines and indentation are
/// stripped so fixtures can sit inline in tests.
pub fn lum_from_ascii(grid: &str) -> Lum8Im {
    let rows: Vec<&str> = grid
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let h = rows.len();
    assert!(h > 0, "grid must have at least one non-empty row");
    let w = rows[0].len();
    assert!(w > 0, "grid rows must be non-empty");
    for r in &rows {
        assert_eq!(r.len(), w, "all rows must have equal length");
    }

    let mut im = Lum8Im::new(w, h);
    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            im.arr[y * im.s + x] = if ch == '#' { 0 } else { 255 };
        }
    }
    im
}

pub fn lum_to_ascii(im: &Lum8Im) -> String {
    let mut out = String::new();
    for y in 0..im.h {
        for x in 0..im.w {
            out.push(if im.arr[y * im.s + x] == 0 { '#' } else { '.' });
        }
        out.push('\n');
    }
    out
}

/// Grid mesh over a raster, scored and ready for operator tests.
pub fn scored_grid_mesh(bw: &Lum8Im, hn: usize, vn: usize, min_e_len: f64) -> Mesh<'_> {
    let mut mesh = Mesh::new(bw, min_e_len);
    mesh.make_grid(hn, vn);
    mesh.update_all().expect("grid scoring failed");
    mesh
}

/// V - E + F over undirected edges; 1 for a triangulated disk.
pub fn euler_characteristic(mesh: &Mesh<'_>) -> i64 {
    let v = mesh.live_vert_count() as i64;
    let f = mesh.live_tri_count() as i64;

    let mut paired = 0i64;
    let mut boundary = 0i64;
    for e in mesh.edges.iter().flatten() {
        if e.twin.is_some() {
            paired += 1;
        } else {
            boundary += 1;
        }
    }
    let e = paired / 2 + boundary;

    v - e + f
}

/// A solid axis-aligned dark disc on a light square canvas.
pub fn disc_raster(dim: usize, cx: i32, cy: i32, r: i32) -> Lum8Im {
    let mut im = Lum8Im::new_filled(dim, dim, 255);
    for y in 0..dim {
        for x in 0..dim {
            let dx = x as i32 - cx;
            let dy = y as i32 - cy;
            if dx * dx + dy * dy <= r * r {
                im.set(x, y, 0);
            }
        }
    }
    im
}

/// Dark annulus: disc of radius `r_out` with a light disc of `r_in` inside.
pub fn annulus_raster(dim: usize, cx: i32, cy: i32, r_out: i32, r_in: i32) -> Lum8Im {
    let mut im = disc_raster(dim, cx, cy, r_out);
    for y in 0..dim {
        for x in 0..dim {
            let dx = x as i32 - cx;
            let dy = y as i32 - cy;
            if dx * dx + dy * dy <= r_in * r_in {
                im.set(x, y, 255);
            }
        }
    }
    im
}
