use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use crate::geom::{dist, iv2, Iv2};

/// One oriented closed polygon headed for the `.poly` writer. Outer
/// boundaries carry no marker; holes carry a point strictly inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolyPath {
    pub points: Vec<Iv2>,
    pub hole: Option<Iv2>,
}

/// Serialize paths in the planar-straight-line-graph format the mesher
/// consumes. Vertices and hole markers are written with y negated; edges
/// run sequentially per path, the last wrapping to the path's first
/// vertex. An empty input still yields all three sections.
pub fn write_poly<W: Write>(out: &mut W, paths: &[PolyPath]) -> io::Result<()> {
    let mut v_count = 0usize;
    let mut e_count = 0usize;
    let mut h_count = 0usize;

    let mut v_string = String::new();
    let mut e_string = String::new();
    let mut h_string = String::new();

    for path in paths {
        let n = path.points.len();
        for (i, p) in path.points.iter().enumerate() {
            if i == n - 1 {
                let _ = writeln!(e_string, "{} {} {}", e_count, v_count, v_count + 1 - n);
            } else {
                let _ = writeln!(e_string, "{} {} {}", e_count, v_count, v_count + 1);
            }
            e_count += 1;

            let _ = writeln!(v_string, "{} {} {}", v_count, p.x, -p.y);
            v_count += 1;
        }

        if let Some(hp) = path.hole {
            let _ = writeln!(h_string, "{} {} {}", h_count, hp.x, -hp.y);
            h_count += 1;
        }
    }

    writeln!(out, "{v_count} 2 0 0")?;
    out.write_all(v_string.as_bytes())?;
    writeln!(out, "{e_count} 0")?;
    out.write_all(e_string.as_bytes())?;
    if h_count == 0 {
        writeln!(out, "0")?;
    } else {
        writeln!(out, "{h_count} 0")?;
        out.write_all(h_string.as_bytes())?;
    }
    writeln!(out)?;

    Ok(())
}

// Reading + metrics
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct PolyData {
    pub vertices: Vec<Iv2>,
    pub edges: Vec<(usize, usize)>,
    pub holes: Vec<Iv2>,
}

fn parse_fields(line: &str) -> Vec<i64> {
    line.split_whitespace()
        .filter_map(|f| f.parse().ok())
        .collect()
}

/// Parse a `.poly` file back into its elements (y un-negated). Tolerant of
/// trailing blank lines; returns what it could read.
pub fn read_poly<R: BufRead>(input: R) -> io::Result<PolyData> {
    let mut data = PolyData::default();

    let mut lines = input.lines();

    let header = match lines.next() {
        Some(l) => parse_fields(&l?),
        None => return Ok(data),
    };
    let v_total = *header.first().unwrap_or(&0) as usize;

    for _ in 0..v_total {
        let Some(l) = lines.next() else { break };
        let f = parse_fields(&l?);
        if f.len() >= 3 {
            data.vertices.push(iv2(f[1] as i32, -(f[2] as i32)));
        }
    }

    let e_total = match lines.next() {
        Some(l) => *parse_fields(&l?).first().unwrap_or(&0) as usize,
        None => return Ok(data),
    };
    for _ in 0..e_total {
        let Some(l) = lines.next() else { break };
        let f = parse_fields(&l?);
        if f.len() >= 3 {
            data.edges.push((f[1] as usize, f[2] as usize));
        }
    }

    let h_total = match lines.next() {
        Some(l) => *parse_fields(&l?).first().unwrap_or(&0) as usize,
        None => return Ok(data),
    };
    for _ in 0..h_total {
        let Some(l) = lines.next() else { break };
        let f = parse_fields(&l?);
        if f.len() >= 3 {
            data.holes.push(iv2(f[1] as i32, -(f[2] as i32)));
        }
    }

    Ok(data)
}

/// Element counts and edge-length statistics for a generated file.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyMetrics {
    pub vertices: usize,
    pub edges: usize,
    pub holes: usize,
    pub len_mean: f64,
    pub len_std_dev: f64,
    pub len_min: f64,
    pub len_max: f64,
}

pub fn metrics(data: &PolyData) -> PolyMetrics {
    let lengths: Vec<f64> = data
        .edges
        .iter()
        .filter_map(|&(a, b)| {
            let pa = data.vertices.get(a)?;
            let pb = data.vertices.get(b)?;
            Some(dist(*pa, *pb))
        })
        .collect();

    let n = lengths.len() as f64;
    let (mean, std_dev, min, max) = if lengths.is_empty() {
        (0.0, 0.0, 0.0, 0.0)
    } else {
        let mean = lengths.iter().sum::<f64>() / n;
        let var = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;
        let min = lengths.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = lengths.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        (mean, var.sqrt(), min, max)
    };

    PolyMetrics {
        vertices: data.vertices.len(),
        edges: data.edges.len(),
        holes: data.holes.len(),
        len_mean: mean,
        len_std_dev: std_dev,
        len_min: min,
        len_max: max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: i32, y0: i32, side: i32) -> Vec<Iv2> {
        vec![
            iv2(x0, y0),
            iv2(x0 + side, y0),
            iv2(x0 + side, y0 + side),
            iv2(x0, y0 + side),
        ]
    }

    #[test]
    fn writes_square_with_wrapping_edge() {
        let paths = vec![PolyPath {
            points: square(0, 0, 10),
            hole: None,
        }];

        let mut buf = Vec::new();
        write_poly(&mut buf, &paths).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let expected = "4 2 0 0\n\
                        0 0 0\n\
                        1 10 0\n\
                        2 10 -10\n\
                        3 0 -10\n\
                        4 0\n\
                        0 0 1\n\
                        1 1 2\n\
                        2 2 3\n\
                        3 3 0\n\
                        0\n\
                        \n";
        assert_eq!(text, expected);
    }

    #[test]
    fn writes_hole_section_when_present() {
        let paths = vec![
            PolyPath {
                points: square(0, 0, 20),
                hole: None,
            },
            PolyPath {
                points: square(5, 5, 6),
                hole: Some(iv2(8, 8)),
            },
        ];

        let mut buf = Vec::new();
        write_poly(&mut buf, &paths).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("8 2 0 0\n"));
        assert!(text.contains("1 0\n0 8 -8\n"));
        // Second path's closing edge wraps inside its own range.
        assert!(text.contains("7 7 4\n"));
    }

    #[test]
    fn empty_input_writes_all_three_sections() {
        let mut buf = Vec::new();
        write_poly(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "0 2 0 0\n0 0\n0\n\n");
    }

    #[test]
    fn read_round_trips_write() {
        let paths = vec![PolyPath {
            points: square(2, 3, 7),
            hole: Some(iv2(5, 6)),
        }];

        let mut buf = Vec::new();
        write_poly(&mut buf, &paths).unwrap();

        let data = read_poly(&buf[..]).unwrap();
        assert_eq!(data.vertices, paths[0].points);
        assert_eq!(data.edges.len(), 4);
        assert_eq!(data.edges[3], (3, 0));
        assert_eq!(data.holes, vec![iv2(5, 6)]);
    }

    #[test]
    fn metrics_over_unit_square() {
        let paths = vec![PolyPath {
            points: square(0, 0, 10),
            hole: None,
        }];
        let mut buf = Vec::new();
        write_poly(&mut buf, &paths).unwrap();

        let m = metrics(&read_poly(&buf[..]).unwrap());
        assert_eq!(m.vertices, 4);
        assert_eq!(m.edges, 4);
        assert_eq!(m.holes, 0);
        assert_eq!(m.len_mean, 10.0);
        assert_eq!(m.len_std_dev, 0.0);
        assert_eq!((m.len_min, m.len_max), (10.0, 10.0));
    }
}
