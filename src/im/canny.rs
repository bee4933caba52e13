use super::core::Lum8Im;

/// Canny edge detection over a greyscale raster: Sobel gradients,
/// non-maximum suppression, then double threshold with hysteresis.
/// Thresholds are absolute gradient magnitudes (the reference raster is
/// two-tone, so step edges land near 4*255 and the defaults of 60/150 are
/// far from either side).
pub fn canny(src: &Lum8Im, t_lower: f32, t_upper: f32) -> Lum8Im {
    let w = src.w;
    let h = src.h;

    let mut out = Lum8Im::new(w, h);
    if w < 3 || h < 3 {
        return out;
    }

    const SOBEL_X: [f32; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];
    const SOBEL_Y: [f32; 9] = [-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0];

    let mut grad_x = vec![0.0f32; w * h];
    let mut grad_y = vec![0.0f32; w * h];
    let mut mag = vec![0.0f32; w * h];

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut gx = 0.0;
            let mut gy = 0.0;
            for ky in 0..3 {
                for kx in 0..3 {
                    let px = src.at(x + kx - 1, y + ky - 1) as f32;
                    gx += px * SOBEL_X[ky * 3 + kx];
                    gy += px * SOBEL_Y[ky * 3 + kx];
                }
            }
            let i = y * w + x;
            grad_x[i] = gx;
            grad_y[i] = gy;
            mag[i] = (gx * gx + gy * gy).sqrt();
        }
    }

    // Non-maximum suppression along the quantized gradient direction.
    let mut thin = vec![0.0f32; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let m = mag[i];
            if m == 0.0 {
                continue;
            }

            let angle = grad_y[i].atan2(grad_x[i]).to_degrees();
            let angle = (angle + 180.0) % 180.0;

            let (dx, dy) = if !(22.5..157.5).contains(&angle) {
                (1i32, 0i32)
            } else if angle < 67.5 {
                (1, 1)
            } else if angle < 112.5 {
                (0, 1)
            } else {
                (-1, 1)
            };

            let m1 = mag[((y as i32 + dy) as usize) * w + (x as i32 + dx) as usize];
            let m2 = mag[((y as i32 - dy) as usize) * w + (x as i32 - dx) as usize];

            // Strict on one side so the two-pixel plateau of a hard step
            // keeps a single pixel.
            if m >= m1 && m > m2 {
                thin[i] = m;
            }
        }
    }

    // Double threshold.
    let mut strong = vec![false; w * h];
    let mut weak = vec![false; w * h];
    for i in 0..w * h {
        if thin[i] >= t_upper {
            strong[i] = true;
            out.arr[i] = 255;
        } else if thin[i] >= t_lower {
            weak[i] = true;
        }
    }

    // Hysteresis: promote weak pixels 8-connected to a strong pixel until
    // the frontier stops growing.
    let mut changed = true;
    while changed {
        changed = false;
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let i = y * w + x;
                if !weak[i] || strong[i] {
                    continue;
                }
                'scan: for dy in -1i32..=1 {
                    for dx in -1i32..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let ni = ((y as i32 + dy) as usize) * w + (x as i32 + dx) as usize;
                        if strong[ni] {
                            strong[i] = true;
                            out.arr[i] = 255;
                            changed = true;
                            break 'scan;
                        }
                    }
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_raster_has_no_edges() {
        let im = Lum8Im::new_filled(16, 16, 255);
        let edges = canny(&im, 60.0, 150.0);
        assert!(edges.arr.iter().all(|&v| v == 0));
    }

    #[test]
    fn step_edge_is_detected_and_thin() {
        // Left half dark, right half light.
        let mut im = Lum8Im::new_filled(16, 16, 255);
        for y in 0..16 {
            for x in 0..8 {
                im.set(x, y, 0);
            }
        }

        let edges = canny(&im, 60.0, 150.0);

        // Some edge response near the boundary...
        let lit: usize = edges.arr.iter().filter(|&&v| v > 0).count();
        assert!(lit > 0, "expected edge pixels along the step");

        // ...and each interior row stays thin after non-maximum
        // suppression.
        for y in 2..14 {
            let row_lit = (0..16).filter(|&x| edges.at(x, y) > 0).count();
            assert!(
                (1..=2).contains(&row_lit),
                "row {y} has {row_lit} edge pixels"
            );
        }

        // Nothing fires far from the boundary.
        assert_eq!(edges.at(2, 8), 0);
        assert_eq!(edges.at(13, 8), 0);
    }
}
