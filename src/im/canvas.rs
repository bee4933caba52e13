use super::core::{Lum8Im, RGBAIm};

/// Padded square working canvas. `bw` is the two-tone reference raster and
/// is never modified after construction; `color` is the drawing target for
/// previews and timelapse frames.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub bw: Lum8Im,
    pub color: RGBAIm,
    pub dim: usize,
}

impl Canvas {
    /// Crop the thresholded foreground to its bounding box, pad by 10% of
    /// the opposite dimension on each side, and center the crop on a white
    /// square canvas. An all-white input keeps its full extent.
    pub fn build(grey: &Lum8Im, color: Option<&RGBAIm>, bw_thresh: u8) -> Canvas {
        let bw_img = grey.threshold(bw_thresh);

        let (x, y, w, h) = bw_img.dark_bbox().unwrap_or((0, 0, grey.w, grey.h));

        let padding_x = (w as f64 * 0.1).round() as usize;
        let padding_y = (h as f64 * 0.1).round() as usize;
        let dim = (h + padding_x * 2).max(w + padding_y * 2);

        let x_pos = (dim - w) / 2;
        let y_pos = (dim - h) / 2;

        let mut bw_canvas = Lum8Im::new_filled(dim, dim, 255);
        let mut color_canvas = RGBAIm::new_filled(dim, dim, 255);

        for j in 0..h {
            for i in 0..w {
                bw_canvas.set(x_pos + i, y_pos + j, bw_img.at(x + i, y + j));

                let px = match color {
                    Some(c) => c.px(x + i, y + j),
                    None => {
                        let v = grey.at(x + i, y + j);
                        [v, v, v, 255]
                    }
                };
                color_canvas.set_px(x_pos + i, y_pos + j, px);
            }
        }

        Canvas {
            bw: bw_canvas,
            color: color_canvas,
            dim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_is_square_and_centered() {
        // 20x10 dark block inside a 100x50 white image.
        let mut grey = Lum8Im::new_filled(100, 50, 255);
        for y in 20..30 {
            for x in 40..60 {
                grey.set(x, y, 0);
            }
        }

        let canvas = Canvas::build(&grey, None, 254);

        // w=20 h=10: dim = max(10 + 2*2, 20 + 2*1) = 22.
        assert_eq!(canvas.dim, 22);
        assert_eq!(canvas.bw.w, 22);
        assert_eq!(canvas.bw.h, 22);

        // Centered crop: x_pos = 1, y_pos = 6.
        assert_eq!(canvas.bw.at(0, 0), 255);
        assert_eq!(canvas.bw.at(1, 6), 0);
        assert_eq!(canvas.bw.at(20, 15), 0);
        assert_eq!(canvas.bw.at(21, 16), 255);
    }

    #[test]
    fn all_white_input_keeps_full_extent() {
        let grey = Lum8Im::new_filled(10, 8, 255);
        let canvas = Canvas::build(&grey, None, 254);

        // w=10 h=8: dim = max(8 + 2*1, 10 + 2*1) = 12, all white.
        assert_eq!(canvas.dim, 12);
        assert!(canvas.bw.arr.iter().all(|&v| v == 255));
    }
}
