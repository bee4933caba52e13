//! Animated GIF capture of the refinement. Frames come straight from the
//! pipeline's drawing callback; the final frame lingers so the settled
//! mesh is readable.

use std::fs::File;
use std::path::Path;

use image::codecs::gif::GifEncoder;
use image::{Delay, Frame, RgbaImage};

use crate::error::PolyError;
use crate::im::RGBAIm;

const FRAME_MS: u32 = 300;
const LAST_FRAME_MS: u32 = 1000;

fn to_rgba_image(frame: &RGBAIm) -> Result<RgbaImage, PolyError> {
    RgbaImage::from_raw(frame.w as u32, frame.h as u32, frame.arr.clone()).ok_or_else(|| {
        PolyError::Image(image::ImageError::Parameter(
            image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ),
        ))
    })
}

/// Encode the captured frames. A single frame is not an animation, so
/// fewer than two frames writes nothing.
pub fn write_gif<P: AsRef<Path>>(path: P, frames: &[RGBAIm]) -> Result<(), PolyError> {
    if frames.len() < 2 {
        return Ok(());
    }

    let file = File::create(path)?;
    let mut encoder = GifEncoder::new(file);

    let n = frames.len();
    let mut out = Vec::with_capacity(n);
    for (i, f) in frames.iter().enumerate() {
        let ms = if i + 1 == n { LAST_FRAME_MS } else { FRAME_MS };
        out.push(Frame::from_parts(
            to_rgba_image(f)?,
            0,
            0,
            Delay::from_numer_denom_ms(ms, 1),
        ));
    }

    encoder.encode_frames(out)?;
    Ok(())
}
