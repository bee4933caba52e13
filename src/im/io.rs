use super::core::{Lum8Im, RGBAIm};
use image::ImageResult;
use std::path::Path;

fn dim_mismatch_err() -> image::ImageError {
    image::ImageError::Parameter(image::error::ParameterError::from_kind(
        image::error::ParameterErrorKind::DimensionMismatch,
    ))
}

// PNG / general decoding
// -----------------------------------------------------------------------------

/// Decode an image file into greyscale and RGBA rasters in one pass.
pub fn load<P: AsRef<Path>>(path: P) -> ImageResult<(Lum8Im, RGBAIm)> {
    let img = image::open(path)?;

    let grey_img = img.to_luma8();
    let rgba_img = img.into_rgba8();

    let w = grey_img.width() as usize;
    let h = grey_img.height() as usize;

    let grey = Lum8Im {
        w,
        h,
        s: w,
        arr: grey_img.into_raw(),
    };
    let rgba = RGBAIm {
        w,
        h,
        s: w * 4,
        arr: rgba_img.into_raw(),
    };

    Ok((grey, rgba))
}

// PNG encoding
// -----------------------------------------------------------------------------
impl Lum8Im {
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let img = image::GrayImage::from_raw(self.w as u32, self.h as u32, self.arr.clone())
            .ok_or_else(dim_mismatch_err)?;

        img.save_with_format(path, image::ImageFormat::Png)
    }
}

impl RGBAIm {
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let img = image::RgbaImage::from_raw(self.w as u32, self.h as u32, self.arr.clone())
            .ok_or_else(dim_mismatch_err)?;

        img.save_with_format(path, image::ImageFormat::Png)
    }
}
