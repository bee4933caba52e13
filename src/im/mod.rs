pub mod core;
#[allow(unused_imports)]
pub use core::{lum_to_rgba, Im, Lum8Im, RGBAIm};

pub mod canny;
#[allow(unused_imports)]
pub use canny::canny;

pub mod canvas;
#[allow(unused_imports)]
pub use canvas::Canvas;

// Optional extras
// -----------------------------------------------------------------------------

#[cfg(feature = "im-io")]
pub mod io;
