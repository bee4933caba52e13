use thiserror::Error;

/// Structural breakage detected by a mesh operator. Guard refusals are not
/// errors (operators return `Ok` with a zero count); these indicate the
/// half-edge graph itself no longer holds its invariants.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("1-ring walk around ({x}, {y}) exceeded its outgoing-edge bound")]
    RingWalk { x: i32, y: i32 },
}

#[derive(Debug, Error)]
pub enum PolyError {
    #[cfg(any(feature = "im-io", feature = "timelapse"))]
    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid parameter {name}: {value}")]
    BadParam { name: String, value: String },

    #[error("config: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}
