use enough::StopReason;
use std::io;

use crate::pixel::Bounds;

/// Errors from loading, traversing, encoding and writing an image.
///
/// Every variant is terminal for a run. The `Display` text is the
/// user-facing message printed by [`crate::run`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PixmapError {
    #[error("cannot read image file: {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot read image file: unrecognized image format")]
    UnrecognizedFormat,

    #[error("cannot read image file: {0}")]
    Decode(#[source] image::ImageError),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("pixel written at ({x}, {y}) lies outside image bounds {bounds}")]
    CoordinateOutOfBounds { x: i32, y: i32, bounds: Bounds },

    #[error("cannot create output file, unknown image type: {0}")]
    UnsupportedFormat(String),

    #[error("cannot encode a {width}x{height} image")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("cannot encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("cannot create output file: {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for PixmapError {
    fn from(r: StopReason) -> Self {
        PixmapError::Cancelled(r)
    }
}
