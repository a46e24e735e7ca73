//! Error types for the speedmeter crate.

use thiserror::Error;

/// Errors raised at the edges of the gauge: resource lookup, checked
/// configuration writes and the window host. Mapping and layer generation
/// never fail.
#[derive(Debug, Error)]
pub enum GaugeError {
    /// A color string was neither `#rrggbb` nor `#rrggbbaa`.
    #[error("invalid color {0:?}: expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),

    /// Neither the given path, the bundled directory nor a bundled default
    /// held the image.
    #[error("image resource not found: {name}")]
    ResourceNotFound { name: String },

    /// A sector list rejected by [`crate::SpeedMeter::set_sectors_checked`].
    #[error("invalid sector list: {0}")]
    InvalidSectors(String),

    #[error("image decoding failed: {0}")]
    Image(#[from] png::DecodingError),

    #[error("image encoding failed: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("unsupported image {0}")]
    UnsupportedImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("font could not be loaded from {0}")]
    Font(String),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("window creation failed: {0}")]
    Os(#[from] winit::error::OsError),

    #[error("pixel surface error: {0}")]
    Pixels(#[from] pixels::Error),
}
