use thiserror::Error;

use crate::element::ObjectId;

/// Errors raised by the canvas core
#[derive(Debug, Error)]
pub enum CanvasError {
    /// A pointer event arrived without client coordinates or touches
    #[error("pointer event carries no coordinates")]
    MissingCoordinates,

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to encode raster: {0}")]
    Encode(String),

    /// The worker decoding a snapshot went away before answering
    #[error("snapshot decode was cancelled")]
    DecodeCancelled,

    #[error("no object with id {0}")]
    UnknownObject(ObjectId),

    #[error("invalid surface dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("font unavailable: {0}")]
    FontUnavailable(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for canvas operations
pub type CanvasResult<T> = Result<T, CanvasError>;
