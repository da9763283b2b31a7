//! Error types for the face gesture control library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding failed
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization or parsing failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Landmark provider output is malformed (wrong point count, missing index,
    /// non-finite coordinate or degenerate geometry)
    #[error("Invalid landmark input: {0}")]
    InvalidLandmarks(String),

    /// Frame source could not produce the next frame
    #[error("Frame source error: {0}")]
    FrameSource(String),

    /// Landmark provider failed for a reason other than "no face"
    #[error("Landmark provider error: {0}")]
    LandmarkProvider(String),

    /// Video sink rejected an encoded frame
    #[error("Video sink error: {0}")]
    VideoSink(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
