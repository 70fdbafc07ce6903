//! Error types for posediff.

use thiserror::Error;

/// The main error type for posediff operations.
#[derive(Error, Debug)]
pub enum PoseDiffError {
    /// A transform matrix could not be decomposed into a pose.
    #[error("malformed pose: {0}")]
    MalformedPose(String),

    /// An external data source failed to deliver cameras or validation results.
    #[error("fetch failed: {0}")]
    FetchFailure(String),

    /// No camera records have been loaded yet.
    #[error("no camera records loaded - call set_records() first")]
    NotLoaded,

    /// A camera with the given file path was not found.
    #[error("camera '{0}' not found")]
    CameraNotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for posediff operations.
pub type Result<T> = std::result::Result<T, PoseDiffError>;
