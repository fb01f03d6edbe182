//! Error types for the hat try-on library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Camera stream could not be acquired (permission denied, no device).
    /// Fatal to the session; never retried automatically.
    #[error("camera acquisition error: {0}")]
    Acquisition(String),

    /// Landmark detector construction or per-frame processing failed.
    /// The session absorbs these and continues in a degraded state.
    #[error("landmark detector error: {0}")]
    Detector(String),

    /// Overlay model failed to load; the previously attached model stays.
    #[error("model asset error: {0}")]
    Asset(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Invalid input parameters provided
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
