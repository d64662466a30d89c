//! Error types for Moviola.

use thiserror::Error;

/// Main error type for Moviola operations.
#[derive(Error, Debug)]
pub enum MoviolaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decoder error: {0}")]
    Decoder(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Moviola operations.
pub type Result<T> = std::result::Result<T, MoviolaError>;
