//! Error types for the EXIF date fixer

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for EXIF date fixer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the EXIF date fixer
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read EXIF data from {path}: {message}")]
    ExifRead { path: PathBuf, message: String },

    #[error("Failed to write EXIF data to {path}: {message}")]
    ExifWrite { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
