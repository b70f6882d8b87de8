//! Error types for dataset operations

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Error types shared by the downloader, the reconciliation checker and the compression sweep
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// HTTP retrieval errors
    #[error("Network error: {0}")]
    Network(String),

    /// Measurement table serialization errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The dataset directory does not exist
    #[error("Directory '{}' not found", .0.display())]
    MissingDirectory(PathBuf),

    /// Nothing in the dataset directory matched the selection filter
    #[error("No files matching '{prefix}*' found in {}", .dir.display())]
    NoMatchingFiles {
        /// Directory that was scanned
        dir: PathBuf,
        /// Filename prefix used as the filter
        prefix: String,
    },
}

impl DatasetError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a missing directory error
    pub fn missing_directory<P: AsRef<Path>>(path: P) -> Self {
        Self::MissingDirectory(path.as_ref().to_path_buf())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<Path>>(operation: &str, path: P, error: &std::io::Error) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create network error with request context
    pub fn network_error<S: Into<String>, E: std::fmt::Display>(context: S, error: E) -> Self {
        Self::Network(format!("{}: {}", context.into(), error))
    }

    /// Create configuration error with the valid range
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {})",
            parameter, value, valid_range
        ))
    }

    /// Whether this error is one of the fatal preconditions that abort a run before any work
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::MissingDirectory(_) | Self::NoMatchingFiles { .. }
        )
    }
}
