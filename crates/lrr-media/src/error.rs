//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while converting RAW files.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Adobe DNG Converter not found")]
    ConverterNotFound,

    #[error("DNG conversion failed: {message}")]
    ConversionFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("DNG not found after conversion: {}", .0.display())]
    OutputMissing(PathBuf),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create a conversion failure error.
    pub fn conversion_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::ConversionFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }
}
