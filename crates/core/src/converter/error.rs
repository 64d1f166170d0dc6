//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

use crate::runner::ToolError;

/// Errors that can occur while cutting or concatenating.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Output directory does not exist and could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirectoryFailed { path: PathBuf },

    /// FFmpeg reported success but produced nothing.
    #[error("Output file not created: {path}")]
    OutputMissing { path: PathBuf },

    /// Job parameters cannot be encoded.
    #[error("Invalid job: {reason}")]
    InvalidJob { reason: String },

    /// FFmpeg could not be run or failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// I/O error around the conversion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    /// Creates a new invalid job error.
    pub fn invalid_job(reason: impl Into<String>) -> Self {
        Self::InvalidJob {
            reason: reason.into(),
        }
    }

    /// Output captured from a failed ffmpeg run.
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Self::Tool(e) => e.captured_output(),
            _ => None,
        }
    }
}
