//! Error types for the tempo module.

use std::path::PathBuf;
use thiserror::Error;

use crate::runner::ToolError;

/// Errors that can occur during tempo analysis.
#[derive(Debug, Error)]
pub enum TempoError {
    /// Segment to analyze does not exist.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Detector ran but did not announce a tempo.
    #[error("tempo undetectable for {path}")]
    Undetectable { path: PathBuf, output: String },

    /// Waveform extraction or detector failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Scratch directory could not be prepared.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TempoError {
    /// Output captured from the failing step.
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Self::Tool(e) => e.captured_output(),
            Self::Undetectable { output, .. } if !output.is_empty() => Some(output),
            _ => None,
        }
    }
}
