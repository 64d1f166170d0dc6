//! Error types for external tool invocation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while running an external collaborator process.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Binary could not be found on disk or in PATH.
    #[error("{program} not found at path: {path}")]
    NotFound { program: String, path: PathBuf },

    /// Process ran but exited unsuccessfully.
    #[error("{program} exited with code {code:?}")]
    Failed {
        program: String,
        code: Option<i32>,
        output: String,
    },

    /// Process exceeded its time budget and was killed.
    #[error("{program} timed out after {timeout_secs} seconds")]
    Timeout { program: String, timeout_secs: u64 },

    /// I/O error while spawning or waiting.
    #[error("I/O error running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    /// Captured stdout/stderr of a failed process, if any.
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Self::Failed { output, .. } if !output.is_empty() => Some(output),
            _ => None,
        }
    }
}
