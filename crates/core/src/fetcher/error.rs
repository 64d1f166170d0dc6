//! Error types for the fetcher module.

use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::index::SourceId;
use crate::runner::ToolError;

/// Errors that can occur while fetching a source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Downloader could not be run or failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Downloader exited successfully but no file can be found.
    #[error("no file produced for source {source_id}")]
    MissingOutput {
        source_id: SourceId,
        reported: Option<PathBuf>,
    },

    /// Destination directory could not be searched for the produced file.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Destination directory could not be prepared.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Output captured from a failed downloader run.
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Self::Tool(e) => e.captured_output(),
            _ => None,
        }
    }
}
