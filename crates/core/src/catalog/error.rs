//! Error types for the catalog module.

use std::path::PathBuf;
use thiserror::Error;

use crate::index::SourceId;

/// Errors that can occur while scanning or querying a directory catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Directory could not be listed.
    #[error("failed to scan {dir}: {source}")]
    Io {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// More than one file claims the same source id.
    #[error("ambiguous files for source {source_id}: {}", format_candidates(.candidates))]
    Ambiguous {
        source_id: SourceId,
        candidates: Vec<PathBuf>,
    },
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
