//! Error types for the index module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading the index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Index file does not exist.
    #[error("missing index file: {path}")]
    NotFound { path: PathBuf },

    /// A URL line did not split into exactly a reference and an offset.
    #[error("malformed index line {line_number}: expected 2 fields, found {fields}: {line}")]
    Malformed {
        line_number: usize,
        fields: usize,
        line: String,
    },

    /// No source id could be extracted from the reference.
    #[error("index line {line_number}: cannot extract a source id from {reference}")]
    MissingSourceId { line_number: usize, reference: String },

    /// I/O error while reading the index.
    #[error("I/O error reading index: {0}")]
    Io(#[from] std::io::Error),
}

/// A start offset that cannot be turned into a duration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid timestamp: {value}")]
pub struct TimestampError {
    pub value: String,
}
