//! Types for the fetcher module.

use std::path::PathBuf;

use crate::index::SourceId;

/// A request to materialize one source locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchJob {
    /// Id the produced file name must carry.
    pub source_id: SourceId,
    /// URL to download.
    pub reference: String,
    /// Directory the file is written into.
    pub dest_dir: PathBuf,
}

/// Result of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub source_id: SourceId,
    /// The downloaded file.
    pub path: PathBuf,
    pub duration_ms: u64,
}
