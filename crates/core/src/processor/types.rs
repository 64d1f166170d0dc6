//! Types for the processor module.

use std::fmt;
use std::path::PathBuf;

use crate::converter::ConcatResult;
use crate::index::IndexEntry;

/// Stage that reports per-entry work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Segment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Segment => write!(f, "segment"),
        }
    }
}

/// Outcome of the fetch or segment stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    /// Entries considered.
    pub total: usize,
    /// Entries whose file already existed.
    pub skipped: usize,
    /// Entries processed by a collaborator.
    pub completed: usize,
    pub duration_ms: u64,
}

impl StageReport {
    pub(crate) fn new(stage: Stage, total: usize) -> Self {
        Self {
            stage,
            total,
            skipped: 0,
            completed: 0,
            duration_ms: 0,
        }
    }
}

/// A segment ready for assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentFile {
    pub entry: IndexEntry,
    pub path: PathBuf,
}

/// Outcome of a complete run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Distinct entries in the index.
    pub entries: usize,
    pub fetch: StageReport,
    pub segment: StageReport,
    /// Manifest handed to the concatenator.
    pub playlist_path: PathBuf,
    pub playlist_len: usize,
    pub output: ConcatResult,
}
