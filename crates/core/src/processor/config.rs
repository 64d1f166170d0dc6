//! Configuration for the processor module.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::MatchRule;
use crate::converter::{EncodeSettings, SeparatorMode};
use crate::tempo::OrderBy;

/// Configuration for the mix pipeline.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Directory holding fetched sources.
    pub work_dir: PathBuf,

    /// Directory holding segments.
    pub segment_dir: PathBuf,

    /// Directory for the playlist manifest.
    pub scratch_dir: PathBuf,

    /// Final mix.
    pub output_path: PathBuf,

    /// Manifest file name inside `scratch_dir`.
    pub playlist_name: String,

    /// Maximum parallel downloads.
    pub max_parallel_fetches: usize,

    /// Maximum parallel cuts, also bounds tempo analysis.
    pub max_parallel_segments: usize,

    /// Length of every segment.
    pub segment_duration: Duration,

    /// Extension of produced segments, without the dot.
    pub segment_extension: String,

    pub encode: EncodeSettings,

    /// Separator sound, if any.
    pub separator: Option<PathBuf>,

    pub separator_mode: SeparatorMode,

    pub order: OrderBy,

    /// Fastest segments first.
    pub descending: bool,

    pub match_rule: MatchRule,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        let encode = EncodeSettings::default();
        Self {
            work_dir: PathBuf::from("."),
            segment_dir: PathBuf::from("cut"),
            scratch_dir: PathBuf::from(".powerhour"),
            output_path: PathBuf::from("POWERHOUR.m4a"),
            playlist_name: "playlist.txt".to_string(),
            max_parallel_fetches: 4,
            max_parallel_segments: 2,
            segment_duration: Duration::from_secs(60),
            segment_extension: encode.media.extension().to_string(),
            encode,
            separator: None,
            separator_mode: SeparatorMode::default(),
            order: OrderBy::default(),
            descending: false,
            match_rule: MatchRule::default(),
        }
    }
}

impl ProcessorConfig {
    /// Sets the fetch and segment directories.
    pub fn with_dirs(mut self, work_dir: PathBuf, segment_dir: PathBuf) -> Self {
        self.work_dir = work_dir;
        self.segment_dir = segment_dir;
        self
    }

    /// Sets the scratch directory.
    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Sets the final output path.
    pub fn with_output(mut self, path: PathBuf) -> Self {
        self.output_path = path;
        self
    }

    /// Sets the maximum parallel downloads.
    pub fn with_max_fetches(mut self, max: usize) -> Self {
        self.max_parallel_fetches = max;
        self
    }

    /// Sets the maximum parallel cuts.
    pub fn with_max_segments(mut self, max: usize) -> Self {
        self.max_parallel_segments = max;
        self
    }

    /// Sets the separator sound and how it is used.
    pub fn with_separator(mut self, path: PathBuf, mode: SeparatorMode) -> Self {
        self.separator = Some(path);
        self.separator_mode = mode;
        self
    }

    /// Sets the ordering of the final mix.
    pub fn with_order(mut self, order: OrderBy, descending: bool) -> Self {
        self.order = order;
        self.descending = descending;
        self
    }

    /// Whether fetched sources and segments would land in one directory.
    ///
    /// Existing directories are compared after resolving symlinks.
    pub fn shares_segment_dir(&self) -> bool {
        match (resolve_dir(&self.work_dir), resolve_dir(&self.segment_dir)) {
            (Some(work), Some(segment)) => work == segment,
            _ => false,
        }
    }

    /// Path of the playlist manifest.
    pub fn playlist_path(&self) -> PathBuf {
        self.scratch_dir.join(&self.playlist_name)
    }
}

fn resolve_dir(path: &Path) -> Option<PathBuf> {
    path.canonicalize()
        .ok()
        .or_else(|| std::path::absolute(path).ok())
}
