//! Pipeline processor implementation.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogError, FileCatalog};
use crate::converter::{
    ConcatJob, ConcatResult, Concatenator, ConverterError, Playlist, SegmentJob, Segmenter,
    SeparatorMode,
};
use crate::fetcher::{FetchError, FetchJob, Fetcher};
use crate::index::{IndexEntry, IndexError, IndexReader, SourceId, TimestampError};
use crate::tempo::{order_by_tempo, OrderBy, TempoAnalyzer, TempoError};

use super::config::ProcessorConfig;
use super::types::{RunSummary, SegmentFile, Stage, StageReport};

/// Error type for pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Index could not be read or parsed.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Directory scan failed or a source id matched several files.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Downloader failed for a source.
    #[error("fetch failed for {source_id}")]
    FetchFailed {
        source_id: SourceId,
        #[source]
        source: FetchError,
    },

    /// No fetched file for an entry that needs cutting.
    #[error("no fetched file for {source_id} in {dir}")]
    MissingFetchedFile { source_id: SourceId, dir: PathBuf },

    /// Start offset of an entry cannot be parsed.
    #[error("index line {line_number}: bad start offset for {source_id}")]
    InvalidTimestamp {
        source_id: SourceId,
        line_number: usize,
        #[source]
        source: TimestampError,
    },

    /// Cutting a segment failed.
    #[error("cutting failed for {source_id}")]
    SegmentFailed {
        source_id: SourceId,
        #[source]
        source: ConverterError,
    },

    /// Tempo of a segment could not be determined.
    #[error("tempo analysis failed for {source_id}")]
    TempoFailed {
        source_id: SourceId,
        #[source]
        source: TempoError,
    },

    /// No segment for an entry at assembly time.
    #[error("no segment for {source_id} in {dir}")]
    MissingSegment { source_id: SourceId, dir: PathBuf },

    /// Fetched sources and segments would share a directory.
    #[error("work and segment directories are the same: {dir}")]
    SharedSegmentDir { dir: PathBuf },

    /// Interleaved separator file does not exist.
    #[error("separator not found: {path}")]
    MissingSeparator { path: PathBuf },

    /// Joining the segments failed.
    #[error("concatenation failed")]
    ConcatFailed(#[source] ConverterError),

    /// An external tool is unusable.
    #[error("{collaborator} is not usable")]
    ToolCheck {
        collaborator: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Directory or manifest I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Full output of the collaborator whose failure ended the run.
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            Self::FetchFailed { source, .. } => source.captured_output(),
            Self::SegmentFailed { source, .. } => source.captured_output(),
            Self::TempoFailed { source, .. } => source.captured_output(),
            Self::ConcatFailed(source) => source.captured_output(),
            _ => None,
        }
    }
}

/// Drops entries whose source id already appeared earlier in the index.
pub fn dedup_entries(entries: Vec<IndexEntry>) -> Vec<IndexEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| {
            let first = seen.insert(entry.source_id.clone());
            if !first {
                warn!(
                    source_id = %entry.source_id,
                    line = entry.line_number,
                    "duplicate source in index, keeping first occurrence"
                );
            }
            first
        })
        .collect()
}

/// Builds the mix: fetch, then segment, then assemble.
///
/// Each stage finishes completely before the next one starts. Within a
/// stage, work runs on a bounded pool and the first failure drops every
/// in-flight job, which kills its child process.
pub struct PowerHourPipeline<F, S, T, C> {
    config: ProcessorConfig,
    fetcher: Arc<F>,
    segmenter: Arc<S>,
    analyzer: Arc<T>,
    concatenator: Arc<C>,
}

impl<F, S, T, C> PowerHourPipeline<F, S, T, C>
where
    F: Fetcher,
    S: Segmenter,
    T: TempoAnalyzer,
    C: Concatenator,
{
    pub fn new(
        config: ProcessorConfig,
        fetcher: Arc<F>,
        segmenter: Arc<S>,
        analyzer: Arc<T>,
        concatenator: Arc<C>,
    ) -> Self {
        Self {
            config,
            fetcher,
            segmenter,
            analyzer,
            concatenator,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Validates every external collaborator.
    ///
    /// Tempo analysis is only checked when the mix is ordered by tempo.
    pub async fn check_tools(&self) -> Result<(), PipelineError> {
        self.fetcher
            .validate()
            .await
            .map_err(|e| tool_check(self.fetcher.name(), e))?;
        self.segmenter
            .validate()
            .await
            .map_err(|e| tool_check(self.segmenter.name(), e))?;
        self.concatenator
            .validate()
            .await
            .map_err(|e| tool_check(self.concatenator.name(), e))?;
        if self.config.order == OrderBy::Tempo {
            self.analyzer
                .validate()
                .await
                .map_err(|e| tool_check(self.analyzer.name(), e))?;
        }
        Ok(())
    }

    /// Runs the whole pipeline for the index at `index_path`.
    pub async fn run(&self, index_path: &Path) -> Result<RunSummary, PipelineError> {
        let reader = IndexReader::open(index_path)?;
        let entries = dedup_entries(reader.read_all()?);
        info!(
            index = %index_path.display(),
            entries = entries.len(),
            "index loaded"
        );

        self.check_dirs()?;
        self.prepare_dirs().await?;

        let fetch = self.fetch_stage(&entries).await?;
        let segment = self.segment_stage(&entries).await?;
        let playlist = self.build_playlist(&entries).await?;

        let playlist_path = self.config.playlist_path();
        playlist.write_to(&playlist_path).await?;
        debug!(path = %playlist_path.display(), entries = playlist.len(), "playlist written");

        let output = self.concat(&playlist_path).await?;

        Ok(RunSummary {
            entries: entries.len(),
            fetch,
            segment,
            playlist_path,
            playlist_len: playlist.len(),
            output,
        })
    }

    fn check_dirs(&self) -> Result<(), PipelineError> {
        if self.config.shares_segment_dir() {
            return Err(PipelineError::SharedSegmentDir {
                dir: self.config.segment_dir.clone(),
            });
        }
        Ok(())
    }

    /// Maps every entry with a file in `dir` to that file.
    fn resolve_in(
        &self,
        dir: &Path,
        entries: &[IndexEntry],
    ) -> Result<HashMap<SourceId, PathBuf>, PipelineError> {
        let catalog = FileCatalog::scan(dir, self.config.match_rule)?;
        Ok(catalog.resolve(entries.iter().map(|entry| &entry.source_id))?)
    }

    async fn prepare_dirs(&self) -> Result<(), PipelineError> {
        for dir in [
            &self.config.work_dir,
            &self.config.segment_dir,
            &self.config.scratch_dir,
        ] {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    /// Downloads every entry not yet present in the work directory.
    pub async fn fetch_stage(&self, entries: &[IndexEntry]) -> Result<StageReport, PipelineError> {
        let start = Instant::now();
        let mut report = StageReport::new(Stage::Fetch, entries.len());
        let fetched = self.resolve_in(&self.config.work_dir, entries)?;

        let mut pending = Vec::new();
        for entry in entries {
            match fetched.get(&entry.source_id) {
                Some(path) => {
                    debug!(source_id = %entry.source_id, path = %path.display(), "already fetched");
                    report.skipped += 1;
                }
                None => pending.push(entry),
            }
        }

        let completed: Vec<()> = stream::iter(pending)
            .map(|entry| self.fetch_one(entry))
            .buffer_unordered(self.config.max_parallel_fetches.max(1))
            .try_collect()
            .await?;

        report.completed = completed.len();
        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            stage = %report.stage,
            fetched = report.completed,
            skipped = report.skipped,
            "stage complete"
        );
        Ok(report)
    }

    async fn fetch_one(&self, entry: &IndexEntry) -> Result<(), PipelineError> {
        info!(source_id = %entry.source_id, "downloading {}", entry.source_reference);
        let job = FetchJob {
            source_id: entry.source_id.clone(),
            reference: entry.source_reference.clone(),
            dest_dir: self.config.work_dir.clone(),
        };

        let result = self
            .fetcher
            .fetch(job)
            .await
            .map_err(|source| PipelineError::FetchFailed {
                source_id: entry.source_id.clone(),
                source,
            })?;
        debug!(
            source_id = %result.source_id,
            path = %result.path.display(),
            duration_ms = result.duration_ms,
            "fetched"
        );
        Ok(())
    }

    /// Cuts a segment for every entry not yet present in the segment directory.
    ///
    /// All jobs are planned before any is started, so a missing source or a
    /// bad offset fails the stage without spending any work.
    pub async fn segment_stage(
        &self,
        entries: &[IndexEntry],
    ) -> Result<StageReport, PipelineError> {
        self.check_dirs()?;
        let start = Instant::now();
        let mut report = StageReport::new(Stage::Segment, entries.len());
        let fetched = self.resolve_in(&self.config.work_dir, entries)?;
        let segments = self.resolve_in(&self.config.segment_dir, entries)?;

        let mut jobs = Vec::new();
        for entry in entries {
            if segments.contains_key(&entry.source_id) {
                debug!(source_id = %entry.source_id, "segment already cut");
                report.skipped += 1;
                continue;
            }
            jobs.push((entry, self.plan_segment(entry, &fetched)?));
        }

        let completed: Vec<()> = stream::iter(jobs)
            .map(|(entry, job)| self.segment_one(entry, job))
            .buffer_unordered(self.config.max_parallel_segments.max(1))
            .try_collect()
            .await?;

        report.completed = completed.len();
        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            stage = %report.stage,
            cut = report.completed,
            skipped = report.skipped,
            "stage complete"
        );
        Ok(report)
    }

    fn plan_segment(
        &self,
        entry: &IndexEntry,
        fetched: &HashMap<SourceId, PathBuf>,
    ) -> Result<SegmentJob, PipelineError> {
        let input_path = fetched.get(&entry.source_id).cloned().ok_or_else(|| {
            PipelineError::MissingFetchedFile {
                source_id: entry.source_id.clone(),
                dir: self.config.work_dir.clone(),
            }
        })?;

        let start = entry
            .start_offset
            .to_duration()
            .map_err(|source| PipelineError::InvalidTimestamp {
                source_id: entry.source_id.clone(),
                line_number: entry.line_number,
                source,
            })?;

        // The fetched stem carries the source id, so the segment does too.
        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| entry.source_id.to_string());
        let output_path = self
            .config
            .segment_dir
            .join(format!("{}.{}", stem, self.config.segment_extension));

        let overlay_path = match self.config.separator_mode {
            SeparatorMode::Overlay => self.config.separator.clone(),
            SeparatorMode::Interleave => None,
        };

        Ok(SegmentJob {
            source_id: entry.source_id.clone(),
            input_path,
            output_path,
            start,
            duration: self.config.segment_duration,
            overlay_path,
            encode: self.config.encode.clone(),
        })
    }

    async fn segment_one(&self, entry: &IndexEntry, job: SegmentJob) -> Result<(), PipelineError> {
        info!(
            source_id = %entry.source_id,
            "cutting {} at {}",
            entry.source_reference,
            entry.start_offset
        );

        let result = self
            .segmenter
            .segment(job)
            .await
            .map_err(|source| PipelineError::SegmentFailed {
                source_id: entry.source_id.clone(),
                source,
            })?;
        debug!(
            source_id = %result.source_id,
            path = %result.output_path.display(),
            size = result.output_size_bytes,
            "segment written"
        );
        Ok(())
    }

    /// Finds the segment of every entry, in index order.
    pub fn collect_segments(
        &self,
        entries: &[IndexEntry],
    ) -> Result<Vec<SegmentFile>, PipelineError> {
        let found = self.resolve_in(&self.config.segment_dir, entries)?;
        entries
            .iter()
            .map(|entry| {
                let path = found.get(&entry.source_id).cloned().ok_or_else(|| {
                    PipelineError::MissingSegment {
                        source_id: entry.source_id.clone(),
                        dir: self.config.segment_dir.clone(),
                    }
                })?;
                Ok(SegmentFile {
                    entry: entry.clone(),
                    path,
                })
            })
            .collect()
    }

    /// Orders segments for the final mix.
    ///
    /// Every tempo is measured exactly once before sorting.
    pub async fn order_segments(
        &self,
        segments: Vec<SegmentFile>,
    ) -> Result<Vec<SegmentFile>, PipelineError> {
        if self.config.order == OrderBy::Index {
            return Ok(segments);
        }

        // `buffered` keeps input order, which the stable sort relies on for ties.
        let measured: Vec<(SegmentFile, f64)> = stream::iter(segments)
            .map(|segment| self.measure(segment))
            .buffered(self.config.max_parallel_segments.max(1))
            .try_collect()
            .await?;

        Ok(order_by_tempo(measured, self.config.descending))
    }

    async fn measure(&self, segment: SegmentFile) -> Result<(SegmentFile, f64), PipelineError> {
        let bpm = self
            .analyzer
            .tempo(&segment.path)
            .await
            .map_err(|source| PipelineError::TempoFailed {
                source_id: segment.entry.source_id.clone(),
                source,
            })?;
        debug!(source_id = %segment.entry.source_id, bpm, "tempo detected");
        Ok((segment, bpm))
    }

    /// Builds the playlist manifest with absolute paths.
    pub async fn build_playlist(&self, entries: &[IndexEntry]) -> Result<Playlist, PipelineError> {
        let segments = self.collect_segments(entries)?;
        let ordered = self.order_segments(segments).await?;

        let interleaved = match (&self.config.separator, self.config.separator_mode) {
            (Some(path), SeparatorMode::Interleave) => {
                if !path.is_file() {
                    return Err(PipelineError::MissingSeparator { path: path.clone() });
                }
                Some(std::path::absolute(path)?)
            }
            _ => None,
        };

        let mut playlist = Playlist::new();
        for segment in ordered {
            playlist.push(std::path::absolute(&segment.path)?);
            if let Some(ref separator) = interleaved {
                playlist.push(separator.clone());
            }
        }
        Ok(playlist)
    }

    async fn concat(&self, manifest_path: &Path) -> Result<ConcatResult, PipelineError> {
        let output_path = &self.config.output_path;
        info!("concatenating to {}", output_path.display());

        let result = self
            .concatenator
            .concat(ConcatJob {
                manifest_path: manifest_path.to_path_buf(),
                output_path: output_path.clone(),
            })
            .await
            .map_err(PipelineError::ConcatFailed)?;
        info!(
            output = %result.output_path.display(),
            size = result.output_size_bytes,
            duration_ms = result.duration_ms,
            "mix complete"
        );
        Ok(result)
    }
}

fn tool_check(
    collaborator: &str,
    source: impl std::error::Error + Send + Sync + 'static,
) -> PipelineError {
    PipelineError::ToolCheck {
        collaborator: collaborator.to_string(),
        source: Box::new(source),
    }
}
