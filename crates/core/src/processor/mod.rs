//! Processor module for the mix pipeline.
//!
//! `PowerHourPipeline` coordinates three stages with hard barriers between
//! them:
//! - Fetch: downloading every source missing from the work directory
//! - Segment: cutting every segment missing from the segment directory
//! - Assemble: ordering the segments and concatenating them into the mix
//!
//! Both producing stages are idempotent: a file tagged with the source id
//! means the work is done.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use std::sync::Arc;
//! use powerhour_core::converter::{ConverterConfig, FfmpegConverter};
//! use powerhour_core::fetcher::YtDlpFetcher;
//! use powerhour_core::processor::{PowerHourPipeline, ProcessorConfig};
//! use powerhour_core::tempo::SoundStretchAnalyzer;
//!
//! let converter = Arc::new(FfmpegConverter::with_defaults());
//! let pipeline = PowerHourPipeline::new(
//!     ProcessorConfig::default(),
//!     Arc::new(YtDlpFetcher::with_defaults()),
//!     Arc::clone(&converter),
//!     Arc::new(SoundStretchAnalyzer::with_defaults()),
//!     converter,
//! );
//!
//! let summary = pipeline.run(Path::new("index.txt")).await?;
//! println!("wrote {}", summary.output.output_path.display());
//! ```

mod config;
mod pipeline;
mod types;

pub use config::ProcessorConfig;
pub use pipeline::{dedup_entries, PipelineError, PowerHourPipeline};
pub use types::{RunSummary, SegmentFile, Stage, StageReport};
