//! Converter module: cuts segments and joins them with FFmpeg.
//!
//! This module provides the `Segmenter` and `Concatenator` traits and an
//! FFmpeg implementation of both.
//!
//! # Features
//!
//! - Input seeking and fixed-length cuts
//! - Separator sound mixed into the segment's audio
//! - Audio-only output (stream copy) or video normalized to one resolution
//! - Playlist manifests for the concat demuxer, quote-safe
//!
//! # Example
//!
//! ```ignore
//! use powerhour_core::converter::{FfmpegConverter, Segmenter, SegmentJob, EncodeSettings};
//!
//! let converter = FfmpegConverter::with_defaults();
//! converter.validate().await?;
//!
//! let result = converter.segment(SegmentJob {
//!     source_id,
//!     input_path: PathBuf::from("Song [abc123].m4a"),
//!     output_path: PathBuf::from("cut/Song [abc123].m4a"),
//!     start: Duration::from_secs(90),
//!     duration: Duration::from_secs(60),
//!     overlay_path: Some(PathBuf::from("airhorn.m4a")),
//!     encode: EncodeSettings::default(),
//! }).await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod playlist;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use playlist::Playlist;
pub use traits::{Concatenator, Segmenter};
pub use types::{
    AudioSettings, ConcatJob, ConcatResult, EncodeSettings, MediaMode, SegmentJob, SegmentResult,
    SeparatorMode, VideoSettings,
};
