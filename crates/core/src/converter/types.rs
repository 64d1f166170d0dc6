//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::index::SourceId;

/// Whether segments carry video or audio only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaMode {
    /// Audio only (the video stream is dropped).
    #[default]
    Audio,
    /// Video with audio, normalized to one resolution so segments concatenate.
    Video,
}

impl MediaMode {
    /// Default segment file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Audio => "m4a",
            Self::Video => "mp4",
        }
    }
}

impl std::str::FromStr for MediaMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            other => Err(format!("unknown media mode: {other}")),
        }
    }
}

/// How the separator sound is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorMode {
    /// Mixed into the start of every segment's audio.
    #[default]
    Overlay,
    /// Played on its own after every segment in the final mix.
    Interleave,
}

impl std::str::FromStr for SeparatorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overlay" => Ok(Self::Overlay),
            "interleave" => Ok(Self::Interleave),
            other => Err(format!("unknown separator mode: {other}")),
        }
    }
}

/// Video encoding settings, used in [`MediaMode::Video`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSettings {
    /// Output width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Output height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Output frame rate. `None` or `0` keeps the source rate.
    #[serde(default = "default_fps")]
    pub fps: Option<u32>,
    /// FFmpeg video codec.
    #[serde(default = "default_video_codec")]
    pub codec: String,
    /// Constant rate factor.
    #[serde(default = "default_crf")]
    pub crf: u8,
    /// Encoder preset.
    #[serde(default = "default_preset")]
    pub preset: String,
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_fps() -> Option<u32> {
    Some(30)
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_crf() -> u8 {
    23
}

fn default_preset() -> String {
    "veryfast".to_string()
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            codec: default_video_codec(),
            crf: default_crf(),
            preset: default_preset(),
        }
    }
}

/// Audio encoding settings, used whenever audio has to be re-encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    /// FFmpeg audio codec.
    #[serde(default = "default_audio_codec")]
    pub codec: String,
    /// Target bitrate in kbps.
    #[serde(default = "default_audio_bitrate")]
    pub bitrate_kbps: u32,
    /// Target sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: u32,
    /// Number of channels.
    #[serde(default = "default_channels")]
    pub channels: u8,
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_audio_bitrate() -> u32 {
    192
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_channels() -> u8 {
    2
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            codec: default_audio_codec(),
            bitrate_kbps: default_audio_bitrate(),
            sample_rate_hz: default_sample_rate(),
            channels: default_channels(),
        }
    }
}

/// Encoding parameters shared by all segments of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodeSettings {
    pub media: MediaMode,
    pub audio: AudioSettings,
    pub video: VideoSettings,
}

/// A request to cut one segment out of a fetched source.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentJob {
    /// Source the segment belongs to.
    pub source_id: SourceId,
    /// Fetched source file.
    pub input_path: PathBuf,
    /// Where the segment is written.
    pub output_path: PathBuf,
    /// Offset into the source.
    pub start: Duration,
    /// Segment length.
    pub duration: Duration,
    /// Sound mixed into the segment's audio, if any.
    pub overlay_path: Option<PathBuf>,
    /// Encoding parameters.
    pub encode: EncodeSettings,
}

/// Result of a successful cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentResult {
    pub source_id: SourceId,
    pub output_path: PathBuf,
    pub output_size_bytes: u64,
    pub duration_ms: u64,
}

/// A request to join segments listed in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatJob {
    /// Playlist manifest in ffmpeg concat-demuxer format.
    pub manifest_path: PathBuf,
    /// Final artifact.
    pub output_path: PathBuf,
}

/// Result of a successful concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatResult {
    pub output_path: PathBuf,
    pub output_size_bytes: u64,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_mode_extension() {
        assert_eq!(MediaMode::Audio.extension(), "m4a");
        assert_eq!(MediaMode::Video.extension(), "mp4");
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("VIDEO".parse::<MediaMode>().unwrap(), MediaMode::Video);
        assert_eq!(
            "interleave".parse::<SeparatorMode>().unwrap(),
            SeparatorMode::Interleave
        );
        assert!("both".parse::<SeparatorMode>().is_err());
    }

    #[test]
    fn test_settings_deserialize_defaults() {
        let video: VideoSettings = toml::from_str("width = 1920\nheight = 1080").unwrap();
        assert_eq!(video.width, 1920);
        assert_eq!(video.crf, 23);
        assert_eq!(video.fps, Some(30));

        let audio: AudioSettings = toml::from_str("").unwrap();
        assert_eq!(audio, AudioSettings::default());
    }
}
