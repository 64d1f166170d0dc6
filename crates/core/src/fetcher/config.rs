//! Configuration for the fetcher module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::converter::MediaMode;

/// Configuration for the yt-dlp fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Path to the downloader binary.
    #[serde(default = "default_downloader_path")]
    pub downloader_path: PathBuf,

    /// Timeout for a single download in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Format selector passed with `-f`.
    #[serde(default = "default_format")]
    pub format: String,

    /// Output template. Must contain `%(id)s` so files can be found again.
    #[serde(default = "default_output_template")]
    pub output_template: String,

    /// Container to merge separate video/audio downloads into.
    #[serde(default)]
    pub merge_output_format: Option<String>,

    /// Keep file names to ASCII without spaces or quotes.
    #[serde(default = "default_restrict_filenames")]
    pub restrict_filenames: bool,

    /// Additional downloader arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_downloader_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_timeout() -> u64 {
    3600 // 1 hour
}

fn default_format() -> String {
    audio_format()
}

fn default_output_template() -> String {
    "%(title)s [%(id)s].%(ext)s".to_string()
}

fn default_restrict_filenames() -> bool {
    true
}

/// The m4a audio track, with fallbacks.
fn audio_format() -> String {
    "140/bestaudio[ext=m4a]/bestaudio".to_string()
}

fn video_format(max_height: u32) -> String {
    format!(
        "bestvideo[height<={h}]+bestaudio/best[height<={h}]/best",
        h = max_height
    )
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            downloader_path: default_downloader_path(),
            timeout_secs: default_timeout(),
            format: default_format(),
            output_template: default_output_template(),
            merge_output_format: None,
            restrict_filenames: default_restrict_filenames(),
            extra_args: Vec::new(),
        }
    }
}

impl FetcherConfig {
    /// Default configuration for the given media mode.
    ///
    /// Video downloads are capped at `max_height` and merged into mp4.
    pub fn for_media(mode: MediaMode, max_height: u32) -> Self {
        match mode {
            MediaMode::Audio => Self::default(),
            MediaMode::Video => Self {
                format: video_format(max_height),
                merge_output_format: Some("mp4".to_string()),
                ..Default::default()
            },
        }
    }

    /// Sets the downloader binary.
    pub fn with_downloader(mut self, path: PathBuf) -> Self {
        self.downloader_path = path;
        self
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the format selector.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }
}
