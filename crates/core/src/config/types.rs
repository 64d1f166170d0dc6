use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::MatchRule;
use crate::converter::{
    AudioSettings, ConverterConfig, EncodeSettings, MediaMode, SeparatorMode, VideoSettings,
};
use crate::fetcher::FetcherConfig;
use crate::processor::ProcessorConfig;
use crate::tempo::{OrderBy, TempoConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub segment: SegmentConfig,
    #[serde(default)]
    pub assembly: AssemblyConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// File and directory locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Index of sources and start offsets
    #[serde(default = "default_index")]
    pub index: PathBuf,
    /// Where fetched sources are stored
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Where segments are stored
    #[serde(default = "default_segment_dir")]
    pub segment_dir: PathBuf,
    /// Playlist manifest and tempo waveforms
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
    /// Final mix
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            index: default_index(),
            work_dir: default_work_dir(),
            segment_dir: default_segment_dir(),
            scratch_dir: default_scratch_dir(),
            output: default_output(),
        }
    }
}

fn default_index() -> PathBuf {
    PathBuf::from("index.txt")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_segment_dir() -> PathBuf {
    PathBuf::from("cut")
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from(".powerhour")
}

fn default_output() -> PathBuf {
    PathBuf::from("POWERHOUR.m4a")
}

/// External binaries
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,
    #[serde(default = "default_downloader")]
    pub downloader: PathBuf,
    #[serde(default = "default_tempo_detector")]
    pub tempo_detector: PathBuf,
    /// Upper bound for any single external process, in seconds
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_ffmpeg_log_level")]
    pub ffmpeg_log_level: String,
    /// Passed to every segment and concat run, before the output path
    #[serde(default)]
    pub ffmpeg_extra_args: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            downloader: default_downloader(),
            tempo_detector: default_tempo_detector(),
            timeout_secs: default_tool_timeout(),
            ffmpeg_log_level: default_ffmpeg_log_level(),
            ffmpeg_extra_args: Vec::new(),
        }
    }
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_downloader() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_tempo_detector() -> PathBuf {
    PathBuf::from("soundstretch")
}

fn default_tool_timeout() -> u64 {
    3600
}

fn default_ffmpeg_log_level() -> String {
    "warning".to_string()
}

/// Fetch stage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_parallel")]
    pub max_parallel: usize,
    /// Format selector; derived from the media mode when unset
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default = "default_restrict_filenames")]
    pub restrict_filenames: bool,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_fetch_parallel(),
            format: None,
            restrict_filenames: default_restrict_filenames(),
            extra_args: Vec::new(),
        }
    }
}

fn default_fetch_parallel() -> usize {
    4
}

fn default_restrict_filenames() -> bool {
    true
}

/// Segment stage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SegmentConfig {
    #[serde(default = "default_segment_parallel")]
    pub max_parallel: usize,
    #[serde(default = "default_duration_secs")]
    pub duration_secs: f64,
    #[serde(default)]
    pub media: MediaMode,
    /// Segment file extension; derived from the media mode when unset
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub video: VideoSettings,
    #[serde(default)]
    pub separator: Option<SeparatorConfig>,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_segment_parallel(),
            duration_secs: default_duration_secs(),
            media: MediaMode::default(),
            extension: None,
            audio: AudioSettings::default(),
            video: VideoSettings::default(),
            separator: None,
        }
    }
}

fn default_segment_parallel() -> usize {
    2
}

fn default_duration_secs() -> f64 {
    60.0
}

/// Separator sound
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeparatorConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub mode: SeparatorMode,
}

/// Assembly stage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssemblyConfig {
    #[serde(default)]
    pub order: OrderBy,
    #[serde(default)]
    pub descending: bool,
    /// Manifest file name inside the scratch directory
    #[serde(default = "default_playlist_name")]
    pub playlist_name: String,
    /// Keep the waveforms extracted for tempo detection
    #[serde(default)]
    pub keep_tempo_scratch: bool,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            order: OrderBy::default(),
            descending: false,
            playlist_name: default_playlist_name(),
            keep_tempo_scratch: false,
        }
    }
}

fn default_playlist_name() -> String {
    "playlist.txt".to_string()
}

/// Idempotency matching
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub match_rule: MatchRule,
}

impl Config {
    /// Settings for the downloader.
    pub fn fetcher_config(&self) -> FetcherConfig {
        let mut config = FetcherConfig::for_media(self.segment.media, self.segment.video.height)
            .with_downloader(self.tools.downloader.clone())
            .with_timeout(self.tools.timeout_secs);
        if let Some(ref format) = self.fetch.format {
            config = config.with_format(format.clone());
        }
        config.restrict_filenames = self.fetch.restrict_filenames;
        config.extra_args = self.fetch.extra_args.clone();
        config
    }

    /// Settings for the ffmpeg segmenter and concatenator.
    pub fn converter_config(&self) -> ConverterConfig {
        let mut config = ConverterConfig::with_path(self.tools.ffmpeg.clone())
            .with_timeout(self.tools.timeout_secs)
            .with_log_level(self.tools.ffmpeg_log_level.clone());
        config.extra_ffmpeg_args = self.tools.ffmpeg_extra_args.clone();
        config
    }

    /// Settings for tempo analysis.
    pub fn tempo_config(&self) -> TempoConfig {
        let mut config = TempoConfig::default()
            .with_scratch_dir(self.paths.scratch_dir.join("tempo"))
            .with_detector(self.tools.tempo_detector.clone());
        config.ffmpeg_path = self.tools.ffmpeg.clone();
        config.timeout_secs = self.tools.timeout_secs;
        config.keep_scratch = self.assembly.keep_tempo_scratch;
        config
    }

    /// Settings for the pipeline itself.
    pub fn processor_config(&self) -> ProcessorConfig {
        let (separator, separator_mode) = match &self.segment.separator {
            Some(s) => (Some(s.path.clone()), s.mode),
            None => (None, SeparatorMode::default()),
        };

        ProcessorConfig {
            work_dir: self.paths.work_dir.clone(),
            segment_dir: self.paths.segment_dir.clone(),
            scratch_dir: self.paths.scratch_dir.clone(),
            output_path: self.paths.output.clone(),
            playlist_name: self.assembly.playlist_name.clone(),
            max_parallel_fetches: self.fetch.max_parallel,
            max_parallel_segments: self.segment.max_parallel,
            segment_duration: Duration::try_from_secs_f64(self.segment.duration_secs)
                .unwrap_or_default(),
            segment_extension: self
                .segment
                .extension
                .clone()
                .unwrap_or_else(|| self.segment.media.extension().to_string()),
            encode: EncodeSettings {
                media: self.segment.media,
                audio: self.segment.audio.clone(),
                video: self.segment.video.clone(),
            },
            separator,
            separator_mode,
            order: self.assembly.order,
            descending: self.assembly.descending,
            match_rule: self.catalog.match_rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.paths.index, PathBuf::from("index.txt"));
        assert_eq!(config.paths.segment_dir, PathBuf::from("cut"));
        assert_eq!(config.paths.output, PathBuf::from("POWERHOUR.m4a"));
        assert_eq!(config.fetch.max_parallel, 4);
        assert_eq!(config.segment.max_parallel, 2);
        assert_eq!(config.segment.duration_secs, 60.0);
        assert_eq!(config.assembly.order, OrderBy::Tempo);
        assert_eq!(config.catalog.match_rule, MatchRule::Token);
        assert!(config.segment.separator.is_none());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[paths]
index = "mix/index.txt"
output = "mix/out.mp4"

[tools]
ffmpeg = "/opt/ffmpeg/bin/ffmpeg"
timeout_secs = 600

[fetch]
max_parallel = 8
format = "bestaudio"

[segment]
max_parallel = 1
duration_secs = 30.5
media = "video"

[segment.video]
width = 1920
height = 1080

[segment.separator]
path = "airhorn.m4a"
mode = "interleave"

[assembly]
order = "index"
descending = true
keep_tempo_scratch = true

[catalog]
match_rule = "substring"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.paths.index, PathBuf::from("mix/index.txt"));
        assert_eq!(config.tools.timeout_secs, 600);
        assert_eq!(config.fetch.format.as_deref(), Some("bestaudio"));
        assert_eq!(config.segment.media, MediaMode::Video);
        assert_eq!(config.segment.video.width, 1920);
        let separator = config.segment.separator.as_ref().unwrap();
        assert_eq!(separator.mode, SeparatorMode::Interleave);
        assert_eq!(config.assembly.order, OrderBy::Index);
        assert!(config.assembly.keep_tempo_scratch);
        assert_eq!(config.catalog.match_rule, MatchRule::Substring);
    }

    #[test]
    fn test_derived_configs() {
        let mut config = Config::default();
        config.tools.ffmpeg = PathBuf::from("/usr/bin/ffmpeg");
        config.tools.timeout_secs = 120;
        config.tools.ffmpeg_extra_args = vec!["-threads".to_string(), "2".to_string()];
        config.assembly.keep_tempo_scratch = true;
        config.segment.media = MediaMode::Video;
        config.segment.separator = Some(SeparatorConfig {
            path: PathBuf::from("horn.m4a"),
            mode: SeparatorMode::Overlay,
        });

        let converter = config.converter_config();
        assert_eq!(converter.ffmpeg_path, PathBuf::from("/usr/bin/ffmpeg"));
        assert_eq!(converter.timeout_secs, 120);
        assert_eq!(converter.extra_ffmpeg_args, vec!["-threads", "2"]);

        let fetcher = config.fetcher_config();
        assert!(fetcher.format.contains("height<=720"));
        assert_eq!(fetcher.timeout_secs, 120);

        let tempo = config.tempo_config();
        assert_eq!(tempo.ffmpeg_path, PathBuf::from("/usr/bin/ffmpeg"));
        assert_eq!(tempo.scratch_dir, PathBuf::from(".powerhour/tempo"));
        assert!(tempo.keep_scratch);

        let processor = config.processor_config();
        assert_eq!(processor.segment_extension, "mp4");
        assert_eq!(processor.segment_duration, Duration::from_secs(60));
        assert_eq!(processor.separator, Some(PathBuf::from("horn.m4a")));
        assert_eq!(processor.max_parallel_fetches, 4);
    }

    #[test]
    fn test_fetch_format_override() {
        let mut config = Config::default();
        config.fetch.format = Some("251".to_string());
        assert_eq!(config.fetcher_config().format, "251");
    }
}
