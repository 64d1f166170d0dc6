//! Command-line arguments and how they override the loaded configuration.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use powerhour_core::config::{Config, SeparatorConfig};
use powerhour_core::converter::{MediaMode, SeparatorMode};
use powerhour_core::{MatchRule, OrderBy};

/// Output used when nothing else is configured, per media mode.
const DEFAULT_AUDIO_OUTPUT: &str = "POWERHOUR.m4a";
const DEFAULT_VIDEO_OUTPUT: &str = "POWERHOUR.mp4";

/// Command-line arguments for power-hour
#[derive(Parser, Debug)]
#[command(name = "power-hour")]
#[command(about = "Build a power hour mix from an index of video links")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to powerhour.toml when present)
    #[arg(short, long, env = "POWERHOUR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Index file listing `<url> <start offset>` per line
    #[arg(short, long)]
    pub index: Option<PathBuf>,

    /// Final mix
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for fetched sources
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Directory for cut segments
    #[arg(long)]
    pub segment_dir: Option<PathBuf>,

    /// Separator sound between segments
    #[arg(long)]
    pub separator: Option<PathBuf>,

    /// How the separator is used: overlay or interleave
    #[arg(long)]
    pub separator_mode: Option<SeparatorMode>,

    /// Segment length in seconds
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Parallel downloads
    #[arg(long)]
    pub fetch_workers: Option<usize>,

    /// Parallel cuts
    #[arg(long)]
    pub segment_workers: Option<usize>,

    /// Mix order: tempo or index
    #[arg(long)]
    pub order: Option<OrderBy>,

    /// Fastest segments first
    #[arg(long)]
    pub descending: bool,

    /// Keep the video track
    #[arg(long)]
    pub video: bool,

    /// Video width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Video height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Video frame rate, 0 keeps the source rate
    #[arg(long)]
    pub fps: Option<u32>,

    /// Video constant rate factor
    #[arg(long)]
    pub crf: Option<u8>,

    /// How a source id is matched in file names: token or substring
    #[arg(long)]
    pub match_rule: Option<MatchRule>,

    /// Check that the external tools are usable, then exit
    #[arg(long)]
    pub check: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// More output, repeat for trace
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Applies flags on top of a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref index) = self.index {
            config.paths.index = index.clone();
        }
        if let Some(ref dir) = self.work_dir {
            config.paths.work_dir = dir.clone();
        }
        if let Some(ref dir) = self.segment_dir {
            config.paths.segment_dir = dir.clone();
        }

        if self.video {
            config.segment.media = MediaMode::Video;
        }
        if let Some(ref output) = self.output {
            config.paths.output = output.clone();
        } else if config.segment.media == MediaMode::Video
            && config.paths.output == PathBuf::from(DEFAULT_AUDIO_OUTPUT)
        {
            config.paths.output = PathBuf::from(DEFAULT_VIDEO_OUTPUT);
        }
        if let Some(width) = self.width {
            config.segment.video.width = width;
        }
        if let Some(height) = self.height {
            config.segment.video.height = height;
        }
        if let Some(fps) = self.fps {
            config.segment.video.fps = (fps > 0).then_some(fps);
        }
        if let Some(crf) = self.crf {
            config.segment.video.crf = crf;
        }

        if let Some(duration) = self.duration {
            config.segment.duration_secs = duration;
        }
        if let Some(workers) = self.fetch_workers {
            config.fetch.max_parallel = workers;
        }
        if let Some(workers) = self.segment_workers {
            config.segment.max_parallel = workers;
        }

        if let Some(ref path) = self.separator {
            let mode = config
                .segment
                .separator
                .as_ref()
                .map(|s| s.mode)
                .unwrap_or_default();
            config.segment.separator = Some(SeparatorConfig {
                path: path.clone(),
                mode,
            });
        }
        if let (Some(mode), Some(separator)) =
            (self.separator_mode, config.segment.separator.as_mut())
        {
            separator.mode = mode;
        }

        if let Some(order) = self.order {
            config.assembly.order = order;
        }
        if self.descending {
            config.assembly.descending = true;
        }
        if let Some(rule) = self.match_rule {
            config.catalog.match_rule = rule;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["power-hour"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = Config::default();
        parse(&[]).apply(&mut config);

        assert_eq!(config.paths.index, PathBuf::from("index.txt"));
        assert_eq!(config.paths.output, PathBuf::from("POWERHOUR.m4a"));
        assert_eq!(config.segment.media, MediaMode::Audio);
        assert!(config.segment.separator.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&[
            "--index",
            "songs.txt",
            "--duration",
            "30",
            "--fetch-workers",
            "8",
            "--order",
            "index",
            "--descending",
            "--match-rule",
            "substring",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.paths.index, PathBuf::from("songs.txt"));
        assert_eq!(config.segment.duration_secs, 30.0);
        assert_eq!(config.fetch.max_parallel, 8);
        assert_eq!(config.assembly.order, OrderBy::Index);
        assert!(config.assembly.descending);
        assert_eq!(config.catalog.match_rule, MatchRule::Substring);
    }

    #[test]
    fn test_video_switches_default_output() {
        let mut config = Config::default();
        parse(&["--video", "--width", "1920", "--height", "1080", "--fps", "0"])
            .apply(&mut config);

        assert_eq!(config.segment.media, MediaMode::Video);
        assert_eq!(config.paths.output, PathBuf::from("POWERHOUR.mp4"));
        assert_eq!(config.segment.video.width, 1920);
        assert_eq!(config.segment.video.fps, None);

        let mut config = Config::default();
        parse(&["--video", "-o", "mix.mkv"]).apply(&mut config);
        assert_eq!(config.paths.output, PathBuf::from("mix.mkv"));
    }

    #[test]
    fn test_separator_flags() {
        let mut config = Config::default();
        parse(&["--separator", "horn.m4a", "--separator-mode", "interleave"])
            .apply(&mut config);

        let separator = config.segment.separator.unwrap();
        assert_eq!(separator.path, PathBuf::from("horn.m4a"));
        assert_eq!(separator.mode, SeparatorMode::Interleave);
    }

    #[test]
    fn test_separator_mode_without_separator_is_ignored() {
        let mut config = Config::default();
        parse(&["--separator-mode", "interleave"]).apply(&mut config);
        assert!(config.segment.separator.is_none());
    }

    #[test]
    fn test_rejects_unknown_order() {
        assert!(Cli::try_parse_from(["power-hour", "--order", "random"]).is_err());
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&[]).log_filter(), "info");
        assert_eq!(parse(&["-v"]).log_filter(), "debug");
        assert_eq!(parse(&["-vv"]).log_filter(), "trace");
    }
}
