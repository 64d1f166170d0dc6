//! Configuration for the tempo module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the external tempo analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempoConfig {
    /// Path to ffmpeg binary, used to extract the waveform.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to the tempo detector binary.
    #[serde(default = "default_detector_path")]
    pub detector_path: PathBuf,

    /// Arguments passed to the detector after the waveform path.
    #[serde(default = "default_detector_args")]
    pub detector_args: Vec<String>,

    /// Directory for scratch waveform files.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    /// Sample rate of the scratch waveform.
    #[serde(default = "default_sample_rate")]
    pub sample_rate_hz: u32,

    /// Timeout for each external call in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Keep scratch waveforms after analysis.
    #[serde(default)]
    pub keep_scratch: bool,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_detector_path() -> PathBuf {
    PathBuf::from("soundstretch")
}

fn default_detector_args() -> Vec<String> {
    vec!["-bpm".to_string()]
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("powerhour-tempo")
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_timeout() -> u64 {
    600 // 10 minutes
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            detector_path: default_detector_path(),
            detector_args: default_detector_args(),
            scratch_dir: default_scratch_dir(),
            sample_rate_hz: default_sample_rate(),
            timeout_secs: default_timeout(),
            keep_scratch: false,
        }
    }
}

impl TempoConfig {
    /// Sets the scratch directory.
    pub fn with_scratch_dir(mut self, dir: PathBuf) -> Self {
        self.scratch_dir = dir;
        self
    }

    /// Sets the detector binary.
    pub fn with_detector(mut self, path: PathBuf) -> Self {
        self.detector_path = path;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TempoConfig::default();
        assert_eq!(config.detector_path, PathBuf::from("soundstretch"));
        assert_eq!(config.detector_args, vec!["-bpm".to_string()]);
        assert_eq!(config.sample_rate_hz, 44100);
        assert!(!config.keep_scratch);
    }

    #[test]
    fn test_config_builder() {
        let config = TempoConfig::default()
            .with_scratch_dir(PathBuf::from("/tmp/scratch"))
            .with_detector(PathBuf::from("/usr/bin/soundstretch"));
        assert_eq!(config.scratch_dir, PathBuf::from("/tmp/scratch"));
        assert_eq!(config.detector_path, PathBuf::from("/usr/bin/soundstretch"));
    }
}
