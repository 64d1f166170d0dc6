//! Tempo analysis through ffmpeg and soundstretch.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::runner::{check_binary, ToolCommand};

use super::config::TempoConfig;
use super::error::TempoError;
use super::traits::TempoAnalyzer;

/// Marker the detector prints in front of the tempo value.
const DETECTION_MARKER: &str = "Detected";

/// Extracts the tempo from detector output.
///
/// Looks for a line containing `Detected` and parses its last whitespace
/// separated token, e.g. `Detected BPM rate 123.4`.
pub fn parse_detected_tempo(output: &str) -> Option<f64> {
    output
        .lines()
        .filter(|line| line.contains(DETECTION_MARKER))
        .find_map(|line| line.split_whitespace().last()?.parse::<f64>().ok())
        .filter(|bpm| bpm.is_finite())
}

/// Analyzer that decodes the segment to a WAV file and runs a detector on it.
#[derive(Debug, Clone)]
pub struct SoundStretchAnalyzer {
    config: TempoConfig,
}

impl SoundStretchAnalyzer {
    /// Creates a new analyzer with the given configuration.
    pub fn new(config: TempoConfig) -> Self {
        Self { config }
    }

    /// Creates an analyzer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TempoConfig::default())
    }

    /// Scratch waveform path for a segment.
    fn scratch_path(&self, segment: &Path) -> PathBuf {
        let stem = segment
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "segment".to_string());
        self.config.scratch_dir.join(format!("{stem}.wav"))
    }

    fn build_extract_args(&self, segment: &Path, wav: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            segment.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-ar".to_string(),
            self.config.sample_rate_hz.to_string(),
            "-f".to_string(),
            "wav".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            wav.to_string_lossy().to_string(),
        ]
    }

    fn build_detect_args(&self, wav: &Path) -> Vec<String> {
        let mut args = vec![wav.to_string_lossy().to_string()];
        args.extend(self.config.detector_args.iter().cloned());
        args
    }

    async fn analyze(&self, segment: &Path, wav: &Path) -> Result<f64, TempoError> {
        ToolCommand::new(&self.config.ffmpeg_path)
            .args(self.build_extract_args(segment, wav))
            .timeout_secs(self.config.timeout_secs)
            .run()
            .await?;

        let output = ToolCommand::new(&self.config.detector_path)
            .args(self.build_detect_args(wav))
            .timeout_secs(self.config.timeout_secs)
            .run()
            .await?;

        let text = output.combined();
        parse_detected_tempo(&text).ok_or_else(|| TempoError::Undetectable {
            path: segment.to_path_buf(),
            output: text,
        })
    }
}

#[async_trait]
impl TempoAnalyzer for SoundStretchAnalyzer {
    fn name(&self) -> &str {
        "soundstretch"
    }

    async fn tempo(&self, path: &Path) -> Result<f64, TempoError> {
        if !path.exists() {
            return Err(TempoError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        tokio::fs::create_dir_all(&self.config.scratch_dir).await?;
        let wav = self.scratch_path(path);

        let result = self.analyze(path, &wav).await;

        if !self.config.keep_scratch {
            if let Err(e) = tokio::fs::remove_file(&wav).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %wav.display(), error = %e, "Failed to remove scratch waveform");
                }
            }
        }

        let bpm = result?;
        debug!(segment = %path.display(), bpm, "Detected tempo");
        Ok(bpm)
    }

    async fn validate(&self) -> Result<(), TempoError> {
        check_binary(&self.config.ffmpeg_path, "-version").await?;
        // soundstretch has no version flag and prints usage with a
        // non-zero status; only check that it can be started.
        match check_binary(&self.config.detector_path, "-license").await {
            Err(e @ crate::runner::ToolError::NotFound { .. }) => Err(e.into()),
            _ => Ok(()),
        }
    }
}
