//! FFmpeg-based segmenter and concatenator.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::runner::{check_binary, ToolCommand};

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::{Concatenator, Segmenter};
use super::types::{ConcatJob, ConcatResult, MediaMode, SegmentJob, SegmentResult};

/// FFmpeg-based converter implementation.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    config: ConverterConfig,
}

/// Formats a duration as fractional seconds for ffmpeg.
fn seconds_arg(d: Duration) -> String {
    format!("{:.3}", d.as_secs_f64())
}

/// Hidden sibling of `path` used while ffmpeg is still writing.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".partial-{}", name))
}

impl FfmpegConverter {
    /// Creates a new FFmpeg converter with the given configuration.
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Creates a converter with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Builds ffmpeg arguments for cutting one segment.
    fn build_segment_args(&self, job: &SegmentJob) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-ss".to_string(),
            seconds_arg(job.start),
            "-i".to_string(),
            job.input_path.to_string_lossy().to_string(),
        ];

        if let Some(ref overlay) = job.overlay_path {
            args.extend(["-i".to_string(), overlay.to_string_lossy().to_string()]);
        }

        args.extend(["-t".to_string(), seconds_arg(job.duration)]);

        let audio = &job.encode.audio;
        let video = &job.encode.video;
        let mut filters = Vec::new();
        let mut reencode_audio = job.overlay_path.is_some();

        if job.encode.media == MediaMode::Video {
            let mut chain = format!(
                "[0:v:0]scale={w}:{h}:force_original_aspect_ratio=decrease,\
                 pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1",
                w = video.width,
                h = video.height
            );
            if let Some(fps) = video.fps.filter(|f| *f > 0) {
                chain.push_str(&format!(",fps={}", fps));
            }
            chain.push_str("[vout]");
            filters.push(chain);
            // Segments from different sources must share audio parameters to
            // be joined without re-encoding.
            reencode_audio = true;
        }

        if job.overlay_path.is_some() {
            filters.push(
                "[0:a:0][1:a:0]amix=inputs=2:duration=first:dropout_transition=0[aout]"
                    .to_string(),
            );
        }

        if !filters.is_empty() {
            args.extend(["-filter_complex".to_string(), filters.join(";")]);
        }

        // Stream selection
        match job.encode.media {
            MediaMode::Video => args.extend(["-map".to_string(), "[vout]".to_string()]),
            MediaMode::Audio => args.push("-vn".to_string()),
        }
        if job.overlay_path.is_some() {
            args.extend(["-map".to_string(), "[aout]".to_string()]);
        } else if job.encode.media == MediaMode::Video {
            args.extend(["-map".to_string(), "0:a:0".to_string()]);
        }

        // Video codec
        if job.encode.media == MediaMode::Video {
            args.extend([
                "-c:v".to_string(),
                video.codec.clone(),
                "-preset".to_string(),
                video.preset.clone(),
                "-crf".to_string(),
                video.crf.to_string(),
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
            ]);
        }

        // Audio codec
        if reencode_audio {
            args.extend([
                "-c:a".to_string(),
                audio.codec.clone(),
                "-b:a".to_string(),
                format!("{}k", audio.bitrate_kbps),
                "-ar".to_string(),
                audio.sample_rate_hz.to_string(),
                "-ac".to_string(),
                audio.channels.to_string(),
            ]);
        } else {
            args.extend(["-c:a".to_string(), "copy".to_string()]);
        }

        // Log level
        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        // Extra args
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        // Output
        args.push(job.output_path.to_string_lossy().to_string());

        args
    }

    /// Builds ffmpeg arguments for joining a playlist manifest.
    fn build_concat_args(&self, job: &ConcatJob) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            job.manifest_path.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ];
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(job.output_path.to_string_lossy().to_string());
        args
    }

    fn command(&self, args: Vec<String>) -> ToolCommand {
        ToolCommand::new(&self.config.ffmpeg_path)
            .args(args)
            .timeout_secs(self.config.timeout_secs)
    }

    async fn ensure_parent(path: &Path) -> Result<(), ConverterError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|_| {
                ConverterError::OutputDirectoryFailed {
                    path: parent.to_path_buf(),
                }
            })?;
        }
        Ok(())
    }

    async fn output_size(path: &Path) -> Result<u64, ConverterError> {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.len())
            .map_err(|_| ConverterError::OutputMissing {
                path: path.to_path_buf(),
            })
    }
}

#[async_trait]
impl Segmenter for FfmpegConverter {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn segment(&self, job: SegmentJob) -> Result<SegmentResult, ConverterError> {
        let start = Instant::now();

        if !job.input_path.exists() {
            return Err(ConverterError::InputNotFound {
                path: job.input_path.clone(),
            });
        }
        if let Some(ref overlay) = job.overlay_path {
            if !overlay.exists() {
                return Err(ConverterError::InputNotFound {
                    path: overlay.clone(),
                });
            }
        }
        if job.duration.is_zero() {
            return Err(ConverterError::invalid_job("segment duration is zero"));
        }

        Self::ensure_parent(&job.output_path).await?;

        // Staged under a hidden name so an interrupted cut never counts as done.
        let staged = SegmentJob {
            output_path: staging_path(&job.output_path),
            ..job.clone()
        };
        let args = self.build_segment_args(&staged);
        if let Err(e) = self.command(args).run().await {
            let _ = tokio::fs::remove_file(&staged.output_path).await;
            return Err(e.into());
        }
        tokio::fs::rename(&staged.output_path, &job.output_path).await?;

        let output_size_bytes = Self::output_size(&job.output_path).await?;
        debug!(
            source_id = %job.source_id,
            output = %job.output_path.display(),
            bytes = output_size_bytes,
            "Segment written"
        );

        Ok(SegmentResult {
            source_id: job.source_id,
            output_path: job.output_path,
            output_size_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        check_binary(&self.config.ffmpeg_path, "-version").await?;
        Ok(())
    }
}

#[async_trait]
impl Concatenator for FfmpegConverter {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn concat(&self, job: ConcatJob) -> Result<ConcatResult, ConverterError> {
        let start = Instant::now();

        if !job.manifest_path.exists() {
            return Err(ConverterError::InputNotFound {
                path: job.manifest_path.clone(),
            });
        }

        Self::ensure_parent(&job.output_path).await?;

        let args = self.build_concat_args(&job);
        self.command(args).run().await?;

        let output_size_bytes = Self::output_size(&job.output_path).await?;

        Ok(ConcatResult {
            output_path: job.output_path,
            output_size_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        check_binary(&self.config.ffmpeg_path, "-version").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{EncodeSettings, VideoSettings};
    use crate::index::SourceId;

    fn job(media: MediaMode, overlay: Option<&str>) -> SegmentJob {
        SegmentJob {
            source_id: SourceId::new("abc").unwrap(),
            input_path: PathBuf::from("/work/Song [abc].m4a"),
            output_path: PathBuf::from("/cut/Song [abc].m4a"),
            start: Duration::from_secs(90),
            duration: Duration::from_secs(60),
            overlay_path: overlay.map(PathBuf::from),
            encode: EncodeSettings {
                media,
                ..Default::default()
            },
        }
    }

    fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(|s| s.as_str())
    }

    #[test]
    fn test_segment_args_audio_copy() {
        let converter = FfmpegConverter::with_defaults();
        let args = converter.build_segment_args(&job(MediaMode::Audio, None));

        assert_eq!(value_after(&args, "-ss"), Some("90.000"));
        assert_eq!(value_after(&args, "-t"), Some("60.000"));
        assert_eq!(value_after(&args, "-c:a"), Some("copy"));
        assert!(args.contains(&"-vn".to_string()));
        assert!(!args.contains(&"-filter_complex".to_string()));
        assert_eq!(args.last().unwrap(), "/cut/Song [abc].m4a");

        // Seek happens on the input, before -i.
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input);
    }

    #[test]
    fn test_segment_args_audio_overlay() {
        let converter = FfmpegConverter::with_defaults();
        let args = converter.build_segment_args(&job(MediaMode::Audio, Some("/assets/airhorn.m4a")));

        let inputs: Vec<&str> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "-i")
            .map(|(i, _)| args[i + 1].as_str())
            .collect();
        assert_eq!(inputs, vec!["/work/Song [abc].m4a", "/assets/airhorn.m4a"]);

        let filter = value_after(&args, "-filter_complex").unwrap();
        assert!(filter.contains("amix=inputs=2"));
        assert_eq!(value_after(&args, "-map"), Some("[aout]"));
        assert_eq!(value_after(&args, "-c:a"), Some("aac"));
        assert_eq!(value_after(&args, "-b:a"), Some("192k"));
    }

    #[test]
    fn test_segment_args_video() {
        let converter = FfmpegConverter::with_defaults();
        let mut video_job = job(MediaMode::Video, None);
        video_job.encode.video = VideoSettings {
            width: 1920,
            height: 1080,
            fps: Some(25),
            ..Default::default()
        };
        let args = converter.build_segment_args(&video_job);

        let filter = value_after(&args, "-filter_complex").unwrap();
        assert!(filter.contains("scale=1920:1080"));
        assert!(filter.contains("pad=1920:1080"));
        assert!(filter.contains("fps=25"));
        assert!(!filter.contains("amix"));
        assert!(!args.contains(&"-vn".to_string()));
        assert_eq!(value_after(&args, "-c:v"), Some("libx264"));
        assert_eq!(value_after(&args, "-crf"), Some("23"));
        assert_eq!(value_after(&args, "-c:a"), Some("aac"));

        let maps: Vec<&str> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "-map")
            .map(|(i, _)| args[i + 1].as_str())
            .collect();
        assert_eq!(maps, vec!["[vout]", "0:a:0"]);
    }

    #[test]
    fn test_segment_args_video_overlay() {
        let converter = FfmpegConverter::with_defaults();
        let args = converter.build_segment_args(&job(MediaMode::Video, Some("/assets/horn.wav")));

        let filter = value_after(&args, "-filter_complex").unwrap();
        assert!(filter.contains("[vout];[0:a:0][1:a:0]amix"));

        let maps: Vec<&str> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "-map")
            .map(|(i, _)| args[i + 1].as_str())
            .collect();
        assert_eq!(maps, vec!["[vout]", "[aout]"]);
    }

    #[test]
    fn test_concat_args() {
        let config = ConverterConfig::default().with_log_level("error");
        let converter = FfmpegConverter::new(config);
        let args = converter.build_concat_args(&ConcatJob {
            manifest_path: PathBuf::from("/scratch/playlist.txt"),
            output_path: PathBuf::from("/out/POWERHOUR.m4a"),
        });

        assert_eq!(value_after(&args, "-f"), Some("concat"));
        assert_eq!(value_after(&args, "-safe"), Some("0"));
        assert_eq!(value_after(&args, "-i"), Some("/scratch/playlist.txt"));
        assert_eq!(value_after(&args, "-c"), Some("copy"));
        assert_eq!(value_after(&args, "-loglevel"), Some("error"));
        assert_eq!(args.last().unwrap(), "/out/POWERHOUR.m4a");
    }

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        assert_eq!(
            staging_path(Path::new("/cut/Song [abc].m4a")),
            PathBuf::from("/cut/.partial-Song [abc].m4a")
        );
    }

    #[tokio::test]
    async fn test_segment_missing_input() {
        let converter = FfmpegConverter::with_defaults();
        let err = converter
            .segment(job(MediaMode::Audio, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ConverterError::InputNotFound { .. }));
    }
}
