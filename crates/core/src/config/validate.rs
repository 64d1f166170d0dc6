use super::{types::Config, ConfigError};
use crate::converter::MediaMode;

/// Longest accepted segment, in seconds.
const MAX_SEGMENT_SECS: f64 = 86_400.0;

/// Validate configuration
/// Currently validates:
/// - Worker pools are not empty
/// - Segment duration is positive and at most a day
/// - Fetched sources and segments live in different directories
/// - Video dimensions are set in video mode
/// - Separator path is not empty
/// - Tool timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.fetch.max_parallel == 0 {
        return Err(ConfigError::ValidationError(
            "fetch.max_parallel cannot be 0".to_string(),
        ));
    }

    if config.segment.max_parallel == 0 {
        return Err(ConfigError::ValidationError(
            "segment.max_parallel cannot be 0".to_string(),
        ));
    }

    let duration = config.segment.duration_secs;
    if !duration.is_finite() || duration <= 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "segment.duration_secs must be positive, got {}",
            duration
        )));
    }
    if duration > MAX_SEGMENT_SECS {
        return Err(ConfigError::ValidationError(format!(
            "segment.duration_secs must be at most {}, got {}",
            MAX_SEGMENT_SECS, duration
        )));
    }

    if config.processor_config().shares_segment_dir() {
        return Err(ConfigError::ValidationError(format!(
            "paths.work_dir and paths.segment_dir must differ, both are {}",
            config.paths.segment_dir.display()
        )));
    }

    if config.segment.media == MediaMode::Video
        && (config.segment.video.width == 0 || config.segment.video.height == 0)
    {
        return Err(ConfigError::ValidationError(
            "segment.video width and height cannot be 0".to_string(),
        ));
    }

    if let Some(ref separator) = config.segment.separator {
        if separator.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "segment.separator.path cannot be empty".to_string(),
            ));
        }
    }

    if config.tools.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "tools.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.assembly.playlist_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "assembly.playlist_name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeparatorConfig;
    use crate::converter::SeparatorMode;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_workers_fails() {
        let mut config = Config::default();
        config.segment.max_parallel = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_duration() {
        let mut config = Config::default();
        config.segment.duration_secs = 0.0;
        assert!(validate_config(&config).is_err());

        config.segment.duration_secs = f64::NAN;
        assert!(validate_config(&config).is_err());

        config.segment.duration_secs = 1e30;
        assert!(validate_config(&config).is_err());

        config.segment.duration_secs = 0.5;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_shared_segment_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.work_dir = dir.path().to_path_buf();
        config.paths.segment_dir = dir.path().to_path_buf();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("must differ"));

        config.paths.segment_dir = dir.path().join("cut");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_video_dimensions() {
        let mut config = Config::default();
        config.segment.video.width = 0;
        // Ignored in audio mode.
        assert!(validate_config(&config).is_ok());

        config.segment.media = MediaMode::Video;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_separator() {
        let mut config = Config::default();
        config.segment.separator = Some(SeparatorConfig {
            path: PathBuf::new(),
            mode: SeparatorMode::Overlay,
        });
        assert!(validate_config(&config).is_err());
    }
}
