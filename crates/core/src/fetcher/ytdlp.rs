//! yt-dlp based fetcher implementation.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

use crate::catalog::{self, MatchRule};
use crate::runner::{check_binary, ToolCommand};

use super::config::FetcherConfig;
use super::error::FetchError;
use super::traits::Fetcher;
use super::types::{FetchJob, FetchResult};

/// Downloader-backed fetcher.
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    config: FetcherConfig,
}

impl YtDlpFetcher {
    /// Creates a new fetcher with the given configuration.
    pub fn new(config: FetcherConfig) -> Self {
        Self { config }
    }

    /// Creates a fetcher with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(FetcherConfig::default())
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Builds downloader arguments for one job.
    fn build_args(&self, job: &FetchJob) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "-f".to_string(),
            self.config.format.clone(),
            "-P".to_string(),
            job.dest_dir.to_string_lossy().to_string(),
            "-o".to_string(),
            self.config.output_template.clone(),
        ];

        if let Some(ref container) = self.config.merge_output_format {
            args.extend(["--merge-output-format".to_string(), container.clone()]);
        }

        if self.config.restrict_filenames {
            args.push("--restrict-filenames".to_string());
        }

        // Report the final path once post-processing is done.
        args.extend([
            "--no-simulate".to_string(),
            "--print".to_string(),
            "after_move:filepath".to_string(),
        ]);

        args.extend(self.config.extra_args.iter().cloned());

        args.push("--".to_string());
        args.push(job.reference.clone());

        args
    }

    /// Picks the reported file path out of the downloader's stdout.
    fn parse_reported_path(stdout: &str) -> Option<PathBuf> {
        stdout
            .lines()
            .map(str::trim)
            .rfind(|l| !l.is_empty())
            .map(PathBuf::from)
    }

    /// Resolves the produced file, falling back to a directory lookup.
    fn locate_output(job: &FetchJob, reported: Option<PathBuf>) -> Result<PathBuf, FetchError> {
        if let Some(ref path) = reported {
            if path.is_file() {
                return Ok(path.clone());
            }
            if let Some(name) = path.file_name() {
                let candidate = job.dest_dir.join(name);
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }

        catalog::exists(&job.source_id, &job.dest_dir, MatchRule::Token)?.ok_or_else(|| {
            FetchError::MissingOutput {
                source_id: job.source_id.clone(),
                reported,
            }
        })
    }
}

#[async_trait]
impl Fetcher for YtDlpFetcher {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch(&self, job: FetchJob) -> Result<FetchResult, FetchError> {
        let start = Instant::now();

        tokio::fs::create_dir_all(&job.dest_dir).await?;

        let output = ToolCommand::new(&self.config.downloader_path)
            .args(self.build_args(&job))
            .timeout_secs(self.config.timeout_secs)
            .run()
            .await?;

        let reported = Self::parse_reported_path(&output.stdout);
        let path = Self::locate_output(&job, reported)?;
        debug!(
            source_id = %job.source_id,
            path = %path.display(),
            "Fetched source"
        );

        Ok(FetchResult {
            source_id: job.source_id,
            path,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), FetchError> {
        check_binary(&self.config.downloader_path, "--version").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SourceId;
    use std::path::Path;
    use tempfile::TempDir;

    fn job(dir: &Path) -> FetchJob {
        FetchJob {
            source_id: SourceId::new("abc123").unwrap(),
            reference: "https://youtu.be/abc123".to_string(),
            dest_dir: dir.to_path_buf(),
        }
    }

    #[test]
    fn test_build_args() {
        let fetcher = YtDlpFetcher::with_defaults();
        let args = fetcher.build_args(&job(Path::new("/work")));

        assert!(args.contains(&"-f".to_string()));
        assert!(args.contains(&"140/bestaudio[ext=m4a]/bestaudio".to_string()));
        assert!(args.contains(&"--restrict-filenames".to_string()));
        assert!(args.contains(&"after_move:filepath".to_string()));
        assert!(!args.contains(&"--merge-output-format".to_string()));

        let p = args.iter().position(|a| a == "-P").unwrap();
        assert_eq!(args[p + 1], "/work");

        // Reference always comes last, after the option terminator.
        assert_eq!(args[args.len() - 2], "--");
        assert_eq!(args.last().unwrap(), "https://youtu.be/abc123");
    }

    #[test]
    fn test_build_args_video() {
        let config = FetcherConfig::for_media(crate::converter::MediaMode::Video, 1080);
        let fetcher = YtDlpFetcher::new(config);
        let args = fetcher.build_args(&job(Path::new("/work")));

        let m = args
            .iter()
            .position(|a| a == "--merge-output-format")
            .unwrap();
        assert_eq!(args[m + 1], "mp4");
    }

    #[test]
    fn test_parse_reported_path() {
        let stdout = "/work/Song_[abc123].m4a\n\n";
        assert_eq!(
            YtDlpFetcher::parse_reported_path(stdout),
            Some(PathBuf::from("/work/Song_[abc123].m4a"))
        );
        assert_eq!(YtDlpFetcher::parse_reported_path("  \n"), None);
    }

    #[test]
    fn test_locate_output_reported() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("Song_[abc123].m4a");
        std::fs::write(&file, b"audio").unwrap();

        let found = YtDlpFetcher::locate_output(&job(dir.path()), Some(file.clone())).unwrap();
        assert_eq!(found, file);
    }

    #[test]
    fn test_locate_output_falls_back_to_scan() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("Other_Title_[abc123].m4a");
        std::fs::write(&file, b"audio").unwrap();

        let found = YtDlpFetcher::locate_output(&job(dir.path()), None).unwrap();
        assert_eq!(found, file);
    }

    #[test]
    fn test_locate_output_missing() {
        let dir = TempDir::new().unwrap();
        let err = YtDlpFetcher::locate_output(
            &job(dir.path()),
            Some(dir.path().join("gone [abc123].m4a")),
        )
        .unwrap_err();
        assert!(matches!(err, FetchError::MissingOutput { reported: Some(_), .. }));
    }
}
