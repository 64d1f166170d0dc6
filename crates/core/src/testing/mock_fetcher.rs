//! Mock fetcher for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::fetcher::{FetchError, FetchJob, FetchResult, Fetcher};
use crate::runner::ToolError;

/// A recorded fetch job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    /// The job that was submitted.
    pub job: FetchJob,
    /// Whether the fetch succeeded.
    pub success: bool,
}

/// Mock implementation of the Fetcher trait.
///
/// Each successful fetch writes a small stub file named
/// `"Track <id> [<id>].m4a"` into the destination directory, which is what
/// the idempotency check looks for on the next run.
///
/// # Example
///
/// ```rust,ignore
/// use powerhour_core::testing::MockFetcher;
///
/// let fetcher = MockFetcher::new();
/// fetcher.fail_on("BROKEN").await;
///
/// let result = fetcher.fetch(job).await?;
/// assert_eq!(fetcher.fetch_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockFetcher {
    /// Recorded fetches.
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    /// Source ids whose fetch fails.
    failing: Arc<RwLock<HashSet<String>>>,
    /// If set, the next fetch will fail with this error.
    next_error: Arc<RwLock<Option<FetchError>>>,
    /// Simulated download time.
    delay: Arc<RwLock<Duration>>,
    /// Fetches currently running.
    in_flight: Arc<AtomicUsize>,
    /// Highest number of fetches seen running at once.
    peak_in_flight: Arc<AtomicUsize>,
    /// Extension of produced files.
    extension: String,
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self {
            fetches: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            extension: "m4a".to_string(),
        }
    }

    /// Produce files with a different extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Get all recorded fetches.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    /// Get the number of fetches attempted.
    pub async fn fetch_count(&self) -> usize {
        self.fetches.read().await.len()
    }

    /// Make every fetch of `source_id` fail like a downloader error.
    pub async fn fail_on(&self, source_id: &str) {
        self.failing.write().await.insert(source_id.to_string());
    }

    /// Configure the next fetch to fail with the given error.
    pub async fn set_next_error(&self, error: FetchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated download time.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Highest number of fetches that overlapped.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Name of the file a fetch of `source_id` produces.
    pub fn file_name(&self, source_id: &str) -> String {
        format!("Track {} [{}].{}", source_id, source_id, self.extension)
    }

    async fn take_error(&self, job: &FetchJob) -> Option<FetchError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Some(err);
        }
        if self.failing.read().await.contains(job.source_id.as_str()) {
            return Some(FetchError::Tool(ToolError::Failed {
                program: "mock-downloader".to_string(),
                code: Some(1),
                output: format!("ERROR: [mock] {}: Video unavailable", job.source_id),
            }));
        }
        None
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, job: FetchJob) -> Result<FetchResult, FetchError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(err) = self.take_error(&job).await {
            self.fetches.write().await.push(RecordedFetch {
                job,
                success: false,
            });
            return Err(err);
        }

        tokio::fs::create_dir_all(&job.dest_dir).await?;
        let path: PathBuf = job.dest_dir.join(self.file_name(job.source_id.as_str()));
        tokio::fs::write(&path, format!("fetched {}", job.reference)).await?;

        self.fetches.write().await.push(RecordedFetch {
            job: job.clone(),
            success: true,
        });

        Ok(FetchResult {
            source_id: job.source_id,
            path,
            duration_ms: delay.as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), FetchError> {
        Ok(())
    }
}
