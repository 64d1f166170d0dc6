//! Mock converter for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::converter::{
    ConcatJob, ConcatResult, Concatenator, ConverterError, SegmentJob, SegmentResult, Segmenter,
};
use crate::runner::ToolError;

/// A recorded segment job for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSegment {
    /// The job that was submitted.
    pub job: SegmentJob,
    /// Whether the cut succeeded.
    pub success: bool,
}

/// A recorded concatenation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedConcat {
    /// The job that was submitted.
    pub job: ConcatJob,
    /// Manifest contents at the time of the call.
    pub manifest: String,
}

impl RecordedConcat {
    /// Paths listed in the manifest, unquoted.
    pub fn manifest_entries(&self) -> Vec<String> {
        self.manifest
            .lines()
            .filter_map(|line| line.strip_prefix("file '"))
            .filter_map(|rest| rest.strip_suffix('\''))
            .map(|path| path.replace(r"'\''", "'"))
            .collect()
    }
}

/// Mock implementation of the Segmenter and Concatenator traits.
///
/// Provides controllable behavior for testing:
/// - Track segment and concat jobs for assertions
/// - Write stub output files so later stages find them
/// - Simulate failure, once or per source id
/// - Track how many cuts overlap
#[derive(Debug)]
pub struct MockConverter {
    /// Recorded cuts.
    segments: Arc<RwLock<Vec<RecordedSegment>>>,
    /// Recorded concatenations.
    concats: Arc<RwLock<Vec<RecordedConcat>>>,
    /// Source ids whose cut fails.
    failing: Arc<RwLock<HashSet<String>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<ConverterError>>>,
    /// Simulated cutting time.
    delay: Arc<RwLock<Duration>>,
    /// Cuts currently running.
    in_flight: Arc<AtomicUsize>,
    /// Highest number of cuts seen running at once.
    peak_in_flight: Arc<AtomicUsize>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    /// Create a new mock converter.
    pub fn new() -> Self {
        Self {
            segments: Arc::new(RwLock::new(Vec::new())),
            concats: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get all recorded cuts.
    pub async fn recorded_segments(&self) -> Vec<RecordedSegment> {
        self.segments.read().await.clone()
    }

    /// Get the number of cuts attempted.
    pub async fn segment_count(&self) -> usize {
        self.segments.read().await.len()
    }

    /// Get all recorded concatenations.
    pub async fn recorded_concats(&self) -> Vec<RecordedConcat> {
        self.concats.read().await.clone()
    }

    /// Get the number of concatenations performed.
    pub async fn concat_count(&self) -> usize {
        self.concats.read().await.len()
    }

    /// Make every cut of `source_id` fail like an ffmpeg error.
    pub async fn fail_on(&self, source_id: &str) {
        self.failing.write().await.insert(source_id.to_string());
    }

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Set the simulated cutting time.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Highest number of cuts that overlapped.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<ConverterError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Segmenter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn segment(&self, job: SegmentJob) -> Result<SegmentResult, ConverterError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut error = self.take_error().await;
        if error.is_none() && self.failing.read().await.contains(job.source_id.as_str()) {
            error = Some(ConverterError::Tool(ToolError::Failed {
                program: "mock-ffmpeg".to_string(),
                code: Some(1),
                output: format!("{}: Invalid data found when processing input", job.source_id),
            }));
        }

        if let Some(err) = error {
            self.segments.write().await.push(RecordedSegment {
                job,
                success: false,
            });
            return Err(err);
        }

        if let Some(parent) = job.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = format!("segment of {}", job.input_path.display());
        tokio::fs::write(&job.output_path, &contents).await?;

        self.segments.write().await.push(RecordedSegment {
            job: job.clone(),
            success: true,
        });

        Ok(SegmentResult {
            source_id: job.source_id,
            output_path: job.output_path,
            output_size_bytes: contents.len() as u64,
            duration_ms: 0,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }
}

#[async_trait]
impl Concatenator for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn concat(&self, job: ConcatJob) -> Result<ConcatResult, ConverterError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        let manifest = tokio::fs::read_to_string(&job.manifest_path).await?;
        if let Some(parent) = job.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&job.output_path, &manifest).await?;

        self.concats.write().await.push(RecordedConcat {
            job: job.clone(),
            manifest: manifest.clone(),
        });

        Ok(ConcatResult {
            output_path: job.output_path,
            output_size_bytes: manifest.len() as u64,
            duration_ms: 0,
        })
    }

    async fn validate(&self) -> Result<(), ConverterError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_entries_unquote() {
        let recorded = RecordedConcat {
            job: ConcatJob {
                manifest_path: "/tmp/playlist.txt".into(),
                output_path: "/tmp/out.m4a".into(),
            },
            manifest: "file '/cut/a.m4a'\nfile '/cut/it'\\''s.m4a'\n".to_string(),
        };
        assert_eq!(
            recorded.manifest_entries(),
            vec!["/cut/a.m4a".to_string(), "/cut/it's.m4a".to_string()]
        );
    }
}
