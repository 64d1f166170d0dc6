//! Trait definitions for the fetcher module.

use async_trait::async_trait;

use super::error::FetchError;
use super::types::{FetchJob, FetchResult};

/// Downloads a source reference to a local file.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the name of this fetcher implementation.
    fn name(&self) -> &str;

    /// Downloads `job.reference` into `job.dest_dir`.
    ///
    /// On success exactly one file whose name contains the source id exists
    /// in the destination directory.
    async fn fetch(&self, job: FetchJob) -> Result<FetchResult, FetchError>;

    /// Validates that the fetcher is properly configured and ready.
    async fn validate(&self) -> Result<(), FetchError>;
}
