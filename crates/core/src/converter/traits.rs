//! Trait definitions for the converter module.

use async_trait::async_trait;

use super::error::ConverterError;
use super::types::{ConcatJob, ConcatResult, SegmentJob, SegmentResult};

/// Cuts a fixed-length segment out of a fetched source.
#[async_trait]
pub trait Segmenter: Send + Sync {
    /// Returns the name of this segmenter implementation.
    fn name(&self) -> &str;

    /// Produces exactly one file at `job.output_path`.
    async fn segment(&self, job: SegmentJob) -> Result<SegmentResult, ConverterError>;

    /// Validates that the segmenter is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;
}

/// Joins segments listed in a playlist manifest into the final artifact.
#[async_trait]
pub trait Concatenator: Send + Sync {
    /// Returns the name of this concatenator implementation.
    fn name(&self) -> &str;

    /// Produces the final artifact at `job.output_path`.
    async fn concat(&self, job: ConcatJob) -> Result<ConcatResult, ConverterError>;

    /// Validates that the concatenator is properly configured and ready.
    async fn validate(&self) -> Result<(), ConverterError>;
}
