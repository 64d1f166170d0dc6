//! Trait definitions for the tempo module.

use async_trait::async_trait;
use std::path::Path;

use super::error::TempoError;

/// Derives the tempo of a segment, used as its sort key.
#[async_trait]
pub trait TempoAnalyzer: Send + Sync {
    /// Returns the name of this analyzer implementation.
    fn name(&self) -> &str;

    /// Detected tempo of the file, in beats per minute.
    async fn tempo(&self, path: &Path) -> Result<f64, TempoError>;

    /// Validates that the analyzer is properly configured and ready.
    async fn validate(&self) -> Result<(), TempoError>;
}
