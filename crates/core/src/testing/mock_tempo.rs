//! Mock tempo analyzer for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::tempo::{TempoAnalyzer, TempoError};

/// Mock implementation of the TempoAnalyzer trait.
///
/// Tempos are assigned by a source id found in the file name; unknown files
/// get the default tempo.
#[derive(Debug)]
pub struct MockTempoAnalyzer {
    /// (source id, bpm) pairs, checked in insertion order.
    tempos: Arc<RwLock<Vec<(String, f64)>>>,
    /// Paths that were analyzed.
    calls: Arc<RwLock<Vec<PathBuf>>>,
    /// Source ids whose tempo cannot be detected.
    failing: Arc<RwLock<HashSet<String>>>,
    default_tempo: f64,
}

impl Default for MockTempoAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTempoAnalyzer {
    /// Create a new mock analyzer reporting 120 bpm for everything.
    pub fn new() -> Self {
        Self {
            tempos: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            default_tempo: 120.0,
        }
    }

    /// Report `bpm` for files whose name contains `source_id`.
    pub async fn set_tempo(&self, source_id: &str, bpm: f64) {
        self.tempos.write().await.push((source_id.to_string(), bpm));
    }

    /// Report no tempo for files whose name contains `source_id`.
    pub async fn fail_on(&self, source_id: &str) {
        self.failing.write().await.insert(source_id.to_string());
    }

    /// Paths analyzed so far.
    pub async fn analyzed(&self) -> Vec<PathBuf> {
        self.calls.read().await.clone()
    }

    /// Number of analyses performed.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}

#[async_trait]
impl TempoAnalyzer for MockTempoAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn tempo(&self, path: &Path) -> Result<f64, TempoError> {
        self.calls.write().await.push(path.to_path_buf());

        if !path.exists() {
            return Err(TempoError::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self
            .failing
            .read()
            .await
            .iter()
            .any(|id| name.contains(id.as_str()))
        {
            return Err(TempoError::Undetectable {
                path: path.to_path_buf(),
                output: format!("{}: no beat detected", name),
            });
        }

        let tempos = self.tempos.read().await;
        Ok(tempos
            .iter()
            .find(|(id, _)| name.contains(id.as_str()))
            .map(|(_, bpm)| *bpm)
            .unwrap_or(self.default_tempo))
    }

    async fn validate(&self) -> Result<(), TempoError> {
        Ok(())
    }
}
