//! Testing utilities and mock implementations for pipeline tests.
//!
//! This module provides mock implementations of every collaborator trait,
//! allowing the whole pipeline to run without yt-dlp, ffmpeg or soundstretch.
//!
//! # Example
//!
//! ```rust,ignore
//! use powerhour_core::testing::{MockConverter, MockFetcher, MockTempoAnalyzer};
//!
//! let fetcher = Arc::new(MockFetcher::new());
//! let converter = Arc::new(MockConverter::new());
//! let analyzer = Arc::new(MockTempoAnalyzer::new());
//!
//! analyzer.set_tempo("AAA", 90.0).await;
//! fetcher.fail_on("BROKEN").await;
//! ```

mod mock_converter;
mod mock_fetcher;
mod mock_tempo;

pub use mock_converter::{MockConverter, RecordedConcat, RecordedSegment};
pub use mock_fetcher::{MockFetcher, RecordedFetch};
pub use mock_tempo::MockTempoAnalyzer;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// An index line for a short link to `source_id`.
    pub fn index_line(source_id: &str, offset: &str) -> String {
        format!("https://youtu.be/{} {}", source_id, offset)
    }

    /// Writes an index file listing `(source_id, offset)` pairs.
    pub fn write_index(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
        let text: String = entries
            .iter()
            .map(|(id, offset)| index_line(id, offset) + "\n")
            .collect();
        let path = dir.join("index.txt");
        std::fs::write(&path, text).expect("write index fixture");
        path
    }

    /// Writes an empty stub file tagged with `source_id`.
    pub fn touch_tagged(dir: &Path, source_id: &str, extension: &str) -> PathBuf {
        std::fs::create_dir_all(dir).expect("create fixture dir");
        let path = dir.join(format!("Stub [{}].{}", source_id, extension));
        std::fs::write(&path, b"stub").expect("write stub fixture");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::index::IndexReader;
    use tempfile::TempDir;

    #[test]
    fn test_written_index_parses() {
        let dir = TempDir::new().unwrap();
        let path = write_index(dir.path(), &[("AAA", "0:30"), ("BBB", "1:00")]);

        let entries = IndexReader::open(path).unwrap().read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].source_id.as_str(), "BBB");
        assert_eq!(entries[1].start_offset.as_str(), "1:00");
    }
}
