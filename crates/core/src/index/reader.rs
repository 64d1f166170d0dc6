//! Line parser and lazy reader for index files.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use super::error::IndexError;
use super::types::{IndexEntry, SourceId, Timestamp};

/// Line prefixes that mark an index entry. Everything else is skipped.
const URL_PREFIXES: &[&str] = &["http://", "https://"];

/// Parses a single index line.
///
/// Returns `Ok(None)` for lines that are not entries (blank lines, comments,
/// anything not starting with a URL).
pub fn parse_line(line_number: usize, line: &str) -> Result<Option<IndexEntry>, IndexError> {
    let line = line.trim();
    if !URL_PREFIXES.iter().any(|p| line.starts_with(p)) {
        return Ok(None);
    }

    let content = match line.split_once('#') {
        Some((before, _)) => before.trim(),
        None => line,
    };

    let fields: Vec<&str> = content.split_whitespace().collect();
    let [reference, offset] = fields.as_slice() else {
        return Err(IndexError::Malformed {
            line_number,
            fields: fields.len(),
            line: line.to_string(),
        });
    };

    // Keep only the first query parameter.
    let reference = match reference.split_once('&') {
        Some((head, _)) => head,
        None => *reference,
    };

    let source_id =
        SourceId::from_reference(reference).ok_or_else(|| IndexError::MissingSourceId {
            line_number,
            reference: reference.to_string(),
        })?;

    Ok(Some(IndexEntry {
        source_reference: reference.to_string(),
        source_id,
        start_offset: Timestamp::new(*offset),
        line_number,
    }))
}

/// Lazy iterator over the entries of an index.
///
/// Stops after the first error.
pub struct IndexEntries<R> {
    lines: Lines<R>,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> IndexEntries<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for IndexEntries<R> {
    type Item = Result<IndexEntry, IndexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            };
            self.line_number += 1;

            match parse_line(self.line_number, &line) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Parses an in-memory index.
pub fn parse_index(text: &str) -> Result<Vec<IndexEntry>, IndexError> {
    IndexEntries::new(text.as_bytes()).collect()
}

/// Handle to an index file on disk.
///
/// Each call to [`IndexReader::entries`] reopens the file, so the sequence
/// can be read any number of times.
#[derive(Debug, Clone)]
pub struct IndexReader {
    path: PathBuf,
}

impl IndexReader {
    /// Opens an index file, failing if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, IndexError> {
        let path = path.into();
        if !path.is_file() {
            return Err(IndexError::NotFound { path });
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a fresh lazy iterator over the entries.
    pub fn entries(&self) -> Result<IndexEntries<BufReader<File>>, IndexError> {
        let file = File::open(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IndexError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                IndexError::Io(e)
            }
        })?;
        Ok(IndexEntries::new(BufReader::new(file)))
    }

    /// Reads every entry, failing on the first malformed line.
    pub fn read_all(&self) -> Result<Vec<IndexEntry>, IndexError> {
        self.entries()?.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_line_strips_comment_and_query() {
        let entry = parse_line(1, "https://example.com/watch?v=ABC123&t=5 00:01:30 # note")
            .unwrap()
            .unwrap();
        assert_eq!(entry.source_reference, "https://example.com/watch?v=ABC123");
        assert_eq!(entry.start_offset.as_str(), "00:01:30");
        assert_eq!(entry.source_id.as_str(), "ABC123");
        assert_eq!(entry.line_number, 1);
    }

    #[test]
    fn test_parse_line_skips_non_urls() {
        assert!(parse_line(1, "").unwrap().is_none());
        assert!(parse_line(1, "# https://youtu.be/abc 1:00").unwrap().is_none());
        assert!(parse_line(1, "some heading").unwrap().is_none());
        assert!(parse_line(1, "ftp://example.com/x 1:00").unwrap().is_none());
    }

    #[test]
    fn test_parse_line_trims_whitespace() {
        let entry = parse_line(4, "   https://youtu.be/abc123   1:00   ")
            .unwrap()
            .unwrap();
        assert_eq!(entry.source_id.as_str(), "abc123");
        assert_eq!(entry.start_offset.as_str(), "1:00");
    }

    #[test]
    fn test_parse_line_wrong_field_count() {
        let err = parse_line(7, "https://youtu.be/abc 1:00 extra # comment").unwrap_err();
        assert!(matches!(
            err,
            IndexError::Malformed {
                line_number: 7,
                fields: 3,
                ..
            }
        ));

        let err = parse_line(2, "https://youtu.be/abc").unwrap_err();
        assert!(matches!(err, IndexError::Malformed { fields: 1, .. }));
    }

    #[test]
    fn test_parse_line_without_source_id() {
        let err = parse_line(3, "https://example.com/about 1:00").unwrap_err();
        assert!(matches!(err, IndexError::MissingSourceId { line_number: 3, .. }));
    }

    #[test]
    fn test_parse_index_keeps_order() {
        let text = "\
# warmup
https://youtu.be/first 0:30

not an entry
https://www.youtube.com/watch?v=second&list=PL1 1:15 # chorus
";
        let entries = parse_index(text).unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.source_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(entries[0].line_number, 2);
        assert_eq!(entries[1].line_number, 5);
    }

    #[test]
    fn test_entries_stop_after_error() {
        let text = "https://youtu.be/a 1:00\nhttps://youtu.be/b\nhttps://youtu.be/c 1:00\n";
        let results: Vec<_> = IndexEntries::new(text.as_bytes()).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn test_reader_is_restartable() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "https://youtu.be/aaa 0:10").unwrap();
        writeln!(file, "https://youtu.be/bbb 0:20").unwrap();

        let reader = IndexReader::open(file.path()).unwrap();
        let first = reader.read_all().unwrap();
        let second = reader.read_all().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_reader_missing_file() {
        let err = IndexReader::open("/nonexistent/index.txt").unwrap_err();
        assert!(matches!(err, IndexError::NotFound { .. }));
    }
}
