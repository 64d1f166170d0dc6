//! Types for the index module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

use super::error::TimestampError;

/// Stable identifier of a source, extracted from its reference URL.
///
/// This is the idempotency key: fetched files and segments are found on disk
/// by looking for it in their file names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Wraps an already extracted id. Returns `None` for empty ids or ids
    /// containing characters outside `[A-Za-z0-9_-]`.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() || !id.chars().all(is_id_char) {
            return None;
        }
        Some(Self(id))
    }

    /// Extracts the id from a video URL.
    ///
    /// Supports `youtu.be/<id>`, `?v=<id>` and `/shorts/<id>`-style paths.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let url = Url::parse(reference).ok()?;
        let host = url.host_str()?;

        if host.ends_with("youtu.be") {
            let id = url.path_segments()?.next()?;
            return Self::new(id);
        }

        if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
            return Self::new(v.into_owned());
        }

        let mut segments = url.path_segments()?;
        match (segments.next(), segments.next()) {
            (Some("shorts" | "embed" | "live" | "v"), Some(id)) => Self::new(id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Characters that may appear inside a source id.
pub fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

static TIMESTAMP_RE: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"^\d+(:\d{1,2}){0,2}(\.\d+)?$").expect("valid timestamp regex")
});

/// Start offset of a segment, kept as written in the index.
///
/// Accepted forms: `SS`, `MM:SS`, `HH:MM:SS`, each with optional fractional
/// seconds. Validation happens when the segment is cut, not when the index
/// is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the offset into a duration.
    pub fn to_duration(&self) -> Result<Duration, TimestampError> {
        let invalid = || TimestampError {
            value: self.0.clone(),
        };

        if !TIMESTAMP_RE.is_match(&self.0) {
            return Err(invalid());
        }

        let parts: Vec<&str> = self.0.split(':').collect();
        let (last, leading) = parts.split_last().ok_or_else(invalid)?;

        let seconds: f64 = last.parse().map_err(|_| invalid())?;
        let seconds = Duration::try_from_secs_f64(seconds).map_err(|_| invalid())?;
        if !leading.is_empty() && seconds >= Duration::from_secs(60) {
            return Err(invalid());
        }

        let mut whole: u64 = 0;
        for (idx, part) in leading.iter().rev().enumerate() {
            let value: u64 = part.parse().map_err(|_| invalid())?;
            // Minutes are bounded only when hours are present.
            if idx == 0 && leading.len() == 2 && value >= 60 {
                return Err(invalid());
            }
            let scaled = 60u64
                .checked_pow(idx as u32 + 1)
                .and_then(|unit| value.checked_mul(unit))
                .ok_or_else(invalid)?;
            whole = whole.checked_add(scaled).ok_or_else(invalid)?;
        }

        Duration::from_secs(whole)
            .checked_add(seconds)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One parsed line of the index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Source URL, with extraneous query parameters removed.
    pub source_reference: String,
    /// Id extracted from the reference.
    pub source_id: SourceId,
    /// Where the segment starts inside the source.
    pub start_offset: Timestamp,
    /// 1-based line number in the index.
    pub line_number: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_id_from_watch_url() {
        let id = SourceId::from_reference("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(id.as_str(), "dQw4w9WgXcQ");

        let id = SourceId::from_reference("https://example.com/watch?v=ABC123").unwrap();
        assert_eq!(id.as_str(), "ABC123");
    }

    #[test]
    fn test_source_id_from_short_links() {
        let id = SourceId::from_reference("https://youtu.be/abc_DEF-12").unwrap();
        assert_eq!(id.as_str(), "abc_DEF-12");

        let id = SourceId::from_reference("https://youtu.be/abc123?t=42").unwrap();
        assert_eq!(id.as_str(), "abc123");

        let id = SourceId::from_reference("https://www.youtube.com/shorts/xyz789").unwrap();
        assert_eq!(id.as_str(), "xyz789");
    }

    #[test]
    fn test_source_id_rejects_unknown_urls() {
        assert!(SourceId::from_reference("https://example.com/").is_none());
        assert!(SourceId::from_reference("https://example.com/watch?v=").is_none());
        assert!(SourceId::from_reference("not a url").is_none());
        assert!(SourceId::new("has space").is_none());
    }

    #[test]
    fn test_timestamp_forms() {
        assert_eq!(
            Timestamp::new("90").to_duration().unwrap(),
            Duration::from_secs(90)
        );
        assert_eq!(
            Timestamp::new("1:30").to_duration().unwrap(),
            Duration::from_secs(90)
        );
        assert_eq!(
            Timestamp::new("00:01:30").to_duration().unwrap(),
            Duration::from_secs(90)
        );
        assert_eq!(
            Timestamp::new("1:02:03").to_duration().unwrap(),
            Duration::from_secs(3723)
        );
        assert_eq!(
            Timestamp::new("0:05.5").to_duration().unwrap(),
            Duration::from_millis(5500)
        );
        // Minutes may exceed 59 without an hour field.
        assert_eq!(
            Timestamp::new("75:00").to_duration().unwrap(),
            Duration::from_secs(4500)
        );
    }

    #[test]
    fn test_timestamp_rejects_garbage() {
        assert!(Timestamp::new("abc").to_duration().is_err());
        assert!(Timestamp::new("1:2:3:4").to_duration().is_err());
        assert!(Timestamp::new("1:75").to_duration().is_err());
        assert!(Timestamp::new("1:75:00").to_duration().is_err());
        assert!(Timestamp::new("-5").to_duration().is_err());
        assert!(Timestamp::new("").to_duration().is_err());
    }

    #[test]
    fn test_timestamp_rejects_out_of_range() {
        assert!(Timestamp::new("99999999999999999999").to_duration().is_err());
        assert!(Timestamp::new("999999999999999999:00").to_duration().is_err());
        assert!(Timestamp::new("99999999999999999:00:00").to_duration().is_err());
        assert!(Timestamp::new("18446744073709551615:59").to_duration().is_err());
        assert_eq!(
            Timestamp::new("1000000:00:00").to_duration().unwrap(),
            Duration::from_secs(3_600_000_000)
        );
    }
}
