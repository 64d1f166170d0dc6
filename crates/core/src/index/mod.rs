//! Index module: reads the list of sources and start offsets.
//!
//! An index file holds one entry per line:
//!
//! ```text
//! # comments and blank lines are skipped
//! https://www.youtube.com/watch?v=dQw4w9WgXcQ 0:43   # chorus
//! https://youtu.be/abc123 1:05
//! ```

mod error;
mod reader;
mod types;

pub use error::{IndexError, TimestampError};
pub use reader::{parse_index, parse_line, IndexEntries, IndexReader};
pub use types::{is_id_char, IndexEntry, SourceId, Timestamp};
