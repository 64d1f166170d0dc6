//! Tempo module: derives the sort key of the final mix.
//!
//! Detection itself is delegated: the segment's audio is decoded to a scratch
//! WAV file and handed to `soundstretch -bpm`, whose `Detected ... <bpm>`
//! line is parsed. Callers compute every tempo once and sort with
//! [`order_by_tempo`].

mod config;
mod error;
mod ordering;
mod soundstretch;
mod traits;

pub use config::TempoConfig;
pub use error::TempoError;
pub use ordering::{order_by_tempo, OrderBy};
pub use soundstretch::{parse_detected_tempo, SoundStretchAnalyzer};
pub use traits::TempoAnalyzer;
