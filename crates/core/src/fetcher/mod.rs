//! Fetcher module: materializes sources as local files.
//!
//! The [`YtDlpFetcher`] shells out to a yt-dlp compatible downloader and
//! names every file after its source id, so the catalog can find it on the
//! next run.

mod config;
mod error;
mod traits;
mod types;
mod ytdlp;

pub use config::FetcherConfig;
pub use error::FetchError;
pub use traits::Fetcher;
pub use types::{FetchJob, FetchResult};
pub use ytdlp::YtDlpFetcher;
