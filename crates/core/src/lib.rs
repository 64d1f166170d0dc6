pub mod catalog;
pub mod config;
pub mod converter;
pub mod fetcher;
pub mod index;
pub mod processor;
pub mod runner;
pub mod tempo;
pub mod testing;

pub use catalog::{CatalogError, FileCatalog, MatchRule};
pub use config::{
    load_config, load_config_from_str, load_default_config, validate_config, Config, ConfigError,
};
pub use converter::{
    Concatenator, ConverterConfig, ConverterError, FfmpegConverter, MediaMode, Playlist,
    Segmenter, SeparatorMode,
};
pub use fetcher::{FetchError, Fetcher, FetcherConfig, YtDlpFetcher};
pub use index::{IndexEntry, IndexError, IndexReader, SourceId, Timestamp};
pub use processor::{PipelineError, PowerHourPipeline, ProcessorConfig, RunSummary, StageReport};
pub use runner::{ToolCommand, ToolError};
pub use tempo::{OrderBy, SoundStretchAnalyzer, TempoAnalyzer, TempoConfig, TempoError};
