//! Catalog module: finds already produced files by source id.
//!
//! The presence of a file tagged with a source id in a directory means the
//! work for that source is done. A [`FileCatalog`] lists a directory once and
//! answers lookups from memory, so a stage never rescans per item.

mod error;
mod file_catalog;
mod types;

pub use error::CatalogError;
pub use file_catalog::{exists, FileCatalog};
pub use types::MatchRule;
