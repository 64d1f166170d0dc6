//! Directory-backed catalog of produced files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::index::SourceId;

use super::error::CatalogError;
use super::types::MatchRule;

/// Suffixes of files a downloader leaves behind while still working.
const IN_PROGRESS_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp"];

/// Per-format intermediates such as `Title [id].f137.mp4`.
static FORMAT_FRAGMENT_RE: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"\.f\d+(-\d+)?\.[A-Za-z0-9]+$").expect("valid fragment regex")
});

fn is_in_progress(name: &str) -> bool {
    name.starts_with('.')
        || IN_PROGRESS_SUFFIXES.iter().any(|s| name.ends_with(s))
        || name.contains(".part-Frag")
        || FORMAT_FRAGMENT_RE.is_match(name)
}

#[derive(Debug, Clone)]
struct CatalogFile {
    name: String,
    path: PathBuf,
}

/// Snapshot of the files in a directory, queried by source id.
///
/// Built once per stage and resolved into a source id to path map.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    dir: PathBuf,
    rule: MatchRule,
    files: Vec<CatalogFile>,
}

impl FileCatalog {
    /// Lists the regular files in `dir`, sorted by name.
    ///
    /// A missing directory yields an empty catalog.
    pub fn scan(dir: impl Into<PathBuf>, rule: MatchRule) -> Result<Self, CatalogError> {
        let dir = dir.into();
        let io_err = |source| CatalogError::Io {
            dir: dir.clone(),
            source,
        };

        let mut files = Vec::new();
        let read_dir = match std::fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self {
                    dir,
                    rule,
                    files,
                })
            }
            Err(e) => return Err(io_err(e)),
        };

        for entry in read_dir {
            let entry = entry.map_err(io_err)?;
            if !entry.file_type().map_err(io_err)?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if is_in_progress(&name) {
                debug!(file = %name, "Skipping in-progress file");
                continue;
            }
            files.push(CatalogFile {
                name,
                path: entry.path(),
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(dir = %dir.display(), files = files.len(), "Scanned directory");
        Ok(Self { dir, rule, files })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn rule(&self) -> MatchRule {
        self.rule
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Finds the file tagged with `source_id`.
    ///
    /// Fails with [`CatalogError::Ambiguous`] when several files match, since
    /// at most one file per source may exist.
    pub fn find(&self, source_id: &SourceId) -> Result<Option<PathBuf>, CatalogError> {
        let mut candidates = self
            .files
            .iter()
            .filter(|f| self.rule.matches(&f.name, source_id.as_str()));

        let Some(first) = candidates.next() else {
            return Ok(None);
        };

        let rest: Vec<&CatalogFile> = candidates.collect();
        if !rest.is_empty() {
            let candidates: Vec<PathBuf> = std::iter::once(first)
                .chain(rest)
                .map(|f| f.path.clone())
                .collect();
            warn!(
                source_id = %source_id,
                candidates = candidates.len(),
                rule = ?self.rule,
                "Several files match one source"
            );
            return Err(CatalogError::Ambiguous {
                source_id: source_id.clone(),
                candidates,
            });
        }

        Ok(Some(first.path.clone()))
    }

    /// Builds the id to path mapping for a set of sources.
    ///
    /// Sources without a file are absent from the result.
    pub fn resolve<'a, I>(&self, ids: I) -> Result<HashMap<SourceId, PathBuf>, CatalogError>
    where
        I: IntoIterator<Item = &'a SourceId>,
    {
        let mut found = HashMap::new();
        for id in ids {
            if let Some(path) = self.find(id)? {
                found.insert(id.clone(), path);
            }
        }
        Ok(found)
    }
}

/// One-shot lookup: is there a file for `source_id` in `dir`?
pub fn exists(
    source_id: &SourceId,
    dir: &Path,
    rule: MatchRule,
) -> Result<Option<PathBuf>, CatalogError> {
    FileCatalog::scan(dir, rule)?.find(source_id)
}
