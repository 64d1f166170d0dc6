//! Playlist manifest in the ffmpeg concat-demuxer format.

use std::path::{Path, PathBuf};

/// Ordered list of files to join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    entries: Vec<PathBuf>,
}

/// Quotes a path for a `file '...'` directive.
///
/// Single quotes cannot be escaped inside a quoted string, so each one closes
/// the string, adds an escaped quote and reopens it.
fn quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', r"'\''"))
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.entries.push(path.into());
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the manifest, one `file` directive per line.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|p| format!("file {}\n", quote(p)))
            .collect()
    }

    /// Writes the manifest to `path`, creating parent directories.
    pub async fn write_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.render()).await
    }
}

impl FromIterator<PathBuf> for Playlist {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render() {
        let playlist: Playlist = vec![
            PathBuf::from("/cut/a [aaa].m4a"),
            PathBuf::from("/cut/b [bbb].m4a"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            playlist.render(),
            "file '/cut/a [aaa].m4a'\nfile '/cut/b [bbb].m4a'\n"
        );
    }

    #[test]
    fn test_render_escapes_quotes() {
        let mut playlist = Playlist::new();
        playlist.push("/cut/Don't Stop [xyz].m4a");
        assert_eq!(
            playlist.render(),
            "file '/cut/Don'\\''t Stop [xyz].m4a'\n"
        );
    }

    #[tokio::test]
    async fn test_write_to_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scratch").join("playlist.txt");

        let mut playlist = Playlist::new();
        playlist.push("/cut/a.m4a");
        playlist.write_to(&path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "file '/cut/a.m4a'\n");
        assert_eq!(playlist.len(), 1);
    }
}
