//! Destinations for exported files.

use std::path::{Path, PathBuf};

use crate::error::{RenderError, RenderResult};

/// Receives finished export bytes under a file name.
pub trait FileSink: Send + Sync {
    /// Persist `bytes` as `filename`, returning where it ended up.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, filename: &str, bytes: &[u8]) -> RenderResult<PathBuf>;
}

/// Writes exports into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create a sink rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn save(&self, filename: &str, bytes: &[u8]) -> RenderResult<PathBuf> {
        // Only the final component is honoured.
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| RenderError::Export(format!("Invalid file name: {filename:?}")))?;

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        std::fs::write(&path, bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "saved export");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_directory_and_writes() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let sink = DirectorySink::new(tmp.path().join("out"));

        let path = sink.save("card.png", b"data").expect("save");
        assert_eq!(path, tmp.path().join("out").join("card.png"));
        assert_eq!(std::fs::read(&path).expect("read"), b"data");
    }

    #[test]
    fn test_strips_directory_components() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let sink = DirectorySink::new(tmp.path());

        let path = sink.save("../escape/card.png", b"x").expect("save");
        assert_eq!(path, tmp.path().join("card.png"));
    }

    #[test]
    fn test_card_filename_with_slash_keeps_prefix() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let sink = DirectorySink::new(tmp.path());

        let path = sink
            .save(&card_core::card_filename("AC/DC Fan"), b"x")
            .expect("save");
        assert_eq!(path, tmp.path().join("iLMIFYTECH-2026-AC_DC-Fan.png"));
    }

    #[test]
    fn test_rejects_empty_name() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let sink = DirectorySink::new(tmp.path());
        assert!(sink.save("..", b"x").is_err());
    }
}
