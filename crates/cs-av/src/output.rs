//! Scoped transient files for transcoder runs.
//!
//! [`PendingOutput`] owns a not-yet-registered output path and removes it on
//! drop unless committed. [`ConcatManifest`] is the ordered source list fed
//! to ffmpeg's concat demuxer; it is deleted when dropped, on every exit path.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// An output file that is deleted on drop unless [`commit`](Self::commit)ted.
#[derive(Debug)]
pub struct PendingOutput {
    path: PathBuf,
    committed: bool,
}

impl PendingOutput {
    /// Reserve `path` as the destination of a transcoder run.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            committed: false,
        }
    }

    /// Reserve `path`, refusing one that already exists so the drop cleanup
    /// can never remove a file this guard did not produce.
    pub async fn claim(path: impl Into<PathBuf>) -> cs_core::Result<Self> {
        let path = path.into();
        if tokio::fs::try_exists(&path).await? {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("output {} already exists", path.display()),
            )
            .into());
        }
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file and hand back its path.
    pub fn commit(mut self) -> PathBuf {
        self.committed = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for PendingOutput {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("removed partial output {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "failed to remove partial output {}: {e}",
                self.path.display()
            ),
        }
    }
}

/// A concat-demuxer manifest living in a temporary file.
#[derive(Debug)]
pub struct ConcatManifest {
    file: NamedTempFile,
}

impl ConcatManifest {
    /// Write a manifest listing `sources` in order into a new
    /// `merge_list_*.txt` file inside `dir`.
    pub fn write_in(dir: &Path, sources: &[PathBuf]) -> cs_core::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("merge_list_")
            .suffix(".txt")
            .tempfile_in(dir)?;
        file.write_all(Self::render(sources)?.as_bytes())?;
        file.flush()?;
        tracing::debug!(
            "wrote concat manifest {} ({} entries)",
            file.path().display(),
            sources.len()
        );
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Render the manifest body: one `file '<absolute path>'` line per source.
    ///
    /// Paths are made absolute because the concat demuxer resolves relative
    /// entries against the manifest's own directory.
    pub fn render(sources: &[PathBuf]) -> cs_core::Result<String> {
        let mut lines = Vec::with_capacity(sources.len());
        for source in sources {
            let absolute = std::path::absolute(source)?;
            let escaped = absolute.to_string_lossy().replace('\'', r"'\''");
            lines.push(format!("file '{escaped}'"));
        }
        Ok(lines.join("\n"))
    }
}
