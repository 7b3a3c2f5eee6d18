//! Immutable context shared by the upload, trim, and merge engines.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cs_av::{Prober, Transcoder};
use cs_core::config::LimitsConfig;

/// Everything an engine needs, resolved once at startup.
///
/// Cloning is cheap; every field is shared.
#[derive(Clone)]
pub struct PipelineContext {
    /// Size and duration bounds for uploads.
    pub limits: Arc<LimitsConfig>,
    /// Storage root for uploads, merge outputs, and merge manifests.
    pub storage_dir: Arc<PathBuf>,
    /// Source of truth for duration and size.
    pub prober: Arc<dyn Prober>,
    /// External tool used for extraction and concatenation.
    pub transcoder: Arc<dyn Transcoder>,
}

impl PipelineContext {
    pub fn new(
        limits: LimitsConfig,
        storage_dir: impl Into<PathBuf>,
        prober: Arc<dyn Prober>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            limits: Arc::new(limits),
            storage_dir: Arc::new(storage_dir.into()),
            prober,
            transcoder,
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("limits", &self.limits)
            .field("storage_dir", &self.storage_dir)
            .field("prober", &self.prober.name())
            .field("transcoder", &self.transcoder.name())
            .finish()
    }
}

/// Microsecond timestamp embedded in generated file names so concurrent
/// operations never collide.
pub(crate) fn file_timestamp() -> i64 {
    chrono::Utc::now().timestamp_micros()
}
