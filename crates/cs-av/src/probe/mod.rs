//! Media probing: the [`Prober`] seam and its ffprobe backend.

pub mod ffprobe;

pub use self::ffprobe::FfprobeProber;

use std::path::Path;

use async_trait::async_trait;
use cs_core::ProbeInfo;

/// Extracts duration and size from a media file.
///
/// This is the single source of truth for clip metadata: trim and merge
/// outputs are re-probed rather than computed. Implementations hold no
/// shared mutable state and may be called concurrently for independent files.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Human-readable name identifying this prober implementation.
    fn name(&self) -> &'static str;

    /// Probe the media file at `path`.
    ///
    /// Fails with [`cs_core::Error::Probe`] when the file is unreadable or
    /// not a recognized container.
    async fn probe(&self, path: &Path) -> cs_core::Result<ProbeInfo>;
}
