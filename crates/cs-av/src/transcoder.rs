//! The [`Transcoder`] seam used by the trim and merge engines.

use std::path::Path;

use async_trait::async_trait;

use crate::actions;
use crate::tools::{ToolConfig, ToolRegistry};

/// External transcoder invoked per operation.
///
/// Both operations write a new file at `output` and never touch their inputs.
/// Failures surface as opaque errors carrying the tool's message.
#[async_trait]
pub trait Transcoder: Send + Sync {
    fn name(&self) -> &'static str;

    /// Copy `[start, end)` of `input` (or `[start, duration)` when `end` is
    /// `None`) into `output`.
    async fn extract(
        &self,
        input: &Path,
        output: &Path,
        start: f64,
        end: Option<f64>,
    ) -> cs_core::Result<()>;

    /// Concatenate the sources listed in the concat `manifest` into `output`.
    async fn concat(&self, manifest: &Path, output: &Path) -> cs_core::Result<()>;
}

/// [`Transcoder`] backed by the `ffmpeg` CLI.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg: ToolConfig,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg: ToolConfig) -> Self {
        Self { ffmpeg }
    }

    /// Create a transcoder from the registry's discovered ffmpeg.
    pub fn from_registry(tools: &ToolRegistry) -> cs_core::Result<Self> {
        Ok(Self::new(tools.require("ffmpeg")?.clone()))
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn extract(
        &self,
        input: &Path,
        output: &Path,
        start: f64,
        end: Option<f64>,
    ) -> cs_core::Result<()> {
        actions::extract_range(&self.ffmpeg, input, output, start, end).await
    }

    async fn concat(&self, manifest: &Path, output: &Path) -> cs_core::Result<()> {
        actions::concat_copy(&self.ffmpeg, manifest, output).await
    }
}
