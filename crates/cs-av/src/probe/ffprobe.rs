//! FFprobe-based [`Prober`] implementation.
//!
//! Shells out to `ffprobe -v error -print_format json -show_format` and reads
//! the container duration and size from the `format` object.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use cs_core::ProbeInfo;
use serde::Deserialize;

use super::Prober;
use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// A prober backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
    timeout: Duration,
}

impl FfprobeProber {
    /// Create a new prober using the given ffprobe path and timeout.
    pub fn new(ffprobe_path: PathBuf, timeout: Duration) -> Self {
        Self {
            ffprobe_path,
            timeout,
        }
    }

    /// Create a prober from the registry's discovered ffprobe.
    pub fn from_registry(tools: &ToolRegistry) -> cs_core::Result<Self> {
        let cfg = tools.require("ffprobe")?;
        Ok(Self::new(cfg.path.clone(), cfg.timeout))
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> cs_core::Result<ProbeInfo> {
        let mut cmd = ToolCommand::new(self.ffprobe_path.clone());
        cmd.timeout(self.timeout);
        cmd.args(["-v", "error", "-print_format", "json", "-show_format"]);
        cmd.arg(path.to_string_lossy().to_string());

        let output = cmd
            .execute()
            .await
            .map_err(|e| cs_core::Error::Probe(e.to_string()))?;

        let ff: FfprobeOutput = serde_json::from_str(&output.stdout)
            .map_err(|e| cs_core::Error::Probe(format!("ffprobe JSON parse error: {e}")))?;

        let mut info = parse_format(ff.format)?;
        if info.size_bytes == 0 {
            info.size_bytes = tokio::fs::metadata(path).await?.len();
        }
        tracing::debug!(
            "probed {}: {:.3}s, {} bytes",
            path.display(),
            info.duration_secs,
            info.size_bytes
        );
        Ok(info)
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
}

/// Read duration and size from ffprobe's `format` object.
///
/// A missing or non-numeric duration is an error; a missing size is
/// reported as zero so the caller can fall back to file metadata.
fn parse_format(format: FfprobeFormat) -> cs_core::Result<ProbeInfo> {
    let duration_secs = format
        .duration
        .as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| cs_core::Error::Probe("no duration reported for file".into()))?;

    let size_bytes = format
        .size
        .as_deref()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);

    Ok(ProbeInfo {
        duration_secs,
        size_bytes,
    })
}
