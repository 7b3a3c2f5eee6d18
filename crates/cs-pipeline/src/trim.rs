//! Trim engine: extract a sub-range of a stored clip into a new file.

use std::path::{Path, PathBuf};

use cs_av::PendingOutput;
use cs_core::{AssetFields, Error, Result};
use cs_db::models::Video;

use crate::context::{file_timestamp, PipelineContext};

/// Check a requested `[start, end)` against the source duration.
///
/// `start` must satisfy `0 <= start < duration`; a given `end` must satisfy
/// `start < end <= duration`. NaN fails both checks.
pub fn validate_trim_bounds(start: f64, end: Option<f64>, duration: f64) -> Result<()> {
    if !(start >= 0.0 && start < duration) {
        return Err(Error::InvalidStartTime);
    }
    if let Some(end) = end {
        if !(end > start && end <= duration) {
            return Err(Error::InvalidEndTime);
        }
    }
    Ok(())
}

/// Output path for a trim of `source`: `{stem}_trimmed_{timestamp}.mp4`
/// next to the source file.
pub fn trimmed_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "clip".to_string());
    let dir = source.parent().unwrap_or_else(|| Path::new("."));
    dir.join(format!("{stem}_trimmed_{}.mp4", file_timestamp()))
}

/// Trim `source` to `[start, end)` (or to its end) and probe the result.
///
/// Bounds are validated before the transcoder runs. Transcoder and probe
/// failures are reported as [`Error::TrimFailed`] and the partial output is
/// removed.
pub async fn trim(
    ctx: &PipelineContext,
    source: &Video,
    start: f64,
    end: Option<f64>,
) -> Result<AssetFields> {
    validate_trim_bounds(start, end, source.duration_secs)?;

    let output = PendingOutput::claim(trimmed_path(&source.file_path))
        .await
        .map_err(|e| Error::TrimFailed(e.to_string()))?;
    tracing::info!(
        "trim {} [{start}, {}) -> {}",
        source.id,
        end.unwrap_or(source.duration_secs),
        output.path().display()
    );

    ctx.transcoder
        .extract(&source.file_path, output.path(), start, end)
        .await
        .map_err(|e| Error::TrimFailed(e.to_string()))?;

    let info = ctx
        .prober
        .probe(output.path())
        .await
        .map_err(|e| Error::TrimFailed(e.to_string()))?;

    Ok(AssetFields::from_probe(output.commit(), info))
}
