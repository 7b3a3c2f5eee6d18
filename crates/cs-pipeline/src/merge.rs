//! Merge engine: concatenate stored clips, in request order, without
//! re-encoding.

use std::path::PathBuf;

use cs_av::{ConcatManifest, PendingOutput};
use cs_core::{AssetFields, Error, Result, VideoId};
use cs_db::models::Video;

use crate::context::{file_timestamp, PipelineContext};

/// Fewest clips a merge accepts.
pub const MIN_MERGE_INPUTS: usize = 2;

/// Fail with [`Error::AssetsNotFound`] unless every requested ID resolved.
///
/// `resolved` holds one entry per distinct existing ID, so a repeated or
/// unknown ID makes the counts differ.
pub fn ensure_all_resolved(requested: &[VideoId], resolved: &[Video]) -> Result<()> {
    if resolved.len() != requested.len() {
        return Err(Error::AssetsNotFound);
    }
    Ok(())
}

/// Concatenate `resolved` (already in request order) into one new clip.
///
/// Existence is checked first, then the input count; both happen before
/// anything touches the filesystem. The manifest is removed after the
/// transcoder run whatever its outcome. Tool, probe, and filesystem
/// failures are reported as [`Error::MergeFailed`].
pub async fn merge(
    ctx: &PipelineContext,
    requested: &[VideoId],
    resolved: &[Video],
) -> Result<AssetFields> {
    ensure_all_resolved(requested, resolved)?;
    if resolved.len() < MIN_MERGE_INPUTS {
        return Err(Error::Validation(
            "Provide at least two video IDs to merge".into(),
        ));
    }

    let sources: Vec<PathBuf> = resolved.iter().map(|v| v.file_path.clone()).collect();
    let failed = |e: Error| Error::MergeFailed(e.to_string());

    tokio::fs::create_dir_all(ctx.storage_dir())
        .await
        .map_err(|e| failed(e.into()))?;
    let manifest = ConcatManifest::write_in(ctx.storage_dir(), &sources).map_err(failed)?;
    let output = PendingOutput::claim(
        ctx.storage_dir()
            .join(format!("merged_{}.mp4", file_timestamp())),
    )
    .await
    .map_err(failed)?;

    tracing::info!(
        "merge {} clips -> {}",
        sources.len(),
        output.path().display()
    );

    let run = ctx.transcoder.concat(manifest.path(), output.path()).await;
    drop(manifest);
    run.map_err(failed)?;

    let info = ctx.prober.probe(output.path()).await.map_err(failed)?;

    Ok(AssetFields::from_probe(output.commit(), info))
}
