//! Upload validation: extension whitelist, streaming size ceiling, and
//! probed duration bounds.
//!
//! The file has to exist on disk before it can be probed, so it is written
//! first and removed again on any rejection.

use std::path::PathBuf;

use bytes::Bytes;
use cs_av::PendingOutput;
use cs_core::{has_allowed_extension, AssetFields, Error, Result};
use futures::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;

use crate::context::{file_timestamp, PipelineContext};

/// Reduce a client-supplied file name to a safe final path component.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Storage name for an upload: `{timestamp}_{sanitized original}`.
pub fn stored_file_name(original: &str) -> String {
    format!("{}_{}", file_timestamp(), sanitize_file_name(original))
}

/// Store, probe, and validate an uploaded clip.
///
/// `body` yields the file's bytes as they arrive; a transport error it
/// yields aborts the upload unchanged. The extension is checked before
/// anything is written, the size ceiling is enforced while streaming, and
/// the duration window is checked after probing. Every rejection after the
/// first write removes the stored file.
pub async fn ingest<S>(ctx: &PipelineContext, original_name: &str, body: S) -> Result<AssetFields>
where
    S: Stream<Item = Result<Bytes>>,
{
    if !has_allowed_extension(original_name) {
        return Err(Error::InvalidFileType);
    }

    tokio::fs::create_dir_all(ctx.storage_dir()).await?;
    let path: PathBuf = ctx.storage_dir().join(stored_file_name(original_name));
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await?;
    let pending = PendingOutput::new(&path);

    let mut body = std::pin::pin!(body);
    let ceiling = ctx.limits.max_size_bytes();
    let mut written: u64 = 0;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        written += chunk.len() as u64;
        if written > ceiling {
            tracing::info!(
                "rejecting upload {original_name}: exceeds {} MB",
                ctx.limits.max_size_mb
            );
            return Err(Error::FileTooLarge {
                limit_mb: ctx.limits.max_size_mb,
            });
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    drop(file);

    let info = ctx.prober.probe(&path).await?;
    if !ctx.limits.duration_allowed(info.duration_secs) {
        tracing::info!(
            "rejecting upload {original_name}: duration {:.2}s outside [{}, {}]",
            info.duration_secs,
            ctx.limits.min_duration_secs,
            ctx.limits.max_duration_secs
        );
        return Err(Error::DurationOutOfRange {
            min: ctx.limits.min_duration_secs,
            max: ctx.limits.max_duration_secs,
        });
    }

    let path = pending.commit();
    tracing::info!(
        "stored upload {} ({written} bytes, {:.2}s)",
        path.display(),
        info.duration_secs
    );
    Ok(AssetFields::from_probe(path, info))
}
