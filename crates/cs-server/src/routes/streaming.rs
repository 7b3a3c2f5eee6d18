//! Range-aware file serving.
//!
//! Responses always carry `Content-Type: video/mp4` and a
//! `Content-Disposition` naming the file. Without a usable `Range` header the
//! whole file is sent with 200; `bytes=<start>-[<end>]` yields 206 with the
//! exact span, and an unsatisfiable start yields 416 with an empty body.
//! Bodies are read from disk in 64 KiB chunks; a client that disconnects
//! mid-stream simply drops the body, which closes the file.

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

/// Read size for streamed bodies.
const CHUNK_SIZE: usize = 64 * 1024;

/// How the client wants the file presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    /// Interpret a `content-disposition` request header. Anything other
    /// than `attachment` plays inline.
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().to_ascii_lowercase().starts_with("attachment") => {
                Disposition::Attachment
            }
            _ => Disposition::Inline,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        }
    }
}

/// Parse a `Range: bytes=START-END` header value.
///
/// Only the first range of a comma-separated list is considered. Returns
/// `(start, Option<end>)` where `end` is `None` for open-ended ranges like
/// `bytes=500-`; suffix ranges (`bytes=-500`) and malformed values are `None`.
pub fn parse_range_header(value: &str) -> Option<(u64, Option<u64>)> {
    let ranges = value.trim().strip_prefix("bytes=")?;
    let first = ranges.split(',').next()?.trim();
    let (start_str, end_str) = first.split_once('-')?;

    let start: u64 = start_str.trim().parse().ok()?;
    let end_str = end_str.trim();
    let end = if end_str.is_empty() {
        None
    } else {
        Some(end_str.parse().ok()?)
    };

    Some((start, end))
}

/// Resolve a parsed range against the file size.
///
/// Returns the inclusive `(start, end)` span, with `end` clamped to the last
/// byte, or `None` when the range cannot be satisfied.
pub fn resolve_range(start: u64, end: Option<u64>, file_size: u64) -> Option<(u64, u64)> {
    if start >= file_size {
        return None;
    }
    let last = file_size - 1;
    let end = end.unwrap_or(last).min(last);
    if start > end {
        return None;
    }
    Some((start, end))
}

/// `{disposition}; filename="{basename}"`, falling back to a generic name
/// when the file name cannot be carried in a header.
fn content_disposition(path: &Path, disposition: Disposition) -> HeaderValue {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().replace(['"', '\\'], "_"))
        .unwrap_or_else(|| "video.mp4".to_string());
    HeaderValue::from_str(&format!("{}; filename=\"{name}\"", disposition.as_str()))
        .unwrap_or_else(|_| match disposition {
            Disposition::Inline => HeaderValue::from_static("inline; filename=\"video.mp4\""),
            Disposition::Attachment => {
                HeaderValue::from_static("attachment; filename=\"video.mp4\"")
            }
        })
}

/// Stream `reader` as a response body, logging at debug level if the client
/// goes away before `expected` bytes were sent.
fn body_from_reader<R>(reader: R, path: PathBuf, expected: u64) -> Body
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut chunks = ReaderStream::with_capacity(reader, CHUNK_SIZE);
    let stream = async_stream::stream! {
        let mut guard = DisconnectGuard { path, expected, sent: 0 };
        while let Some(chunk) = chunks.next().await {
            if let Ok(bytes) = &chunk {
                guard.sent += bytes.len() as u64;
            }
            yield chunk;
        }
    };
    Body::from_stream(stream)
}

/// Notes an early drop of a streaming body.
struct DisconnectGuard {
    path: PathBuf,
    expected: u64,
    sent: u64,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if self.sent < self.expected {
            tracing::debug!(
                "client disconnected from {} after {}/{} bytes",
                self.path.display(),
                self.sent,
                self.expected
            );
        }
    }
}

/// Serve `file_path` honouring an optional `Range` header.
pub async fn serve_file(
    file_path: &Path,
    range_header: Option<&str>,
    disposition: Disposition,
) -> Result<Response, cs_core::Error> {
    let metadata = tokio::fs::metadata(file_path).await.map_err(|_| {
        cs_core::Error::not_found(
            "File",
            file_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        )
    })?;
    let file_size = metadata.len();

    let content_type = HeaderValue::from_static("video/mp4");
    let disposition = content_disposition(file_path, disposition);

    let Some((start, end_opt)) = range_header.and_then(parse_range_header) else {
        let file = tokio::fs::File::open(file_path).await?;
        let body = body_from_reader(file, file_path.to_path_buf(), file_size);

        return Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type),
                (header::CONTENT_DISPOSITION, disposition),
                (header::CONTENT_LENGTH, HeaderValue::from(file_size)),
                (header::ACCEPT_RANGES, HeaderValue::from_static("bytes")),
            ],
            body,
        )
            .into_response());
    };

    let Some((start, end)) = resolve_range(start, end_opt, file_size) else {
        tracing::debug!(
            "unsatisfiable range {start}-{end_opt:?} for {} ({file_size} bytes)",
            file_path.display()
        );
        return Ok((
            StatusCode::RANGE_NOT_SATISFIABLE,
            [
                (header::CONTENT_TYPE, content_type),
                (header::CONTENT_DISPOSITION, disposition),
                (
                    header::CONTENT_RANGE,
                    HeaderValue::from_str(&format!("bytes */{file_size}"))
                        .unwrap_or_else(|_| HeaderValue::from_static("bytes */0")),
                ),
            ],
            Body::empty(),
        )
            .into_response());
    };

    let length = end - start + 1;
    let mut file = tokio::fs::File::open(file_path).await?;
    file.seek(std::io::SeekFrom::Start(start)).await?;

    // Wrap in a Take to limit reads to exactly `length` bytes.
    let body = body_from_reader(file.take(length), file_path.to_path_buf(), length);

    Ok((
        StatusCode::PARTIAL_CONTENT,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (
                header::CONTENT_RANGE,
                HeaderValue::from_str(&format!("bytes {start}-{end}/{file_size}"))
                    .unwrap_or_else(|_| HeaderValue::from_static("bytes */0")),
            ),
            (header::CONTENT_LENGTH, HeaderValue::from(length)),
            (header::ACCEPT_RANGES, HeaderValue::from_static("bytes")),
        ],
        body,
    )
        .into_response())
}
