//! Video upload, trim, and merge handlers.
//!
//! Each handler resolves its inputs from the database, runs the matching
//! pipeline engine, and records the produced asset. Connections are only
//! held for the synchronous lookups, never across an engine await.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use cs_core::config::LimitsConfig;
use cs_core::{AssetFields, Error, VideoId};
use futures::TryStreamExt;
use cs_db::models::Video;
use cs_db::queries::videos;
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::AppError;

/// Multipart field carrying the uploaded file.
const UPLOAD_FIELD: &str = "video";

/// Video as returned by the API.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: VideoId,
    pub file_path: String,
    #[serde(rename = "sizeMB")]
    pub size_mb: f64,
    pub duration_seconds: f64,
    /// RFC 3339 upload timestamp.
    pub uploaded_at: String,
}

impl From<&Video> for VideoResponse {
    fn from(v: &Video) -> Self {
        Self {
            id: v.id,
            file_path: v.file_path.to_string_lossy().to_string(),
            size_mb: v.size_mb,
            duration_seconds: v.duration_secs,
            uploaded_at: v.uploaded_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VideoEnvelope {
    pub message: String,
    pub video: VideoResponse,
}

impl VideoEnvelope {
    fn new(message: &str, video: &Video) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            video: video.into(),
        })
    }
}

/// Multipart form accepted by the upload endpoint.
#[derive(Debug, utoipa::ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// MP4 or MOV file.
    #[schema(value_type = String, format = Binary)]
    pub video: Vec<u8>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrimRequest {
    pub video_id: Option<String>,
    /// Seconds from the start of the source. Defaults to 0.
    pub start: Option<f64>,
    /// Exclusive end in seconds. Omit to keep the rest of the video.
    pub end: Option<f64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    /// Videos to concatenate, in output order.
    pub video_ids: Option<Vec<String>>,
}

/// Turn a JSON extractor rejection into the API's validation error.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    body.map(|Json(v)| v)
        .map_err(|rejection| Error::Validation(rejection.body_text()))
}

/// Parse a client-supplied video id. Malformed ids name no video.
pub(crate) fn parse_video_id(raw: &str) -> Result<VideoId, Error> {
    raw.trim()
        .parse()
        .map_err(|_| Error::not_found("Video", raw))
}

/// A body that outgrew the request limit is reported as too large; any
/// other multipart failure is a malformed upload.
fn upload_error(err: MultipartError, limits: &LimitsConfig) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::FileTooLarge {
            limit_mb: limits.max_size_mb,
        }
    } else {
        Error::Validation(format!("Upload failed: {}", err.body_text()))
    }
}

/// Persist a freshly produced asset, removing the file if the insert fails.
pub(crate) async fn record_asset(ctx: &AppContext, fields: &AssetFields) -> Result<Video, Error> {
    let inserted = cs_db::pool::get_conn(&ctx.db).and_then(|conn| videos::create_video(&conn, fields));
    if inserted.is_err() {
        if let Err(e) = tokio::fs::remove_file(&fields.file_path).await {
            tracing::warn!(
                "failed to remove unrecorded asset {}: {e}",
                fields.file_path.display()
            );
        }
    }
    inserted
}

/// POST /api/videos/upload
#[utoipa::path(
    post,
    path = "/api/videos/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video uploaded", body = VideoEnvelope),
        (status = 400, description = "Rejected upload", body = crate::error::ErrorResponse)
    )
)]
pub async fn upload_video(
    State(ctx): State<AppContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoEnvelope>, AppError> {
    let mut multipart = multipart.map_err(|r| Error::Validation(r.body_text()))?;

    let fields = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| upload_error(e, &ctx.config.limits))?
            .ok_or_else(|| Error::Validation("Video file is required".into()))?;

        if field.name() != Some(UPLOAD_FIELD) {
            tracing::debug!("ignoring multipart field {:?}", field.name());
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let limits = &ctx.config.limits;
        let body = field.map_err(|e| upload_error(e, limits));
        break cs_pipeline::upload::ingest(&ctx.pipeline, &original_name, body).await?;
    };

    let video = record_asset(&ctx, &fields).await?;
    tracing::info!(
        "uploaded video {} ({} MB, {}s)",
        video.id,
        video.size_mb,
        video.duration_secs
    );
    Ok(VideoEnvelope::new("Video uploaded successfully", &video))
}

/// POST /api/videos/trim
#[utoipa::path(
    post,
    path = "/api/videos/trim",
    request_body = TrimRequest,
    responses(
        (status = 200, description = "Trimmed copy created", body = VideoEnvelope),
        (status = 400, description = "Invalid bounds or unknown video", body = crate::error::ErrorResponse)
    )
)]
pub async fn trim_video(
    State(ctx): State<AppContext>,
    body: Result<Json<TrimRequest>, JsonRejection>,
) -> Result<Json<VideoEnvelope>, AppError> {
    let req = json_body(body)?;
    let raw_id = req
        .video_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| Error::Validation("Video ID is required".into()))?;
    let id = parse_video_id(&raw_id)?;

    let source = {
        let conn = cs_db::pool::get_conn(&ctx.db)?;
        videos::get_video(&conn, id)?.ok_or_else(|| Error::not_found("Video", id))?
    };

    let fields =
        cs_pipeline::trim::trim(&ctx.pipeline, &source, req.start.unwrap_or(0.0), req.end).await?;
    let video = record_asset(&ctx, &fields).await?;
    Ok(VideoEnvelope::new("Video trimmed successfully", &video))
}

/// POST /api/videos/merge
#[utoipa::path(
    post,
    path = "/api/videos/merge",
    request_body = MergeRequest,
    responses(
        (status = 200, description = "Merged video created", body = VideoEnvelope),
        (status = 400, description = "Too few or unknown videos", body = crate::error::ErrorResponse)
    )
)]
pub async fn merge_videos(
    State(ctx): State<AppContext>,
    body: Result<Json<MergeRequest>, JsonRejection>,
) -> Result<Json<VideoEnvelope>, AppError> {
    let req = json_body(body)?;
    let raw_ids = req
        .video_ids
        .ok_or_else(|| Error::Validation("Provide at least two video IDs to merge".into()))?;

    // A malformed id can never resolve.
    let requested: Vec<VideoId> = raw_ids
        .iter()
        .map(|raw| raw.trim().parse().map_err(|_| Error::AssetsNotFound))
        .collect::<Result<_, Error>>()?;

    let resolved = {
        let conn = cs_db::pool::get_conn(&ctx.db)?;
        videos::get_videos_by_ids(&conn, &requested)?
    };

    let fields = cs_pipeline::merge::merge(&ctx.pipeline, &requested, &resolved).await?;
    let video = record_asset(&ctx, &fields).await?;
    Ok(VideoEnvelope::new("Videos merged successfully.", &video))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn video_response_uses_api_field_names() {
        let video = Video {
            id: VideoId::new(),
            file_path: "/uploads/1_clip.mp4".into(),
            size_mb: 1.5,
            duration_secs: 12.0,
            uploaded_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(VideoResponse::from(&video)).unwrap();
        assert_eq!(json["filePath"], "/uploads/1_clip.mp4");
        assert_eq!(json["sizeMB"], 1.5);
        assert_eq!(json["durationSeconds"], 12.0);
        assert_eq!(json["uploadedAt"], "2024-05-01T12:00:00+00:00");
        assert_eq!(json["id"], video.id.to_string());
    }

    #[test]
    fn malformed_video_id_is_not_found() {
        let err = parse_video_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(parse_video_id(&VideoId::new().to_string()).is_ok());
    }
}
