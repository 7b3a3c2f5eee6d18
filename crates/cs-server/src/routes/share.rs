//! Share link handlers and the public streaming endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use cs_core::{Error, ShareLinkId, VideoId};
use cs_db::models::ShareLink;
use cs_pipeline::share;
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::error::AppError;
use crate::routes::streaming::{serve_file, Disposition};
use crate::routes::videos::{json_body, parse_video_id};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub video_id: Option<String>,
    /// Lifetime in minutes. Defaults to the configured TTL.
    pub expires_in: Option<f64>,
}

/// Share link as returned by the API.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareLinkResponse {
    pub id: ShareLinkId,
    pub video_id: VideoId,
    pub slug: String,
    pub expires_at: String,
    pub created_at: String,
    /// Public URL streaming the video.
    pub link: String,
}

impl ShareLinkResponse {
    fn from_model(link: &ShareLink, ctx: &AppContext) -> Self {
        Self {
            id: link.id,
            video_id: link.video_id,
            slug: link.slug.clone(),
            expires_at: link.expires_at.to_rfc3339(),
            created_at: link.created_at.to_rfc3339(),
            link: ctx.config.share_url(&link.slug),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LinkEnvelope {
    pub message: String,
    pub link: ShareLinkResponse,
}

/// POST /api/share/create
#[utoipa::path(
    post,
    path = "/api/share/create",
    request_body = CreateLinkRequest,
    responses(
        (status = 200, description = "Link created", body = LinkEnvelope),
        (status = 400, description = "Unknown video or bad lifetime", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_link(
    State(ctx): State<AppContext>,
    body: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<Json<LinkEnvelope>, AppError> {
    let req = json_body(body)?;
    let raw_id = req
        .video_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| Error::Validation("Video ID is required".into()))?;
    let video_id = parse_video_id(&raw_id)?;
    let ttl = req
        .expires_in
        .unwrap_or(ctx.config.share.default_ttl_minutes as f64);

    let conn = cs_db::pool::get_conn(&ctx.db)?;
    let link = share::create_link(&conn, video_id, ttl, Utc::now())?;

    Ok(Json(LinkEnvelope {
        message: "Shared link created successfully.".into(),
        link: ShareLinkResponse::from_model(&link, &ctx),
    }))
}

/// GET /api/share/{slug}
#[utoipa::path(
    get,
    path = "/api/share/{slug}",
    params(("slug" = String, Path, description = "Share link slug")),
    responses(
        (status = 200, description = "Live link", body = LinkEnvelope),
        (status = 400, description = "Unknown or expired link", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_link(
    State(ctx): State<AppContext>,
    Path(slug): Path<String>,
) -> Result<Json<LinkEnvelope>, AppError> {
    let conn = cs_db::pool::get_conn(&ctx.db)?;
    let link = share::get_link(&conn, &slug, Utc::now())?;

    Ok(Json(LinkEnvelope {
        message: "Shared link retrieved successfully.".into(),
        link: ShareLinkResponse::from_model(&link, &ctx),
    }))
}

/// GET /s/{slug}
///
/// Streams the shared video, honouring `Range`. A `Content-Disposition:
/// attachment` request header asks for a download instead of inline play.
#[utoipa::path(
    get,
    path = "/s/{slug}",
    params(("slug" = String, Path, description = "Share link slug")),
    responses(
        (status = 200, description = "Whole file", content_type = "video/mp4"),
        (status = 206, description = "Requested byte range", content_type = "video/mp4"),
        (status = 416, description = "Range not satisfiable"),
        (status = 400, description = "Unknown or expired link", body = crate::error::ErrorResponse)
    )
)]
pub async fn stream_shared(
    State(ctx): State<AppContext>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let video = {
        let conn = cs_db::pool::get_conn(&ctx.db)?;
        share::resolve(&conn, &slug, Utc::now())?
    };

    let range = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    let disposition = Disposition::from_header(
        headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok()),
    );

    let response = serve_file(&video.file_path, range, disposition)
        .await
        .map_err(|e| match e {
            Error::NotFound { .. } => {
                tracing::warn!(
                    "shared video {} has no file at {}",
                    video.id,
                    video.file_path.display()
                );
                Error::AssetMissing
            }
            other => other,
        })?;
    Ok(response)
}
