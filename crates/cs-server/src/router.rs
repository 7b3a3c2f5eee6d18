//! Axum router construction.
//!
//! Builds the full application router with all route groups, middleware
//! layers, and the OpenAPI document.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::context::AppContext;
use crate::middleware::auth::auth_middleware;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Allowance for multipart boundaries and part headers on top of the file.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health_check,
        routes::videos::upload_video,
        routes::videos::trim_video,
        routes::videos::merge_videos,
        routes::share::create_link,
        routes::share::get_link,
        routes::share::stream_shared,
        routes::admin::tools,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::videos::VideoResponse,
        routes::videos::VideoEnvelope,
        routes::videos::UploadForm,
        routes::videos::TrimRequest,
        routes::videos::MergeRequest,
        routes::share::CreateLinkRequest,
        routes::share::ShareLinkResponse,
        routes::share::LinkEnvelope,
        crate::error::ErrorResponse,
        cs_av::ToolInfo,
    ))
)]
pub struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit = usize::try_from(ctx.config.limits.max_size_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let api = Router::new()
        .route(
            "/videos/upload",
            post(routes::videos::upload_video).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/videos/trim", post(routes::videos::trim_video))
        .route("/videos/merge", post(routes::videos::merge_videos))
        .route("/share/create", post(routes::share::create_link))
        .route("/share/{slug}", get(routes::share::get_link))
        .route("/admin/tools", get(routes::admin::tools))
        .layer(middleware::from_fn_with_state(ctx.clone(), auth_middleware));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/s/{slug}", get(routes::share::stream_shared))
        .nest("/api", api)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::{Duration, Utc};
    use cs_av::{Prober, ToolRegistry, Transcoder};
    use cs_core::config::Config;
    use cs_core::{AssetFields, ProbeInfo};
    use cs_db::queries::{share_links, videos};
    use cs_pipeline::PipelineContext;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    struct StubProber;

    #[async_trait]
    impl Prober for StubProber {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn probe(&self, path: &Path) -> cs_core::Result<ProbeInfo> {
            Ok(ProbeInfo {
                duration_secs: 10.0,
                size_bytes: std::fs::metadata(path)?.len(),
            })
        }
    }

    struct StubTranscoder;

    #[async_trait]
    impl Transcoder for StubTranscoder {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn extract(&self, _: &Path, output: &Path, _: f64, _: Option<f64>) -> cs_core::Result<()> {
            std::fs::write(output, b"trimmed")?;
            Ok(())
        }

        async fn concat(&self, _: &Path, output: &Path) -> cs_core::Result<()> {
            std::fs::write(output, b"merged")?;
            Ok(())
        }
    }

    fn test_app(dir: &Path, config: Config) -> (Router, AppContext) {
        let db = cs_db::pool::init_memory_pool().unwrap();
        let pipeline = PipelineContext::new(
            config.limits.clone(),
            dir,
            Arc::new(StubProber),
            Arc::new(StubTranscoder),
        );
        let ctx = AppContext::new(db, config, ToolRegistry::default(), pipeline);
        (build_router(ctx.clone()), ctx)
    }

    fn seed_video(ctx: &AppContext, dir: &Path, len: usize) -> cs_db::models::Video {
        let path = dir.join("seed.mp4");
        std::fs::write(&path, vec![7u8; len]).unwrap();
        let conn = ctx.db.get().unwrap();
        videos::create_video(
            &conn,
            &AssetFields {
                file_path: path,
                size_mb: 0.0,
                duration_secs: 10.0,
            },
        )
        .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn oversized_upload_body_is_file_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.limits.max_size_mb = 1;
        let (app, _) = test_app(dir.path(), config);

        let boundary = "clipshare-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"big.mp4\"\r\nContent-Type: video/mp4\r\n\r\n"
        )
        .into_bytes();
        body.extend(vec![0u8; 5 * 1024 * 1024]);
        body.extend(format!("\r\n--{boundary}--\r\n").into_bytes());

        let request = Request::post("/api/videos/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "file_too_large");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn unrecorded_asset_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let (_, ctx) = test_app(dir.path(), Config::default());
        ctx.db
            .get()
            .unwrap()
            .execute_batch("DROP TABLE share_links; DROP TABLE videos;")
            .unwrap();

        let path = dir.path().join("orphan.mp4");
        std::fs::write(&path, b"produced").unwrap();
        let fields = AssetFields {
            file_path: path.clone(),
            size_mb: 0.0,
            duration_secs: 10.0,
        };
        assert!(crate::routes::videos::record_asset(&ctx, &fields).await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path(), Config::default());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path(), Config::default());
        let response = app
            .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["paths"]["/api/videos/trim"].is_object());
        assert!(json["paths"]["/s/{slug}"].is_object());
    }

    #[tokio::test]
    async fn shared_link_streams_range() {
        let dir = tempfile::tempdir().unwrap();
        let (app, ctx) = test_app(dir.path(), Config::default());
        let video = seed_video(&ctx, dir.path(), 100);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/share/create",
                serde_json::json!({ "videoId": video.id.to_string(), "expiresIn": 5 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Shared link created successfully.");
        let slug = json["link"]["slug"].as_str().unwrap().to_string();
        assert!(json["link"]["link"].as_str().unwrap().ends_with(&format!("/s/{slug}")));

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/s/{slug}"))
                    .header(header::RANGE, "bytes=0-49")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 0-49/100");
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes.len(), 50);

        let response = app
            .oneshot(
                Request::get(format!("/s/{slug}"))
                    .header(header::RANGE, "bytes=100-")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    }

    #[tokio::test]
    async fn expired_link_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (app, ctx) = test_app(dir.path(), Config::default());
        let video = seed_video(&ctx, dir.path(), 10);
        {
            let conn = ctx.db.get().unwrap();
            share_links::create_share_link(
                &conn,
                video.id,
                "stale",
                Utc::now() - Duration::minutes(1),
            )
            .unwrap();
        }

        let response = app
            .oneshot(Request::get("/s/stale").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Shared link has expired");
    }

    #[tokio::test]
    async fn trim_requires_video_id() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = test_app(dir.path(), Config::default());
        let response = app
            .oneshot(post_json("/api/videos/trim", serde_json::json!({ "end": 3 })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Video ID is required");
    }

    #[tokio::test]
    async fn trim_creates_new_video() {
        let dir = tempfile::tempdir().unwrap();
        let (app, ctx) = test_app(dir.path(), Config::default());
        let video = seed_video(&ctx, dir.path(), 10);

        let response = app
            .oneshot(post_json(
                "/api/videos/trim",
                serde_json::json!({ "videoId": video.id.to_string(), "start": 1, "end": 4 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Video trimmed successfully");
        assert_ne!(json["video"]["id"], video.id.to_string());
        assert!(json["video"]["filePath"].as_str().unwrap().contains("seed_trimmed_"));
    }

    #[tokio::test]
    async fn merge_with_unknown_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (app, ctx) = test_app(dir.path(), Config::default());
        let video = seed_video(&ctx, dir.path(), 10);

        let response = app
            .oneshot(post_json(
                "/api/videos/merge",
                serde_json::json!({ "videoIds": [video.id.to_string(), "nope"] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "assets_not_found");
    }

    #[tokio::test]
    async fn auth_guards_api_but_not_public_stream() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.auth.enabled = true;
        config.auth.token = Some("s3cret".into());
        let (app, _) = test_app(dir.path(), config);

        let response = app
            .clone()
            .oneshot(Request::get("/api/admin/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("x-request-id"));

        let response = app
            .clone()
            .oneshot(
                Request::get("/api/admin/tools")
                    .header(header::AUTHORIZATION, "Bearer s3cret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/s/unknown").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Shared link not found");
    }
}
