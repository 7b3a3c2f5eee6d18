//! cs-server: HTTP API and range streaming server.
//!
//! This crate ties together all other cs-* crates into a running server
//! application. It provides:
//!
//! - Axum-based HTTP API for upload, trim, merge, and share links
//! - Range-aware streaming of shared videos
//! - Bearer-token authentication and request ids
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use cs_av::{FfmpegTranscoder, FfprobeProber, ToolRegistry};
use cs_core::config::Config;
use cs_pipeline::PipelineContext;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;

/// Start the clipshare server.
///
/// Opens the database, discovers ffmpeg and ffprobe, prepares the storage
/// root, and serves until a shutdown signal arrives or `cancel` fires.
pub async fn start(config: Config, cancel: CancellationToken) -> cs_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let db_path = &config.server.db_path;
    let existed = db_path.exists();
    let db = cs_db::pool::init_pool(db_path)?;
    if existed {
        tracing::info!("Database opened (existing) at {}", db_path.display());
    } else {
        tracing::info!("Database created (new) at {}", db_path.display());
    }

    let tools = ToolRegistry::discover(&config.tools);
    let prober = Arc::new(FfprobeProber::from_registry(&tools)?);
    let transcoder = Arc::new(FfmpegTranscoder::from_registry(&tools)?);

    let upload_dir = &config.storage.upload_dir;
    tokio::fs::create_dir_all(upload_dir).await?;
    tracing::info!("Storing videos under {}", upload_dir.display());

    let pipeline = PipelineContext::new(config.limits.clone(), upload_dir.clone(), prober, transcoder);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| cs_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(db, config, tools, pipeline);
    let app = router::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| cs_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;
    tracing::info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM) or cancellation.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
}
