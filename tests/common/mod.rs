//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a temporary
//! storage root, in-process stand-ins for ffprobe and ffmpeg, and a full
//! [`AppContext`]. The [`TestHarness::with_server`] constructor starts Axum on
//! a random port for HTTP-level testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cs_av::{Prober, ToolRegistry, Transcoder};
use cs_core::config::Config;
use cs_core::{AssetFields, ProbeInfo};
use cs_db::models::Video;
use cs_db::pool::{init_memory_pool, DbPool};
use cs_pipeline::PipelineContext;
use cs_server::context::AppContext;
use cs_server::router::build_router;

/// Reports a fixed duration and the file's real size.
pub struct StubProber {
    pub duration_secs: f64,
}

#[async_trait]
impl Prober for StubProber {
    fn name(&self) -> &'static str {
        "stub-probe"
    }

    async fn probe(&self, path: &Path) -> cs_core::Result<ProbeInfo> {
        Ok(ProbeInfo {
            duration_secs: self.duration_secs,
            size_bytes: tokio::fs::metadata(path).await?.len(),
        })
    }
}

/// Writes a marker file for every operation and counts invocations.
#[derive(Default)]
pub struct StubTranscoder {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Transcoder for StubTranscoder {
    fn name(&self) -> &'static str {
        "stub-transcode"
    }

    async fn extract(&self, _: &Path, output: &Path, _: f64, _: Option<f64>) -> cs_core::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::write(output, b"extracted").await?;
        Ok(())
    }

    async fn concat(&self, manifest: &Path, output: &Path) -> cs_core::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let listing = tokio::fs::read(manifest).await?;
        tokio::fs::write(output, listing).await?;
        Ok(())
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub transcoder: Arc<StubTranscoder>,
    pub storage: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration and 10-second clips.
    pub fn new() -> Self {
        Self::with_config(Config::default(), 10.0)
    }

    /// Create a harness whose prober reports `duration_secs` for every file.
    pub fn with_config(config: Config, duration_secs: f64) -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        let storage = tempfile::tempdir().expect("failed to create storage dir");
        let transcoder = Arc::new(StubTranscoder::default());
        let pipeline = PipelineContext::new(
            config.limits.clone(),
            storage.path(),
            Arc::new(StubProber { duration_secs }),
            transcoder.clone(),
        );
        let ctx = AppContext::new(db.clone(), config, ToolRegistry::default(), pipeline);

        Self {
            ctx,
            db,
            transcoder,
            storage,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default(), 10.0).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config, duration_secs: f64) -> (Self, SocketAddr) {
        let harness = Self::with_config(config, duration_secs);
        let app = build_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> cs_db::pool::PooledConnection {
        cs_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    /// Write `len` bytes under the storage root and record them as a video.
    pub fn create_video(&self, name: &str, len: usize) -> Video {
        let path = self.storage.path().join(name);
        let data: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
        std::fs::write(&path, data).expect("failed to write fixture");
        cs_db::queries::videos::create_video(
            &self.conn(),
            &AssetFields {
                file_path: path,
                size_mb: cs_core::to_mb(len as u64),
                duration_secs: 10.0,
            },
        )
        .expect("failed to insert video")
    }

    pub fn transcoder_calls(&self) -> usize {
        self.transcoder.calls.load(Ordering::SeqCst)
    }

    /// Files currently in the storage root.
    pub fn stored_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.storage.path())
            .expect("failed to list storage dir")
            .filter_map(|e| e.ok().map(|e| e.path()))
            .collect();
        files.sort();
        files
    }
}
