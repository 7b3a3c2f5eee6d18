//! Application context shared across all route handlers via Axum state.

use std::sync::Arc;

use cs_av::ToolRegistry;
use cs_core::config::Config;
use cs_db::pool::DbPool;
use cs_pipeline::PipelineContext;

/// Immutable infrastructure handed to every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppContext {
    /// SQLite connection pool.
    pub db: DbPool,
    /// Resolved configuration (file, then environment, then CLI).
    pub config: Arc<Config>,
    /// Discovered external tools, reported by `/api/admin/tools`.
    pub tools: Arc<ToolRegistry>,
    /// Upload, trim, and merge engines.
    pub pipeline: PipelineContext,
}

impl AppContext {
    pub fn new(
        db: DbPool,
        config: Config,
        tools: ToolRegistry,
        pipeline: PipelineContext,
    ) -> Self {
        Self {
            db,
            config: Arc::new(config),
            tools: Arc::new(tools),
            pipeline,
        }
    }
}
