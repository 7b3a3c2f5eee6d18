//! cs-db: database access and persistence layer.
//!
//! SQLite-backed storage for clipshare with connection pooling, embedded
//! migrations, typed models, and query modules for videos and share links.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
