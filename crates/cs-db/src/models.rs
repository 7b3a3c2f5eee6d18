//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row` selected with the owning query module's `COLS`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use cs_core::{ShareLinkId, VideoId};
use uuid::Uuid;

/// Parse a UUID-based ID from a text column.
fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(T::from(uuid))
}

/// Parse an RFC 3339 timestamp from a text column.
fn parse_time(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

// ---------------------------------------------------------------------------
// Video
// ---------------------------------------------------------------------------

/// A stored clip. Rows are never updated; trim and merge insert new ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: VideoId,
    pub file_path: PathBuf,
    pub size_mb: f64,
    pub duration_secs: f64,
    pub uploaded_at: DateTime<Utc>,
}

impl Video {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let file_path: String = row.get(1)?;
        Ok(Self {
            id: parse_id(row, 0)?,
            file_path: PathBuf::from(file_path),
            size_mb: row.get(2)?,
            duration_secs: row.get(3)?,
            uploaded_at: parse_time(row, 4)?,
        })
    }
}

// ---------------------------------------------------------------------------
// ShareLink
// ---------------------------------------------------------------------------

/// A time-bounded public pointer to one video.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareLink {
    pub id: ShareLinkId,
    pub video_id: VideoId,
    pub slug: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ShareLink {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: parse_id(row, 0)?,
            video_id: parse_id(row, 1)?,
            slug: row.get(2)?,
            expires_at: parse_time(row, 3)?,
            created_at: parse_time(row, 4)?,
        })
    }
}
