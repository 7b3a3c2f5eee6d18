//! Video operations.

use std::collections::HashSet;

use cs_core::{AssetFields, Error, Result, VideoId};
use rusqlite::Connection;

use super::{db_now, to_db_time};
use crate::models::Video;

const COLS: &str = "id, file_path, size_mb, duration_secs, uploaded_at";

/// Insert a new video row for a fully produced and probed file.
pub fn create_video(conn: &Connection, fields: &AssetFields) -> Result<Video> {
    let id = VideoId::new();
    let now = db_now();

    conn.execute(
        "INSERT INTO videos (id, file_path, size_mb, duration_secs, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            id.to_string(),
            fields.file_path.to_string_lossy().to_string(),
            fields.size_mb,
            fields.duration_secs,
            to_db_time(now),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(Video {
        id,
        file_path: fields.file_path.clone(),
        size_mb: fields.size_mb,
        duration_secs: fields.duration_secs,
        uploaded_at: now,
    })
}

/// Get a video by ID.
pub fn get_video(conn: &Connection, id: VideoId) -> Result<Option<Video>> {
    let q = format!("SELECT {COLS} FROM videos WHERE id = ?1");
    let result = conn.query_row(&q, [id.to_string()], Video::from_row);
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Resolve several IDs, returning the videos that exist in request order.
///
/// A repeated ID resolves to a single entry, so callers can compare the
/// result's length against the requested count to detect missing rows.
pub fn get_videos_by_ids(conn: &Connection, ids: &[VideoId]) -> Result<Vec<Video>> {
    let q = format!("SELECT {COLS} FROM videos WHERE id = ?1");
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;

    let mut seen = HashSet::new();
    let mut videos = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(*id) {
            continue;
        }
        match stmt.query_row([id.to_string()], Video::from_row) {
            Ok(v) => videos.push(v),
            Err(rusqlite::Error::QueryReturnedNoRows) => {}
            Err(e) => return Err(Error::database(e.to_string())),
        }
    }
    Ok(videos)
}

/// Delete a video by ID; its share links go with it. Returns true if a row
/// was deleted.
pub fn delete_video(conn: &Connection, id: VideoId) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM videos WHERE id = ?1", [id.to_string()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(n > 0)
}
