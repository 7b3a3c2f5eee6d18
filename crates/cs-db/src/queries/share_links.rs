//! Share link operations. Links are created once and never updated.

use chrono::{DateTime, SubsecRound, Utc};
use cs_core::{Error, Result, ShareLinkId, VideoId};
use rusqlite::Connection;

use super::{db_now, to_db_time};
use crate::models::ShareLink;

const COLS: &str = "id, video_id, slug, expires_at, created_at";

/// Create a share link for `video_id` under the given public `slug`.
pub fn create_share_link(
    conn: &Connection,
    video_id: VideoId,
    slug: &str,
    expires_at: DateTime<Utc>,
) -> Result<ShareLink> {
    let id = ShareLinkId::new();
    let now = db_now();
    let expires_at = expires_at.trunc_subsecs(6);

    conn.execute(
        "INSERT INTO share_links (id, video_id, slug, expires_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            id.to_string(),
            video_id.to_string(),
            slug,
            to_db_time(expires_at),
            to_db_time(now),
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(ShareLink {
        id,
        video_id,
        slug: slug.to_string(),
        expires_at,
        created_at: now,
    })
}

/// Get a share link by its public slug.
pub fn get_share_link_by_slug(conn: &Connection, slug: &str) -> Result<Option<ShareLink>> {
    let q = format!("SELECT {COLS} FROM share_links WHERE slug = ?1");
    let result = conn.query_row(&q, [slug], ShareLink::from_row);
    match result {
        Ok(link) => Ok(Some(link)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}
