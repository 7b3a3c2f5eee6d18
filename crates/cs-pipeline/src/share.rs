//! Share links: creation and the expiry gate in front of streaming.

use chrono::{DateTime, Duration, Utc};
use cs_core::{Error, Result, VideoId};
use cs_db::models::{ShareLink, Video};
use cs_db::queries::{share_links, videos};
use rand::RngCore;
use rusqlite::Connection;

/// Random bytes behind each slug.
const SLUG_BYTES: usize = 16;

/// An unguessable slug: 32 lowercase hex characters from the thread-local
/// CSPRNG.
pub fn generate_slug() -> String {
    let mut bytes = [0u8; SLUG_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Reject a link whose expiry lies strictly before `now`.
///
/// A link is still valid at its exact expiry instant.
pub fn check_not_expired(link: &ShareLink, now: DateTime<Utc>) -> Result<()> {
    if now > link.expires_at {
        return Err(Error::LinkExpired);
    }
    Ok(())
}

/// Create a link to `video_id` that expires `ttl_minutes` after `now`.
///
/// Fractional minutes are honoured to the millisecond.
pub fn create_link(
    conn: &Connection,
    video_id: VideoId,
    ttl_minutes: f64,
    now: DateTime<Utc>,
) -> Result<ShareLink> {
    if !(ttl_minutes.is_finite() && ttl_minutes > 0.0) {
        return Err(Error::Validation(
            "expiresIn must be a positive number of minutes".into(),
        ));
    }
    if videos::get_video(conn, video_id)?.is_none() {
        return Err(Error::not_found("Video", video_id));
    }

    let ttl_ms = (ttl_minutes * 60_000.0).round();
    let expires_at = Some(ttl_ms)
        .filter(|ms| *ms <= i64::MAX as f64)
        .and_then(|ms| Duration::try_milliseconds(ms as i64))
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| Error::Validation("expiresIn is too large".into()))?;

    let link = share_links::create_share_link(conn, video_id, &generate_slug(), expires_at)?;
    tracing::info!("share link {} for video {video_id} until {}", link.slug, link.expires_at);
    Ok(link)
}

/// Look up a live link by slug.
pub fn get_link(conn: &Connection, slug: &str, now: DateTime<Utc>) -> Result<ShareLink> {
    let link = share_links::get_share_link_by_slug(conn, slug)?.ok_or(Error::LinkNotFound)?;
    check_not_expired(&link, now)?;
    Ok(link)
}

/// Resolve a slug to the video it shares, passing through the expiry gate.
pub fn resolve(conn: &Connection, slug: &str, now: DateTime<Utc>) -> Result<Video> {
    let link = get_link(conn, slug, now)?;
    videos::get_video(conn, link.video_id)?.ok_or(Error::AssetMissing)
}
