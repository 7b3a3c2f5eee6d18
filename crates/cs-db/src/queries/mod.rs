//! Database query modules.

pub mod share_links;
pub mod videos;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Timestamps are stored as RFC 3339 UTC text with microsecond precision.
pub(crate) fn to_db_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time at the precision the database keeps.
pub(crate) fn db_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
