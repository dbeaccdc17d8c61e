use chrono::{TimeZone, Utc};

/// Point in time, stored as RFC 3339 in json
pub type DateTime = chrono::DateTime<Utc>;

pub fn now() -> DateTime {
    Utc::now()
}

/// Convert unix seconds to [`DateTime`], clamping invalid values to epoch
pub fn from_unix(secs: i64) -> DateTime {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

/// Short human-readable form, used in admin listings
pub fn short_date(dt: &DateTime) -> String {
    dt.format("%d %b %Y, %H:%M").to_string()
}
