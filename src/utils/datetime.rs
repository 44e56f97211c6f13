use chrono::{DateTime, Utc};

pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%A, %B %d at %H:%M UTC").to_string()
}

/// Whole days elapsed since a timestamp, clamped at zero.
pub fn days_since(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_days().max(0)
}
