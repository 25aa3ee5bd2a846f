//! Time helpers

use chrono::{DateTime, Duration, Utc};

/// Current UTC timestamp
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current epoch seconds
#[must_use]
pub fn epoch_secs() -> i64 {
    Utc::now().timestamp()
}

/// Current epoch milliseconds
#[must_use]
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// UTC timestamp `days` days in the past
#[must_use]
pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

/// Age of `ts` in fractional days, never negative
#[must_use]
pub fn age_days(ts: DateTime<Utc>) -> f64 {
    let secs = (Utc::now() - ts).num_seconds().max(0) as f64;
    secs / 86_400.0
}
