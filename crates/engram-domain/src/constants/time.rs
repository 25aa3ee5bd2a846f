//! Time-based hygiene thresholds.

/// Conversation session TTL (seconds)
pub const SESSION_TTL_SECS: u64 = 3600;
/// Short-term memory record TTL in the KV tier (seconds)
pub const SHORT_TERM_TTL_SECS: u64 = 3600;

/// Age after which a low-hotness record is archived (days)
pub const ARCHIVE_AFTER_DAYS: i64 = 90;
/// Access-count ceiling for the archive rule
pub const MAX_ACCESS_THRESHOLD: u64 = 3;
/// Age after which a still-accessed record is flagged for review (days)
pub const STALE_CHECK_DAYS: i64 = 180;

/// Grace period between soft delete and permanent purge (days)
pub const TRASH_RETENTION_DAYS: i64 = 7;

/// External tool registry refresh interval (seconds)
pub const EXTERNAL_REFRESH_SECS: u64 = 3600;
/// Connection pool health-check interval (seconds)
pub const HEALTH_CHECK_INTERVAL_SECS: u64 = 30;
