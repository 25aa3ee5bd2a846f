//! Identifier generation

use uuid::Uuid;

/// Generate a fresh random identifier
#[must_use]
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}

/// Build the deterministic long-term key for a typed entity memory.
///
/// Layout: `{prefix}_{user}_{value}_{ts}`, matching the write-back
/// convention of the coreference resolver (`part_…`, `tlf19_…`).
#[must_use]
pub fn entity_memory_id(prefix: &str, user_id: &str, value: &str, ts_secs: i64) -> String {
    format!("{prefix}_{user_id}_{value}_{ts_secs}")
}
