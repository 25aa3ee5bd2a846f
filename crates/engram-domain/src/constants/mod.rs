//! Domain-level constants

/// Metadata and storage key names
pub mod keys;
/// Retry and timeout budgets for outward calls
pub mod retry;
/// Retrieval and injection defaults
pub mod search;
/// Time-based hygiene thresholds
pub mod time;
