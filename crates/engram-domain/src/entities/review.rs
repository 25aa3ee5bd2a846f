//! Memory hygiene reports produced by the weekly review job.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time;

/// Aggregate statistics over one user's long-term memories
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMemoryStats {
    /// Total records counted
    pub total_count: usize,
    /// Record counts per entity type
    pub by_entity_type: HashMap<String, usize>,
    /// Record counts per status
    pub by_status: HashMap<String, usize>,
    /// Mean confidence across records
    pub avg_confidence: f32,
    /// Sum of access counters
    pub total_access_count: u64,
}

/// Per-user output of one weekly review run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryReviewReport {
    /// Reviewed user
    pub user_id: String,
    /// Report timestamp
    pub generated_at: DateTime<Utc>,
    /// Records matching the low-hotness rule
    pub low_hotness_count: usize,
    /// Records matching the stale rule
    pub potentially_stale_count: usize,
    /// Records actually archived this run
    pub archived_count: usize,
    /// Records actually flagged for review this run
    pub review_count: usize,
    /// Human-readable follow-up hints
    pub suggestions: Vec<String>,
    /// Snapshot of the user's memory statistics
    pub stats: UserMemoryStats,
}

impl MemoryReviewReport {
    /// Open an empty report for a user
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            generated_at: time::now(),
            low_hotness_count: 0,
            potentially_stale_count: 0,
            archived_count: 0,
            review_count: 0,
            suggestions: Vec::new(),
            stats: UserMemoryStats::default(),
        }
    }
}
