//! Weekly memory review job.
//!
//! Per user: archive low-hotness records (old and rarely accessed), flag
//! long-untouched-but-still-accessed records for human review, and emit a
//! per-user report plus an aggregate log line.

use std::sync::Arc;

use engram_domain::constants::time::{
    ARCHIVE_AFTER_DAYS, MAX_ACCESS_THRESHOLD, STALE_CHECK_DAYS,
};
use engram_domain::entities::{MemoryReviewReport, MemoryStatus};
use engram_domain::ports::VectorMemoryAdapter;
use engram_domain::utils::time;

/// Weekly hygiene job over the long-term store.
pub struct MemoryReviewJob {
    adapter: Arc<dyn VectorMemoryAdapter>,
    archive_after_days: i64,
    max_access_threshold: u64,
    stale_check_days: i64,
}

impl MemoryReviewJob {
    /// Build a job with the default thresholds (90 d / 3 accesses / 180 d).
    #[must_use]
    pub fn new(adapter: Arc<dyn VectorMemoryAdapter>) -> Self {
        Self::with_thresholds(
            adapter,
            ARCHIVE_AFTER_DAYS,
            MAX_ACCESS_THRESHOLD,
            STALE_CHECK_DAYS,
        )
    }

    /// Build a job with explicit thresholds.
    #[must_use]
    pub fn with_thresholds(
        adapter: Arc<dyn VectorMemoryAdapter>,
        archive_after_days: i64,
        max_access_threshold: u64,
        stale_check_days: i64,
    ) -> Self {
        Self {
            adapter,
            archive_after_days,
            max_access_threshold,
            stale_check_days,
        }
    }

    /// Run the review for every user discovered in the store.
    pub async fn run_weekly_review(&self) -> Vec<MemoryReviewReport> {
        tracing::info!("Starting weekly memory review");
        let users = self.adapter.list_user_ids().await;
        if users.is_empty() {
            tracing::info!("No user data found for review");
            return Vec::new();
        }
        tracing::info!(user_count = users.len(), "Reviewing users");

        let mut reports = Vec::with_capacity(users.len());
        for user_id in users {
            let report = self.review_user(&user_id).await;
            tracing::info!(
                user_id = %report.user_id,
                archived = report.archived_count,
                review = report.review_count,
                low_hotness = report.low_hotness_count,
                "User review complete"
            );
            reports.push(report);
        }

        let total_archived: usize = reports.iter().map(|r| r.archived_count).sum();
        let total_review: usize = reports.iter().map(|r| r.review_count).sum();
        tracing::info!(
            users = reports.len(),
            archived = total_archived,
            review = total_review,
            "Weekly memory review complete"
        );
        reports
    }

    /// Review a single user's memories.
    pub async fn review_user(&self, user_id: &str) -> MemoryReviewReport {
        let mut report = MemoryReviewReport::new(user_id);
        report.stats = self.adapter.user_stats(user_id).await;

        // Rule 1: archive old, rarely-accessed records.
        let low_hotness = self
            .adapter
            .find_low_hotness(user_id, self.max_access_threshold, self.archive_after_days)
            .await;
        report.low_hotness_count = low_hotness.len();
        for memory in &low_hotness {
            if self.adapter.archive(&memory.memory_id).await {
                report.archived_count += 1;
                tracing::info!(
                    user_id,
                    memory_id = %memory.memory_id,
                    access_count = memory.access_count,
                    "Archived low-hotness memory"
                );
            }
        }

        // Rule 2: flag old records that are still being accessed.
        let cutoff = time::days_ago(self.stale_check_days);
        let candidates = self
            .adapter
            .get_user_entities(user_id, None, Some(MemoryStatus::Active), 1000)
            .await;
        let stale: Vec<_> = candidates
            .into_iter()
            .filter(|m| m.updated_at < cutoff && m.access_count > 0)
            .collect();
        report.potentially_stale_count = stale.len();
        for memory in &stale {
            let reason = format!(
                "Memory is older than {} days but still accessed (access_count={}); confirm it is still valid.",
                self.stale_check_days, memory.access_count
            );
            if self.adapter.mark_for_review(&memory.memory_id, &reason).await {
                report.review_count += 1;
                tracing::info!(user_id, memory_id = %memory.memory_id, "Flagged memory for review");
            }
        }

        if report.archived_count > 0 {
            report
                .suggestions
                .push(format!("Archived {} low-hotness memories", report.archived_count));
        }
        if report.review_count > 0 {
            report.suggestions.push(format!(
                "{} memories need human review for staleness",
                report.review_count
            ));
        }
        if report.stats.total_count > 1000 {
            report.suggestions.push(format!(
                "User holds {} memories; consider periodic cleanup of low-value records",
                report.stats.total_count
            ));
        }

        report
    }
}
