//! Real-time retrieval service.
//!
//! Per-query pipeline: cache check → parallel per-tier search (bounded,
//! 5 s per tier) → relevance scoring → sort → filter/trim → access marking
//! → cache write. A timed-out tier yields empty results for that tier and
//! never aborts the other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use engram_domain::constants::retry::TRACK_TIMEOUT;
use engram_domain::constants::search::RETRIEVAL_CACHE_TTL_SECS;
use engram_domain::entities::{MemoryRecord, MemoryTier, sort_by_relevance};
use engram_domain::utils::{stable_hash, time};

use crate::memory_manager::AamManager;

/// Conversation context supplied with a query; participates in the cache key.
pub type QueryContext = HashMap<String, String>;

/// Real-time memory retrieval with TTL result caching.
pub struct RealtimeRetrievalService {
    aam: Arc<AamManager>,
    cache_enabled: bool,
    cache_ttl: Duration,
    cache: DashMap<u64, (Instant, Vec<MemoryRecord>)>,
}

impl RealtimeRetrievalService {
    /// Build a service with the default 300 s cache TTL.
    #[must_use]
    pub fn new(aam: Arc<AamManager>) -> Self {
        Self::with_config(aam, true, Duration::from_secs(RETRIEVAL_CACHE_TTL_SECS))
    }

    /// Build a service with explicit cache settings.
    #[must_use]
    pub fn with_config(aam: Arc<AamManager>, cache_enabled: bool, cache_ttl: Duration) -> Self {
        Self {
            aam,
            cache_enabled,
            cache_ttl,
            cache: DashMap::new(),
        }
    }

    fn cache_key(query: &str, context: Option<&QueryContext>) -> u64 {
        let context_str = context.map_or_else(String::new, |ctx| {
            let mut pairs: Vec<(&String, &String)> = ctx.iter().collect();
            pairs.sort();
            pairs
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(";")
        });
        stable_hash(&format!("{query}:{context_str}"))
    }

    fn cached(&self, key: u64) -> Option<Vec<MemoryRecord>> {
        if !self.cache_enabled {
            return None;
        }
        if let Some(entry) = self.cache.get(&key) {
            let (stored_at, results) = entry.value();
            if stored_at.elapsed() < self.cache_ttl {
                tracing::debug!(key, "Retrieval cache hit");
                return Some(results.clone());
            }
        }
        self.cache.remove(&key);
        None
    }

    fn score(memory: &mut MemoryRecord) {
        let mut relevance = memory.relevance_score;
        relevance += memory.priority.relevance_bonus();
        if memory.access_count > 0 {
            relevance += (memory.access_count as f32 * 0.01).min(0.1);
        }
        if let Some(accessed_at) = memory.accessed_at {
            let age_days = time::age_days(accessed_at) as f32;
            relevance += (0.1 * (1.0 - age_days)).max(0.0);
        }
        memory.relevance_score = relevance.clamp(0.0, 1.0);
    }

    /// Run the retrieval pipeline.
    pub async fn retrieve(
        &self,
        query: &str,
        context: Option<&QueryContext>,
        tier: Option<MemoryTier>,
        limit: usize,
        min_relevance: f32,
        use_cache: bool,
    ) -> Vec<MemoryRecord> {
        let start = Instant::now();
        let key = Self::cache_key(query, context);

        if use_cache {
            if let Some(cached) = self.cached(key) {
                tracing::info!(
                    query = %engram_domain::utils::clip(query, 50),
                    count = cached.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Retrieved from cache"
                );
                return cached.into_iter().take(limit).collect();
            }
        }

        let mut results = match tier {
            Some(tier) => {
                self.aam
                    .search_memories(query, Some(tier), limit * 2, min_relevance)
                    .await
            }
            None => self.parallel_search(query, limit * 2, min_relevance).await,
        };

        for memory in &mut results {
            Self::score(memory);
        }
        sort_by_relevance(&mut results);
        results.retain(|m| m.relevance_score >= min_relevance);
        results.truncate(limit);

        // Mark hits accessed; persistence of the bump is best-effort.
        let vector = self.aam.vector_adapter();
        for memory in &mut results {
            memory.touch_access();
            if memory.tier == MemoryTier::LongTerm {
                if let Some(vector) = &vector {
                    vector.update_access(&memory.memory_id).await;
                }
            }
        }

        if use_cache && self.cache_enabled {
            self.cache.insert(key, (Instant::now(), results.clone()));
        }

        tracing::info!(
            query = %engram_domain::utils::clip(query, 50),
            count = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Retrieved memories"
        );
        results
    }

    async fn parallel_search(
        &self,
        query: &str,
        limit: usize,
        min_relevance: f32,
    ) -> Vec<MemoryRecord> {
        let short = async {
            if !self.aam.short_term_enabled() {
                return Vec::new();
            }
            match tokio::time::timeout(
                TRACK_TIMEOUT,
                self.aam
                    .search_memories(query, Some(MemoryTier::ShortTerm), limit, min_relevance),
            )
            .await
            {
                Ok(results) => results,
                Err(_) => {
                    tracing::error!(tier = "short_term", "Tier search timed out");
                    Vec::new()
                }
            }
        };
        let long = async {
            if !self.aam.long_term_enabled() {
                return Vec::new();
            }
            match tokio::time::timeout(
                TRACK_TIMEOUT,
                self.aam
                    .search_memories(query, Some(MemoryTier::LongTerm), limit, min_relevance),
            )
            .await
            {
                Ok(results) => results,
                Err(_) => {
                    tracing::error!(tier = "long_term", "Tier search timed out");
                    Vec::new()
                }
            }
        };

        let (mut results, long_results) = tokio::join!(short, long);
        results.extend(long_results);
        results
    }

    /// Drop every cached result set; returns the number of entries removed.
    pub fn clear_cache(&self) -> usize {
        let count = self.cache.len();
        self.cache.clear();
        tracing::info!(count, "Retrieval cache cleared");
        count
    }
}
