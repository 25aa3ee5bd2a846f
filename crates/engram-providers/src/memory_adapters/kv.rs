//! Short-term memory adapter over a KV cache backend.
//!
//! Records are TTL'd JSON documents keyed `{prefix}{memory_id}`. Search is
//! intentionally unsupported on this tier: scored search goes through the
//! vector or graph adapter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use engram_domain::constants::keys::KV_MEMORY_PREFIX;
use engram_domain::constants::time::SHORT_TERM_TTL_SECS;
use engram_domain::entities::{MemoryRecord, MemoryTier};
use engram_domain::ports::{CacheEntryConfig, CacheProvider, MemoryStoreAdapter};

/// KV adapter for the short-term tier.
pub struct KvMemoryAdapter {
    cache: Arc<dyn CacheProvider>,
    key_prefix: String,
    ttl: Duration,
}

impl KvMemoryAdapter {
    /// Wrap a cache provider with the default prefix and TTL.
    #[must_use]
    pub fn new(cache: Arc<dyn CacheProvider>) -> Self {
        Self::with_config(
            cache,
            KV_MEMORY_PREFIX,
            Duration::from_secs(SHORT_TERM_TTL_SECS),
        )
    }

    /// Wrap a cache provider with an explicit prefix and TTL.
    #[must_use]
    pub fn with_config(
        cache: Arc<dyn CacheProvider>,
        key_prefix: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            key_prefix: key_prefix.into(),
            ttl,
        }
    }

    fn key(&self, memory_id: &str) -> String {
        format!("{}{memory_id}", self.key_prefix)
    }
}

#[async_trait]
impl MemoryStoreAdapter for KvMemoryAdapter {
    async fn store(&self, memory: &MemoryRecord) -> bool {
        let json = match serde_json::to_string(memory) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(adapter = "kv", error = %e, "Failed to serialize memory");
                return false;
            }
        };
        match self
            .cache
            .set_json(
                &self.key(&memory.memory_id),
                &json,
                CacheEntryConfig {
                    ttl: Some(self.ttl),
                },
            )
            .await
        {
            Ok(()) => {
                tracing::debug!(adapter = "kv", memory_id = %memory.memory_id, "Stored memory");
                true
            }
            Err(e) => {
                tracing::error!(adapter = "kv", error = %e, "Failed to store memory");
                false
            }
        }
    }

    async fn retrieve(&self, memory_id: &str) -> Option<MemoryRecord> {
        match self.cache.get_json(&self.key(memory_id)).await {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(memory) => Some(memory),
                Err(e) => {
                    tracing::error!(adapter = "kv", error = %e, "Failed to parse stored memory");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::error!(adapter = "kv", error = %e, "Failed to retrieve memory");
                None
            }
        }
    }

    async fn update(&self, memory: &MemoryRecord) -> bool {
        self.store(memory).await
    }

    async fn delete(&self, memory_id: &str) -> bool {
        match self.cache.delete(&self.key(memory_id)).await {
            Ok(removed) => {
                tracing::debug!(adapter = "kv", memory_id, "Deleted memory");
                removed
            }
            Err(e) => {
                tracing::error!(adapter = "kv", error = %e, "Failed to delete memory");
                false
            }
        }
    }

    async fn search(
        &self,
        _query: &str,
        _tier: Option<MemoryTier>,
        _limit: usize,
    ) -> Vec<MemoryRecord> {
        // The KV tier has no content index.
        tracing::warn!(adapter = "kv", "KV search is not supported");
        Vec::new()
    }

    fn adapter_name(&self) -> &str {
        "kv"
    }
}
