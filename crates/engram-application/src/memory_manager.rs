//! Memory lifecycle manager.
//!
//! # Overview
//! `AamManager` routes memory operations across the enabled tiers: the
//! TTL'd KV tier for short-term records and the vector tier for long-term
//! records, with an optional shadow write into the graph/document store.
//!
//! # Failure model
//! Tier adapter errors are absorbed by the adapters themselves; return
//! values reflect success of the *primary* tier. The shadow write never
//! fails the primary. A tier that is disabled (or has no adapter wired)
//! refuses the operation silently with a warning.

use std::collections::HashMap;
use std::sync::Arc;

use engram_domain::entities::{
    MemoryPriority, MemoryRecord, MemoryTier, sort_by_relevance,
};
use engram_domain::ports::{GraphMemoryAdapter, MemoryStoreAdapter, VectorMemoryAdapter};
use engram_domain::utils::id;

/// Tiered memory manager.
pub struct AamManager {
    kv_adapter: Option<Arc<dyn MemoryStoreAdapter>>,
    vector_adapter: Option<Arc<dyn VectorMemoryAdapter>>,
    graph_adapter: Option<Arc<dyn GraphMemoryAdapter>>,
    enable_short_term: bool,
    enable_long_term: bool,
}

impl AamManager {
    /// Build a manager over the wired adapters.
    #[must_use]
    pub fn new(
        kv_adapter: Option<Arc<dyn MemoryStoreAdapter>>,
        vector_adapter: Option<Arc<dyn VectorMemoryAdapter>>,
        graph_adapter: Option<Arc<dyn GraphMemoryAdapter>>,
        enable_short_term: bool,
        enable_long_term: bool,
    ) -> Self {
        if enable_short_term && kv_adapter.is_none() {
            tracing::warn!("Short-term memory enabled but KV adapter not provided");
        }
        if enable_long_term && vector_adapter.is_none() {
            tracing::warn!("Long-term memory enabled but vector adapter not provided");
        }
        Self {
            kv_adapter,
            vector_adapter,
            graph_adapter,
            enable_short_term,
            enable_long_term,
        }
    }

    /// True when the short-term tier is usable
    #[must_use]
    pub fn short_term_enabled(&self) -> bool {
        self.enable_short_term && self.kv_adapter.is_some()
    }

    /// True when the long-term tier is usable
    #[must_use]
    pub fn long_term_enabled(&self) -> bool {
        self.enable_long_term && self.vector_adapter.is_some()
    }

    /// The vector tier's extension surface, when wired
    #[must_use]
    pub fn vector_adapter(&self) -> Option<Arc<dyn VectorMemoryAdapter>> {
        if self.enable_long_term {
            self.vector_adapter.clone()
        } else {
            None
        }
    }

    /// The graph adapter, when wired
    #[must_use]
    pub fn graph_adapter(&self) -> Option<Arc<dyn GraphMemoryAdapter>> {
        self.graph_adapter.clone()
    }

    fn adapter_for(&self, tier: MemoryTier) -> Option<Arc<dyn MemoryStoreAdapter>> {
        match tier {
            MemoryTier::ShortTerm => {
                if !self.enable_short_term {
                    return None;
                }
                self.kv_adapter.clone()
            }
            MemoryTier::LongTerm => {
                if !self.enable_long_term {
                    return None;
                }
                self.vector_adapter
                    .clone()
                    .map(|v| v as Arc<dyn MemoryStoreAdapter>)
            }
        }
    }

    fn enabled_adapters(&self) -> Vec<Arc<dyn MemoryStoreAdapter>> {
        // Tier order short -> long is the retrieval contract.
        [MemoryTier::ShortTerm, MemoryTier::LongTerm]
            .into_iter()
            .filter_map(|tier| self.adapter_for(tier))
            .collect()
    }

    /// Store a memory. Generates an id when absent; shadow-writes to the
    /// graph store. Returns `None` on primary store failure.
    pub async fn store_memory(
        &self,
        content: impl Into<String>,
        tier: MemoryTier,
        priority: MemoryPriority,
        metadata: HashMap<String, serde_json::Value>,
        memory_id: Option<String>,
    ) -> Option<String> {
        let memory_id = memory_id.unwrap_or_else(id::generate);
        let mut memory = MemoryRecord::with_id(memory_id.clone(), content, tier)
            .with_priority(priority);
        memory.metadata = metadata;
        self.store_record(&memory).await.then_some(memory_id)
    }

    /// Store a fully-populated record (typed entities, confidence, status).
    pub async fn store_record(&self, memory: &MemoryRecord) -> bool {
        let Some(adapter) = self.adapter_for(memory.tier) else {
            tracing::warn!(tier = memory.tier.as_str(), "No adapter available for memory tier");
            return false;
        };
        if !adapter.store(memory).await {
            return false;
        }
        if let Some(graph) = &self.graph_adapter {
            // Shadow write; never fails the primary.
            if !graph.store(memory).await {
                tracing::warn!(memory_id = %memory.memory_id, "Shadow write to graph store failed");
            }
        }
        tracing::info!(memory_id = %memory.memory_id, tier = memory.tier.as_str(), "Stored memory");
        true
    }

    /// Retrieve a memory by id, searching tiers short → long when the tier
    /// is not given. Bumps access tracking on hit.
    pub async fn retrieve_memory(
        &self,
        memory_id: &str,
        tier: Option<MemoryTier>,
    ) -> Option<MemoryRecord> {
        let adapters = match tier {
            Some(tier) => self.adapter_for(tier).into_iter().collect(),
            None => self.enabled_adapters(),
        };
        for adapter in adapters {
            if let Some(mut memory) = adapter.retrieve(memory_id).await {
                memory.touch_access();
                // Persist the access bump best-effort.
                if !adapter.update(&memory).await {
                    tracing::debug!(memory_id, "Failed to persist access bump");
                }
                return Some(memory);
            }
        }
        None
    }

    /// Read-modify-write update of content, priority, and merged metadata.
    pub async fn update_memory(
        &self,
        memory_id: &str,
        content: Option<String>,
        priority: Option<MemoryPriority>,
        metadata: Option<HashMap<String, serde_json::Value>>,
    ) -> bool {
        let Some(mut memory) = self.retrieve_memory(memory_id, None).await else {
            tracing::warn!(memory_id, "Memory not found for update");
            return false;
        };
        if let Some(content) = content {
            memory.content = content;
        }
        if let Some(priority) = priority {
            memory.priority = priority;
        }
        if let Some(metadata) = metadata {
            memory.merge_metadata(metadata);
        }
        memory.touch_updated();

        let Some(adapter) = self.adapter_for(memory.tier) else {
            return false;
        };
        let success = adapter.update(&memory).await;
        if success {
            if let Some(graph) = &self.graph_adapter {
                if !graph.update(&memory).await {
                    tracing::debug!(memory_id, "Graph mirror update failed");
                }
            }
            tracing::info!(memory_id, "Updated memory");
        }
        success
    }

    /// Delete a memory. With no tier given, tries every enabled tier and
    /// succeeds when at least one adapter removed it.
    pub async fn delete_memory(&self, memory_id: &str, tier: Option<MemoryTier>) -> bool {
        let success = match tier {
            Some(tier) => match self.adapter_for(tier) {
                Some(adapter) => adapter.delete(memory_id).await,
                None => false,
            },
            None => {
                let mut any = false;
                for adapter in self.enabled_adapters() {
                    if adapter.delete(memory_id).await {
                        any = true;
                    }
                }
                any
            }
        };
        if success {
            if let Some(graph) = &self.graph_adapter {
                if !graph.delete(memory_id).await {
                    tracing::debug!(memory_id, "Graph mirror delete failed");
                }
            }
            tracing::info!(memory_id, "Deleted memory");
        }
        success
    }

    /// Scored search. With no tier given, merges short- and long-term
    /// results; output is filtered by `min_relevance` and sorted by
    /// `(relevance, priority, accessed_at)` descending.
    pub async fn search_memories(
        &self,
        query: &str,
        tier: Option<MemoryTier>,
        limit: usize,
        min_relevance: f32,
    ) -> Vec<MemoryRecord> {
        let mut results: Vec<MemoryRecord> = Vec::new();
        match tier {
            Some(tier) => {
                if let Some(adapter) = self.adapter_for(tier) {
                    results = adapter.search(query, Some(tier), limit).await;
                }
            }
            None => {
                for tier in [MemoryTier::ShortTerm, MemoryTier::LongTerm] {
                    if let Some(adapter) = self.adapter_for(tier) {
                        results.extend(adapter.search(query, Some(tier), limit).await);
                    }
                }
            }
        }

        results.retain(|m| m.relevance_score >= min_relevance);
        sort_by_relevance(&mut results);
        results.truncate(limit);
        results
    }

    /// Update and propagate to **all** enabled adapters; best-effort on the
    /// non-primary ones.
    pub async fn sync_memory(
        &self,
        memory_id: &str,
        content: Option<String>,
        metadata: Option<HashMap<String, serde_json::Value>>,
    ) -> bool {
        let Some(mut memory) = self.retrieve_memory(memory_id, None).await else {
            tracing::warn!(memory_id, "Memory not found for sync");
            return false;
        };
        if let Some(content) = content {
            memory.content = content;
        }
        if let Some(metadata) = metadata {
            memory.merge_metadata(metadata);
        }
        memory.touch_updated();

        let mut success = true;
        if let Some(adapter) = self.adapter_for(memory.tier) {
            if !adapter.update(&memory).await {
                success = false;
            }
        }
        if let Some(graph) = &self.graph_adapter {
            if !graph.update(&memory).await {
                tracing::warn!(memory_id, "Failed to sync memory to graph store");
            }
        }
        if success {
            tracing::info!(memory_id, "Synced memory");
        }
        success
    }

    /// Append a content delta (newline-joined) and shallow-merge a metadata
    /// delta. Deliberately non-idempotent: applying the same delta twice
    /// appends twice.
    pub async fn incremental_update(
        &self,
        memory_id: &str,
        content_delta: Option<String>,
        metadata_delta: Option<HashMap<String, serde_json::Value>>,
    ) -> bool {
        let Some(mut memory) = self.retrieve_memory(memory_id, None).await else {
            tracing::warn!(memory_id, "Memory not found for incremental update");
            return false;
        };
        if let Some(delta) = content_delta {
            memory.content.push('\n');
            memory.content.push_str(&delta);
        }
        if let Some(delta) = metadata_delta {
            memory.merge_metadata(delta);
        }
        memory.touch_updated();

        let Some(adapter) = self.adapter_for(memory.tier) else {
            return false;
        };
        let success = adapter.update(&memory).await;
        if success {
            if let Some(graph) = &self.graph_adapter {
                if !graph.update(&memory).await {
                    tracing::debug!(memory_id, "Graph mirror update failed");
                }
            }
            tracing::info!(memory_id, "Incrementally updated memory");
        }
        success
    }
}
