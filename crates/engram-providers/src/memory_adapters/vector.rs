//! Embedded long-term memory adapter.
//!
//! In-process reference implementation of the long-term vector tier:
//! records are embedded on write and searched by cosine similarity, with
//! the full extension surface (user isolation, exact match, conflict
//! detection, hotness, archive transitions). Remote vector engines plug in
//! behind the same port.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use engram_domain::constants::keys::{MEMORY_COLLECTION, METADATA_KEY_REVIEW_REASON};
use engram_domain::constants::search::{CONFLICT_SIMILARITY_HIGH, CONFLICT_SIMILARITY_LOW};
use engram_domain::entities::{MemoryRecord, MemoryStatus, MemoryTier, UserMemoryStats};
use engram_domain::ports::{EmbeddingProvider, MemoryStoreAdapter, VectorMemoryAdapter};
use engram_domain::utils::time;
use engram_domain::value_objects::{ConflictAction, MemoryConflict, cosine_similarity};

struct StoredRecord {
    record: MemoryRecord,
    vector: Vec<f32>,
}

/// In-memory long-term adapter with an embedding index.
pub struct EmbeddedMemoryAdapter {
    records: DashMap<String, StoredRecord>,
    embedder: Arc<dyn EmbeddingProvider>,
    collection: String,
}

impl EmbeddedMemoryAdapter {
    /// Create an adapter over the given embedder.
    #[must_use]
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self::with_collection(embedder, MEMORY_COLLECTION)
    }

    /// Create an adapter with an explicit collection label.
    #[must_use]
    pub fn with_collection(
        embedder: Arc<dyn EmbeddingProvider>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            records: DashMap::new(),
            embedder,
            collection: collection.into(),
        }
    }

    /// Collection label this adapter serves.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        match self.embedder.embed(text).await {
            Ok(embedding) => Some(embedding.vector),
            Err(e) => {
                tracing::error!(adapter = "vector", error = %e, "Embedding failed");
                None
            }
        }
    }

    fn matches_status(record: &MemoryRecord, status: Option<MemoryStatus>) -> bool {
        match status {
            Some(wanted) => record.status == wanted,
            // Archived records are never returned by default retrieval.
            None => record.status != MemoryStatus::Archived,
        }
    }
}

#[async_trait]
impl MemoryStoreAdapter for EmbeddedMemoryAdapter {
    async fn store(&self, memory: &MemoryRecord) -> bool {
        if self.records.contains_key(&memory.memory_id) {
            return self.update(memory).await;
        }
        let Some(vector) = self.embed(&memory.content).await else {
            return false;
        };
        self.records.insert(
            memory.memory_id.clone(),
            StoredRecord {
                record: memory.clone(),
                vector,
            },
        );
        tracing::debug!(adapter = "vector", memory_id = %memory.memory_id, "Stored memory");
        true
    }

    async fn retrieve(&self, memory_id: &str) -> Option<MemoryRecord> {
        self.records.get(memory_id).map(|e| e.record.clone())
    }

    async fn update(&self, memory: &MemoryRecord) -> bool {
        if !self.records.contains_key(&memory.memory_id) {
            tracing::warn!(adapter = "vector", memory_id = %memory.memory_id, "Memory not found for update");
            return false;
        }
        let Some(vector) = self.embed(&memory.content).await else {
            return false;
        };
        let mut updated = memory.clone();
        updated.touch_updated();
        self.records.insert(
            memory.memory_id.clone(),
            StoredRecord {
                record: updated,
                vector,
            },
        );
        true
    }

    async fn delete(&self, memory_id: &str) -> bool {
        self.records.remove(memory_id).is_some()
    }

    async fn search(
        &self,
        query: &str,
        tier: Option<MemoryTier>,
        limit: usize,
    ) -> Vec<MemoryRecord> {
        let Some(query_vector) = self.embed(query).await else {
            return Vec::new();
        };
        let mut hits: Vec<MemoryRecord> = self
            .records
            .iter()
            .filter(|e| tier.is_none_or(|t| e.record.tier == t))
            .filter(|e| Self::matches_status(&e.record, None))
            .map(|e| {
                let mut record = e.record.clone();
                record.relevance_score = cosine_similarity(&query_vector, &e.vector).max(0.0);
                record
            })
            .collect();
        hits.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        hits
    }

    fn adapter_name(&self) -> &str {
        "vector"
    }
}

#[async_trait]
impl VectorMemoryAdapter for EmbeddedMemoryAdapter {
    async fn search_entities(
        &self,
        query: &str,
        user_id: &str,
        entity_type: Option<&str>,
        status: Option<MemoryStatus>,
        min_confidence: f32,
        limit: usize,
    ) -> Vec<MemoryRecord> {
        let Some(query_vector) = self.embed(query).await else {
            return Vec::new();
        };
        let mut hits: Vec<MemoryRecord> = self
            .records
            .iter()
            .filter(|e| e.record.user_id == user_id)
            .filter(|e| entity_type.is_none_or(|t| e.record.entity_type == t))
            .filter(|e| Self::matches_status(&e.record, status))
            .filter(|e| e.record.confidence >= min_confidence)
            .map(|e| {
                let mut record = e.record.clone();
                record.relevance_score = cosine_similarity(&query_vector, &e.vector).max(0.0);
                record
            })
            .collect();
        hits.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        hits
    }

    async fn find_by_exact_match(
        &self,
        user_id: &str,
        entity_type: &str,
        entity_value: &str,
    ) -> Option<MemoryRecord> {
        self.records
            .iter()
            .find(|e| {
                e.record.user_id == user_id
                    && e.record.entity_type == entity_type
                    && e.record.entity_value == entity_value
                    && e.record.status == MemoryStatus::Active
            })
            .map(|e| e.record.clone())
    }

    async fn get_user_entities(
        &self,
        user_id: &str,
        entity_type: Option<&str>,
        status: Option<MemoryStatus>,
        limit: usize,
    ) -> Vec<MemoryRecord> {
        self.records
            .iter()
            // Empty user_id is the admin escape hatch listing every user.
            .filter(|e| user_id.is_empty() || e.record.user_id == user_id)
            .filter(|e| entity_type.is_none_or(|t| e.record.entity_type == t))
            .filter(|e| status.is_none_or(|s| e.record.status == s))
            .take(limit)
            .map(|e| e.record.clone())
            .collect()
    }

    async fn detect_conflicts(
        &self,
        user_id: &str,
        entity_type: &str,
        new_value: &str,
        new_confidence: f32,
    ) -> Vec<MemoryConflict> {
        let existing = self
            .get_user_entities(user_id, Some(entity_type), Some(MemoryStatus::Active), 50)
            .await;
        if existing.is_empty() {
            return Vec::new();
        }
        let Some(new_vector) = self.embed(new_value).await else {
            return Vec::new();
        };

        let mut conflicts = Vec::new();
        for record in existing {
            let Some(stored) = self.records.get(&record.memory_id) else {
                continue;
            };
            let similarity = cosine_similarity(&new_vector, &stored.vector);
            drop(stored);
            if similarity > CONFLICT_SIMILARITY_LOW && similarity < CONFLICT_SIMILARITY_HIGH {
                let suggested_action = if new_confidence > record.confidence {
                    ConflictAction::Overwrite
                } else {
                    ConflictAction::Ignore
                };
                conflicts.push(MemoryConflict {
                    existing: record,
                    new_confidence,
                    similarity,
                    suggested_action,
                });
            }
        }
        conflicts
    }

    async fn update_access(&self, memory_id: &str) -> bool {
        match self.records.get_mut(memory_id) {
            Some(mut entry) => {
                entry.record.touch_access();
                true
            }
            None => false,
        }
    }

    async fn find_low_hotness(
        &self,
        user_id: &str,
        max_access: u64,
        older_than_days: i64,
    ) -> Vec<MemoryRecord> {
        let cutoff = time::days_ago(older_than_days);
        self.records
            .iter()
            .filter(|e| e.record.user_id == user_id)
            .filter(|e| e.record.status == MemoryStatus::Active)
            .filter(|e| e.record.created_at < cutoff)
            .filter(|e| e.record.access_count <= max_access)
            .map(|e| e.record.clone())
            .collect()
    }

    async fn archive(&self, memory_id: &str) -> bool {
        match self.records.get_mut(memory_id) {
            Some(mut entry) => {
                entry.record.status = MemoryStatus::Archived;
                entry.record.touch_updated();
                true
            }
            None => false,
        }
    }

    async fn mark_for_review(&self, memory_id: &str, reason: &str) -> bool {
        match self.records.get_mut(memory_id) {
            Some(mut entry) => {
                entry.record.status = MemoryStatus::Review;
                entry.record.metadata.insert(
                    METADATA_KEY_REVIEW_REASON.to_owned(),
                    serde_json::Value::String(reason.to_owned()),
                );
                entry.record.touch_updated();
                true
            }
            None => false,
        }
    }

    async fn user_stats(&self, user_id: &str) -> UserMemoryStats {
        let mut stats = UserMemoryStats::default();
        let mut confidence_sum = 0.0_f32;
        let mut by_entity_type: HashMap<String, usize> = HashMap::new();
        let mut by_status: HashMap<String, usize> = HashMap::new();

        for entry in self.records.iter() {
            if !user_id.is_empty() && entry.record.user_id != user_id {
                continue;
            }
            stats.total_count += 1;
            *by_entity_type
                .entry(entry.record.entity_type.clone())
                .or_default() += 1;
            *by_status
                .entry(entry.record.status.as_str().to_owned())
                .or_default() += 1;
            confidence_sum += entry.record.confidence;
            stats.total_access_count += entry.record.access_count;
        }

        if stats.total_count > 0 {
            stats.avg_confidence = confidence_sum / stats.total_count as f32;
        }
        stats.by_entity_type = by_entity_type;
        stats.by_status = by_status;
        stats
    }

    async fn list_user_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .records
            .iter()
            .filter(|e| !e.record.user_id.is_empty())
            .map(|e| e.record.user_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use engram_domain::registry::vector_memory::{
    VECTOR_MEMORY_ADAPTERS, VectorMemoryConfig, VectorMemoryEntry,
};

/// Factory building the embedded adapter with a self-contained lexical
/// embedder. The composition root swaps in a shared embedding provider via
/// [`EmbeddedMemoryAdapter::with_collection`] when one is configured.
fn embedded_memory_factory(
    config: &VectorMemoryConfig,
) -> std::result::Result<Arc<dyn VectorMemoryAdapter>, String> {
    let dimensions = config.dimensions.unwrap_or(384);
    let embedder = Arc::new(crate::embedding::LexicalEmbeddingProvider::new(dimensions));
    let collection = config
        .collection
        .clone()
        .unwrap_or_else(|| MEMORY_COLLECTION.to_owned());
    Ok(Arc::new(EmbeddedMemoryAdapter::with_collection(
        embedder, collection,
    )))
}

#[linkme::distributed_slice(VECTOR_MEMORY_ADAPTERS)]
static EMBEDDED_MEMORY_ADAPTER: VectorMemoryEntry = VectorMemoryEntry {
    name: "memory",
    description: "In-process embedded vector memory adapter",
    build: embedded_memory_factory,
};
