//! Storage adapter ports; the uniform C1 contract plus tier extensions.
//!
//! Adapters absorb transient back-end failures: they log and degrade to
//! `false` / `None` / empty instead of surfacing errors, and the layer above
//! decides what to do. This is the boundary where the degrade-don't-fail
//! contract of the platform is enforced.
#![allow(missing_docs)]

use async_trait::async_trait;

use crate::entities::{
    GraphEntity, GraphRelation, MemoryRecord, MemoryStatus, MemoryTier, NeighborRecord,
    SubgraphPath, UserMemoryStats,
};
use crate::value_objects::MemoryConflict;

/// Uniform CRUD + search surface over one storage tier.
#[async_trait]
pub trait MemoryStoreAdapter: Send + Sync {
    /// Persist a record. Returns false on failure.
    async fn store(&self, memory: &MemoryRecord) -> bool;

    /// Fetch a record by id.
    async fn retrieve(&self, memory_id: &str) -> Option<MemoryRecord>;

    /// Replace a record. Returns false when missing or on failure.
    async fn update(&self, memory: &MemoryRecord) -> bool;

    /// Remove a record. Returns false when missing or on failure.
    async fn delete(&self, memory_id: &str) -> bool;

    /// Scored content search. The KV tier intentionally returns empty:
    /// search must go through the vector or graph adapter.
    async fn search(&self, query: &str, tier: Option<MemoryTier>, limit: usize)
        -> Vec<MemoryRecord>;

    /// Adapter name for logs
    fn adapter_name(&self) -> &str;
}

/// Extension surface of the long-term vector adapter.
#[async_trait]
pub trait VectorMemoryAdapter: MemoryStoreAdapter {
    /// User-isolated typed search. Every call filters on `user_id`; archived
    /// records are excluded unless `status` asks for them explicitly.
    async fn search_entities(
        &self,
        query: &str,
        user_id: &str,
        entity_type: Option<&str>,
        status: Option<MemoryStatus>,
        min_confidence: f32,
        limit: usize,
    ) -> Vec<MemoryRecord>;

    /// Exact lookup on `(user_id, entity_type, entity_value, active)`.
    async fn find_by_exact_match(
        &self,
        user_id: &str,
        entity_type: &str,
        entity_value: &str,
    ) -> Option<MemoryRecord>;

    /// Enumerate a user's records, optionally filtered by type and status.
    /// An empty `user_id` is the admin escape hatch listing every user.
    async fn get_user_entities(
        &self,
        user_id: &str,
        entity_type: Option<&str>,
        status: Option<MemoryStatus>,
        limit: usize,
    ) -> Vec<MemoryRecord>;

    /// Compare a candidate fact against stored active records of the same
    /// type; similarity strictly inside (0.85, 1.0) is a conflict.
    async fn detect_conflicts(
        &self,
        user_id: &str,
        entity_type: &str,
        new_value: &str,
        new_confidence: f32,
    ) -> Vec<MemoryConflict>;

    /// Bump access counter and timestamp on a stored record.
    async fn update_access(&self, memory_id: &str) -> bool;

    /// Active records with `access_count <= max_access` created before
    /// `older_than_days` ago.
    async fn find_low_hotness(
        &self,
        user_id: &str,
        max_access: u64,
        older_than_days: i64,
    ) -> Vec<MemoryRecord>;

    /// Transition a record to `Archived`.
    async fn archive(&self, memory_id: &str) -> bool;

    /// Transition a record to `Review`, recording the reason in metadata.
    async fn mark_for_review(&self, memory_id: &str, reason: &str) -> bool;

    /// Aggregate statistics for one user.
    async fn user_stats(&self, user_id: &str) -> UserMemoryStats;

    /// Distinct user ids present in the store.
    async fn list_user_ids(&self) -> Vec<String>;
}

/// Extension surface of the graph/document adapter.
#[async_trait]
pub trait GraphMemoryAdapter: MemoryStoreAdapter {
    /// Insert or replace an entity node by key.
    async fn upsert_entity(&self, entity: &GraphEntity) -> bool;

    /// Insert a relation edge.
    async fn upsert_relation(&self, relation: &GraphRelation) -> bool;

    /// Text match over entity names: exact, prefix-contained, and
    /// case-insensitive substring, optionally filtered by type.
    async fn find_entities_by_text(
        &self,
        text: &str,
        entity_type: Option<&str>,
        limit: usize,
    ) -> Vec<GraphEntity>;

    /// 1-hop neighbours of an entity.
    async fn neighbors(&self, entity_key: &str, limit: usize) -> Vec<NeighborRecord>;

    /// Paths from an entity up to `max_depth` hops.
    async fn subgraph(&self, entity_key: &str, max_depth: usize, limit: usize)
        -> Vec<SubgraphPath>;

    /// Remove every entity referencing a file. Returns removed count.
    async fn delete_entities_by_file(&self, file_id: &str) -> usize;

    /// Remove every relation referencing a file. Returns removed count.
    async fn delete_relations_by_file(&self, file_id: &str) -> usize;
}
