//! In-memory graph/document adapter.
//!
//! Shadow memory documents live in a document table keyed by `memory_id`;
//! entities and relations live in arena-style tables keyed by `_key`-like
//! strings and are looked up on demand. Edges form cycles, so nothing here
//! holds owning references across the tables.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use engram_domain::entities::{
    GraphEntity, GraphRelation, MemoryRecord, MemoryStatus, MemoryTier, NeighborRecord,
    SubgraphPath,
};
use engram_domain::ports::{GraphMemoryAdapter, MemoryStoreAdapter};

/// In-memory graph store with a shadow document table.
#[derive(Default)]
pub struct InMemoryGraphAdapter {
    documents: DashMap<String, MemoryRecord>,
    entities: DashMap<String, GraphEntity>,
    relations: std::sync::RwLock<Vec<GraphRelation>>,
}

impl InMemoryGraphAdapter {
    /// Create an empty adapter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn relations_snapshot(&self) -> Vec<GraphRelation> {
        self.relations.read().map(|r| r.clone()).unwrap_or_default()
    }

    fn entity(&self, key: &str) -> Option<GraphEntity> {
        self.entities.get(key).map(|e| e.clone())
    }

    fn collect_paths(
        &self,
        relations: &[GraphRelation],
        current_key: &str,
        vertices: Vec<GraphEntity>,
        edges: Vec<GraphRelation>,
        depth_left: usize,
        out: &mut Vec<SubgraphPath>,
        limit: usize,
    ) {
        if out.len() >= limit || depth_left == 0 {
            return;
        }
        for rel in relations {
            if rel.from != current_key && rel.to != current_key {
                continue;
            }
            let next_key = rel.other_end(current_key);
            if vertices.iter().any(|v| v.key == next_key) {
                continue;
            }
            let Some(next) = self.entity(next_key) else {
                continue;
            };
            let mut path_vertices = vertices.clone();
            let mut path_edges = edges.clone();
            path_vertices.push(next);
            path_edges.push(rel.clone());
            out.push(SubgraphPath {
                vertices: path_vertices.clone(),
                relations: path_edges.clone(),
            });
            if out.len() >= limit {
                return;
            }
            self.collect_paths(
                relations,
                next_key,
                path_vertices,
                path_edges,
                depth_left - 1,
                out,
                limit,
            );
        }
    }
}

#[async_trait]
impl MemoryStoreAdapter for InMemoryGraphAdapter {
    async fn store(&self, memory: &MemoryRecord) -> bool {
        self.documents
            .insert(memory.memory_id.clone(), memory.clone());
        tracing::debug!(adapter = "graph", memory_id = %memory.memory_id, "Stored memory document");
        true
    }

    async fn retrieve(&self, memory_id: &str) -> Option<MemoryRecord> {
        self.documents.get(memory_id).map(|e| e.clone())
    }

    async fn update(&self, memory: &MemoryRecord) -> bool {
        if !self.documents.contains_key(&memory.memory_id) {
            return false;
        }
        let mut updated = memory.clone();
        updated.touch_updated();
        self.documents.insert(memory.memory_id.clone(), updated);
        true
    }

    async fn delete(&self, memory_id: &str) -> bool {
        self.documents.remove(memory_id).is_some()
    }

    async fn search(
        &self,
        query: &str,
        tier: Option<MemoryTier>,
        limit: usize,
    ) -> Vec<MemoryRecord> {
        let needle = query.to_lowercase();
        self.documents
            .iter()
            .filter(|e| tier.is_none_or(|t| e.tier == t))
            .filter(|e| e.status != MemoryStatus::Archived)
            .filter(|e| e.content.to_lowercase().contains(&needle))
            .take(limit)
            .map(|e| e.clone())
            .collect()
    }

    fn adapter_name(&self) -> &str {
        "graph"
    }
}

#[async_trait]
impl GraphMemoryAdapter for InMemoryGraphAdapter {
    async fn upsert_entity(&self, entity: &GraphEntity) -> bool {
        self.entities.insert(entity.key.clone(), entity.clone());
        true
    }

    async fn upsert_relation(&self, relation: &GraphRelation) -> bool {
        match self.relations.write() {
            Ok(mut relations) => {
                relations.push(relation.clone());
                true
            }
            Err(e) => {
                tracing::error!(adapter = "graph", error = %e, "Relation table poisoned");
                false
            }
        }
    }

    async fn find_entities_by_text(
        &self,
        text: &str,
        entity_type: Option<&str>,
        limit: usize,
    ) -> Vec<GraphEntity> {
        let lowered = text.to_lowercase();
        self.entities
            .iter()
            .filter(|e| entity_type.is_none_or(|t| e.entity_type == t))
            .filter(|e| {
                e.name == text
                    || e.name.contains(text)
                    || e.name.to_lowercase().contains(&lowered)
            })
            .take(limit)
            .map(|e| e.clone())
            .collect()
    }

    async fn neighbors(&self, entity_key: &str, limit: usize) -> Vec<NeighborRecord> {
        let Some(anchor) = self.entity(entity_key) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for rel in self.relations_snapshot() {
            if out.len() >= limit {
                break;
            }
            if rel.from != entity_key && rel.to != entity_key {
                continue;
            }
            let Some(neighbor) = self.entity(rel.other_end(entity_key)) else {
                continue;
            };
            out.push(NeighborRecord {
                anchor: anchor.clone(),
                relation: rel,
                neighbor,
            });
        }
        out
    }

    async fn subgraph(
        &self,
        entity_key: &str,
        max_depth: usize,
        limit: usize,
    ) -> Vec<SubgraphPath> {
        let Some(anchor) = self.entity(entity_key) else {
            return Vec::new();
        };
        let relations = self.relations_snapshot();
        let mut out = Vec::new();
        self.collect_paths(
            &relations,
            entity_key,
            vec![anchor],
            Vec::new(),
            max_depth,
            &mut out,
            limit,
        );
        out
    }

    async fn delete_entities_by_file(&self, file_id: &str) -> usize {
        let keys: Vec<String> = self
            .entities
            .iter()
            .filter(|e| e.references_file(file_id))
            .map(|e| e.key.clone())
            .collect();
        for key in &keys {
            self.entities.remove(key);
        }
        keys.len()
    }

    async fn delete_relations_by_file(&self, file_id: &str) -> usize {
        match self.relations.write() {
            Ok(mut relations) => {
                let before = relations.len();
                relations.retain(|r| r.file_id.as_deref() != Some(file_id));
                before - relations.len()
            }
            Err(e) => {
                tracing::error!(adapter = "graph", error = %e, "Relation table poisoned");
                0
            }
        }
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use engram_domain::registry::graph_memory::{
    GRAPH_MEMORY_ADAPTERS, GraphMemoryConfig, GraphMemoryEntry,
};

fn memory_graph_factory(
    _config: &GraphMemoryConfig,
) -> std::result::Result<Arc<dyn GraphMemoryAdapter>, String> {
    Ok(Arc::new(InMemoryGraphAdapter::new()))
}

#[linkme::distributed_slice(GRAPH_MEMORY_ADAPTERS)]
static MEMORY_GRAPH_ADAPTER: GraphMemoryEntry = GraphMemoryEntry {
    name: "memory",
    description: "In-process graph and document store",
    build: memory_graph_factory,
};
