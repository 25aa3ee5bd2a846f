//! In-memory point-level vector store.
//!
//! Reference implementation of the Qdrant-style point surface used by
//! document ingestion and per-file RAG. Payload updates preserve ids and
//! vectors, which the two-stage ingestion relies on.

use async_trait::async_trait;
use dashmap::DashMap;
use engram_domain::error::{Error, Result};
use engram_domain::ports::VectorStoreProvider;
use engram_domain::value_objects::{PointFilter, ScoredPoint, VectorPoint, cosine_similarity};

/// Point store keyed by collection name.
#[derive(Default)]
pub struct InMemoryVectorStore {
    collections: DashMap<String, DashMap<String, VectorPoint>>,
}

impl InMemoryVectorStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn payload_matches(point: &VectorPoint, filter: &PointFilter) -> bool {
        if let Some(file_id) = &filter.file_id {
            if point.payload.get("file_id").and_then(|v| v.as_str()) != Some(file_id.as_str()) {
                return false;
            }
        }
        if let Some(user_id) = &filter.user_id {
            if point.payload.get("user_id").and_then(|v| v.as_str()) != Some(user_id.as_str()) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl VectorStoreProvider for InMemoryVectorStore {
    async fn ensure_collection(&self, collection: &str, _dimensions: usize) -> Result<()> {
        self.collections.entry(collection.to_owned()).or_default();
        Ok(())
    }

    async fn upsert_points(&self, collection: &str, points: Vec<VectorPoint>) -> Result<usize> {
        let coll = self.collections.entry(collection.to_owned()).or_default();
        let count = points.len();
        for point in points {
            coll.insert(point.id.clone(), point);
        }
        Ok(count)
    }

    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        filter: &PointFilter,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let Some(coll) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut hits: Vec<ScoredPoint> = coll
            .iter()
            .filter(|p| Self::payload_matches(p, filter))
            .map(|p| ScoredPoint {
                id: p.id.clone(),
                // Cosine distance keeps "smaller is closer" semantics.
                distance: 1.0 - cosine_similarity(vector, &p.vector),
                payload: p.payload.clone(),
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn fetch_points_by_file(
        &self,
        collection: &str,
        file_id: &str,
    ) -> Result<Vec<VectorPoint>> {
        let Some(coll) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };
        let filter = PointFilter {
            file_id: Some(file_id.to_owned()),
            user_id: None,
        };
        Ok(coll
            .iter()
            .filter(|p| Self::payload_matches(p, &filter))
            .map(|p| p.clone())
            .collect())
    }

    async fn update_payloads(&self, collection: &str, points: Vec<VectorPoint>) -> Result<usize> {
        let coll = self
            .collections
            .get(collection)
            .ok_or_else(|| Error::vector_store(format!("Unknown collection: {collection}")))?;
        let mut updated = 0;
        for incoming in points {
            if let Some(mut existing) = coll.get_mut(&incoming.id) {
                // Ids and vectors survive; only the payload is replaced.
                existing.payload = incoming.payload;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete_by_file(
        &self,
        collection: &str,
        file_id: &str,
        user_id: &str,
    ) -> Result<usize> {
        let Some(coll) = self.collections.get(collection) else {
            return Ok(0);
        };
        let filter = PointFilter {
            file_id: Some(file_id.to_owned()),
            user_id: Some(user_id.to_owned()),
        };
        let ids: Vec<String> = coll
            .iter()
            .filter(|p| Self::payload_matches(p, &filter))
            .map(|p| p.id.clone())
            .collect();
        for id in &ids {
            coll.remove(id);
        }
        Ok(ids.len())
    }
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorStore")
            .field("collections", &self.collections.len())
            .finish()
    }
}
