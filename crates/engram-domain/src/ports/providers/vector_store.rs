//! Point-level vector store port (Qdrant-style).
//!
//! Used by document ingestion and per-file RAG. Payload updates retain
//! existing point ids and vectors, which is what lets the two-stage
//! ingestion enrich points without re-embedding.
#![allow(missing_docs)]

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::{PointFilter, ScoredPoint, VectorPoint};

#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    async fn ensure_collection(&self, collection: &str, dimensions: usize) -> Result<()>;

    async fn upsert_points(&self, collection: &str, points: Vec<VectorPoint>) -> Result<usize>;

    /// Similarity query; results are sorted by ascending distance.
    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        filter: &PointFilter,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>>;

    /// Fetch all points belonging to one file, payload and vector included.
    async fn fetch_points_by_file(
        &self,
        collection: &str,
        file_id: &str,
    ) -> Result<Vec<VectorPoint>>;

    /// Replace payloads of existing points; ids and vectors are preserved.
    async fn update_payloads(&self, collection: &str, points: Vec<VectorPoint>) -> Result<usize>;

    /// Delete all points of one file within one user's scope.
    async fn delete_by_file(&self, collection: &str, file_id: &str, user_id: &str)
        -> Result<usize>;
}
