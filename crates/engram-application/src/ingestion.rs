//! Two-stage document ingestion.
//!
//! Stage 1 (fast): chunk, embed, upsert with a minimal payload so retrieval
//! is live immediately. Stage 2 (deep, background): generate a document
//! summary, per-chunk contextual headers, and visual-element descriptions,
//! then batch-update the existing points' payloads; ids and vectors are
//! retained. Stage 2 is advisory; stage 1 remains authoritative.

use std::collections::HashMap;
use std::sync::Arc;

use engram_domain::entities::{ChatTurn, MessageRole};
use engram_domain::error::{Error, Result};
use engram_domain::ports::{ChatModelProvider, EmbeddingProvider, VectorStoreProvider};
use engram_domain::utils::{clip, id};
use engram_domain::value_objects::CollectionNaming;

/// One chunk of a document prepared for indexing.
#[derive(Debug, Clone)]
pub struct DocumentChunk {
    /// Chunk text
    pub text: String,
    /// Position within the document
    pub chunk_index: usize,
}

/// A visual element extracted from the document (caption or OCR text).
#[derive(Debug, Clone)]
pub struct VisualElement {
    /// Chunk the element belongs to
    pub chunk_index: usize,
    /// Raw caption / OCR text to describe
    pub raw_text: String,
}

/// Outcome of the fast track.
#[derive(Debug, Clone)]
pub struct Stage1Outcome {
    /// Point ids created, in chunk order
    pub point_ids: Vec<String>,
    /// Collection the points landed in
    pub collection: String,
}

/// Two-track document ingestor.
pub struct DualTrackIngestor {
    vector_store: Arc<dyn VectorStoreProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    model: Option<Arc<dyn ChatModelProvider>>,
    model_name: String,
    collection_naming: CollectionNaming,
    user_collection: String,
}

impl DualTrackIngestor {
    /// Build an ingestor.
    #[must_use]
    pub fn new(
        vector_store: Arc<dyn VectorStoreProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        model: Option<Arc<dyn ChatModelProvider>>,
        model_name: impl Into<String>,
        collection_naming: CollectionNaming,
        user_collection: impl Into<String>,
    ) -> Self {
        Self {
            vector_store,
            embedder,
            model,
            model_name: model_name.into(),
            collection_naming,
            user_collection: user_collection.into(),
        }
    }

    fn collection_for(&self, file_id: &str) -> String {
        match self.collection_naming {
            CollectionNaming::FileBased => format!("file_{file_id}"),
            CollectionNaming::UserBased => self.user_collection.clone(),
        }
    }

    /// Stage 1: embed and upsert with the minimal payload. Retrieval over
    /// the file is live once this returns.
    pub async fn stage1_ingest(
        &self,
        file_id: &str,
        user_id: &str,
        chunks: &[DocumentChunk],
    ) -> Result<Stage1Outcome> {
        if chunks.is_empty() {
            return Err(Error::invalid_argument("No chunks to ingest"));
        }
        let collection = self.collection_for(file_id);
        self.vector_store
            .ensure_collection(&collection, self.embedder.dimensions())
            .await?;

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let mut points = Vec::with_capacity(chunks.len());
        let mut point_ids = Vec::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            let point_id = id::generate();
            let mut payload: HashMap<String, serde_json::Value> = HashMap::new();
            payload.insert(
                "text".to_owned(),
                serde_json::Value::String(chunk.text.clone()),
            );
            payload.insert(
                "chunk_index".to_owned(),
                serde_json::Value::from(chunk.chunk_index),
            );
            payload.insert(
                "file_id".to_owned(),
                serde_json::Value::String(file_id.to_owned()),
            );
            payload.insert(
                "user_id".to_owned(),
                serde_json::Value::String(user_id.to_owned()),
            );
            point_ids.push(point_id.clone());
            points.push(engram_domain::value_objects::VectorPoint {
                id: point_id,
                vector: embedding.vector,
                payload,
            });
        }

        let upserted = self.vector_store.upsert_points(&collection, points).await?;
        tracing::info!(file_id, upserted, collection = %collection, "Stage 1 ingest complete");
        Ok(Stage1Outcome {
            point_ids,
            collection,
        })
    }

    /// Stage 2: enrich existing points with a document summary, contextual
    /// headers, and visual descriptions. Returns false (after logging) on
    /// any failure; the fast track stays authoritative either way.
    pub async fn stage2_enrich(
        &self,
        file_id: &str,
        file_name: &str,
        full_text: &str,
        visuals: &[VisualElement],
    ) -> bool {
        match self
            .stage2_enrich_inner(file_id, file_name, full_text, visuals)
            .await
        {
            Ok(updated) => {
                tracing::info!(file_id, updated, "Stage 2 enrichment complete");
                true
            }
            Err(e) => {
                tracing::warn!(file_id, error = %e, "Stage 2 enrichment failed");
                false
            }
        }
    }

    async fn stage2_enrich_inner(
        &self,
        file_id: &str,
        file_name: &str,
        full_text: &str,
        visuals: &[VisualElement],
    ) -> Result<usize> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::model("No model wired for deep enrichment"))?;

        let summary = self
            .generate(
                model,
                format!(
                    "以下是文件「{file_name}」的內容，請以一段話總結其主題與重點：\n\n{}",
                    clip(full_text, 4000)
                ),
            )
            .await?;

        let mut visual_descriptions: HashMap<usize, String> = HashMap::new();
        for visual in visuals {
            let description = self
                .generate(
                    model,
                    format!(
                        "請用一句話描述以下視覺元素的內容：\n\n{}",
                        clip(&visual.raw_text, 1000)
                    ),
                )
                .await
                .unwrap_or_default();
            if !description.is_empty() {
                visual_descriptions.insert(visual.chunk_index, description);
            }
        }

        let collection = self.collection_for(file_id);
        let mut points = self
            .vector_store
            .fetch_points_by_file(&collection, file_id)
            .await?;
        if points.is_empty() {
            return Err(Error::not_found(format!("points for file {file_id}")));
        }

        for point in &mut points {
            let chunk_text = point
                .payload
                .get("text")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_owned();
            let header = self
                .generate(
                    model,
                    format!(
                        "文件摘要：{summary}\n\n請為下列段落產生一行上下文標題，說明它在整份文件中的位置與作用：\n\n{}",
                        clip(&chunk_text, 1500)
                    ),
                )
                .await
                .unwrap_or_default();

            point.payload.insert(
                "global_summary".to_owned(),
                serde_json::Value::String(summary.clone()),
            );
            if !header.is_empty() {
                point
                    .payload
                    .insert("contextual_header".to_owned(), serde_json::Value::String(header));
            }
            let chunk_index = point
                .payload
                .get("chunk_index")
                .and_then(serde_json::Value::as_u64)
                .map(|v| v as usize);
            if let Some(description) =
                chunk_index.and_then(|idx| visual_descriptions.get(&idx))
            {
                point.payload.insert(
                    "image_description".to_owned(),
                    serde_json::Value::String(description.clone()),
                );
            }
        }

        // Payload-only update: ids and vectors survive.
        self.vector_store.update_payloads(&collection, points).await
    }

    async fn generate(&self, model: &Arc<dyn ChatModelProvider>, prompt: String) -> Result<String> {
        model
            .chat(
                &[ChatTurn::new(MessageRole::User, prompt)],
                &self.model_name,
            )
            .await
    }
}
