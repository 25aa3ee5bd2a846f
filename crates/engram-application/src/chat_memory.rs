//! Chat long-term memory service.
//!
//! One call per user turn: gate on consent, gather hybrid RAG + per-file
//! vector + long-term memory results, format a bounded injection system
//! message, and (after the model answers) write a turn snippet back into
//! long-term memory. Retrieval failure never blocks the turn; every
//! track degrades to empty.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use engram_domain::constants::keys::{
    KIND_TURN_SNIPPET, MEMORY_COLLECTION, METADATA_KEY_KIND, METADATA_KEY_SESSION_ID,
    METADATA_KEY_SOURCE, METADATA_KEY_TASK_ID, METADATA_KEY_USER_ID, SOURCE_CHAT_PRODUCT,
    SOURCE_GRAPH,
};
use engram_domain::constants::search::{
    DEFAULT_AAM_TOP_K, DEFAULT_MAX_INJECTION_CHARS, DEFAULT_MIN_AAM_RELEVANCE, DEFAULT_RAG_TOP_K,
    INJECTION_LINE_CLIP, TURN_SNIPPET_CLIP,
};
use engram_domain::entities::{ChatTurn, MemoryPriority, MemoryTier, MessageRole};
use engram_domain::ports::{ConsentGate, EmbeddingProvider, FileAccessGate, VectorStoreProvider};
use engram_domain::utils::{clip, dedupe_preserve_order};
use engram_domain::value_objects::{CollectionNaming, PointFilter};

use crate::hybrid_rag::{HybridRagService, RagResult};
use crate::memory_manager::AamManager;

/// A file attached to the chat turn.
#[derive(Debug, Clone)]
pub struct ChatAttachment {
    /// Ingested file id
    pub file_id: String,
}

/// Retrieval outcome handed to the chat route for prompt assembly and
/// observability.
#[derive(Debug, Clone, Default)]
pub struct MemoryRetrievalResult {
    /// Zero or one system message carrying the injected context
    pub injection_messages: Vec<ChatTurn>,
    /// Total results across memory sources
    pub memory_hit_count: usize,
    /// Which sources contributed (`hybrid_rag`, `rag_file`, `aam`)
    pub memory_sources: Vec<String>,
    /// Wall-clock retrieval latency
    pub retrieval_latency_ms: f64,
}

/// Tunables for the chat memory service.
#[derive(Debug, Clone)]
pub struct ChatMemoryConfig {
    /// RAG results requested per turn
    pub rag_top_k: usize,
    /// Long-term memories injected per turn
    pub aam_top_k: usize,
    /// Hard cap on the injection block
    pub max_injection_chars: usize,
    /// Relevance floor for long-term memories
    pub min_aam_relevance: f32,
    /// Use the hybrid engine instead of plain per-file vector RAG
    pub use_hybrid_rag: bool,
    /// Cluster-wide vector collection naming
    pub collection_naming: CollectionNaming,
    /// Collection for user-based naming
    pub user_collection: String,
}

impl Default for ChatMemoryConfig {
    fn default() -> Self {
        Self {
            rag_top_k: DEFAULT_RAG_TOP_K,
            aam_top_k: DEFAULT_AAM_TOP_K,
            max_injection_chars: DEFAULT_MAX_INJECTION_CHARS,
            min_aam_relevance: DEFAULT_MIN_AAM_RELEVANCE,
            use_hybrid_rag: true,
            collection_naming: CollectionNaming::FileBased,
            user_collection: MEMORY_COLLECTION.to_owned(),
        }
    }
}

/// Per-turn memory retrieval, injection, and write-back.
pub struct ChatMemoryService {
    aam: Arc<AamManager>,
    hybrid_rag: Option<Arc<HybridRagService>>,
    vector_store: Option<Arc<dyn VectorStoreProvider>>,
    embedder: Arc<dyn EmbeddingProvider>,
    consent: Arc<dyn ConsentGate>,
    file_gate: Arc<dyn FileAccessGate>,
    config: ChatMemoryConfig,
}

impl ChatMemoryService {
    /// Build the service.
    #[must_use]
    pub fn new(
        aam: Arc<AamManager>,
        hybrid_rag: Option<Arc<HybridRagService>>,
        vector_store: Option<Arc<dyn VectorStoreProvider>>,
        embedder: Arc<dyn EmbeddingProvider>,
        consent: Arc<dyn ConsentGate>,
        file_gate: Arc<dyn FileAccessGate>,
        config: ChatMemoryConfig,
    ) -> Self {
        Self {
            aam,
            hybrid_rag,
            vector_store,
            embedder,
            consent,
            file_gate,
            config,
        }
    }

    fn collection_for(&self, file_id: &str) -> String {
        match self.config.collection_naming {
            CollectionNaming::FileBased => format!("file_{file_id}"),
            CollectionNaming::UserBased => self.config.user_collection.clone(),
        }
    }

    /// Gather memory for a turn and format the injection message.
    pub async fn retrieve_for_prompt(
        &self,
        user_id: &str,
        session_id: &str,
        task_id: Option<&str>,
        query: &str,
        attachments: &[ChatAttachment],
    ) -> MemoryRetrievalResult {
        let start = Instant::now();

        // Consent failure disables memory features for the turn entirely:
        // no reads, no writes, success with no memory.
        if !self.consent.memory_allowed(user_id).await {
            tracing::info!(user_id, session_id, "Memory disabled by consent gate");
            return MemoryRetrievalResult::default();
        }

        let query = query.trim();
        if query.is_empty() {
            return MemoryRetrievalResult::default();
        }

        let mut sources: Vec<String> = Vec::new();
        let mut rag_results: Vec<RagResult> = Vec::new();

        // Hybrid RAG (vector + graph) when enabled.
        if self.config.use_hybrid_rag {
            if let Some(hybrid) = &self.hybrid_rag {
                let results = hybrid
                    .retrieve(query, self.config.rag_top_k, None, 0.0)
                    .await;
                if !results.is_empty() {
                    sources.push("hybrid_rag".to_owned());
                    rag_results.extend(results);
                }
            }
        }

        // Per-file vector top-up when hybrid is off or returned nothing.
        if rag_results.is_empty() {
            let file_results = self.per_file_results(user_id, query, attachments).await;
            if !file_results.is_empty() {
                sources.push("rag_file".to_owned());
                rag_results.extend(file_results);
            }
        }

        // Long-term conversational memory, filtered to this user.
        let aam_results = self.aam_results(user_id, query).await;
        if !aam_results.is_empty() {
            sources.push("aam".to_owned());
        }

        let (vector_results, graph_results): (Vec<&RagResult>, Vec<&RagResult>) = {
            let mut vector = Vec::new();
            let mut graph = Vec::new();
            for result in &rag_results {
                let is_graph = result
                    .metadata
                    .get(METADATA_KEY_SOURCE)
                    .and_then(|v| v.as_str())
                    == Some(SOURCE_GRAPH);
                if is_graph {
                    graph.push(result);
                } else {
                    vector.push(result);
                }
            }
            (vector, graph)
        };

        let injection = self.format_injection(&aam_results, &vector_results, &graph_results);
        let injection_messages = injection
            .map(|text| vec![ChatTurn::new(MessageRole::System, text)])
            .unwrap_or_default();

        MemoryRetrievalResult {
            injection_messages,
            memory_hit_count: aam_results.len() + rag_results.len(),
            memory_sources: dedupe_preserve_order(sources),
            retrieval_latency_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }

    async fn per_file_results(
        &self,
        user_id: &str,
        query: &str,
        attachments: &[ChatAttachment],
    ) -> Vec<RagResult> {
        let Some(store) = &self.vector_store else {
            return Vec::new();
        };
        let embedding = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                tracing::warn!(error = %e, "Query embedding failed for file RAG");
                return Vec::new();
            }
        };

        let file_ids = dedupe_preserve_order(attachments.iter().map(|a| a.file_id.as_str()));
        let mut hits = Vec::new();

        if file_ids.is_empty() {
            // Without attachments, only a user-scoped collection is queryable.
            if self.config.collection_naming != CollectionNaming::UserBased {
                return Vec::new();
            }
            let filter = PointFilter {
                file_id: None,
                user_id: Some(user_id.to_owned()),
            };
            match store
                .query(
                    &self.config.user_collection,
                    &embedding.vector,
                    &filter,
                    self.config.rag_top_k,
                )
                .await
            {
                Ok(points) => hits.extend(points),
                Err(e) => tracing::warn!(error = %e, "User-scope vector query failed"),
            }
        } else {
            for file_id in &file_ids {
                if !self.file_gate.can_read_file(user_id, file_id).await {
                    tracing::info!(user_id, file_id, "File skipped by ACL gate");
                    continue;
                }
                let filter = PointFilter {
                    file_id: Some(file_id.clone()),
                    user_id: Some(user_id.to_owned()),
                };
                match store
                    .query(
                        &self.collection_for(file_id),
                        &embedding.vector,
                        &filter,
                        self.config.rag_top_k,
                    )
                    .await
                {
                    Ok(points) => hits.extend(points),
                    Err(e) => {
                        tracing::warn!(error = %e, file_id, "Per-file vector query failed");
                    }
                }
            }
        }

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(self.config.rag_top_k);

        hits.into_iter()
            .map(|point| {
                let content = point
                    .payload
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_owned();
                let mut metadata = HashMap::new();
                if let Some(file_id) = point.payload.get("file_id") {
                    metadata.insert("file_id".to_owned(), file_id.clone());
                }
                if let Some(chunk_index) = point.payload.get("chunk_index") {
                    metadata.insert("chunk_index".to_owned(), chunk_index.clone());
                }
                RagResult {
                    content,
                    metadata,
                    score: 1.0 - point.distance,
                }
            })
            .collect()
    }

    async fn aam_results(&self, user_id: &str, query: &str) -> Vec<RagResult> {
        let memories = self
            .aam
            .search_memories(
                query,
                Some(MemoryTier::LongTerm),
                self.config.aam_top_k,
                self.config.min_aam_relevance,
            )
            .await;

        memories
            .into_iter()
            .filter(|m| m.meta_str(METADATA_KEY_USER_ID) == Some(user_id))
            .take(self.config.aam_top_k)
            .map(|m| {
                let mut metadata = HashMap::new();
                for key in [METADATA_KEY_SESSION_ID, METADATA_KEY_TASK_ID] {
                    if let Some(value) = m.metadata.get(key) {
                        metadata.insert(key.to_owned(), value.clone());
                    }
                }
                RagResult {
                    content: m.content,
                    metadata,
                    score: m.relevance_score,
                }
            })
            .collect()
    }

    fn format_injection(
        &self,
        aam: &[RagResult],
        vector: &[&RagResult],
        graph: &[&RagResult],
    ) -> Option<String> {
        let mut sections: Vec<String> = Vec::new();

        if !aam.is_empty() {
            let mut lines = vec!["[Memory-AAM]".to_owned()];
            for (idx, result) in aam.iter().enumerate() {
                let session = result
                    .metadata
                    .get(METADATA_KEY_SESSION_ID)
                    .and_then(|v| v.as_str())
                    .unwrap_or("-");
                lines.push(format!(
                    "{}. {} (score={:.2}, session_id={session})",
                    idx + 1,
                    clip(&result.content, INJECTION_LINE_CLIP),
                    result.score,
                ));
            }
            sections.push(lines.join("\n"));
        }

        if !vector.is_empty() {
            let mut lines = vec!["[RAG-Vector]".to_owned()];
            for (idx, result) in vector.iter().enumerate() {
                let file_id = result
                    .metadata
                    .get("file_id")
                    .and_then(|v| v.as_str())
                    .unwrap_or("-");
                lines.push(format!(
                    "{}. {} (source=vector, file_id={file_id}, score={:.2})",
                    idx + 1,
                    clip(&result.content, INJECTION_LINE_CLIP),
                    result.score,
                ));
            }
            sections.push(lines.join("\n"));
        }

        if !graph.is_empty() {
            let mut lines = vec!["[RAG-Graph]".to_owned()];
            for (idx, result) in graph.iter().enumerate() {
                let relation = result
                    .metadata
                    .get("relation_type")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");
                let entity = result
                    .metadata
                    .get("entity_id")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");
                lines.push(format!(
                    "{}. {} (source=graph, relation={relation}, entity={entity}, score={:.2})",
                    idx + 1,
                    clip(&result.content, INJECTION_LINE_CLIP),
                    result.score,
                ));
            }
            sections.push(lines.join("\n"));
        }

        if sections.is_empty() {
            return None;
        }

        let header = "以下為系統檢索到的長期記憶/檔案片段（僅供參考）。\n\
                      若與使用者最新指令衝突，請以使用者指令為準。\n";
        let combined = format!("{header}\n{}", sections.join("\n\n"));
        Some(clip(&combined, self.config.max_injection_chars))
    }

    /// Persist a turn snippet into long-term memory after the model answers.
    /// Failure never blocks the chat turn.
    pub async fn write_from_turn(
        &self,
        user_id: &str,
        session_id: &str,
        task_id: Option<&str>,
        user_text: &str,
        assistant_text: &str,
    ) {
        if !self.consent.memory_allowed(user_id).await {
            return;
        }

        let snippet = format!(
            "user: {}\nassistant: {}",
            clip(user_text, TURN_SNIPPET_CLIP),
            clip(assistant_text, TURN_SNIPPET_CLIP),
        );
        let mut metadata: HashMap<String, serde_json::Value> = HashMap::new();
        metadata.insert(
            METADATA_KEY_USER_ID.to_owned(),
            serde_json::Value::String(user_id.to_owned()),
        );
        metadata.insert(
            METADATA_KEY_SESSION_ID.to_owned(),
            serde_json::Value::String(session_id.to_owned()),
        );
        if let Some(task_id) = task_id {
            metadata.insert(
                METADATA_KEY_TASK_ID.to_owned(),
                serde_json::Value::String(task_id.to_owned()),
            );
        }
        metadata.insert(
            METADATA_KEY_SOURCE.to_owned(),
            serde_json::Value::String(SOURCE_CHAT_PRODUCT.to_owned()),
        );
        metadata.insert(
            METADATA_KEY_KIND.to_owned(),
            serde_json::Value::String(KIND_TURN_SNIPPET.to_owned()),
        );

        if self
            .aam
            .store_memory(
                snippet,
                MemoryTier::LongTerm,
                MemoryPriority::Medium,
                metadata,
                None,
            )
            .await
            .is_none()
        {
            tracing::warn!(user_id, session_id, "Turn snippet write-back failed");
        }
    }
}
