//! Hybrid RAG engine.
//!
//! Combines the dense vector track (real-time retrieval) with a graph
//! track: entity extraction → entity/keyword matching in the graph store →
//! neighbour and subgraph traversal → pseudo-memory formatting. Results of
//! both tracks are merged with configurable weights.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::RwLock;
use std::time::Instant;

use engram_domain::constants::keys::{
    METADATA_KEY_ENTITY_ID, METADATA_KEY_FILE_ID, METADATA_KEY_RELATION_TYPE, METADATA_KEY_SOURCE,
    SOURCE_GRAPH,
};
use engram_domain::constants::retry::TRACK_TIMEOUT;
use engram_domain::constants::search::{
    DEFAULT_GRAPH_WEIGHT, DEFAULT_VECTOR_WEIGHT, GRAPH_PATH_RELEVANCE, GRAPH_TRIPLE_MATCH_RELEVANCE,
    GRAPH_TRIPLE_RELEVANCE, KEYWORD_LIMIT, NEIGHBOR_LIMIT, SUBGRAPH_LIMIT, SUBGRAPH_MAX_DEPTH,
};
use engram_domain::entities::{
    GraphEntity, MemoryPriority, MemoryRecord, MemoryTier,
};
use engram_domain::ports::NerProvider;
use engram_domain::utils::clip;
use engram_domain::value_objects::{ExtractedEntity, RetrievalStrategy};
use once_cell::sync::Lazy;

use crate::memory_manager::AamManager;
use crate::retrieval::RealtimeRetrievalService;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "的", "和", "与", "及", "或", "是", "在", "有", "为", "了", "就", "也", "都", "还", "又",
        "但", "而", "如果", "因为", "所以",
    ]
    .into_iter()
    .collect()
});

/// One formatted retrieval result ready for prompt assembly.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RagResult {
    /// Result text
    pub content: String,
    /// Provenance metadata (`source`, entity/relation ids, file id, …)
    pub metadata: HashMap<String, serde_json::Value>,
    /// Fused relevance score
    pub score: f32,
}

/// Hybrid retrieval over vector and graph tracks.
pub struct HybridRagService {
    aam: Arc<AamManager>,
    retrieval: Arc<RealtimeRetrievalService>,
    ner: Arc<dyn NerProvider>,
    strategy: RwLock<RetrievalStrategy>,
    weights: RwLock<(f32, f32)>,
}

impl HybridRagService {
    /// Build the engine with default strategy and weights.
    #[must_use]
    pub fn new(
        aam: Arc<AamManager>,
        retrieval: Arc<RealtimeRetrievalService>,
        ner: Arc<dyn NerProvider>,
    ) -> Self {
        Self {
            aam,
            retrieval,
            ner,
            strategy: RwLock::new(RetrievalStrategy::Hybrid),
            weights: RwLock::new((DEFAULT_VECTOR_WEIGHT, DEFAULT_GRAPH_WEIGHT)),
        }
    }

    /// Current `(vector, graph)` weights.
    #[must_use]
    pub fn weights(&self) -> (f32, f32) {
        self.weights
            .read()
            .map(|w| *w)
            .unwrap_or((DEFAULT_VECTOR_WEIGHT, DEFAULT_GRAPH_WEIGHT))
    }

    /// Replace the weights, renormalising to sum 1.
    pub fn update_weights(&self, vector_weight: f32, graph_weight: f32) {
        let total = vector_weight + graph_weight;
        if total <= 0.0 {
            return;
        }
        if let Ok(mut weights) = self.weights.write() {
            *weights = (vector_weight / total, graph_weight / total);
            tracing::info!(
                vector_weight = weights.0,
                graph_weight = weights.1,
                "Updated retrieval weights"
            );
        }
    }

    /// Replace the default strategy.
    pub fn update_strategy(&self, strategy: RetrievalStrategy) {
        if let Ok(mut current) = self.strategy.write() {
            *current = strategy;
            tracing::info!(strategy = strategy.as_str(), "Updated retrieval strategy");
        }
    }

    /// Run hybrid retrieval, returning raw memory records.
    pub async fn retrieve_records(
        &self,
        query: &str,
        top_k: usize,
        strategy: Option<RetrievalStrategy>,
        min_relevance: f32,
    ) -> Vec<MemoryRecord> {
        let start = Instant::now();
        let strategy = strategy.unwrap_or_else(|| {
            self.strategy
                .read()
                .map(|s| *s)
                .unwrap_or(RetrievalStrategy::Hybrid)
        });

        let results = match strategy {
            RetrievalStrategy::VectorFirst => {
                self.vector_first(query, top_k, min_relevance).await
            }
            RetrievalStrategy::GraphFirst => self.graph_first(query, top_k, min_relevance).await,
            RetrievalStrategy::Hybrid => self.hybrid(query, top_k, min_relevance).await,
        };

        tracing::info!(
            query = %clip(query, 50),
            count = results.len(),
            strategy = strategy.as_str(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Hybrid RAG retrieval completed"
        );
        results
    }

    /// Run hybrid retrieval and format for prompt assembly.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        strategy: Option<RetrievalStrategy>,
        min_relevance: f32,
    ) -> Vec<RagResult> {
        self.retrieve_records(query, top_k, strategy, min_relevance)
            .await
            .into_iter()
            .map(|memory| {
                let mut metadata = memory.metadata.clone();
                metadata.insert(
                    "memory_id".to_owned(),
                    serde_json::Value::String(memory.memory_id.clone()),
                );
                metadata.insert(
                    "memory_tier".to_owned(),
                    serde_json::Value::String(memory.tier.as_str().to_owned()),
                );
                RagResult {
                    content: memory.content,
                    metadata,
                    score: memory.relevance_score,
                }
            })
            .collect()
    }

    async fn vector_first(
        &self,
        query: &str,
        top_k: usize,
        min_relevance: f32,
    ) -> Vec<MemoryRecord> {
        let mut results = self
            .retrieval
            .retrieve(query, None, None, top_k, min_relevance, true)
            .await;
        if results.len() < top_k {
            results.extend(self.graph_track(query, top_k - results.len()).await);
        }
        results.truncate(top_k);
        results
    }

    async fn graph_first(
        &self,
        query: &str,
        top_k: usize,
        min_relevance: f32,
    ) -> Vec<MemoryRecord> {
        let mut results = self.graph_track(query, top_k).await;
        if results.len() < top_k {
            let backfill = self
                .retrieval
                .retrieve(
                    query,
                    None,
                    None,
                    top_k - results.len(),
                    min_relevance,
                    true,
                )
                .await;
            results.extend(backfill);
        }
        results.truncate(top_k);
        results
    }

    async fn hybrid(&self, query: &str, top_k: usize, min_relevance: f32) -> Vec<MemoryRecord> {
        // Both tracks request 2·top_k under a 5 s per-track budget; a
        // timed-out track yields empty and never aborts the other.
        let vector = async {
            match tokio::time::timeout(
                TRACK_TIMEOUT,
                self.retrieval
                    .retrieve(query, None, None, top_k * 2, min_relevance, true),
            )
            .await
            {
                Ok(results) => results,
                Err(_) => {
                    tracing::error!(track = "vector", "Track timed out");
                    Vec::new()
                }
            }
        };
        let graph = async {
            match tokio::time::timeout(TRACK_TIMEOUT, self.graph_track(query, top_k * 2)).await {
                Ok(results) => results,
                Err(_) => {
                    tracing::error!(track = "graph", "Track timed out");
                    Vec::new()
                }
            }
        };
        let (vector_results, graph_results) = tokio::join!(vector, graph);
        self.merge_results(vector_results, graph_results, top_k)
    }

    // ------------------------------------------------------------------
    // Graph track
    // ------------------------------------------------------------------

    async fn graph_track(&self, query: &str, limit: usize) -> Vec<MemoryRecord> {
        let Some(graph) = self.aam.graph_adapter() else {
            return Vec::new();
        };

        let entities = match self.ner.extract_entities(query).await {
            Ok(entities) => entities,
            Err(e) => {
                tracing::warn!(error = %e, "Entity extraction failed");
                return Vec::new();
            }
        };
        if entities.is_empty() {
            tracing::debug!(query = %clip(query, 50), "No entities found in query");
            return Vec::new();
        }

        let matched = self.match_entities(&*graph, &entities, limit * 2).await;
        if matched.is_empty() {
            tracing::debug!(query = %clip(query, 50), "No matching entities found in graph");
            return Vec::new();
        }

        let mut memories = Vec::new();
        let mut seen_triples: HashSet<String> = HashSet::new();
        let query_lower = query.to_lowercase();

        for entity in matched.iter().take(limit) {
            let neighbors = graph.neighbors(&entity.key, NEIGHBOR_LIMIT.min(limit)).await;
            for record in neighbors {
                let triple = format!(
                    "{}|{}|{}",
                    record.anchor.name, record.relation.relation_type, record.neighbor.name
                );
                if !seen_triples.insert(triple) {
                    continue;
                }
                let relevance = if record.anchor.name.to_lowercase().contains(&query_lower)
                    || record.neighbor.name.to_lowercase().contains(&query_lower)
                {
                    GRAPH_TRIPLE_MATCH_RELEVANCE
                } else {
                    GRAPH_TRIPLE_RELEVANCE
                };
                let content = format!(
                    "{} - {} - {}",
                    record.anchor.name, record.relation.relation_type, record.neighbor.name
                );
                let mut memory = MemoryRecord::new(content, MemoryTier::LongTerm)
                    .with_priority(MemoryPriority::Medium)
                    .with_meta(
                        METADATA_KEY_SOURCE.to_owned(),
                        serde_json::Value::String(SOURCE_GRAPH.to_owned()),
                    )
                    .with_meta(
                        METADATA_KEY_ENTITY_ID.to_owned(),
                        serde_json::Value::String(record.anchor.key.clone()),
                    )
                    .with_meta(
                        METADATA_KEY_RELATION_TYPE.to_owned(),
                        serde_json::Value::String(record.relation.relation_type.clone()),
                    );
                if let Some(file_id) = &record.anchor.file_id {
                    memory = memory.with_meta(
                        METADATA_KEY_FILE_ID.to_owned(),
                        serde_json::Value::String(file_id.clone()),
                    );
                }
                memory.relevance_score = relevance;
                memories.push(memory);
            }

            if memories.len() < limit {
                let remaining = (limit - memories.len()).min(SUBGRAPH_LIMIT);
                let paths = graph
                    .subgraph(&entity.key, SUBGRAPH_MAX_DEPTH, remaining)
                    .await;
                for path in paths {
                    let content = path.render();
                    if content.is_empty() || !seen_triples.insert(content.clone()) {
                        continue;
                    }
                    let mut memory = MemoryRecord::new(content, MemoryTier::LongTerm)
                        .with_priority(MemoryPriority::Medium)
                        .with_meta(
                            METADATA_KEY_SOURCE.to_owned(),
                            serde_json::Value::String(SOURCE_GRAPH.to_owned()),
                        )
                        .with_meta(
                            "path_length".to_owned(),
                            serde_json::Value::from(path.vertices.len()),
                        );
                    if let Some(file_id) = path.vertices.first().and_then(|v| v.file_id.clone()) {
                        memory = memory.with_meta(
                            METADATA_KEY_FILE_ID.to_owned(),
                            serde_json::Value::String(file_id),
                        );
                    }
                    memory.relevance_score = GRAPH_PATH_RELEVANCE;
                    memories.push(memory);
                }
            }

            if memories.len() >= limit {
                break;
            }
        }

        memories.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        memories.truncate(limit);

        tracing::info!(
            query = %clip(query, 50),
            entities_extracted = entities.len(),
            matched_entities = matched.len(),
            memories = memories.len(),
            "Graph retrieval completed"
        );
        memories
    }

    async fn match_entities(
        &self,
        graph: &dyn engram_domain::ports::GraphMemoryAdapter,
        entities: &[ExtractedEntity],
        limit: usize,
    ) -> Vec<GraphEntity> {
        let mut matched: Vec<GraphEntity> = Vec::new();
        let mut seen_keys: HashSet<String> = HashSet::new();

        for entity in entities {
            let entity_type = entity.label.as_deref();

            // Strategy 1: text match; retry without the type filter when the
            // typed query comes back empty.
            let mut text_matches = graph
                .find_entities_by_text(&entity.text, entity_type, limit)
                .await;
            if text_matches.is_empty() && entity_type.is_some() {
                text_matches = graph.find_entities_by_text(&entity.text, None, limit).await;
            }
            for m in text_matches {
                if seen_keys.insert(m.key.clone()) {
                    matched.push(m);
                }
            }

            // Strategy 2: keyword match on sub-tokens.
            if matched.len() < limit {
                for keyword in Self::extract_keywords(&entity.text) {
                    if matched.len() >= limit {
                        break;
                    }
                    let mut keyword_matches = graph
                        .find_entities_by_text(&keyword, entity_type, limit - matched.len())
                        .await;
                    if keyword_matches.is_empty() && entity_type.is_some() {
                        keyword_matches = graph
                            .find_entities_by_text(&keyword, None, limit - matched.len())
                            .await;
                    }
                    for m in keyword_matches {
                        if seen_keys.insert(m.key.clone()) {
                            matched.push(m);
                            if matched.len() >= limit {
                                break;
                            }
                        }
                    }
                }
            }

            if matched.len() >= limit {
                break;
            }
        }

        matched.truncate(limit);
        matched
    }

    /// Split entity text into candidate sub-tokens: whole CJK words first,
    /// then 3- and 2-char CJK n-grams, else punctuation-split words. A small
    /// stop-word list is excluded throughout.
    #[must_use]
    pub fn extract_keywords(text: &str) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();
        let push = |candidate: String, keywords: &mut Vec<String>| {
            if candidate.chars().count() < 2 {
                return;
            }
            if STOP_WORDS.contains(candidate.as_str()) {
                return;
            }
            if !keywords.contains(&candidate) {
                keywords.push(candidate);
            }
        };

        let chars: Vec<char> = text.chars().collect();
        let is_cjk = |c: char| matches!(c as u32, 0x4E00..=0x9FFF | 0x3400..=0x4DBF);

        // Whole CJK runs of length >= 2.
        let mut run = String::new();
        for &c in &chars {
            if is_cjk(c) {
                run.push(c);
            } else if !run.is_empty() {
                push(std::mem::take(&mut run), &mut keywords);
            }
        }
        if !run.is_empty() {
            push(run, &mut keywords);
        }

        // Sub-words for longer text: 3-grams first, then 2-grams.
        if chars.len() > 4 {
            for length in [3usize, 2] {
                for window in chars.windows(length) {
                    if !window.iter().all(|&c| is_cjk(c)) {
                        continue;
                    }
                    push(window.iter().collect(), &mut keywords);
                    if keywords.len() >= KEYWORD_LIMIT {
                        break;
                    }
                }
                if keywords.len() >= KEYWORD_LIMIT {
                    break;
                }
            }
        }

        // Non-CJK fallback: punctuation-split words.
        if keywords.is_empty() {
            for word in text.split(|c: char| !c.is_alphanumeric()) {
                if word.len() >= 2 {
                    push(word.to_lowercase(), &mut keywords);
                    if keywords.len() >= KEYWORD_LIMIT {
                        break;
                    }
                }
            }
        }

        keywords.truncate(KEYWORD_LIMIT);
        keywords
    }

    // ------------------------------------------------------------------
    // Fusion
    // ------------------------------------------------------------------

    /// Weighted fusion of the two tracks: dedupe by `memory_id`, scale each
    /// track by its weight, sum duplicate graph scores onto the vector
    /// entry, sort descending, take `top_k`.
    #[must_use]
    pub fn merge_results(
        &self,
        vector_results: Vec<MemoryRecord>,
        graph_results: Vec<MemoryRecord>,
        top_k: usize,
    ) -> Vec<MemoryRecord> {
        let (vector_weight, graph_weight) = self.weights();
        let mut merged: Vec<MemoryRecord> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for mut memory in vector_results {
            if index.contains_key(&memory.memory_id) {
                continue;
            }
            memory.relevance_score *= vector_weight;
            index.insert(memory.memory_id.clone(), merged.len());
            merged.push(memory);
        }

        for mut memory in graph_results {
            match index.get(&memory.memory_id) {
                Some(&i) => {
                    // Same record surfaced by both tracks: sum the
                    // graph-weighted score onto the vector-weighted one.
                    merged[i].relevance_score += memory.relevance_score * graph_weight;
                }
                None => {
                    memory.relevance_score *= graph_weight;
                    index.insert(memory.memory_id.clone(), merged.len());
                    merged.push(memory);
                }
            }
        }

        merged.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.truncate(top_k);
        merged
    }
}
