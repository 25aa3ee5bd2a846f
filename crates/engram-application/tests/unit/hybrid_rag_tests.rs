use std::collections::HashMap;

use engram_application::HybridRagService;
use engram_domain::entities::{GraphEntity, GraphRelation, MemoryRecord, MemoryTier};
use engram_domain::value_objects::RetrievalStrategy;

use crate::support::stack;

fn scored(id: &str, relevance: f32) -> MemoryRecord {
    let mut record = MemoryRecord::with_id(id, format!("content {id}"), MemoryTier::LongTerm);
    record.relevance_score = relevance;
    record
}

#[tokio::test]
async fn test_weighted_merge_with_duplicate_sums_scores() {
    // Vector track: M1 0.8, M2 0.6. Graph track: M2 0.5, M3 0.4.
    // Weights 0.6/0.4 => M2 = 0.6*0.6 + 0.4*0.5 = 0.56, M1 = 0.48, M3 = 0.16.
    let stack = stack();
    let merged = stack.hybrid.merge_results(
        vec![scored("M1", 0.8), scored("M2", 0.6)],
        vec![scored("M2", 0.5), scored("M3", 0.4)],
        3,
    );

    let ids: Vec<&str> = merged.iter().map(|m| m.memory_id.as_str()).collect();
    assert_eq!(ids, vec!["M2", "M1", "M3"]);
    assert!((merged[0].relevance_score - 0.56).abs() < 1e-6);
    assert!((merged[1].relevance_score - 0.48).abs() < 1e-6);
    assert!((merged[2].relevance_score - 0.16).abs() < 1e-6);
}

#[tokio::test]
async fn test_merge_truncates_to_top_k() {
    let stack = stack();
    let merged = stack.hybrid.merge_results(
        vec![scored("A", 0.9), scored("B", 0.8)],
        vec![scored("C", 0.7)],
        2,
    );
    assert_eq!(merged.len(), 2);
}

#[tokio::test]
async fn test_update_weights_renormalises() {
    let stack = stack();
    stack.hybrid.update_weights(3.0, 1.0);
    let (vector, graph) = stack.hybrid.weights();
    assert!((vector - 0.75).abs() < 1e-6);
    assert!((graph - 0.25).abs() < 1e-6);
    assert!((vector + graph - 1.0).abs() < 1e-6);

    // Non-positive totals are ignored.
    stack.hybrid.update_weights(0.0, 0.0);
    assert_eq!(stack.hybrid.weights(), (0.75, 0.25));
}

#[test]
fn test_keyword_extraction_prefers_ngrams() {
    let keywords = HybridRagService::extract_keywords("中国预制菜产业");
    assert!(keywords.contains(&"中国预制菜产业".to_owned()));
    // 3-grams come before 2-grams.
    let pos3 = keywords.iter().position(|k| k.chars().count() == 3);
    let pos2 = keywords.iter().position(|k| k.chars().count() == 2);
    if let (Some(p3), Some(p2)) = (pos3, pos2) {
        assert!(p3 < p2);
    }
}

#[test]
fn test_keyword_extraction_drops_stop_words() {
    let keywords = HybridRagService::extract_keywords("因为所以");
    assert!(!keywords.contains(&"因为".to_owned()));
    assert!(!keywords.contains(&"所以".to_owned()));
}

#[test]
fn test_keyword_extraction_latin_fallback() {
    let keywords = HybridRagService::extract_keywords("Supply Chain");
    assert!(keywords.contains(&"supply".to_owned()));
    assert!(keywords.contains(&"chain".to_owned()));
}

async fn seed_graph(stack: &crate::support::Stack) {
    for (key, name) in [("e1", "供應鏈"), ("e2", "物流中心"), ("e3", "倉儲系統")] {
        stack
            .graph
            .upsert_entity(&GraphEntity::new(key, name, "concept"))
            .await;
    }
    stack
        .graph
        .upsert_relation(&GraphRelation::new("e1", "e2", "包含"))
        .await;
    stack
        .graph
        .upsert_relation(&GraphRelation::new("e2", "e3", "依賴"))
        .await;
}

#[tokio::test]
async fn test_graph_track_produces_triples() {
    let stack = stack();
    seed_graph(&stack).await;

    let results = stack
        .hybrid
        .retrieve_records("供應鏈 的狀態", 10, Some(RetrievalStrategy::GraphFirst), 0.0)
        .await;
    assert!(!results.is_empty());

    let triple = results
        .iter()
        .find(|m| m.meta_str("source") == Some("graph"))
        .expect("graph-sourced record");
    assert!(triple.content.contains(" - "));
    assert!(triple.relevance_score >= 0.6);
    assert!(triple.meta_str("entity_id").is_some());
}

#[tokio::test]
async fn test_graph_track_boosts_query_substring_matches() {
    let stack = stack();
    seed_graph(&stack).await;

    let results = stack
        .hybrid
        .retrieve_records("供應鏈", 10, Some(RetrievalStrategy::GraphFirst), 0.0)
        .await;
    let best = results
        .iter()
        .filter(|m| m.meta_str("source") == Some("graph"))
        .map(|m| m.relevance_score)
        .fold(0.0_f32, f32::max);
    assert!((best - 0.9).abs() < 1e-6, "endpoint match should score 0.9, got {best}");
}

#[tokio::test]
async fn test_hybrid_strategy_combines_tracks() {
    let stack = stack();
    seed_graph(&stack).await;
    stack
        .aam
        .store_memory(
            "供應鏈 管理 摘要",
            MemoryTier::LongTerm,
            engram_domain::entities::MemoryPriority::Medium,
            HashMap::new(),
            None,
        )
        .await
        .expect("store");

    let results = stack
        .hybrid
        .retrieve_records("供應鏈", 10, Some(RetrievalStrategy::Hybrid), 0.0)
        .await;
    let sources: Vec<Option<&str>> = results.iter().map(|m| m.meta_str("source")).collect();
    assert!(sources.iter().any(|s| *s == Some("graph")));
    assert!(sources.iter().any(|s| s.is_none()), "vector-track record expected");
}

#[tokio::test]
async fn test_graph_track_empty_without_entities() {
    let stack = stack();
    let results = stack
        .hybrid
        .retrieve_records("...", 10, Some(RetrievalStrategy::GraphFirst), 0.0)
        .await;
    assert!(results.is_empty());
}
