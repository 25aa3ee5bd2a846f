use std::collections::HashMap;

use engram_domain::entities::{MemoryPriority, MemoryTier};

use crate::support::stack;

#[tokio::test]
async fn test_retrieve_scores_and_orders() {
    let stack = stack();
    for (content, priority) in [
        ("memory retrieval pipeline", MemoryPriority::Critical),
        ("memory retrieval pipeline notes", MemoryPriority::Low),
    ] {
        stack
            .aam
            .store_memory(content, MemoryTier::LongTerm, priority, HashMap::new(), None)
            .await
            .expect("store");
    }

    let results = stack
        .retrieval
        .retrieve("memory retrieval pipeline", None, None, 10, 0.0, false)
        .await;
    assert!(!results.is_empty());
    assert!(
        results
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score)
    );
    // Scores stay clamped.
    assert!(results.iter().all(|m| (0.0..=1.0).contains(&m.relevance_score)));
}

#[tokio::test]
async fn test_priority_bonus_breaks_ties() {
    let stack = stack();
    for (id, priority) in [
        ("low", MemoryPriority::Low),
        ("critical", MemoryPriority::Critical),
    ] {
        stack
            .aam
            .store_memory(
                "identical content line",
                MemoryTier::LongTerm,
                priority,
                HashMap::new(),
                Some(id.to_owned()),
            )
            .await
            .expect("store");
    }

    let results = stack
        .retrieval
        .retrieve("identical content line", None, None, 10, 0.0, false)
        .await;
    assert_eq!(results[0].memory_id, "critical");
}

#[tokio::test]
async fn test_cache_returns_same_top_k_within_ttl() {
    let stack = stack();
    stack
        .aam
        .store_memory(
            "cached retrieval subject",
            MemoryTier::LongTerm,
            MemoryPriority::Medium,
            HashMap::new(),
            None,
        )
        .await
        .expect("store");

    let first = stack
        .retrieval
        .retrieve("cached retrieval subject", None, None, 5, 0.0, true)
        .await;

    // A write after caching must not change the cached answer within TTL.
    stack
        .aam
        .store_memory(
            "cached retrieval subject second",
            MemoryTier::LongTerm,
            MemoryPriority::Critical,
            HashMap::new(),
            None,
        )
        .await
        .expect("store");

    let second = stack
        .retrieval
        .retrieve("cached retrieval subject", None, None, 5, 0.0, true)
        .await;
    let first_ids: Vec<&str> = first.iter().map(|m| m.memory_id.as_str()).collect();
    let second_ids: Vec<&str> = second.iter().map(|m| m.memory_id.as_str()).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn test_context_participates_in_cache_key() {
    let stack = stack();
    stack
        .aam
        .store_memory(
            "context keyed entry",
            MemoryTier::LongTerm,
            MemoryPriority::Medium,
            HashMap::new(),
            None,
        )
        .await
        .expect("store");

    let ctx_a: HashMap<String, String> = [("task".to_owned(), "a".to_owned())].into();
    let ctx_b: HashMap<String, String> = [("task".to_owned(), "b".to_owned())].into();

    let _ = stack
        .retrieval
        .retrieve("context keyed entry", Some(&ctx_a), None, 5, 0.0, true)
        .await;
    // Different context: not served from the same cache slot; both succeed.
    let with_b = stack
        .retrieval
        .retrieve("context keyed entry", Some(&ctx_b), None, 5, 0.0, true)
        .await;
    assert!(!with_b.is_empty());

    assert!(stack.retrieval.clear_cache() >= 2);
}

#[tokio::test]
async fn test_clear_cache_counts_entries() {
    let stack = stack();
    assert_eq!(stack.retrieval.clear_cache(), 0);
}
