use std::collections::HashMap;
use std::sync::Arc;

use engram_application::AamManager;
use engram_domain::entities::{MemoryPriority, MemoryRecord, MemoryTier};

use crate::support::stack;

fn meta(pairs: &[(&str, &str)]) -> HashMap<String, serde_json::Value> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), serde_json::json!(v)))
        .collect()
}

#[tokio::test]
async fn test_store_routes_by_tier_and_shadows_graph() {
    let stack = stack();
    let id = stack
        .aam
        .store_memory(
            "long term fact",
            MemoryTier::LongTerm,
            MemoryPriority::High,
            HashMap::new(),
            Some("m-long".to_owned()),
        )
        .await
        .expect("store succeeds");
    assert_eq!(id, "m-long");

    // Primary tier has it.
    assert!(stack.vector.retrieve("m-long").await.is_some());
    // Shadow document landed in the graph store.
    assert!(stack.graph.retrieve("m-long").await.is_some());
}

#[tokio::test]
async fn test_retrieve_bumps_access_tracking() {
    let stack = stack();
    stack
        .aam
        .store_memory(
            "hot fact",
            MemoryTier::LongTerm,
            MemoryPriority::Medium,
            HashMap::new(),
            Some("m1".to_owned()),
        )
        .await
        .expect("store");

    let first = stack.aam.retrieve_memory("m1", None).await.expect("hit");
    let second = stack.aam.retrieve_memory("m1", None).await.expect("hit");
    assert!(second.access_count > first.access_count - 1);
    assert!(second.access_count >= 2);
}

#[tokio::test]
async fn test_retrieve_searches_tiers_in_order() {
    let stack = stack();
    stack
        .aam
        .store_memory(
            "short note",
            MemoryTier::ShortTerm,
            MemoryPriority::Low,
            HashMap::new(),
            Some("dup".to_owned()),
        )
        .await
        .expect("store short");

    let hit = stack.aam.retrieve_memory("dup", None).await.expect("hit");
    assert_eq!(hit.tier, MemoryTier::ShortTerm);
}

#[tokio::test]
async fn test_update_merges_metadata_and_advances_timestamp() {
    let stack = stack();
    stack
        .aam
        .store_memory(
            "original",
            MemoryTier::LongTerm,
            MemoryPriority::Medium,
            meta(&[("source", "test")]),
            Some("m1".to_owned()),
        )
        .await
        .expect("store");
    let before = stack.aam.retrieve_memory("m1", None).await.expect("hit");

    assert!(
        stack
            .aam
            .update_memory(
                "m1",
                Some("updated".to_owned()),
                Some(MemoryPriority::Critical),
                Some(meta(&[("extra", "yes")])),
            )
            .await
    );

    let after = stack.aam.retrieve_memory("m1", None).await.expect("hit");
    assert_eq!(after.content, "updated");
    assert_eq!(after.priority, MemoryPriority::Critical);
    assert_eq!(after.meta_str("source"), Some("test"));
    assert_eq!(after.meta_str("extra"), Some("yes"));
    assert!(after.updated_at > before.updated_at);
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn test_update_missing_memory_fails() {
    let stack = stack();
    assert!(!stack.aam.update_memory("ghost", None, None, None).await);
}

#[tokio::test]
async fn test_delete_without_tier_tries_all() {
    let stack = stack();
    stack
        .aam
        .store_memory(
            "to delete",
            MemoryTier::LongTerm,
            MemoryPriority::Low,
            HashMap::new(),
            Some("m1".to_owned()),
        )
        .await
        .expect("store");

    assert!(stack.aam.delete_memory("m1", None).await);
    assert!(stack.aam.retrieve_memory("m1", None).await.is_none());
    // Shadow copy removed too.
    assert!(stack.graph.retrieve("m1").await.is_none());
    assert!(!stack.aam.delete_memory("m1", None).await);
}

#[tokio::test]
async fn test_search_merges_tiers_and_sorts() {
    let stack = stack();
    stack
        .aam
        .store_memory(
            "rust retrieval engine design",
            MemoryTier::LongTerm,
            MemoryPriority::High,
            HashMap::new(),
            None,
        )
        .await
        .expect("store");
    stack
        .aam
        .store_memory(
            "unrelated cooking recipe",
            MemoryTier::LongTerm,
            MemoryPriority::Low,
            HashMap::new(),
            None,
        )
        .await
        .expect("store");

    let results = stack
        .aam
        .search_memories("rust retrieval engine", None, 10, 0.0)
        .await;
    assert!(!results.is_empty());
    assert!(results[0].content.contains("rust"));
    // Descending relevance.
    assert!(
        results
            .windows(2)
            .all(|w| w[0].relevance_score >= w[1].relevance_score)
    );
}

#[tokio::test]
async fn test_sync_touches_primary_and_graph() {
    let stack = stack();
    stack
        .aam
        .store_memory(
            "to sync",
            MemoryTier::LongTerm,
            MemoryPriority::Medium,
            HashMap::new(),
            Some("m1".to_owned()),
        )
        .await
        .expect("store");

    assert!(
        stack
            .aam
            .sync_memory("m1", Some("synced".to_owned()), None)
            .await
    );
    assert_eq!(
        stack.vector.retrieve("m1").await.expect("vector").content,
        "synced"
    );
    assert_eq!(
        stack.graph.retrieve("m1").await.expect("graph").content,
        "synced"
    );
}

#[tokio::test]
async fn test_incremental_update_appends_twice() {
    let stack = stack();
    stack
        .aam
        .store_memory(
            "base",
            MemoryTier::LongTerm,
            MemoryPriority::Medium,
            HashMap::new(),
            Some("m1".to_owned()),
        )
        .await
        .expect("store");

    // Non-idempotent by design: the same delta applied twice appends twice.
    for _ in 0..2 {
        assert!(
            stack
                .aam
                .incremental_update("m1", Some("delta".to_owned()), None)
                .await
        );
    }
    let record = stack.aam.retrieve_memory("m1", None).await.expect("hit");
    assert_eq!(record.content, "base\ndelta\ndelta");
}

#[tokio::test]
async fn test_disabled_tier_refuses_silently() {
    let manager = AamManager::new(None, None, None, true, true);
    let stored = manager
        .store_memory(
            "nowhere to go",
            MemoryTier::ShortTerm,
            MemoryPriority::Low,
            HashMap::new(),
            None,
        )
        .await;
    assert!(stored.is_none());
    assert!(manager.retrieve_memory("any", None).await.is_none());
}

#[tokio::test]
async fn test_fixed_id_write_back_does_not_multiply_records() {
    let stack = stack();
    let record = MemoryRecord::with_id("fixed", "料號: RM05-008", MemoryTier::LongTerm)
        .with_user("u1")
        .with_entity("part_number", "RM05-008", 0.9);

    assert!(stack.aam.store_record(&record).await);
    assert!(stack.aam.store_record(&record).await);

    let all = stack
        .vector
        .get_user_entities("u1", Some("part_number"), None, 100)
        .await;
    assert_eq!(all.len(), 1, "idempotent write-back must not multiply records");
}

#[tokio::test]
async fn test_min_relevance_filters_results() {
    let stack = stack();
    stack
        .aam
        .store_memory(
            "somewhat related words",
            MemoryTier::LongTerm,
            MemoryPriority::Medium,
            HashMap::new(),
            None,
        )
        .await
        .expect("store");

    let strict = Arc::clone(&stack.aam)
        .search_memories("completely different topic", None, 10, 0.99)
        .await;
    assert!(strict.is_empty());
}
