use std::sync::Arc;

use engram_domain::entities::{MemoryPriority, MemoryRecord, MemoryStatus, MemoryTier};
use engram_domain::ports::{MemoryStoreAdapter, VectorMemoryAdapter};
use engram_domain::value_objects::ConflictAction;
use engram_providers::embedding::LexicalEmbeddingProvider;
use engram_providers::memory_adapters::{EmbeddedMemoryAdapter, KvMemoryAdapter};
use engram_providers::cache::MokaCacheProvider;

fn adapter() -> EmbeddedMemoryAdapter {
    EmbeddedMemoryAdapter::new(Arc::new(LexicalEmbeddingProvider::new(256)))
}

fn typed_record(
    id: &str,
    user: &str,
    entity_type: &str,
    value: &str,
    confidence: f32,
) -> MemoryRecord {
    MemoryRecord::with_id(id, format!("{entity_type}: {value}"), MemoryTier::LongTerm)
        .with_user(user)
        .with_priority(MemoryPriority::High)
        .with_entity(entity_type, value, confidence)
}

#[tokio::test]
async fn test_store_retrieve_update_delete() {
    let adapter = adapter();
    let record = typed_record("m1", "u1", "part_number", "RM05-008", 0.9);

    assert!(adapter.store(&record).await);
    let loaded = adapter.retrieve("m1").await.expect("retrieve");
    assert_eq!(loaded.entity_value, "RM05-008");

    let mut changed = loaded.clone();
    changed.content = "part_number: RM05-009".to_owned();
    assert!(adapter.update(&changed).await);
    let reloaded = adapter.retrieve("m1").await.expect("retrieve");
    assert!(reloaded.updated_at > record.updated_at);

    assert!(adapter.delete("m1").await);
    assert!(adapter.retrieve("m1").await.is_none());
}

#[tokio::test]
async fn test_user_isolation_in_entity_search() {
    let adapter = adapter();
    adapter
        .store(&typed_record("m1", "u1", "part_number", "RM05-008", 0.9))
        .await;
    adapter
        .store(&typed_record("m2", "u2", "part_number", "RM05-008", 0.9))
        .await;

    let hits = adapter
        .search_entities("RM05-008", "u1", None, None, 0.0, 10)
        .await;
    assert!(!hits.is_empty());
    assert!(
        hits.iter().all(|m| m.user_id == "u1"),
        "no cross-user record may ever be returned"
    );
}

#[tokio::test]
async fn test_archived_records_hidden_by_default() {
    let adapter = adapter();
    adapter
        .store(&typed_record("m1", "u1", "preference", "dark-mode", 0.8))
        .await;
    assert!(adapter.archive("m1").await);

    let default_hits = adapter
        .search_entities("dark-mode", "u1", None, None, 0.0, 10)
        .await;
    assert!(default_hits.is_empty());

    let explicit = adapter
        .search_entities("dark-mode", "u1", None, Some(MemoryStatus::Archived), 0.0, 10)
        .await;
    assert_eq!(explicit.len(), 1);
}

#[tokio::test]
async fn test_exact_match_requires_active_status() {
    let adapter = adapter();
    adapter
        .store(&typed_record("m1", "u1", "part_number", "ABC-123", 0.8))
        .await;

    assert!(
        adapter
            .find_by_exact_match("u1", "part_number", "ABC-123")
            .await
            .is_some()
    );
    assert!(
        adapter
            .find_by_exact_match("u2", "part_number", "ABC-123")
            .await
            .is_none()
    );

    adapter.archive("m1").await;
    assert!(
        adapter
            .find_by_exact_match("u1", "part_number", "ABC-123")
            .await
            .is_none()
    );
}

#[tokio::test]
async fn test_conflict_detection_band_and_action() {
    let adapter = adapter();
    adapter
        .store(&typed_record("m1", "u1", "preference", "綠色 高山 烏龍茶", 0.5))
        .await;

    // Near-identical value lands inside the (0.85, 1.0) similarity band.
    let conflicts = adapter
        .detect_conflicts("u1", "preference", "preference: 綠色 高山 烏龍茶葉", 0.9)
        .await;
    assert_eq!(conflicts.len(), 1);
    assert!(conflicts[0].similarity > 0.85 && conflicts[0].similarity < 1.0);
    assert_eq!(conflicts[0].suggested_action, ConflictAction::Overwrite);

    // Lower incoming confidence flips the suggestion.
    let conflicts = adapter
        .detect_conflicts("u1", "preference", "preference: 綠色 高山 烏龍茶葉", 0.1)
        .await;
    assert_eq!(conflicts[0].suggested_action, ConflictAction::Ignore);

    // A completely different value produces no conflict.
    let conflicts = adapter
        .detect_conflicts("u1", "preference", "咖啡", 0.9)
        .await;
    assert!(conflicts.is_empty());
}

#[tokio::test]
async fn test_update_access_persists_hotness() {
    let adapter = adapter();
    adapter
        .store(&typed_record("m1", "u1", "intent", "purchase", 0.7))
        .await;
    assert!(adapter.update_access("m1").await);
    assert!(adapter.update_access("m1").await);
    let record = adapter.retrieve("m1").await.expect("retrieve");
    assert_eq!(record.access_count, 2);
    assert!(record.accessed_at.is_some());
}

#[tokio::test]
async fn test_find_low_hotness_applies_both_rules() {
    let adapter = adapter();
    let mut old_cold = typed_record("m1", "u1", "context", "old", 0.5);
    old_cold.created_at = engram_domain::utils::time::days_ago(100);
    adapter.store(&old_cold).await;

    let mut old_hot = typed_record("m2", "u1", "context", "hot", 0.5);
    old_hot.created_at = engram_domain::utils::time::days_ago(100);
    old_hot.access_count = 50;
    adapter.store(&old_hot).await;

    adapter
        .store(&typed_record("m3", "u1", "context", "fresh", 0.5))
        .await;

    let low = adapter.find_low_hotness("u1", 3, 90).await;
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].memory_id, "m1");
}

#[tokio::test]
async fn test_mark_for_review_records_reason() {
    let adapter = adapter();
    adapter
        .store(&typed_record("m1", "u1", "context", "stale", 0.5))
        .await;
    assert!(adapter.mark_for_review("m1", "too old").await);
    let record = adapter.retrieve("m1").await.expect("retrieve");
    assert_eq!(record.status, MemoryStatus::Review);
    assert_eq!(record.meta_str("review_reason"), Some("too old"));
}

#[tokio::test]
async fn test_user_stats_and_user_listing() {
    let adapter = adapter();
    adapter
        .store(&typed_record("m1", "u1", "part_number", "A", 0.4))
        .await;
    adapter
        .store(&typed_record("m2", "u1", "intent", "buy", 0.8))
        .await;
    adapter
        .store(&typed_record("m3", "u2", "intent", "sell", 0.6))
        .await;

    let stats = adapter.user_stats("u1").await;
    assert_eq!(stats.total_count, 2);
    assert_eq!(stats.by_entity_type.get("part_number"), Some(&1));
    assert!((stats.avg_confidence - 0.6).abs() < 1e-6);

    assert_eq!(adapter.list_user_ids().await, vec!["u1", "u2"]);
}

#[tokio::test]
async fn test_kv_adapter_round_trip_and_no_search() {
    let kv = KvMemoryAdapter::new(Arc::new(MokaCacheProvider::new(100)));
    let record = MemoryRecord::with_id("s1", "short lived note", MemoryTier::ShortTerm);

    assert!(kv.store(&record).await);
    let loaded = kv.retrieve("s1").await.expect("retrieve");
    assert_eq!(loaded.content, "short lived note");

    // The KV tier intentionally refuses search.
    assert!(kv.search("note", None, 10).await.is_empty());

    assert!(kv.delete("s1").await);
    assert!(!kv.delete("s1").await);
}
