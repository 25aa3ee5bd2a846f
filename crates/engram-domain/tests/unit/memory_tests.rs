use std::str::FromStr;

use engram_domain::entities::{
    MemoryPriority, MemoryRecord, MemoryStatus, MemoryTier, sort_by_relevance,
};

#[test]
fn test_serde_round_trip_is_identity_modulo_relevance() {
    let mut record = MemoryRecord::new("favourite colour is teal", MemoryTier::LongTerm)
        .with_user("u-1")
        .with_priority(MemoryPriority::High)
        .with_entity("preference", "teal", 0.9)
        .with_meta("session_id".to_owned(), serde_json::json!("s-1"));
    record.relevance_score = 0.73;
    record.touch_access();

    let json = serde_json::to_string(&record).expect("serialize");
    let back: MemoryRecord = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(back.memory_id, record.memory_id);
    assert_eq!(back.content, record.content);
    assert_eq!(back.tier, record.tier);
    assert_eq!(back.priority, record.priority);
    assert_eq!(back.user_id, record.user_id);
    assert_eq!(back.entity_type, record.entity_type);
    assert_eq!(back.entity_value, record.entity_value);
    assert_eq!(back.status, record.status);
    assert_eq!(back.access_count, record.access_count);
    assert_eq!(back.created_at, record.created_at);
    assert_eq!(back.updated_at, record.updated_at);
    assert_eq!(back.metadata, record.metadata);
}

#[test]
fn test_priority_rank_is_total_order() {
    assert!(MemoryPriority::Critical.rank() > MemoryPriority::High.rank());
    assert!(MemoryPriority::High.rank() > MemoryPriority::Medium.rank());
    assert!(MemoryPriority::Medium.rank() > MemoryPriority::Low.rank());
}

#[test]
fn test_priority_relevance_bonus_matches_contract() {
    assert_eq!(MemoryPriority::Low.relevance_bonus(), 0.0);
    assert_eq!(MemoryPriority::Medium.relevance_bonus(), 0.1);
    assert_eq!(MemoryPriority::High.relevance_bonus(), 0.2);
    assert_eq!(MemoryPriority::Critical.relevance_bonus(), 0.3);
}

#[test]
fn test_access_counter_is_monotonic() {
    let mut record = MemoryRecord::new("x", MemoryTier::ShortTerm);
    assert_eq!(record.access_count, 0);
    assert!(record.accessed_at.is_none());

    let mut previous = 0;
    for _ in 0..5 {
        record.touch_access();
        assert!(record.access_count > previous);
        previous = record.access_count;
        assert!(record.accessed_at.is_some());
    }
}

#[test]
fn test_updated_at_strictly_advances() {
    let mut record = MemoryRecord::new("x", MemoryTier::LongTerm);
    let created = record.created_at;
    let mut previous = record.updated_at;
    for _ in 0..3 {
        record.touch_updated();
        assert!(record.updated_at > previous);
        previous = record.updated_at;
    }
    // created_at never changes.
    assert_eq!(record.created_at, created);
}

#[test]
fn test_sort_orders_by_relevance_then_priority() {
    let mut low = MemoryRecord::new("a", MemoryTier::LongTerm).with_priority(MemoryPriority::Low);
    low.relevance_score = 0.5;
    let mut high =
        MemoryRecord::new("b", MemoryTier::LongTerm).with_priority(MemoryPriority::High);
    high.relevance_score = 0.5;
    let mut top = MemoryRecord::new("c", MemoryTier::LongTerm).with_priority(MemoryPriority::Low);
    top.relevance_score = 0.9;

    let mut records = vec![low.clone(), high.clone(), top.clone()];
    sort_by_relevance(&mut records);

    assert_eq!(records[0].memory_id, top.memory_id);
    // Equal relevance: higher priority first.
    assert_eq!(records[1].memory_id, high.memory_id);
    assert_eq!(records[2].memory_id, low.memory_id);
}

#[test]
fn test_enum_wire_names_round_trip() {
    for tier in [MemoryTier::ShortTerm, MemoryTier::LongTerm] {
        assert_eq!(MemoryTier::from_str(tier.as_str()), Ok(tier));
    }
    for status in [
        MemoryStatus::Active,
        MemoryStatus::Archived,
        MemoryStatus::Review,
    ] {
        assert_eq!(MemoryStatus::from_str(status.as_str()), Ok(status));
    }
    assert!(MemoryTier::from_str("bogus").is_err());
}

#[test]
fn test_confidence_is_clamped() {
    let record = MemoryRecord::new("x", MemoryTier::LongTerm).with_entity("intent", "buy", 7.0);
    assert_eq!(record.confidence, 1.0);
    let record = MemoryRecord::new("x", MemoryTier::LongTerm).with_entity("intent", "buy", -1.0);
    assert_eq!(record.confidence, 0.0);
}
