use engram_domain::entities::{GraphEntity, GraphRelation, MemoryRecord, MemoryTier};
use engram_domain::ports::{GraphMemoryAdapter, MemoryStoreAdapter};
use engram_providers::graph_store::InMemoryGraphAdapter;

async fn seeded() -> InMemoryGraphAdapter {
    let graph = InMemoryGraphAdapter::new();
    for (key, name, entity_type, file) in [
        ("e1", "供應鏈", "concept", Some("f1")),
        ("e2", "物流", "concept", Some("f1")),
        ("e3", "倉儲", "concept", Some("f2")),
        ("e4", "Acme Corp", "organization", None),
    ] {
        let mut entity = GraphEntity::new(key, name, entity_type);
        entity.file_id = file.map(str::to_owned);
        graph.upsert_entity(&entity).await;
    }
    for (from, to, rel, file) in [
        ("e1", "e2", "包含", Some("f1")),
        ("e2", "e3", "依賴", Some("f1")),
        ("e1", "e4", "營運方", None),
    ] {
        let mut relation = GraphRelation::new(from, to, rel);
        relation.file_id = file.map(str::to_owned);
        graph.upsert_relation(&relation).await;
    }
    graph
}

#[tokio::test]
async fn test_text_match_exact_substring_and_case() {
    let graph = seeded().await;

    let exact = graph.find_entities_by_text("供應鏈", None, 10).await;
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].key, "e1");

    let case_insensitive = graph.find_entities_by_text("acme", None, 10).await;
    assert_eq!(case_insensitive.len(), 1);
    assert_eq!(case_insensitive[0].key, "e4");

    let typed = graph
        .find_entities_by_text("供應鏈", Some("organization"), 10)
        .await;
    assert!(typed.is_empty());
}

#[tokio::test]
async fn test_neighbors_resolve_both_directions() {
    let graph = seeded().await;
    let neighbors = graph.neighbors("e2", 10).await;
    let names: Vec<&str> = neighbors.iter().map(|n| n.neighbor.name.as_str()).collect();
    assert_eq!(neighbors.len(), 2);
    assert!(names.contains(&"供應鏈"));
    assert!(names.contains(&"倉儲"));
}

#[tokio::test]
async fn test_neighbor_limit_is_applied() {
    let graph = seeded().await;
    let neighbors = graph.neighbors("e1", 1).await;
    assert_eq!(neighbors.len(), 1);
}

#[tokio::test]
async fn test_subgraph_paths_respect_depth() {
    let graph = seeded().await;
    let paths = graph.subgraph("e1", 2, 20).await;
    assert!(!paths.is_empty());
    for path in &paths {
        assert!(path.relations.len() <= 2);
        assert_eq!(path.vertices.len(), path.relations.len() + 1);
    }
    // Two hops reach 倉儲 via 物流.
    assert!(paths.iter().any(|p| {
        p.vertices.last().map(|v| v.name.as_str()) == Some("倉儲") && p.relations.len() == 2
    }));
}

#[tokio::test]
async fn test_path_rendering_joins_triples() {
    let graph = seeded().await;
    let paths = graph.subgraph("e1", 2, 20).await;
    let rendered = paths
        .iter()
        .find(|p| p.relations.len() == 2)
        .map(engram_domain::entities::SubgraphPath::render)
        .expect("two-hop path");
    assert!(rendered.contains(" | "));
    assert!(rendered.contains("供應鏈 - 包含 - 物流"));
}

#[tokio::test]
async fn test_delete_by_file_removes_entities_and_relations() {
    let graph = seeded().await;
    assert_eq!(graph.delete_entities_by_file("f1").await, 2);
    assert_eq!(graph.delete_relations_by_file("f1").await, 2);
    assert!(graph.find_entities_by_text("物流", None, 10).await.is_empty());
    // Untouched file survives.
    assert_eq!(graph.find_entities_by_text("倉儲", None, 10).await.len(), 1);
}

#[tokio::test]
async fn test_document_store_substring_search() {
    let graph = InMemoryGraphAdapter::new();
    let record = MemoryRecord::with_id("m1", "供應鏈管理需要即時庫存", MemoryTier::LongTerm);
    assert!(graph.store(&record).await);

    let hits = graph.search("庫存", None, 10).await;
    assert_eq!(hits.len(), 1);
    assert!(graph.search("不存在的詞", None, 10).await.is_empty());

    assert!(graph.delete("m1").await);
    assert!(graph.retrieve("m1").await.is_none());
}
