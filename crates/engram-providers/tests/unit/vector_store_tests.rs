use std::collections::HashMap;

use engram_domain::ports::VectorStoreProvider;
use engram_domain::value_objects::{PointFilter, VectorPoint};
use engram_providers::vector_store::InMemoryVectorStore;

fn point(id: &str, vector: Vec<f32>, file_id: &str, user_id: &str, text: &str) -> VectorPoint {
    let mut payload = HashMap::new();
    payload.insert("text".to_owned(), serde_json::json!(text));
    payload.insert("file_id".to_owned(), serde_json::json!(file_id));
    payload.insert("user_id".to_owned(), serde_json::json!(user_id));
    payload.insert("chunk_index".to_owned(), serde_json::json!(0));
    VectorPoint {
        id: id.to_owned(),
        vector,
        payload,
    }
}

#[tokio::test]
async fn test_query_orders_by_ascending_distance() {
    let store = InMemoryVectorStore::new();
    store.ensure_collection("c", 2).await.expect("collection");
    store
        .upsert_points(
            "c",
            vec![
                point("near", vec![1.0, 0.0], "f1", "u1", "near"),
                point("far", vec![0.0, 1.0], "f1", "u1", "far"),
            ],
        )
        .await
        .expect("upsert");

    let hits = store
        .query("c", &[1.0, 0.1], &PointFilter::default(), 10)
        .await
        .expect("query");
    assert_eq!(hits[0].id, "near");
    assert!(hits[0].distance < hits[1].distance);
}

#[tokio::test]
async fn test_filters_scope_by_file_and_user() {
    let store = InMemoryVectorStore::new();
    store.ensure_collection("c", 2).await.expect("collection");
    store
        .upsert_points(
            "c",
            vec![
                point("p1", vec![1.0, 0.0], "f1", "u1", "a"),
                point("p2", vec![1.0, 0.0], "f2", "u1", "b"),
                point("p3", vec![1.0, 0.0], "f1", "u2", "c"),
            ],
        )
        .await
        .expect("upsert");

    let filter = PointFilter {
        file_id: Some("f1".to_owned()),
        user_id: Some("u1".to_owned()),
    };
    let hits = store.query("c", &[1.0, 0.0], &filter, 10).await.expect("query");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "p1");
}

#[tokio::test]
async fn test_payload_update_preserves_ids_and_vectors() {
    let store = InMemoryVectorStore::new();
    store.ensure_collection("c", 2).await.expect("collection");
    store
        .upsert_points("c", vec![point("p1", vec![0.6, 0.8], "f1", "u1", "chunk")])
        .await
        .expect("upsert");

    // Stage-2 style enrichment: same id, new payload, empty vector slot.
    let mut enriched = point("p1", Vec::new(), "f1", "u1", "chunk");
    enriched
        .payload
        .insert("contextual_header".to_owned(), serde_json::json!("overview"));
    let updated = store
        .update_payloads("c", vec![enriched])
        .await
        .expect("update");
    assert_eq!(updated, 1);

    let points = store.fetch_points_by_file("c", "f1").await.expect("fetch");
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].vector, vec![0.6, 0.8], "vector must survive");
    assert_eq!(
        points[0].payload.get("contextual_header"),
        Some(&serde_json::json!("overview"))
    );
}

#[tokio::test]
async fn test_delete_by_file_is_user_scoped() {
    let store = InMemoryVectorStore::new();
    store.ensure_collection("c", 2).await.expect("collection");
    store
        .upsert_points(
            "c",
            vec![
                point("p1", vec![1.0, 0.0], "f1", "u1", "a"),
                point("p2", vec![1.0, 0.0], "f1", "u2", "b"),
            ],
        )
        .await
        .expect("upsert");

    let removed = store.delete_by_file("c", "f1", "u1").await.expect("delete");
    assert_eq!(removed, 1);
    let remaining = store.fetch_points_by_file("c", "f1").await.expect("fetch");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "p2");
}

#[tokio::test]
async fn test_unknown_collection_queries_empty() {
    let store = InMemoryVectorStore::new();
    let hits = store
        .query("missing", &[1.0], &PointFilter::default(), 10)
        .await
        .expect("query");
    assert!(hits.is_empty());
}
