use engram_domain::ports::EmbeddingProvider;
use engram_domain::value_objects::cosine_similarity;
use engram_providers::embedding::LexicalEmbeddingProvider;

#[tokio::test]
async fn test_embedding_is_deterministic() {
    let provider = LexicalEmbeddingProvider::new(128);
    let a = provider.embed("供應鏈 管理 系統").await.expect("embed");
    let b = provider.embed("供應鏈 管理 系統").await.expect("embed");
    assert_eq!(a.vector, b.vector);
    assert_eq!(a.dimensions, 128);
}

#[tokio::test]
async fn test_embedding_is_normalised() {
    let provider = LexicalEmbeddingProvider::new(64);
    let embedding = provider.embed("some text to embed").await.expect("embed");
    let norm: f32 = embedding.vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn test_related_texts_score_higher_than_unrelated() {
    let provider = LexicalEmbeddingProvider::new(256);
    let base = provider.embed("rust memory retrieval platform").await.expect("embed");
    let related = provider.embed("memory retrieval in rust").await.expect("embed");
    let unrelated = provider.embed("鳳梨酥 食譜 烘焙").await.expect("embed");

    let sim_related = cosine_similarity(&base.vector, &related.vector);
    let sim_unrelated = cosine_similarity(&base.vector, &unrelated.vector);
    assert!(
        sim_related > sim_unrelated,
        "related {sim_related} should beat unrelated {sim_unrelated}"
    );
}

#[tokio::test]
async fn test_batch_preserves_order() {
    let provider = LexicalEmbeddingProvider::new(64);
    let texts = vec!["one".to_owned(), "two".to_owned()];
    let batch = provider.embed_batch(&texts).await.expect("batch");
    let single = provider.embed("two").await.expect("single");
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[1].vector, single.vector);
}
