use engram_domain::entities::{MemoryPriority, MemoryTier};
use engram_infrastructure::{AppConfig, init_app};

#[tokio::test]
async fn test_default_config_wires_the_full_stack() {
    let ctx = init_app(AppConfig::default()).await.expect("init app");

    assert!(ctx.vector_adapter().is_some());
    assert!(ctx.graph_adapter().is_some());
    assert!(ctx.review_job().is_some());
    // No model endpoint configured by default.
    assert!(ctx.chat_model().is_none());

    // The wired stack is operational end to end.
    let id = ctx
        .aam()
        .store_memory(
            "bootstrap smoke memory",
            MemoryTier::LongTerm,
            MemoryPriority::Medium,
            std::collections::HashMap::new(),
            None,
        )
        .await
        .expect("store");
    let loaded = ctx.aam().retrieve_memory(&id, None).await.expect("retrieve");
    assert_eq!(loaded.content, "bootstrap smoke memory");
}

#[tokio::test]
async fn test_disabled_tiers_are_absent() {
    let mut config = AppConfig::default();
    config.memory.enable_long_term = false;
    config.memory.enable_graph = false;
    let ctx = init_app(config).await.expect("init app");

    assert!(ctx.vector_adapter().is_none());
    assert!(ctx.graph_adapter().is_none());
    assert!(ctx.review_job().is_none());
}

#[tokio::test]
async fn test_unknown_cache_provider_fails_resolution() {
    let mut config = AppConfig::default();
    config.memory.cache_provider = "memcached".to_owned();
    let err = init_app(config).await.err().expect("must fail");
    assert!(err.to_string().contains("memcached"));
}

#[tokio::test]
async fn test_configured_weights_reach_the_engine() {
    let mut config = AppConfig::default();
    config.retrieval.vector_weight = 3.0;
    config.retrieval.graph_weight = 1.0;
    let ctx = init_app(config).await.expect("init app");

    let (vector, graph) = ctx.hybrid_rag().weights();
    assert!((vector - 0.75).abs() < 1e-6);
    assert!((graph - 0.25).abs() < 1e-6);
}
