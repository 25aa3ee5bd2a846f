//! DI container bootstrap; the composition root.
//!
//! `init_app` resolves providers from the linkme registries, wires the
//! application services, and returns an [`AppContext`]. The original
//! system's ambient `get_*_service()` singletons are deliberately replaced
//! by this explicit root: tests build isolated contexts and nothing reads
//! global state.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use engram_application::{
    AamManager, ChatMemoryConfig, ChatMemoryService, ContextRecorder, CoreferenceResolver,
    DualTrackIngestor, HybridRagService, MemoryReviewJob, RealtimeRetrievalService,
    UserTaskService,
};
use engram_domain::error::Result;
use engram_domain::ports::{
    AllowAll, CacheProvider, ChatModelProvider, ConsentGate, EmbeddingProvider, FileAccessGate,
    GraphMemoryAdapter, MemoryStoreAdapter, NerProvider, OperationLogStore, UserTaskStore,
    VectorMemoryAdapter, VectorStoreProvider,
};
use engram_domain::registry::cache::CacheProviderConfig;
use engram_domain::registry::embedding::EmbeddingProviderConfig;
use engram_domain::registry::graph_memory::GraphMemoryConfig;
use engram_domain::registry::vector_memory::VectorMemoryConfig;
use engram_domain::value_objects::CollectionNaming;
use engram_providers::chat::HttpChatProvider;
use engram_providers::history::KvHistoryStore;
use engram_providers::memory_adapters::{EmbeddedMemoryAdapter, KvMemoryAdapter};
use engram_providers::ner::LexicalNerProvider;
use engram_providers::stores::{InMemoryOperationLogStore, InMemoryUserTaskStore};
use engram_providers::vector_store::{HttpVectorStore, InMemoryVectorStore};

use crate::config::AppConfig;

/// Application context produced by the composition root.
pub struct AppContext {
    /// Application configuration
    pub config: Arc<AppConfig>,

    cache: Arc<dyn CacheProvider>,
    embedding: Arc<dyn EmbeddingProvider>,
    vector_adapter: Option<Arc<dyn VectorMemoryAdapter>>,
    graph_adapter: Option<Arc<dyn GraphMemoryAdapter>>,
    vector_store: Arc<dyn VectorStoreProvider>,
    chat_model: Option<Arc<dyn ChatModelProvider>>,
    ner: Arc<dyn NerProvider>,

    aam: Arc<AamManager>,
    retrieval: Arc<RealtimeRetrievalService>,
    hybrid_rag: Arc<HybridRagService>,
    recorder: Arc<ContextRecorder>,
    coreference: Arc<CoreferenceResolver>,
    chat_memory: Arc<ChatMemoryService>,
    ingestor: Arc<DualTrackIngestor>,
    user_tasks: Arc<UserTaskService>,
    user_task_store: Arc<dyn UserTaskStore>,
    operation_log: Arc<dyn OperationLogStore>,
    review_job: Option<Arc<MemoryReviewJob>>,
}

impl AppContext {
    /// KV cache provider
    #[must_use]
    pub fn cache(&self) -> Arc<dyn CacheProvider> {
        Arc::clone(&self.cache)
    }

    /// Embedding provider
    #[must_use]
    pub fn embedding(&self) -> Arc<dyn EmbeddingProvider> {
        Arc::clone(&self.embedding)
    }

    /// Long-term vector memory adapter
    #[must_use]
    pub fn vector_adapter(&self) -> Option<Arc<dyn VectorMemoryAdapter>> {
        self.vector_adapter.clone()
    }

    /// Graph/document adapter
    #[must_use]
    pub fn graph_adapter(&self) -> Option<Arc<dyn GraphMemoryAdapter>> {
        self.graph_adapter.clone()
    }

    /// Point-level vector store
    #[must_use]
    pub fn vector_store(&self) -> Arc<dyn VectorStoreProvider> {
        Arc::clone(&self.vector_store)
    }

    /// Chat model provider, when an endpoint is configured
    #[must_use]
    pub fn chat_model(&self) -> Option<Arc<dyn ChatModelProvider>> {
        self.chat_model.clone()
    }

    /// Entity extraction provider
    #[must_use]
    pub fn ner(&self) -> Arc<dyn NerProvider> {
        Arc::clone(&self.ner)
    }

    /// Tiered memory manager
    #[must_use]
    pub fn aam(&self) -> Arc<AamManager> {
        Arc::clone(&self.aam)
    }

    /// Real-time retrieval service
    #[must_use]
    pub fn retrieval(&self) -> Arc<RealtimeRetrievalService> {
        Arc::clone(&self.retrieval)
    }

    /// Hybrid RAG engine
    #[must_use]
    pub fn hybrid_rag(&self) -> Arc<HybridRagService> {
        Arc::clone(&self.hybrid_rag)
    }

    /// Conversation recorder
    #[must_use]
    pub fn recorder(&self) -> Arc<ContextRecorder> {
        Arc::clone(&self.recorder)
    }

    /// Coreference resolver
    #[must_use]
    pub fn coreference(&self) -> Arc<CoreferenceResolver> {
        Arc::clone(&self.coreference)
    }

    /// Chat memory service
    #[must_use]
    pub fn chat_memory(&self) -> Arc<ChatMemoryService> {
        Arc::clone(&self.chat_memory)
    }

    /// Two-stage document ingestor
    #[must_use]
    pub fn ingestor(&self) -> Arc<DualTrackIngestor> {
        Arc::clone(&self.ingestor)
    }

    /// User task service
    #[must_use]
    pub fn user_tasks(&self) -> Arc<UserTaskService> {
        Arc::clone(&self.user_tasks)
    }

    /// User task store (for deletion transactions)
    #[must_use]
    pub fn user_task_store(&self) -> Arc<dyn UserTaskStore> {
        Arc::clone(&self.user_task_store)
    }

    /// Operation log store
    #[must_use]
    pub fn operation_log(&self) -> Arc<dyn OperationLogStore> {
        Arc::clone(&self.operation_log)
    }

    /// Weekly review job, when the long-term tier is enabled
    #[must_use]
    pub fn review_job(&self) -> Option<Arc<MemoryReviewJob>> {
        self.review_job.clone()
    }
}

/// Build the application context with permissive consent/ACL gates.
///
/// # Errors
///
/// Returns an error when a configured provider cannot be resolved.
pub async fn init_app(config: AppConfig) -> Result<AppContext> {
    init_app_with_gates(config, Arc::new(AllowAll), Arc::new(AllowAll)).await
}

/// Build the application context with explicit consent and ACL gates.
///
/// # Errors
///
/// Returns an error when a configured provider cannot be resolved.
pub async fn init_app_with_gates(
    config: AppConfig,
    consent: Arc<dyn ConsentGate>,
    file_gate: Arc<dyn FileAccessGate>,
) -> Result<AppContext> {
    let config = Arc::new(config);

    // ------------------------------------------------------------------
    // Providers
    // ------------------------------------------------------------------
    let mut cache_config = CacheProviderConfig::new(config.memory.cache_provider.clone())
        .with_namespace("engram");
    if let Some(uri) = &config.memory.cache_uri {
        cache_config = cache_config.with_uri(uri.clone());
    }
    let cache = engram_domain::registry::cache::resolve_cache_provider(&cache_config)?;

    let mut embedding_config =
        EmbeddingProviderConfig::new(config.memory.embedding_provider.clone())
            .with_dimensions(config.memory.embedding_dimensions);
    if let Some(uri) = &config.memory.embedding_uri {
        embedding_config = embedding_config.with_uri(uri.clone());
    }
    if let Some(model) = &config.memory.embedding_model {
        embedding_config = embedding_config.with_model(model.clone());
    }
    let embedding =
        engram_domain::registry::embedding::resolve_embedding_provider(&embedding_config)?;

    let vector_adapter: Option<Arc<dyn VectorMemoryAdapter>> = if config.memory.enable_long_term {
        if config.memory.vector_provider == "memory" {
            // Share the resolved embedding provider instead of the registry
            // factory's self-contained one.
            Some(Arc::new(EmbeddedMemoryAdapter::with_collection(
                Arc::clone(&embedding),
                config.memory.collection.clone(),
            )))
        } else {
            let adapter_config = VectorMemoryConfig::new(config.memory.vector_provider.clone())
                .with_collection(config.memory.collection.clone())
                .with_dimensions(config.memory.embedding_dimensions);
            Some(
                engram_domain::registry::vector_memory::resolve_vector_memory_adapter(
                    &adapter_config,
                )?,
            )
        }
    } else {
        None
    };

    let graph_adapter: Option<Arc<dyn GraphMemoryAdapter>> = if config.memory.enable_graph {
        let graph_config = GraphMemoryConfig::new(config.memory.graph_provider.clone());
        Some(engram_domain::registry::graph_memory::resolve_graph_memory_adapter(&graph_config)?)
    } else {
        None
    };

    let kv_adapter: Option<Arc<dyn MemoryStoreAdapter>> = if config.memory.enable_short_term {
        Some(Arc::new(KvMemoryAdapter::new(Arc::clone(&cache))))
    } else {
        None
    };

    let vector_store: Arc<dyn VectorStoreProvider> = match &config.memory.vector_store_uri {
        Some(uri) => Arc::new(HttpVectorStore::new(uri.clone())),
        None => Arc::new(InMemoryVectorStore::new()),
    };

    let chat_model: Option<Arc<dyn ChatModelProvider>> = config
        .chat
        .model_endpoint
        .as_ref()
        .map(|endpoint| Arc::new(HttpChatProvider::new(endpoint.clone())) as Arc<dyn ChatModelProvider>);

    let ner: Arc<dyn NerProvider> = Arc::new(LexicalNerProvider::new());

    // ------------------------------------------------------------------
    // Application services
    // ------------------------------------------------------------------
    let aam = Arc::new(AamManager::new(
        kv_adapter,
        vector_adapter.clone(),
        graph_adapter.clone(),
        config.memory.enable_short_term,
        config.memory.enable_long_term,
    ));

    let retrieval = Arc::new(RealtimeRetrievalService::with_config(
        Arc::clone(&aam),
        true,
        Duration::from_secs(config.retrieval.cache_ttl_secs),
    ));

    let hybrid_rag = Arc::new(HybridRagService::new(
        Arc::clone(&aam),
        Arc::clone(&retrieval),
        Arc::clone(&ner),
    ));
    hybrid_rag.update_weights(config.retrieval.vector_weight, config.retrieval.graph_weight);

    let recorder = Arc::new(ContextRecorder::new(Arc::new(KvHistoryStore::new(
        Arc::clone(&cache),
    ))));

    let coreference = Arc::new(CoreferenceResolver::new(
        vector_adapter.clone(),
        chat_model.clone(),
        config.chat.model.clone(),
    ));

    let collection_naming = CollectionNaming::from_str(&config.chat.collection_naming)
        .unwrap_or_default();
    let chat_memory = Arc::new(ChatMemoryService::new(
        Arc::clone(&aam),
        Some(Arc::clone(&hybrid_rag)),
        Some(Arc::clone(&vector_store)),
        Arc::clone(&embedding),
        consent,
        file_gate,
        ChatMemoryConfig {
            rag_top_k: config.chat.rag_top_k,
            aam_top_k: config.chat.aam_top_k,
            max_injection_chars: config.chat.max_injection_chars,
            min_aam_relevance: config.chat.min_aam_relevance,
            use_hybrid_rag: config.chat.use_hybrid_rag,
            collection_naming,
            user_collection: config.memory.collection.clone(),
        },
    ));

    let ingestor = Arc::new(DualTrackIngestor::new(
        Arc::clone(&vector_store),
        Arc::clone(&embedding),
        chat_model.clone(),
        config.chat.model.clone(),
        collection_naming,
        config.memory.collection.clone(),
    ));

    let user_task_store: Arc<dyn UserTaskStore> = Arc::new(InMemoryUserTaskStore::new());
    let user_tasks = Arc::new(UserTaskService::new(Arc::clone(&user_task_store)));
    let operation_log: Arc<dyn OperationLogStore> = Arc::new(InMemoryOperationLogStore::new());

    let review_job = vector_adapter
        .clone()
        .map(|adapter| Arc::new(MemoryReviewJob::new(adapter)));

    Ok(AppContext {
        config,
        cache,
        embedding,
        vector_adapter,
        graph_adapter,
        vector_store,
        chat_model,
        ner,
        aam,
        retrieval,
        hybrid_rag,
        recorder,
        coreference,
        chat_memory,
        ingestor,
        user_tasks,
        user_task_store,
        operation_log,
        review_job,
    })
}
