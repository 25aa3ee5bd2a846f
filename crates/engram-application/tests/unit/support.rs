//! Shared fixtures for the application test suite.

use std::sync::Arc;

use engram_application::{AamManager, HybridRagService, RealtimeRetrievalService};
use engram_domain::ports::{GraphMemoryAdapter, MemoryStoreAdapter, VectorMemoryAdapter};
use engram_providers::cache::MokaCacheProvider;
use engram_providers::embedding::LexicalEmbeddingProvider;
use engram_providers::graph_store::InMemoryGraphAdapter;
use engram_providers::memory_adapters::{EmbeddedMemoryAdapter, KvMemoryAdapter};
use engram_providers::ner::LexicalNerProvider;

/// Everything a test needs to drive the memory stack end to end.
pub struct Stack {
    pub aam: Arc<AamManager>,
    pub vector: Arc<dyn VectorMemoryAdapter>,
    pub graph: Arc<dyn GraphMemoryAdapter>,
    pub retrieval: Arc<RealtimeRetrievalService>,
    pub hybrid: Arc<HybridRagService>,
}

/// Build a fully in-process stack: moka KV, embedded vector tier, graph
/// shadow store, lexical embeddings and NER.
#[must_use]
pub fn stack() -> Stack {
    let embedder = Arc::new(LexicalEmbeddingProvider::new(256));
    let vector: Arc<dyn VectorMemoryAdapter> = Arc::new(EmbeddedMemoryAdapter::new(embedder));
    let graph: Arc<dyn GraphMemoryAdapter> = Arc::new(InMemoryGraphAdapter::new());
    let kv: Arc<dyn MemoryStoreAdapter> =
        Arc::new(KvMemoryAdapter::new(Arc::new(MokaCacheProvider::new(1000))));

    let aam = Arc::new(AamManager::new(
        Some(kv),
        Some(Arc::clone(&vector)),
        Some(Arc::clone(&graph)),
        true,
        true,
    ));
    let retrieval = Arc::new(RealtimeRetrievalService::new(Arc::clone(&aam)));
    let hybrid = Arc::new(HybridRagService::new(
        Arc::clone(&aam),
        Arc::clone(&retrieval),
        Arc::new(LexicalNerProvider::new()),
    ));

    Stack {
        aam,
        vector,
        graph,
        retrieval,
        hybrid,
    }
}
