//! Port interfaces the domain depends on

/// Storage adapter ports (tiered memory contract)
pub mod adapters;
/// External provider ports
pub mod providers;
/// Repository ports
pub mod stores;

pub use adapters::{GraphMemoryAdapter, MemoryStoreAdapter, VectorMemoryAdapter};
pub use providers::{
    AllowAll, CacheEntryConfig, CacheProvider, CacheStats, ChatModelProvider, ConsentGate,
    EmbeddingProvider, FileAccessGate, NerProvider, VectorStoreProvider,
};
pub use stores::{
    HistoryStore, MessageFilter, OperationLogStore, ToolConfigStore, UserTaskStore,
};
