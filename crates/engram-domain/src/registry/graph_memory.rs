//! Graph Memory Adapter Registry

use std::collections::HashMap;

/// Configuration for graph memory adapter creation
#[derive(Debug, Clone, Default)]
pub struct GraphMemoryConfig {
    /// Adapter name (e.g. "memory")
    pub provider: String,
    /// Store endpoint (for remote stores)
    pub uri: Option<String>,
    /// Document collection holding shadow memory documents
    pub collection: Option<String>,
    /// Additional adapter-specific configuration
    pub extra: HashMap<String, String>,
}

crate::impl_config_builder!(GraphMemoryConfig {
    /// Set the store endpoint
    uri: with_uri(into String),
    /// Set the document collection name
    collection: with_collection(into String),
});

crate::impl_registry!(
    provider_trait: crate::ports::GraphMemoryAdapter,
    config_type: GraphMemoryConfig,
    entry_type: GraphMemoryEntry,
    slice_name: GRAPH_MEMORY_ADAPTERS,
    resolve_fn: resolve_graph_memory_adapter,
    list_fn: list_graph_memory_adapters
);
