//! Long-term Vector Memory Adapter Registry

use std::collections::HashMap;

/// Configuration for vector memory adapter creation
#[derive(Debug, Clone, Default)]
pub struct VectorMemoryConfig {
    /// Adapter name (e.g. "memory", "http")
    pub provider: String,
    /// Store endpoint (for remote stores)
    pub uri: Option<String>,
    /// Collection holding long-term entity memories
    pub collection: Option<String>,
    /// Vector dimensionality of the collection
    pub dimensions: Option<usize>,
    /// Additional adapter-specific configuration
    pub extra: HashMap<String, String>,
}

crate::impl_config_builder!(VectorMemoryConfig {
    /// Set the store endpoint
    uri: with_uri(into String),
    /// Set the collection name
    collection: with_collection(into String),
    /// Set the vector dimensionality
    dimensions: with_dimensions(usize),
});

crate::impl_registry!(
    provider_trait: crate::ports::VectorMemoryAdapter,
    config_type: VectorMemoryConfig,
    entry_type: VectorMemoryEntry,
    slice_name: VECTOR_MEMORY_ADAPTERS,
    resolve_fn: resolve_vector_memory_adapter,
    list_fn: list_vector_memory_adapters
);
