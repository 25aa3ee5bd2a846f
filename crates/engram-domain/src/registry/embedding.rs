//! Embedding Provider Registry

use std::collections::HashMap;

/// Configuration for embedding provider creation
#[derive(Debug, Clone, Default)]
pub struct EmbeddingProviderConfig {
    /// Provider name (e.g. "lexical", "http")
    pub provider: String,
    /// Service endpoint (for remote providers)
    pub uri: Option<String>,
    /// Model name requested from the provider
    pub model: Option<String>,
    /// Vector dimensionality
    pub dimensions: Option<usize>,
    /// Additional provider-specific configuration
    pub extra: HashMap<String, String>,
}

crate::impl_config_builder!(EmbeddingProviderConfig {
    /// Set the service endpoint
    uri: with_uri(into String),
    /// Set the model name
    model: with_model(into String),
    /// Set the vector dimensionality
    dimensions: with_dimensions(usize),
});

crate::impl_registry!(
    provider_trait: crate::ports::EmbeddingProvider,
    config_type: EmbeddingProviderConfig,
    entry_type: EmbeddingProviderEntry,
    slice_name: EMBEDDING_PROVIDERS,
    resolve_fn: resolve_embedding_provider,
    list_fn: list_embedding_providers
);
