//! Typed application configuration.

use serde::{Deserialize, Serialize};

/// Root application configuration (the `settings:` section of the YAML file)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Memory tier settings
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Retrieval and fusion settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Chat memory settings
    #[serde(default)]
    pub chat: ChatConfig,
    /// MCP client pool and external tool settings
    #[serde(default)]
    pub mcp: McpConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (`error`..`trace`)
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

/// Memory tier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Enable the short-term KV tier
    pub enable_short_term: bool,
    /// Enable the long-term vector tier
    pub enable_long_term: bool,
    /// Enable the graph shadow store
    pub enable_graph: bool,
    /// Cache backend (`moka`, `redis`)
    pub cache_provider: String,
    /// Cache connection URI for distributed backends
    #[serde(default)]
    pub cache_uri: Option<String>,
    /// Vector memory adapter (`memory`)
    pub vector_provider: String,
    /// Long-term collection name
    pub collection: String,
    /// Graph adapter (`memory`)
    pub graph_provider: String,
    /// Embedding provider (`lexical`, `http`)
    pub embedding_provider: String,
    /// Embedding endpoint for remote providers
    #[serde(default)]
    pub embedding_uri: Option<String>,
    /// Embedding model name
    #[serde(default)]
    pub embedding_model: Option<String>,
    /// Embedding dimensionality
    pub embedding_dimensions: usize,
    /// Point-level vector store endpoint; absent selects the in-process store
    #[serde(default)]
    pub vector_store_uri: Option<String>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enable_short_term: true,
            enable_long_term: true,
            enable_graph: true,
            cache_provider: "moka".to_owned(),
            cache_uri: None,
            vector_provider: "memory".to_owned(),
            collection: "aam_entities".to_owned(),
            graph_provider: "memory".to_owned(),
            embedding_provider: "lexical".to_owned(),
            embedding_uri: None,
            embedding_model: None,
            embedding_dimensions: 384,
            vector_store_uri: None,
        }
    }
}

/// Retrieval and fusion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Result cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// Dense-track weight
    pub vector_weight: f32,
    /// Graph-track weight
    pub graph_weight: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            vector_weight: 0.6,
            graph_weight: 0.4,
        }
    }
}

/// Chat memory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// RAG results per turn
    pub rag_top_k: usize,
    /// Long-term memories per turn
    pub aam_top_k: usize,
    /// Injection block cap (characters)
    pub max_injection_chars: usize,
    /// Relevance floor for long-term injection
    pub min_aam_relevance: f32,
    /// Use the hybrid engine for the RAG track
    pub use_hybrid_rag: bool,
    /// Vector collection naming strategy (`file_based`, `user_based`)
    pub collection_naming: String,
    /// Default chat model
    pub model: String,
    /// Chat model endpoint; absent disables the model provider
    #[serde(default)]
    pub model_endpoint: Option<String>,
    /// Models users may select; empty allows everything
    #[serde(default)]
    pub allowed_models: Vec<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            rag_top_k: 5,
            aam_top_k: 5,
            max_injection_chars: 1800,
            min_aam_relevance: 0.2,
            use_hybrid_rag: true,
            collection_naming: "file_based".to_owned(),
            model: "qwen3:32b".to_owned(),
            model_endpoint: None,
            allowed_models: Vec::new(),
        }
    }
}

/// MCP client pool and external tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    /// Endpoints the pool balances over
    #[serde(default)]
    pub endpoints: Vec<String>,
    /// Health check interval in seconds
    pub health_check_interval_secs: u64,
    /// Attempts per pooled call
    pub max_retries: u32,
    /// YAML fallback file for external tool descriptors
    #[serde(default)]
    pub external_tools_path: Option<String>,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            health_check_interval_secs: 30,
            max_retries: 3,
            external_tools_path: None,
        }
    }
}
