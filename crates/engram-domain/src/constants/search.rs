//! Retrieval, fusion, and injection defaults.

/// Result cache TTL for the real-time retrieval service (seconds)
pub const RETRIEVAL_CACHE_TTL_SECS: u64 = 300;
/// Bounded worker pool size for parallel tier search
pub const RETRIEVAL_MAX_WORKERS: usize = 4;

/// Default dense-track weight in hybrid fusion
pub const DEFAULT_VECTOR_WEIGHT: f32 = 0.6;
/// Default graph-track weight in hybrid fusion
pub const DEFAULT_GRAPH_WEIGHT: f32 = 0.4;

/// Per-entity cap on 1-hop neighbour records
pub const NEIGHBOR_LIMIT: usize = 10;
/// Per-entity cap on subgraph path records
pub const SUBGRAPH_LIMIT: usize = 20;
/// Maximum traversal depth for subgraph expansion
pub const SUBGRAPH_MAX_DEPTH: usize = 2;
/// Cap on extracted keywords per query entity
pub const KEYWORD_LIMIT: usize = 15;

/// Default relevance for a formatted graph triple
pub const GRAPH_TRIPLE_RELEVANCE: f32 = 0.7;
/// Relevance for a triple whose endpoint contains the query text
pub const GRAPH_TRIPLE_MATCH_RELEVANCE: f32 = 0.9;
/// Relevance for a multi-hop path record
pub const GRAPH_PATH_RELEVANCE: f32 = 0.6;

/// Lower bound (exclusive) of the conflict similarity band
pub const CONFLICT_SIMILARITY_LOW: f32 = 0.85;
/// Upper bound (exclusive) of the conflict similarity band
pub const CONFLICT_SIMILARITY_HIGH: f32 = 1.0;

/// Default number of RAG results requested per chat turn
pub const DEFAULT_RAG_TOP_K: usize = 5;
/// Default number of long-term memories injected per chat turn
pub const DEFAULT_AAM_TOP_K: usize = 5;
/// Default minimum relevance for long-term memory injection
pub const DEFAULT_MIN_AAM_RELEVANCE: f32 = 0.2;
/// Hard cap on the injected context block (characters)
pub const DEFAULT_MAX_INJECTION_CHARS: usize = 1800;
/// Per-line clip applied inside injection sections (characters)
pub const INJECTION_LINE_CLIP: usize = 280;
/// Per-side clip applied to turn snippets before write-back (characters)
pub const TURN_SNIPPET_CLIP: usize = 800;

/// Minimum confidence for typed entities consulted during coreference
pub const COREF_MIN_CONFIDENCE: f32 = 0.7;
/// Acceptance threshold for the memory-assisted resolution path
pub const COREF_AAM_ACCEPT: f32 = 0.85;
/// Acceptance threshold for the rule-based resolution path
pub const COREF_RULE_ACCEPT: f32 = 0.8;
/// Score cap for the rule-based path
pub const COREF_RULE_CAP: f32 = 0.9;
/// Fixed confidence assigned to model-produced resolutions
pub const COREF_MODEL_CONFIDENCE: f32 = 0.95;
/// Minimum confidence required before a resolution is persisted
pub const COREF_WRITEBACK_MIN_CONFIDENCE: f32 = 0.7;
