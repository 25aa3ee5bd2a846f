//! Metadata and storage key names shared across tiers.

/// Metadata key carrying the owning user id
pub const METADATA_KEY_USER_ID: &str = "user_id";
/// Metadata key carrying the chat session id
pub const METADATA_KEY_SESSION_ID: &str = "session_id";
/// Metadata key carrying the UI task id
pub const METADATA_KEY_TASK_ID: &str = "task_id";
/// Metadata key tagging the producing subsystem
pub const METADATA_KEY_SOURCE: &str = "source";
/// Metadata key distinguishing record kinds within a source
pub const METADATA_KEY_KIND: &str = "kind";
/// Metadata key holding the reason a record was flagged for review
pub const METADATA_KEY_REVIEW_REASON: &str = "review_reason";
/// Metadata key naming the graph entity behind a pseudo-memory
pub const METADATA_KEY_ENTITY_ID: &str = "entity_id";
/// Metadata key naming the relation type behind a pseudo-memory
pub const METADATA_KEY_RELATION_TYPE: &str = "relation_type";
/// Metadata key carrying the originating file id
pub const METADATA_KEY_FILE_ID: &str = "file_id";

/// Source tag for records produced by the graph RAG track
pub const SOURCE_GRAPH: &str = "graph";
/// Source tag for chat-product turn snippets
pub const SOURCE_CHAT_PRODUCT: &str = "chat_product";
/// Kind tag for per-turn conversation snippets
pub const KIND_TURN_SNIPPET: &str = "turn_snippet";

/// Key prefix for short-term memory records in the KV tier
pub const KV_MEMORY_PREFIX: &str = "aam:memory:";
/// Namespace for per-session conversation history in the KV tier
pub const HISTORY_NAMESPACE: &str = "engram:history";
/// Default collection name for long-term entity memories
pub const MEMORY_COLLECTION: &str = "aam_entities";
/// Document-store collection holding graph entities
pub const ENTITIES_COLLECTION: &str = "entities";
/// Document-store collection holding graph relations
pub const RELATIONS_COLLECTION: &str = "relations";
