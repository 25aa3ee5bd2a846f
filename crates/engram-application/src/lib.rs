//! # Application Layer
//!
//! Use cases of the Engram memory platform: tiered memory lifecycle,
//! real-time and hybrid retrieval, coreference resolution, conversation
//! context, per-turn chat memory, two-stage document ingestion, background
//! task processing, multi-store deletion transactions, memory hygiene, and
//! the user-task soft-delete contract.
//!
//! Services depend only on domain ports; concrete providers are wired in
//! by the infrastructure composition root.

/// Per-turn chat memory retrieval, injection, and write-back
pub mod chat_memory;
/// Conversation context recording and history
pub mod context;
/// Coreference and ellipsis resolution
pub mod coreference;
/// Multi-store deletion transactions
pub mod deletion;
/// Hybrid vector + graph retrieval
pub mod hybrid_rag;
/// Two-stage document ingestion
pub mod ingestion;
/// Tiered memory lifecycle
pub mod memory_manager;
/// Real-time retrieval with result caching
pub mod retrieval;
/// Weekly memory hygiene
pub mod review;
/// Background task processing
pub mod tasks;
/// User-task soft delete
pub mod user_tasks;

pub use chat_memory::{ChatAttachment, ChatMemoryConfig, ChatMemoryService, MemoryRetrievalResult};
pub use context::ContextRecorder;
pub use coreference::CoreferenceResolver;
pub use deletion::{DeletionDeps, DeletionRollbackManager, FileArtifactStore, RollbackReport};
pub use hybrid_rag::{HybridRagService, RagResult};
pub use ingestion::{DocumentChunk, DualTrackIngestor, Stage1Outcome, VisualElement};
pub use memory_manager::AamManager;
pub use retrieval::RealtimeRetrievalService;
pub use review::MemoryReviewJob;
pub use tasks::AsyncTaskProcessor;
pub use user_tasks::UserTaskService;
