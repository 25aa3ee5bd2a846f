//! Core business entities with identity

mod context;
mod deletion;
mod graph;
mod memory;
mod resolution;
mod response;
mod review;
mod task;
mod tool;
mod user_task;

pub use context::{ChatTurn, ContextMessage, ContextSession, MessageRole};
pub use deletion::{
    DeletionKind, DeletionOperation, DeletionTransaction, OperationStatus, TransactionStatus,
};
pub use graph::{GraphEntity, GraphRelation, NeighborRecord, SubgraphPath};
pub use memory::{MemoryPriority, MemoryRecord, MemoryStatus, MemoryTier, sort_by_relevance};
pub use resolution::{ResolutionMethod, ResolutionResult};
pub use response::{ErrorCode, ResponseStatus, StructuredResponse};
pub use review::{MemoryReviewReport, UserMemoryStats};
pub use task::{AsyncTask, TaskStatus};
pub use tool::{
    AuthConfig, AuthType, ExternalToolConfig, ProxyConfig, ToolDescriptor, ToolOrigin,
};
pub use user_task::{UserTask, UserTaskStatus};
