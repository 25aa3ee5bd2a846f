//! Deletion transaction records.
//!
//! A transaction lives only for the duration of one delete request and is
//! persisted afterwards as an operation log / report. There is no automatic
//! rollback of successful deletes; cleanup is a forward retry problem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time;

/// Store surface a deletion step targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionKind {
    /// Vector points for a file
    Vector,
    /// Knowledge-graph entities referencing a file
    KgEntity,
    /// Knowledge-graph relations referencing a file
    KgRelation,
    /// File metadata document
    Metadata,
    /// The stored file object itself
    File,
    /// A folder document
    Folder,
    /// The owning task record
    Task,
}

impl DeletionKind {
    /// Wire name of the kind
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::KgEntity => "kg_entity",
            Self::KgRelation => "kg_relation",
            Self::Metadata => "metadata",
            Self::File => "file",
            Self::Folder => "folder",
            Self::Task => "task",
        }
    }

    /// Per-file execution order of the file-scoped kinds
    #[must_use]
    pub fn file_sequence() -> [Self; 5] {
        [
            Self::Vector,
            Self::KgEntity,
            Self::KgRelation,
            Self::Metadata,
            Self::File,
        ]
    }
}

/// Outcome of one deletion step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// Recorded, not yet executed
    Pending,
    /// Delete succeeded
    Success,
    /// Delete failed after all retries
    Failed,
}

/// One tracked deletion step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionOperation {
    /// File, folder, or task id the step targets
    pub target_id: String,
    /// Store surface targeted
    pub kind: DeletionKind,
    /// Step outcome
    pub status: OperationStatus,
    /// Final error when the step failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Attempts spent beyond the first
    #[serde(default)]
    pub retry_count: u32,
    /// Step start
    pub started_at: DateTime<Utc>,
    /// Step completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Aggregate outcome of a whole transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Steps still executing
    InProgress,
    /// All steps succeeded
    Completed,
    /// Some steps failed
    PartiallyFailed,
    /// All steps failed
    Failed,
}

/// Operation log of one multi-store delete request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionTransaction {
    /// Owning task
    pub task_id: String,
    /// Requesting user
    pub user_id: String,
    /// Request start
    pub started_at: DateTime<Utc>,
    /// Request completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Aggregate status
    pub status: TransactionStatus,
    /// Tracked steps in execution order
    pub operations: Vec<DeletionOperation>,
}

impl DeletionTransaction {
    /// Open a transaction for a task delete
    #[must_use]
    pub fn new(task_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            user_id: user_id.into(),
            started_at: time::now(),
            completed_at: None,
            status: TransactionStatus::InProgress,
            operations: Vec::new(),
        }
    }

    /// Record a pending step and return its index
    pub fn add_operation(&mut self, target_id: impl Into<String>, kind: DeletionKind) -> usize {
        self.operations.push(DeletionOperation {
            target_id: target_id.into(),
            kind,
            status: OperationStatus::Pending,
            error: None,
            retry_count: 0,
            started_at: time::now(),
            completed_at: None,
        });
        self.operations.len() - 1
    }

    /// Mark the step at `index` successful
    pub fn mark_success(&mut self, index: usize) {
        if let Some(op) = self.operations.get_mut(index) {
            op.status = OperationStatus::Success;
            op.retry_count = 0;
            op.completed_at = Some(time::now());
        }
    }

    /// Mark the step at `index` failed with its final error
    pub fn mark_failed(&mut self, index: usize, error: impl Into<String>, retry_count: u32) {
        if let Some(op) = self.operations.get_mut(index) {
            op.status = OperationStatus::Failed;
            op.error = Some(error.into());
            op.retry_count = retry_count;
            op.completed_at = Some(time::now());
        }
    }

    /// Number of successful steps
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| op.status == OperationStatus::Success)
            .count()
    }

    /// Number of failed steps
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| op.status == OperationStatus::Failed)
            .count()
    }

    /// Failed steps, in execution order
    #[must_use]
    pub fn failed_operations(&self) -> Vec<&DeletionOperation> {
        self.operations
            .iter()
            .filter(|op| op.status == OperationStatus::Failed)
            .collect()
    }

    /// Close the transaction and derive the aggregate status
    pub fn complete(&mut self) -> TransactionStatus {
        self.completed_at = Some(time::now());
        let failed = self.failed_count();
        self.status = if failed == 0 {
            TransactionStatus::Completed
        } else if failed < self.operations.len() {
            TransactionStatus::PartiallyFailed
        } else {
            TransactionStatus::Failed
        };
        self.status
    }
}
