//! Background task records for the async processor.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{id, time};

/// Lifecycle state of a background task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Queued, not yet picked up
    Pending,
    /// Executing on a worker
    Running,
    /// Finished with a result
    Completed,
    /// Finished with an error
    Failed,
    /// Cancelled before or during execution
    Cancelled,
}

impl TaskStatus {
    /// Wire name of the status
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// True for states a task can never leave
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown task status: {s}")),
        }
    }
}

/// Descriptor of one background task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncTask {
    /// Task identity
    pub task_id: String,
    /// Application-level type tag
    pub task_type: String,
    /// Lifecycle state
    pub status: TaskStatus,
    /// Dispatch priority; higher runs first within the pool
    pub priority: i32,
    /// Submission timestamp
    pub created_at: DateTime<Utc>,
    /// Pickup timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Terminal timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Result payload, only set on `Completed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error message, only set on `Failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Application-level retry counter
    #[serde(default)]
    pub retry_count: u32,
    /// Submission metadata
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl AsyncTask {
    /// Create a pending task
    #[must_use]
    pub fn new(task_type: impl Into<String>, priority: i32) -> Self {
        Self {
            task_id: id::generate(),
            task_type: task_type.into(),
            status: TaskStatus::Pending,
            priority,
            created_at: time::now(),
            started_at: None,
            completed_at: None,
            result: None,
            error: None,
            retry_count: 0,
            metadata: HashMap::new(),
        }
    }
}
