//! UI task records and the two-step soft-delete contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::time;

/// Display status controlling sidebar visibility and deletion staging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserTaskStatus {
    /// Visible and live
    #[default]
    Activate,
    /// Hidden but kept
    Archive,
    /// Soft-deleted, awaiting permanent purge
    Trash,
}

impl UserTaskStatus {
    /// Wire name of the status
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Archive => "archive",
            Self::Trash => "trash",
        }
    }
}

impl std::str::FromStr for UserTaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "activate" => Ok(Self::Activate),
            "archive" => Ok(Self::Archive),
            "trash" => Ok(Self::Trash),
            _ => Err(format!("Unknown user task status: {s}")),
        }
    }
}

/// A UI task document as the core touches it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTask {
    /// Task identity
    pub task_id: String,
    /// Owning user
    pub user_id: String,
    /// Task title
    pub title: String,
    /// Workflow state (pending / in-progress / completed), opaque to the core
    #[serde(default)]
    pub status: String,
    /// Display / deletion staging status
    #[serde(default)]
    pub task_status: UserTaskStatus,
    /// Soft-delete timestamp; cleared on restore
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Scheduled permanent purge; `deleted_at + 7d`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent_delete_at: Option<DateTime<Utc>>,
    /// Colour label carried for the UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_color: Option<String>,
    /// Agent-run marker carried for the UI
    #[serde(default)]
    pub is_agent_task: bool,
    /// Opaque task payload (messages, file tree, execution config)
    #[serde(default)]
    pub payload: serde_json::Value,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl UserTask {
    /// Create a live task
    #[must_use]
    pub fn new(
        task_id: impl Into<String>,
        user_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let now = time::now();
        Self {
            task_id: task_id.into(),
            user_id: user_id.into(),
            title: title.into(),
            status: "pending".to_owned(),
            task_status: UserTaskStatus::Activate,
            deleted_at: None,
            permanent_delete_at: None,
            label_color: None,
            is_agent_task: false,
            payload: serde_json::Value::Null,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the task sits in trash
    #[must_use]
    pub fn is_trashed(&self) -> bool {
        self.task_status == UserTaskStatus::Trash
    }
}
