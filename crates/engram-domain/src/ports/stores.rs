//! Repository ports for documents the core persists outside the memory tiers.
#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{ContextMessage, ExternalToolConfig, MessageRole, UserTask};
use crate::error::Result;

/// Filters applied when reading or deleting history messages
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    /// Keep only this role
    pub role: Option<MessageRole>,
    /// Keep only messages from this agent
    pub agent_name: Option<String>,
    /// Keep only messages at or after this instant
    pub start_time: Option<DateTime<Utc>>,
    /// Keep only messages at or before this instant
    pub end_time: Option<DateTime<Utc>>,
}

impl MessageFilter {
    /// True when the message passes every set filter
    #[must_use]
    pub fn matches(&self, message: &ContextMessage) -> bool {
        if let Some(role) = self.role {
            if message.role != role {
                return false;
            }
        }
        if let Some(agent) = &self.agent_name {
            if message.agent_name.as_deref() != Some(agent.as_str()) {
                return false;
            }
        }
        if let Some(start) = self.start_time {
            if message.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if message.timestamp > end {
                return false;
            }
        }
        true
    }
}

/// Per-session ordered message log.
///
/// Two backends exist: in-process and KV. Single-session single-writer is
/// assumed; no cross-process ordering beyond the backing store's.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one message; refreshes the session's TTL.
    async fn append(&self, session_id: &str, message: ContextMessage) -> Result<()>;

    /// Read messages passing the filter, oldest first, capped at `limit`
    /// newest when set.
    async fn messages(
        &self,
        session_id: &str,
        filter: &MessageFilter,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<ContextMessage>>;

    /// Count messages passing the filter.
    async fn message_count(&self, session_id: &str, filter: &MessageFilter) -> Result<usize>;

    /// Delete messages matching the filter; returns deleted count.
    async fn delete_messages(&self, session_id: &str, filter: &MessageFilter) -> Result<usize>;

    /// Drop the whole session log.
    async fn clear(&self, session_id: &str) -> Result<bool>;

    /// Move the full list to an archive key and remove the live key.
    async fn archive(&self, session_id: &str, archive_key: Option<String>) -> Result<bool>;

    /// Session ids with a live message log.
    async fn session_ids(&self) -> Result<Vec<String>>;

    /// Last-touch instant of a session, when known.
    async fn last_touched(&self, session_id: &str) -> Result<Option<DateTime<Utc>>>;
}

/// UI task persistence as the core touches it (soft-delete contract).
#[async_trait]
pub trait UserTaskStore: Send + Sync {
    async fn insert(&self, task: &UserTask) -> Result<()>;
    async fn get(&self, user_id: &str, task_id: &str) -> Result<Option<UserTask>>;
    async fn update(&self, task: &UserTask) -> Result<bool>;
    /// Hard delete; only the service's permanent-delete path calls this.
    async fn remove(&self, user_id: &str, task_id: &str) -> Result<bool>;
    async fn list(&self, user_id: &str, include_archived: bool) -> Result<Vec<UserTask>>;
    /// Tasks across all users whose scheduled purge is due.
    async fn list_expired_trash(&self, now: DateTime<Utc>) -> Result<Vec<UserTask>>;
}

/// Append-only operation log documents keyed `{user}_{resource}_{op}_{ts_ms}`.
#[async_trait]
pub trait OperationLogStore: Send + Sync {
    async fn append(&self, key: &str, document: serde_json::Value) -> Result<()>;
    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<serde_json::Value>>;
}

/// Source of external tool descriptors (config table with file fallback).
#[async_trait]
pub trait ToolConfigStore: Send + Sync {
    async fn load(&self) -> Result<Vec<ExternalToolConfig>>;
}
