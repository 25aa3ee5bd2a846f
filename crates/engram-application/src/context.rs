//! Conversation context recording and history access.
//!
//! `ContextRecorder` fronts a [`HistoryStore`] backend (in-process or KV)
//! with the per-session append/read/filter/archive operations and TTL-based
//! session expiry. Appends within one session are ordered; single-writer
//! per session is assumed.

use std::sync::Arc;
use std::time::Duration;

use engram_domain::constants::time::SESSION_TTL_SECS;
use engram_domain::entities::{ChatTurn, ContextMessage, MessageRole};
use engram_domain::error::Result;
use engram_domain::ports::{HistoryStore, MessageFilter};
use engram_domain::utils::time;

/// Session-scoped conversation recorder.
pub struct ContextRecorder {
    store: Arc<dyn HistoryStore>,
    session_ttl: Duration,
}

impl ContextRecorder {
    /// Build a recorder with the default 3600 s session TTL.
    #[must_use]
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self::with_ttl(store, Duration::from_secs(SESSION_TTL_SECS))
    }

    /// Build a recorder with an explicit session TTL.
    #[must_use]
    pub fn with_ttl(store: Arc<dyn HistoryStore>, session_ttl: Duration) -> Self {
        Self { store, session_ttl }
    }

    /// Append one message to a session's ordered log.
    pub async fn record(
        &self,
        session_id: &str,
        role: MessageRole,
        content: impl Into<String>,
        metadata: Option<std::collections::HashMap<String, serde_json::Value>>,
    ) -> Result<()> {
        let mut message = ContextMessage::new(role, content);
        if let Some(metadata) = metadata {
            message.metadata = metadata;
        }
        self.store.append(session_id, message).await?;
        tracing::debug!(session_id, "Recorded context entry");
        Ok(())
    }

    /// Read session history, newest-`limit` messages in chronological order,
    /// optionally filtered by role.
    pub async fn get_history(
        &self,
        session_id: &str,
        limit: Option<usize>,
        role_filter: Option<MessageRole>,
    ) -> Result<Vec<ContextMessage>> {
        let filter = MessageFilter {
            role: role_filter,
            ..MessageFilter::default()
        };
        self.store.messages(session_id, &filter, limit, 0).await
    }

    /// LLM-ready `[{role, content}]` view of the session.
    pub async fn get_conversation_context(
        &self,
        session_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ChatTurn>> {
        let history = self.get_history(session_id, limit, None).await?;
        Ok(history
            .into_iter()
            .map(|m| ChatTurn {
                role: m.role.as_str().to_owned(),
                content: m.content,
            })
            .collect())
    }

    /// Count messages passing a filter.
    pub async fn message_count(&self, session_id: &str, filter: &MessageFilter) -> Result<usize> {
        self.store.message_count(session_id, filter).await
    }

    /// Delete messages matching the filter; returns deleted count.
    pub async fn delete_messages(
        &self,
        session_id: &str,
        filter: &MessageFilter,
    ) -> Result<usize> {
        let deleted = self.store.delete_messages(session_id, filter).await?;
        tracing::info!(session_id, deleted, "Deleted history messages");
        Ok(deleted)
    }

    /// Drop a session's whole log.
    pub async fn clear_history(&self, session_id: &str) -> Result<bool> {
        self.store.clear(session_id).await
    }

    /// Move the full list to an archive key and remove the live key.
    pub async fn archive_session(
        &self,
        session_id: &str,
        archive_key: Option<String>,
    ) -> Result<bool> {
        let archived = self.store.archive(session_id, archive_key).await?;
        if archived {
            tracing::info!(session_id, "Archived session");
        }
        Ok(archived)
    }

    /// Delete sessions whose last touch is older than the TTL; returns the
    /// number of sessions removed.
    pub async fn cleanup_expired_sessions(&self) -> Result<usize> {
        let cutoff = time::now()
            - chrono::Duration::from_std(self.session_ttl)
                .unwrap_or_else(|_| chrono::Duration::seconds(SESSION_TTL_SECS as i64));
        let mut removed = 0;
        for session_id in self.store.session_ids().await? {
            let expired = match self.store.last_touched(&session_id).await? {
                Some(last) => last < cutoff,
                None => true,
            };
            if expired && self.store.clear(&session_id).await? {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(removed, "Cleaned up expired sessions");
        }
        Ok(removed)
    }
}
