//! In-process history store.
//!
//! Per-session bounded deques guarded by a mutex map. Suitable for
//! single-process deployments and tests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engram_domain::entities::ContextMessage;
use engram_domain::error::Result;
use engram_domain::ports::{HistoryStore, MessageFilter};
use engram_domain::utils::time;
use tokio::sync::Mutex;

struct SessionLog {
    messages: VecDeque<ContextMessage>,
    last_touched: DateTime<Utc>,
}

/// Memory-backed history store with a per-session window cap.
pub struct InMemoryHistoryStore {
    sessions: Mutex<HashMap<String, SessionLog>>,
    archives: Mutex<HashMap<String, Vec<ContextMessage>>>,
    max_history: usize,
}

impl InMemoryHistoryStore {
    /// Create a store retaining at most `max_history` messages per session.
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            archives: Mutex::new(HashMap::new()),
            max_history: max_history.max(1),
        }
    }

    /// Messages under an archive key, for replay after archiving.
    pub async fn archived(&self, archive_key: &str) -> Vec<ContextMessage> {
        self.archives
            .lock()
            .await
            .get(archive_key)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, session_id: &str, message: ContextMessage) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        let log = sessions
            .entry(session_id.to_owned())
            .or_insert_with(|| SessionLog {
                messages: VecDeque::new(),
                last_touched: time::now(),
            });
        if log.messages.len() >= self.max_history {
            log.messages.pop_front();
        }
        log.messages.push_back(message);
        log.last_touched = time::now();
        Ok(())
    }

    async fn messages(
        &self,
        session_id: &str,
        filter: &MessageFilter,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<ContextMessage>> {
        let sessions = self.sessions.lock().await;
        let Some(log) = sessions.get(session_id) else {
            return Ok(Vec::new());
        };
        let mut messages: Vec<ContextMessage> = log
            .messages
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        if offset > 0 {
            messages = messages.into_iter().skip(offset).collect();
        }
        if let Some(limit) = limit {
            if messages.len() > limit {
                messages = messages.split_off(messages.len() - limit);
            }
        }
        Ok(messages)
    }

    async fn message_count(&self, session_id: &str, filter: &MessageFilter) -> Result<usize> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .get(session_id)
            .map(|log| log.messages.iter().filter(|m| filter.matches(m)).count())
            .unwrap_or(0))
    }

    async fn delete_messages(&self, session_id: &str, filter: &MessageFilter) -> Result<usize> {
        let mut sessions = self.sessions.lock().await;
        let Some(log) = sessions.get_mut(session_id) else {
            return Ok(0);
        };
        let before = log.messages.len();
        log.messages.retain(|m| !filter.matches(m));
        log.last_touched = time::now();
        Ok(before - log.messages.len())
    }

    async fn clear(&self, session_id: &str) -> Result<bool> {
        Ok(self.sessions.lock().await.remove(session_id).is_some())
    }

    async fn archive(&self, session_id: &str, archive_key: Option<String>) -> Result<bool> {
        let mut sessions = self.sessions.lock().await;
        let Some(log) = sessions.remove(session_id) else {
            return Ok(false);
        };
        let archive_key = archive_key
            .unwrap_or_else(|| format!("{session_id}:archive:{}", time::epoch_secs()));
        self.archives
            .lock()
            .await
            .insert(archive_key, log.messages.into_iter().collect());
        Ok(true)
    }

    async fn session_ids(&self) -> Result<Vec<String>> {
        Ok(self.sessions.lock().await.keys().cloned().collect())
    }

    async fn last_touched(&self, session_id: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .sessions
            .lock()
            .await
            .get(session_id)
            .map(|log| log.last_touched))
    }
}
