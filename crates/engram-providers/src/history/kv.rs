//! KV-backed history store.
//!
//! One JSON document per session under `{namespace}:{session_id}:messages`;
//! archives move the document to `{namespace}:{session_id}:archive:<ts>`.
//! The session TTL rides on the KV entry so expiry needs no sweeper when
//! the backend enforces TTLs (redis); the in-process cache backend is
//! swept by the recorder's cleanup pass.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engram_domain::constants::keys::HISTORY_NAMESPACE;
use engram_domain::constants::time::SESSION_TTL_SECS;
use engram_domain::entities::ContextMessage;
use engram_domain::error::{Error, Result};
use engram_domain::ports::{CacheEntryConfig, CacheProvider, HistoryStore, MessageFilter};
use engram_domain::utils::time;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Default)]
struct SessionDocument {
    messages: Vec<ContextMessage>,
    updated_at: Option<DateTime<Utc>>,
}

/// History store over a [`CacheProvider`] backend.
pub struct KvHistoryStore {
    cache: Arc<dyn CacheProvider>,
    namespace: String,
    ttl: Duration,
}

impl KvHistoryStore {
    /// Build a store with the default namespace and session TTL.
    #[must_use]
    pub fn new(cache: Arc<dyn CacheProvider>) -> Self {
        Self::with_config(
            cache,
            HISTORY_NAMESPACE,
            Duration::from_secs(SESSION_TTL_SECS),
        )
    }

    /// Build a store with explicit namespace and TTL.
    #[must_use]
    pub fn with_config(
        cache: Arc<dyn CacheProvider>,
        namespace: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            namespace: namespace.into(),
            ttl,
        }
    }

    fn messages_key(&self, session_id: &str) -> String {
        format!("{}:{session_id}:messages", self.namespace)
    }

    async fn load(&self, session_id: &str) -> Result<Option<SessionDocument>> {
        match self.cache.get_json(&self.messages_key(session_id)).await? {
            Some(json) => {
                let document = serde_json::from_str(&json)
                    .map_err(|e| Error::cache(format!("Corrupt session document: {e}")))?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, key: &str, document: &SessionDocument) -> Result<()> {
        let json = serde_json::to_string(document)?;
        self.cache
            .set_json(key, &json, CacheEntryConfig { ttl: Some(self.ttl) })
            .await
    }
}

#[async_trait]
impl HistoryStore for KvHistoryStore {
    async fn append(&self, session_id: &str, message: ContextMessage) -> Result<()> {
        let mut document = self.load(session_id).await?.unwrap_or_default();
        document.messages.push(message);
        document.updated_at = Some(time::now());
        self.save(&self.messages_key(session_id), &document).await
    }

    async fn messages(
        &self,
        session_id: &str,
        filter: &MessageFilter,
        limit: Option<usize>,
        offset: usize,
    ) -> Result<Vec<ContextMessage>> {
        let Some(document) = self.load(session_id).await? else {
            return Ok(Vec::new());
        };
        let mut messages: Vec<ContextMessage> = document
            .messages
            .into_iter()
            .filter(|m| filter.matches(m))
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
        Ok(self
            .load(session_id)
            .await?
            .map(|d| d.messages.iter().filter(|m| filter.matches(m)).count())
            .unwrap_or(0))
    }

    async fn delete_messages(&self, session_id: &str, filter: &MessageFilter) -> Result<usize> {
        let Some(mut document) = self.load(session_id).await? else {
            return Ok(0);
        };
        let before = document.messages.len();
        document.messages.retain(|m| !filter.matches(m));
        document.updated_at = Some(time::now());
        let deleted = before - document.messages.len();
        self.save(&self.messages_key(session_id), &document).await?;
        Ok(deleted)
    }

    async fn clear(&self, session_id: &str) -> Result<bool> {
        self.cache.delete(&self.messages_key(session_id)).await
    }

    async fn archive(&self, session_id: &str, archive_key: Option<String>) -> Result<bool> {
        let Some(document) = self.load(session_id).await? else {
            return Ok(false);
        };
        let archive_key = archive_key.unwrap_or_else(|| {
            format!(
                "{}:{session_id}:archive:{}",
                self.namespace,
                time::epoch_secs()
            )
        });
        // Archives have no TTL; they outlive the live session window.
        let json = serde_json::to_string(&document)?;
        self.cache
            .set_json(&archive_key, &json, CacheEntryConfig::default())
            .await?;
        self.cache.delete(&self.messages_key(session_id)).await?;
        Ok(true)
    }

    async fn session_ids(&self) -> Result<Vec<String>> {
        let prefix = format!("{}:", self.namespace);
        let keys = self.cache.keys(&prefix).await?;
        Ok(keys
            .iter()
            .filter_map(|key| {
                key.strip_prefix(&prefix)
                    .and_then(|rest| rest.strip_suffix(":messages"))
                    .map(str::to_owned)
            })
            .collect())
    }

    async fn last_touched(&self, session_id: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.load(session_id).await?.and_then(|d| d.updated_at))
    }
}
