//! In-memory append-only operation log.

use async_trait::async_trait;
use dashmap::DashMap;
use engram_domain::error::Result;
use engram_domain::ports::OperationLogStore;

/// Append-only documents keyed `{user}_{resource}_{op}_{ts_ms}`.
#[derive(Default)]
pub struct InMemoryOperationLogStore {
    documents: DashMap<String, serde_json::Value>,
}

impl InMemoryOperationLogStore {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OperationLogStore for InMemoryOperationLogStore {
    async fn append(&self, key: &str, document: serde_json::Value) -> Result<()> {
        self.documents.insert(key.to_owned(), document);
        Ok(())
    }

    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<serde_json::Value>> {
        let mut entries: Vec<(String, serde_json::Value)> = self
            .documents
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries.into_iter().map(|(_, v)| v).collect())
    }
}
