//! Cache provider port; JSON values over a namespaced key space.
#![allow(missing_docs)]

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Per-entry write options
#[derive(Debug, Clone, Default)]
pub struct CacheEntryConfig {
    /// Time to live; `None` means no expiry
    pub ttl: Option<Duration>,
}

impl CacheEntryConfig {
    /// Entry expiring after `secs` seconds
    #[must_use]
    pub fn ttl_secs(secs: u64) -> Self {
        Self {
            ttl: Some(Duration::from_secs(secs)),
        }
    }
}

/// Counters reported by a cache backend
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug {
    async fn get_json(&self, key: &str) -> Result<Option<String>>;
    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<bool>;
    async fn exists(&self, key: &str) -> Result<bool>;
    /// List live keys under a prefix. Backends may cap the scan.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;
    async fn clear(&self) -> Result<()>;
    async fn stats(&self) -> Result<CacheStats>;
    fn provider_name(&self) -> &str;
}
