//! Redis cache provider
//!
//! Distributed KV backend for the short-term memory tier and conversation
//! history. TTLs are enforced server-side via `SET .. EX`.

use async_trait::async_trait;
use engram_domain::error::{Error, Result};
use engram_domain::ports::{CacheEntryConfig, CacheProvider, CacheStats};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Redis-backed cache provider.
///
/// Holds a multiplexed connection manager; clones share the connection.
#[derive(Clone)]
pub struct RedisCacheProvider {
    manager: ConnectionManager,
    namespace: String,
}

impl RedisCacheProvider {
    /// Connect to a Redis instance.
    ///
    /// # Errors
    ///
    /// Returns an error when the URI is invalid or the initial connection
    /// cannot be established.
    pub async fn connect(uri: &str, namespace: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(uri)
            .map_err(|e| Error::configuration_with_source("Invalid Redis URI", e))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| Error::network_with_source("Redis connection failed", e))?;
        Ok(Self {
            manager,
            namespace: namespace.into(),
        })
    }

    fn qualified(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_owned()
        } else {
            format!("{}:{key}", self.namespace)
        }
    }

    fn strip(&self, key: &str) -> String {
        if self.namespace.is_empty() {
            key.to_owned()
        } else {
            key.strip_prefix(&format!("{}:", self.namespace))
                .unwrap_or(key)
                .to_owned()
        }
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        conn.get(self.qualified(key))
            .await
            .map_err(|e| Error::cache(format!("Redis GET failed: {e}")))
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let mut conn = self.manager.clone();
        let key = self.qualified(key);
        match config.ttl {
            Some(ttl) => {
                let _: () = conn
                    .set_ex(key, value, ttl.as_secs())
                    .await
                    .map_err(|e| Error::cache(format!("Redis SETEX failed: {e}")))?;
            }
            None => {
                let _: () = conn
                    .set(key, value)
                    .await
                    .map_err(|e| Error::cache(format!("Redis SET failed: {e}")))?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.manager.clone();
        let removed: i64 = conn
            .del(self.qualified(key))
            .await
            .map_err(|e| Error::cache(format!("Redis DEL failed: {e}")))?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.manager.clone();
        conn.exists(self.qualified(key))
            .await
            .map_err(|e| Error::cache(format!("Redis EXISTS failed: {e}")))
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut conn = self.manager.clone();
        let pattern = format!("{}*", self.qualified(prefix));
        let keys: Vec<String> = conn
            .keys(pattern)
            .await
            .map_err(|e| Error::cache(format!("Redis KEYS failed: {e}")))?;
        Ok(keys.into_iter().map(|k| self.strip(&k)).collect())
    }

    async fn clear(&self) -> Result<()> {
        let keys = self.keys("").await?;
        let mut conn = self.manager.clone();
        for key in keys {
            let _: () = conn
                .del(self.qualified(&key))
                .await
                .map_err(|e| Error::cache(format!("Redis DEL failed: {e}")))?;
        }
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        let entries = self.keys("").await?.len() as u64;
        Ok(CacheStats {
            hits: 0,
            misses: 0,
            entries,
        })
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

impl std::fmt::Debug for RedisCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheProvider")
            .field("namespace", &self.namespace)
            .finish()
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use std::sync::Arc;

use engram_domain::registry::cache::{CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry};

/// Factory function for creating Redis cache provider instances.
///
/// The registry factory is synchronous; connection setup happens lazily on a
/// blocking handshake through the current runtime.
fn redis_cache_factory(
    config: &CacheProviderConfig,
) -> std::result::Result<Arc<dyn CacheProvider>, String> {
    let uri = config
        .uri
        .clone()
        .ok_or_else(|| "Redis cache provider requires uri in config".to_owned())?;
    let namespace = config.namespace.clone().unwrap_or_default();

    let handle = tokio::runtime::Handle::try_current()
        .map_err(|_| "Redis cache provider requires a Tokio runtime".to_owned())?;
    let provider = std::thread::spawn(move || {
        handle.block_on(RedisCacheProvider::connect(&uri, namespace))
    })
    .join()
    .map_err(|_| "Redis connection task panicked".to_owned())?
    .map_err(|e| e.to_string())?;

    Ok(Arc::new(provider))
}

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static REDIS_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: "redis",
    description: "Redis distributed cache",
    build: redis_cache_factory,
};
