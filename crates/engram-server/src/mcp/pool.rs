//! MCP connection pool.
//!
//! Strategy-based load balancing over several MCP endpoints with a
//! background health-check loop. An endpoint failing a call or a check is
//! marked unhealthy and excluded from selection until its next successful
//! check; `call_with_retry` reselects across the remaining endpoints.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use engram_domain::constants::retry::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use engram_domain::constants::time::HEALTH_CHECK_INTERVAL_SECS;
use engram_domain::error::{Error, Result};
use engram_domain::utils::time;
use rand::Rng;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::mcp::client::{McpClient, SharedMcpClient};

/// Endpoint selection strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalanceStrategy {
    /// Rotate through healthy endpoints
    #[default]
    RoundRobin,
    /// Pick a random healthy endpoint
    Random,
    /// Pick the healthy endpoint with the fewest failures
    LeastConnections,
}

impl std::str::FromStr for LoadBalanceStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "round_robin" => Ok(Self::RoundRobin),
            "random" => Ok(Self::Random),
            "least_connections" => Ok(Self::LeastConnections),
            _ => Err(format!("Unknown load balance strategy: {s}")),
        }
    }
}

/// Health state of one pooled endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Last check or call succeeded
    Healthy,
    /// Last check or call failed
    Unhealthy,
    /// Not yet checked
    Unknown,
}

/// One pooled endpoint.
pub struct ConnectionInfo {
    /// Endpoint URL
    pub endpoint: String,
    /// The shared client
    pub client: SharedMcpClient,
    status: Mutex<ConnectionStatus>,
    failure_count: AtomicU64,
    success_count: AtomicU64,
    last_error: Mutex<Option<String>>,
    last_health_check: Mutex<Option<i64>>,
}

impl ConnectionInfo {
    fn new(endpoint: String) -> Self {
        let client = Arc::new(McpClient::new(endpoint.clone()));
        Self {
            endpoint,
            client,
            status: Mutex::new(ConnectionStatus::Unknown),
            failure_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            last_error: Mutex::new(None),
            last_health_check: Mutex::new(None),
        }
    }

    /// Current health state.
    pub async fn status(&self) -> ConnectionStatus {
        *self.status.lock().await
    }

    async fn mark_healthy(&self) {
        *self.status.lock().await = ConnectionStatus::Healthy;
        self.success_count.fetch_add(1, Ordering::Relaxed);
        self.failure_count.store(0, Ordering::Relaxed);
    }

    async fn mark_unhealthy(&self, error: String) {
        *self.status.lock().await = ConnectionStatus::Unhealthy;
        self.failure_count.fetch_add(1, Ordering::Relaxed);
        *self.last_error.lock().await = Some(error);
    }

    /// Probe the endpoint: initialize on first contact, refresh tools after.
    pub async fn health_check(&self) -> bool {
        let result = if self.client.is_initialized().await {
            self.client.refresh_tools().await.map(|_| ())
        } else {
            self.client.initialize().await.map(|_| ())
        };
        *self.last_health_check.lock().await = Some(time::epoch_secs());
        match result {
            Ok(()) => {
                self.mark_healthy().await;
                true
            }
            Err(e) => {
                tracing::warn!(endpoint = %self.endpoint, error = %e, "Health check failed");
                self.mark_unhealthy(e.to_string()).await;
                false
            }
        }
    }
}

/// Per-endpoint statistics snapshot
#[derive(Debug, Clone, Serialize)]
pub struct EndpointStats {
    /// Endpoint URL
    pub endpoint: String,
    /// Health state
    pub status: ConnectionStatus,
    /// Consecutive failures since last success
    pub failure_count: u64,
    /// Lifetime successes
    pub success_count: u64,
    /// Last error observed
    pub last_error: Option<String>,
    /// Last health-check instant (epoch seconds)
    pub last_health_check: Option<i64>,
}

/// Aggregate pool statistics
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    /// Endpoints in the pool
    pub total_connections: usize,
    /// Currently healthy endpoints
    pub healthy_connections: usize,
    /// Currently unhealthy endpoints
    pub unhealthy_connections: usize,
    /// Per-endpoint detail
    pub connections: Vec<EndpointStats>,
}

/// Pool of MCP clients with health checks and failover.
pub struct McpConnectionPool {
    connections: Vec<Arc<ConnectionInfo>>,
    strategy: LoadBalanceStrategy,
    health_check_interval: Duration,
    max_retries: u32,
    retry_delay: Duration,
    round_robin_index: AtomicUsize,
    shutdown: CancellationToken,
}

impl McpConnectionPool {
    /// Build a pool over the given endpoints.
    #[must_use]
    pub fn new(endpoints: Vec<String>, strategy: LoadBalanceStrategy) -> Self {
        Self::with_config(
            endpoints,
            strategy,
            Duration::from_secs(HEALTH_CHECK_INTERVAL_SECS),
            DEFAULT_MAX_RETRIES,
            DEFAULT_RETRY_DELAY,
        )
    }

    /// Build a pool with explicit intervals and retry policy.
    #[must_use]
    pub fn with_config(
        endpoints: Vec<String>,
        strategy: LoadBalanceStrategy,
        health_check_interval: Duration,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Self {
        let connections = endpoints
            .into_iter()
            .map(|endpoint| Arc::new(ConnectionInfo::new(endpoint)))
            .collect();
        Self {
            connections,
            strategy,
            health_check_interval,
            max_retries,
            retry_delay,
            round_robin_index: AtomicUsize::new(0),
            shutdown: CancellationToken::new(),
        }
    }

    /// Initialize every endpoint and start the background health loop.
    pub async fn initialize(self: &Arc<Self>) {
        for conn in &self.connections {
            conn.health_check().await;
        }
        let pool = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = tokio::time::sleep(pool.health_check_interval) => {
                        pool.perform_health_checks().await;
                    }
                    () = pool.shutdown.cancelled() => break,
                }
            }
        });
        tracing::info!(
            connections = self.connections.len(),
            "Connection pool initialized"
        );
    }

    async fn perform_health_checks(&self) {
        let checks = self.connections.iter().map(|c| c.health_check());
        futures::future::join_all(checks).await;
    }

    async fn healthy_connections(&self) -> Vec<Arc<ConnectionInfo>> {
        let mut healthy = Vec::new();
        for conn in &self.connections {
            if conn.status().await == ConnectionStatus::Healthy {
                healthy.push(Arc::clone(conn));
            }
        }
        healthy
    }

    /// Select a healthy endpoint according to the pool strategy.
    pub async fn get_connection(&self) -> Option<Arc<ConnectionInfo>> {
        let healthy = self.healthy_connections().await;
        if healthy.is_empty() {
            return None;
        }
        let index = match self.strategy {
            LoadBalanceStrategy::RoundRobin => {
                self.round_robin_index.fetch_add(1, Ordering::Relaxed) % healthy.len()
            }
            LoadBalanceStrategy::Random => rand::thread_rng().gen_range(0..healthy.len()),
            LoadBalanceStrategy::LeastConnections => {
                let mut best = 0;
                let mut best_failures = u64::MAX;
                for (i, conn) in healthy.iter().enumerate() {
                    let failures = conn.failure_count.load(Ordering::Relaxed);
                    if failures < best_failures {
                        best_failures = failures;
                        best = i;
                    }
                }
                best
            }
        };
        Some(Arc::clone(&healthy[index]))
    }

    /// Run `operation` against a healthy endpoint; on failure mark it
    /// unhealthy, back off, and retry on a different endpoint up to
    /// `max_retries` attempts.
    pub async fn call_with_retry<T, F, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn(SharedMcpClient) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error: Option<Error> = None;
        for attempt in 0..self.max_retries {
            let Some(conn) = self.get_connection().await else {
                return Err(Error::network("No healthy connections available"));
            };
            match operation(Arc::clone(&conn.client)).await {
                Ok(result) => {
                    conn.mark_healthy().await;
                    return Ok(result);
                }
                Err(e) => {
                    tracing::warn!(
                        endpoint = %conn.endpoint,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        error = %e,
                        "Pooled call failed"
                    );
                    conn.mark_unhealthy(e.to_string()).await;
                    last_error = Some(e);
                    if attempt + 1 < self.max_retries {
                        tokio::time::sleep(self.retry_delay * (attempt + 1)).await;
                    }
                }
            }
        }
        Err(last_error.unwrap_or_else(|| Error::network("All retry attempts failed")))
    }

    /// Statistics snapshot across the pool.
    pub async fn stats(&self) -> PoolStats {
        let mut connections = Vec::with_capacity(self.connections.len());
        let mut healthy = 0;
        for conn in &self.connections {
            let status = conn.status().await;
            if status == ConnectionStatus::Healthy {
                healthy += 1;
            }
            connections.push(EndpointStats {
                endpoint: conn.endpoint.clone(),
                status,
                failure_count: conn.failure_count.load(Ordering::Relaxed),
                success_count: conn.success_count.load(Ordering::Relaxed),
                last_error: conn.last_error.lock().await.clone(),
                last_health_check: *conn.last_health_check.lock().await,
            });
        }
        PoolStats {
            total_connections: self.connections.len(),
            healthy_connections: healthy,
            unhealthy_connections: self.connections.len() - healthy,
            connections,
        }
    }

    /// Stop the health loop and drop endpoint sessions.
    pub async fn close(&self) {
        self.shutdown.cancel();
        for conn in &self.connections {
            conn.client.close().await;
        }
        tracing::info!("Connection pool closed");
    }
}
