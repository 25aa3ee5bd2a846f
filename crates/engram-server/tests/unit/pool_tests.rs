use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use engram_server::mcp::{LoadBalanceStrategy, McpConnectionPool};

#[test]
fn test_strategy_parsing() {
    assert_eq!(
        LoadBalanceStrategy::from_str("round_robin"),
        Ok(LoadBalanceStrategy::RoundRobin)
    );
    assert_eq!(
        LoadBalanceStrategy::from_str("random"),
        Ok(LoadBalanceStrategy::Random)
    );
    assert_eq!(
        LoadBalanceStrategy::from_str("least_connections"),
        Ok(LoadBalanceStrategy::LeastConnections)
    );
    assert!(LoadBalanceStrategy::from_str("weighted").is_err());
}

#[tokio::test]
async fn test_no_healthy_connection_without_checks() {
    // Fresh pool, nothing probed yet: every endpoint is Unknown.
    let pool = McpConnectionPool::new(
        vec!["http://127.0.0.1:1/mcp".to_owned()],
        LoadBalanceStrategy::RoundRobin,
    );
    assert!(pool.get_connection().await.is_none());
}

#[tokio::test]
async fn test_call_with_retry_errors_when_pool_is_empty() {
    let pool = McpConnectionPool::new(Vec::new(), LoadBalanceStrategy::RoundRobin);
    let result = pool
        .call_with_retry(|client| async move { client.list_tools().await })
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_marked_unhealthy() {
    // Port 1 refuses connections immediately.
    let pool = Arc::new(McpConnectionPool::with_config(
        vec!["http://127.0.0.1:1/mcp".to_owned()],
        LoadBalanceStrategy::RoundRobin,
        Duration::from_secs(3600),
        1,
        Duration::from_millis(10),
    ));
    pool.initialize().await;

    let stats = pool.stats().await;
    assert_eq!(stats.total_connections, 1);
    assert_eq!(stats.healthy_connections, 0);
    assert_eq!(stats.unhealthy_connections, 1);
    assert!(stats.connections[0].last_error.is_some());
    assert!(stats.connections[0].last_health_check.is_some());

    // Unhealthy endpoints are excluded from selection.
    assert!(pool.get_connection().await.is_none());
    pool.close().await;
}
