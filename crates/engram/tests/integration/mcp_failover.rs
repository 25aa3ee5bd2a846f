//! Connection pool failover against a live in-process MCP server.

use std::sync::Arc;
use std::time::Duration;

use engram_server::mcp::{
    ConnectionStatus, FnToolHandler, LoadBalanceStrategy, McpConnectionPool, McpServer,
};

/// Spawn a real MCP server on an ephemeral port; returns its endpoint URL.
async fn spawn_mcp_server() -> String {
    let server = Arc::new(McpServer::new("live", "0.0.1"));
    server.register_tool(
        "ping",
        "Answer pong",
        serde_json::json!({"type": "object"}),
        Arc::new(FnToolHandler(|_args: serde_json::Value| async move {
            Ok(serde_json::json!({ "pong": true }))
        })),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, server.router()).await;
    });
    format!("http://{addr}/mcp")
}

#[tokio::test]
async fn test_failover_marks_bad_endpoint_and_reselects() {
    let good = spawn_mcp_server().await;
    // Port 1 refuses connections immediately.
    let bad = "http://127.0.0.1:1/mcp".to_owned();

    let pool = Arc::new(McpConnectionPool::with_config(
        vec![bad.clone(), good.clone()],
        LoadBalanceStrategy::RoundRobin,
        Duration::from_secs(3600),
        3,
        Duration::from_millis(10),
    ));
    pool.initialize().await;

    // The initial health sweep classifies both endpoints.
    let stats = pool.stats().await;
    let bad_stats = stats
        .connections
        .iter()
        .find(|c| c.endpoint == bad)
        .expect("bad endpoint stats");
    assert_eq!(bad_stats.status, ConnectionStatus::Unhealthy);
    assert!(bad_stats.last_error.is_some());

    // Pooled calls succeed by selecting the healthy endpoint.
    let tools = pool
        .call_with_retry(|client| async move { client.list_tools().await })
        .await
        .expect("pooled call");
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "ping");

    // Selection keeps skipping the unhealthy endpoint until a check passes.
    for _ in 0..5 {
        let conn = pool.get_connection().await.expect("healthy connection");
        assert_eq!(conn.endpoint, good);
    }

    let stats = pool.stats().await;
    assert_eq!(stats.healthy_connections, 1);
    assert_eq!(stats.unhealthy_connections, 1);
    pool.close().await;
}

#[tokio::test]
async fn test_pooled_tool_call_round_trip() {
    let good = spawn_mcp_server().await;
    let pool = Arc::new(McpConnectionPool::with_config(
        vec![good],
        LoadBalanceStrategy::LeastConnections,
        Duration::from_secs(3600),
        3,
        Duration::from_millis(10),
    ));
    pool.initialize().await;

    let result = pool
        .call_with_retry(|client| async move {
            client.call_tool("ping", serde_json::json!({})).await
        })
        .await
        .expect("tool call");
    assert_eq!(result["pong"], true);
    pool.close().await;
}
