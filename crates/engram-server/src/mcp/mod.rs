//! MCP protocol layer: wire types, dispatcher, client, pool, external tools

/// MCP client
pub mod client;
/// External tool manager
pub mod external;
/// Per-tool call metrics
pub mod metrics;
/// Connection pool and load balancing
pub mod pool;
/// Wire types
pub mod protocol;
/// Tool registry
pub mod registry;
/// Dispatcher and HTTP routes
pub mod server;

pub use client::{McpClient, SharedMcpClient};
pub use external::{
    ExternalMcpTool, ExternalToolManager, StaticToolConfigStore, YamlToolConfigStore,
};
pub use metrics::{ToolMetrics, ToolMetricsSummary, ToolStatsView};
pub use pool::{ConnectionStatus, LoadBalanceStrategy, McpConnectionPool, PoolStats};
pub use protocol::{McpError, McpRequest, McpResponse, ToolCallParams};
pub use registry::{FnToolHandler, ToolHandler, ToolRegistry};
pub use server::McpServer;
