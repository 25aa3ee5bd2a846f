//! # Server Layer
//!
//! The MCP protocol surface (dispatcher, client, connection pool, external
//! tool manager) and the REST routes the memory core collaborates with
//! (chat entry, session replay, model preferences, user tasks).

/// MCP protocol layer
pub mod mcp;
/// REST routes
pub mod routes;
/// Shared server state
pub mod state;

pub use mcp::{McpClient, McpConnectionPool, McpServer, ToolRegistry};
pub use routes::api_router;
pub use state::ServerState;
