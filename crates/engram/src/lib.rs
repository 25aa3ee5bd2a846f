//! # Engram
//!
//! An agent memory and retrieval platform: tiered memory (KV short-term,
//! vector long-term, graph shadow), hybrid vector+graph RAG, coreference
//! resolution, per-turn chat memory injection, an MCP tool surface with a
//! pooled client, and time-based memory hygiene.
//!
//! This crate re-exports the layered workspace for embedders and hosts the
//! server binary.

pub use engram_application as application;
pub use engram_domain as domain;
pub use engram_infrastructure as infrastructure;
pub use engram_providers as providers;
pub use engram_server as server;

use std::sync::Arc;

use engram_infrastructure::AppContext;
use engram_server::mcp::McpServer;
use engram_server::{ServerState, api_router};

/// Assemble the full HTTP router: REST surface plus the MCP dispatcher.
#[must_use]
pub fn build_router(ctx: Arc<AppContext>, mcp_server: Arc<McpServer>) -> axum::Router {
    api_router(ServerState::new(ctx)).merge(mcp_server.router())
}
