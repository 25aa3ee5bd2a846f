//! Engram server entry point.

use std::sync::Arc;

use engram_infrastructure::{ConfigLoader, init_app, init_logging};
use engram_server::mcp::McpServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new().load()?;
    init_logging(&config.logging)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let ctx = Arc::new(init_app(config).await?);

    let mcp_server = Arc::new(McpServer::new("engram", env!("CARGO_PKG_VERSION")));
    register_builtin_tools(&ctx, &mcp_server);

    let router = engram::build_router(Arc::clone(&ctx), Arc::clone(&mcp_server));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Engram server listening");
    axum::serve(listener, router).await?;
    Ok(())
}

/// Expose the memory core over the MCP tool surface.
fn register_builtin_tools(ctx: &Arc<engram_infrastructure::AppContext>, server: &Arc<McpServer>) {
    use engram_server::mcp::FnToolHandler;

    let aam = ctx.aam();
    server.register_tool(
        "memory_search",
        "Search tiered memory by text query",
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" },
                "limit": { "type": "integer", "minimum": 1 }
            },
            "required": ["query"]
        }),
        Arc::new(FnToolHandler(move |args: serde_json::Value| {
            let aam = Arc::clone(&aam);
            async move {
                let query = args.get("query").and_then(|v| v.as_str()).unwrap_or_default();
                let limit = args
                    .get("limit")
                    .and_then(serde_json::Value::as_u64)
                    .unwrap_or(10) as usize;
                let results = aam.search_memories(query, None, limit, 0.0).await;
                Ok(serde_json::json!({ "memories": results }))
            }
        })),
    );

    let hybrid = ctx.hybrid_rag();
    server.register_tool(
        "hybrid_retrieve",
        "Hybrid vector + graph retrieval over long-term memory",
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string" },
                "top_k": { "type": "integer", "minimum": 1 }
            },
            "required": ["query"]
        }),
        Arc::new(FnToolHandler(move |args: serde_json::Value| {
            let hybrid = Arc::clone(&hybrid);
            async move {
                let query = args.get("query").and_then(|v| v.as_str()).unwrap_or_default();
                let top_k = args
                    .get("top_k")
                    .and_then(serde_json::Value::as_u64)
                    .unwrap_or(10) as usize;
                let results = hybrid.retrieve(query, top_k, None, 0.0).await;
                Ok(serde_json::json!({ "results": results }))
            }
        })),
    );
}
