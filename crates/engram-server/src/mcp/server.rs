//! MCP server; stateless dispatcher over the tool registry.
//!
//! Exactly three methods (`initialize`, `tools/list`, `tools/call`) plus
//! `/health` and `/ready` probes. Arguments of `tools/call` are validated
//! against the tool's JSON schema before dispatch, and a metrics callback
//! observes `(method, latency, is_error)` for every request.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use engram_domain::entities::{ToolDescriptor, ToolOrigin};
use serde_json::json;

use crate::mcp::metrics::ToolMetrics;
use crate::mcp::protocol::{
    ERROR_INTERNAL, ERROR_INVALID_PARAMS, ERROR_METHOD_NOT_FOUND, McpRequest, McpResponse,
    PROTOCOL_VERSION, ToolCallParams,
};
use crate::mcp::registry::{ToolHandler, ToolRegistry};

/// Callback observing `(method, latency_ms, is_error)` per request.
pub type MetricsCallback = Arc<dyn Fn(&str, f64, bool) + Send + Sync>;

/// Stateless MCP dispatcher.
pub struct McpServer {
    name: String,
    version: String,
    registry: Arc<ToolRegistry>,
    tool_metrics: Arc<ToolMetrics>,
    metrics_callback: Option<MetricsCallback>,
}

impl McpServer {
    /// Build a server over a fresh registry.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            registry: Arc::new(ToolRegistry::new()),
            tool_metrics: Arc::new(ToolMetrics::new()),
            metrics_callback: None,
        }
    }

    /// Attach a request metrics callback.
    #[must_use]
    pub fn with_metrics_callback(mut self, callback: MetricsCallback) -> Self {
        self.metrics_callback = Some(callback);
        self
    }

    /// The shared tool registry.
    #[must_use]
    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    /// Per-tool call metrics.
    #[must_use]
    pub fn tool_metrics(&self) -> Arc<ToolMetrics> {
        Arc::clone(&self.tool_metrics)
    }

    /// Register an internal tool.
    pub fn register_tool(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
        handler: Arc<dyn ToolHandler>,
    ) {
        let descriptor = ToolDescriptor {
            name: name.into(),
            description: description.into(),
            input_schema,
            origin: ToolOrigin::Internal,
            endpoint: None,
            auth: None,
        };
        self.registry.register(descriptor, handler, None);
    }

    /// Dispatch one request.
    pub async fn handle(&self, request: McpRequest) -> McpResponse {
        let start = Instant::now();
        let method = request.method.clone();
        let response = self.dispatch(request).await;
        if let Some(callback) = &self.metrics_callback {
            callback(
                &method,
                start.elapsed().as_secs_f64() * 1000.0,
                response.error.is_some(),
            );
        }
        response
    }

    async fn dispatch(&self, request: McpRequest) -> McpResponse {
        match request.method.as_str() {
            "initialize" => McpResponse::success(
                request.id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "serverInfo": { "name": self.name, "version": self.version },
                }),
            ),
            "tools/list" => {
                let tools: Vec<serde_json::Value> = self
                    .registry
                    .descriptors()
                    .iter()
                    .map(Self::descriptor_json)
                    .collect();
                McpResponse::success(request.id, json!({ "tools": tools }))
            }
            "tools/call" => self.handle_tool_call(request).await,
            other => McpResponse::failure(
                request.id,
                ERROR_METHOD_NOT_FOUND,
                "Method not found",
                Some(json!({ "method": other })),
            ),
        }
    }

    fn descriptor_json(descriptor: &ToolDescriptor) -> serde_json::Value {
        json!({
            "name": descriptor.name,
            "description": descriptor.description,
            "inputSchema": descriptor.input_schema,
        })
    }

    async fn handle_tool_call(&self, request: McpRequest) -> McpResponse {
        let params: ToolCallParams = match request
            .params
            .clone()
            .map(serde_json::from_value)
            .transpose()
        {
            Ok(Some(params)) => params,
            Ok(None) => {
                return McpResponse::failure(
                    request.id,
                    ERROR_INVALID_PARAMS,
                    "Missing params for tools/call",
                    None,
                );
            }
            Err(e) => {
                return McpResponse::failure(
                    request.id,
                    ERROR_INVALID_PARAMS,
                    "Malformed params for tools/call",
                    Some(json!({ "error": e.to_string() })),
                );
            }
        };

        let Some((descriptor, handler)) = self.registry.get(&params.name) else {
            return McpResponse::failure(
                request.id,
                ERROR_INTERNAL,
                format!("Tool '{}' not found", params.name),
                None,
            );
        };

        // Validate arguments against the declared schema before dispatch.
        if let Ok(validator) = jsonschema::validator_for(&descriptor.input_schema) {
            let errors: Vec<String> = validator
                .iter_errors(&params.arguments)
                .map(|e| e.to_string())
                .collect();
            if !errors.is_empty() {
                return McpResponse::failure(
                    request.id,
                    ERROR_INVALID_PARAMS,
                    format!("Invalid arguments for tool '{}'", params.name),
                    Some(json!({ "errors": errors })),
                );
            }
        }

        let start = Instant::now();
        match handler.call(params.arguments).await {
            Ok(result) => {
                let latency = start.elapsed().as_secs_f64() * 1000.0;
                self.tool_metrics
                    .record_call(&params.name, true, latency, None);
                self.registry.record_tool_call(&params.name, true);
                let text = match &result {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                McpResponse::success(
                    request.id,
                    json!({ "content": [{ "type": "text", "text": text }] }),
                )
            }
            Err(e) => {
                let latency = start.elapsed().as_secs_f64() * 1000.0;
                self.tool_metrics
                    .record_call(&params.name, false, latency, Some("handler_error"));
                self.registry.record_tool_call(&params.name, false);
                tracing::error!(tool = %params.name, error = %e, "Tool call failed");
                McpResponse::failure(
                    request.id,
                    ERROR_INTERNAL,
                    "Internal error",
                    Some(json!({ "error": e.to_string() })),
                )
            }
        }
    }

    /// Build the axum router exposing `/mcp`, `/health`, and `/ready`.
    #[must_use]
    pub fn router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/mcp", post(handle_mcp))
            .route("/health", get(health))
            .route("/ready", get(ready))
            .with_state(self)
    }
}

async fn handle_mcp(
    State(server): State<Arc<McpServer>>,
    Json(request): Json<McpRequest>,
) -> Json<McpResponse> {
    Json(server.handle(request).await)
}

async fn health(State(server): State<Arc<McpServer>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "server": server.name,
        "version": server.version,
        "protocol_version": PROTOCOL_VERSION,
        "tools_count": server.registry.len(),
    }))
}

async fn ready(State(server): State<Arc<McpServer>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ready",
        "server": server.name,
        "tools_count": server.registry.len(),
    }))
}
