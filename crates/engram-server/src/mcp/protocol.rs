//! MCP wire types.
//!
//! JSON-RPC-like request/response envelope with exactly three methods:
//! `initialize`, `tools/list`, `tools/call`. Numeric ids are echoed back;
//! unknown methods map to `-32601`, internal failures to `-32603`.

use serde::{Deserialize, Serialize};

/// Protocol version this server speaks
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Method not found
pub const ERROR_METHOD_NOT_FOUND: i64 = -32601;
/// Invalid params (schema validation)
pub const ERROR_INVALID_PARAMS: i64 = -32602;
/// Internal error
pub const ERROR_INTERNAL: i64 = -32603;

/// One MCP request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    /// Protocol tag; optional on the wire
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    /// Request id echoed back in the response
    #[serde(default)]
    pub id: Option<i64>,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl McpRequest {
    /// Build a request
    #[must_use]
    pub fn new(id: i64, method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: Some("2.0".to_owned()),
            id: Some(id),
            method: method.into(),
            params,
        }
    }
}

/// Structured wire error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    /// Numeric error code
    pub code: i64,
    /// Human-readable message
    pub message: String,
    /// Optional structured detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// One MCP response: either `result` or `error` is present
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    /// Request id echoed back
    #[serde(default)]
    pub id: Option<i64>,
    /// Success payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Failure payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl McpResponse {
    /// A success response
    #[must_use]
    pub fn success(id: Option<i64>, result: serde_json::Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    /// An error response
    #[must_use]
    pub fn failure(
        id: Option<i64>,
        code: i64,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id,
            result: None,
            error: Some(McpError {
                code,
                message: message.into(),
                data,
            }),
        }
    }
}

/// Parameters of a `tools/call` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallParams {
    /// Tool name
    pub name: String,
    /// Tool arguments
    #[serde(default)]
    pub arguments: serde_json::Value,
}
