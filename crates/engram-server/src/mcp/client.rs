//! MCP client.
//!
//! initialize → list tools → call tool against one endpoint, with typed
//! auth headers and a linear-backoff retry policy that retries connect and
//! timeout failures only; HTTP status errors surface immediately.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use engram_domain::constants::retry::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, MCP_TIMEOUT};
use engram_domain::entities::ToolDescriptor;
use engram_domain::error::{Error, Result};
use serde_json::json;
use tokio::sync::Mutex;

use crate::mcp::protocol::{McpRequest, McpResponse};

struct ClientState {
    initialized: bool,
    protocol_version: Option<String>,
    server_info: Option<serde_json::Value>,
    tools: Vec<ToolDescriptor>,
}

/// Client for one MCP endpoint.
pub struct McpClient {
    endpoint: String,
    client_name: String,
    client_version: String,
    http: reqwest::Client,
    headers: Mutex<HashMap<String, String>>,
    max_retries: u32,
    retry_delay: Duration,
    request_counter: AtomicI64,
    state: Mutex<ClientState>,
}

impl McpClient {
    /// Build a client with default timeout and retry policy.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_config(endpoint, MCP_TIMEOUT, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
    }

    /// Build a client with explicit timeout and retry policy.
    #[must_use]
    pub fn with_config(
        endpoint: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            endpoint: endpoint.into(),
            client_name: "engram-client".to_owned(),
            client_version: env!("CARGO_PKG_VERSION").to_owned(),
            http,
            headers: Mutex::new(HashMap::new()),
            max_retries,
            retry_delay,
            request_counter: AtomicI64::new(0),
            state: Mutex::new(ClientState {
                initialized: false,
                protocol_version: None,
                server_info: None,
                tools: Vec::new(),
            }),
        }
    }

    /// The endpoint this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Replace the extra request headers (auth, proxy routing).
    pub async fn set_headers(&self, headers: HashMap<String, String>) {
        *self.headers.lock().await = headers;
    }

    /// True once `initialize` has succeeded.
    pub async fn is_initialized(&self) -> bool {
        self.state.lock().await.initialized
    }

    fn next_request_id(&self) -> i64 {
        self.request_counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    async fn send_request(&self, request: &McpRequest) -> Result<McpResponse> {
        let headers = self.headers.lock().await.clone();
        let mut last_error: Option<Error> = None;

        for attempt in 0..self.max_retries {
            let mut builder = self.http.post(&self.endpoint).json(request);
            for (name, value) in &headers {
                builder = builder.header(name, value);
            }
            match builder.send().await {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        // HTTP errors are not retried.
                        let body = response.text().await.unwrap_or_default();
                        return Err(Error::network(format!(
                            "MCP endpoint returned {status}: {body}"
                        )));
                    }
                    return response.json::<McpResponse>().await.map_err(|e| {
                        Error::network_with_source("MCP response was not JSON", e)
                    });
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    tracing::warn!(
                        endpoint = %self.endpoint,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        error = %e,
                        "Connection error, retrying"
                    );
                    last_error = Some(Error::network_with_source("MCP connection failed", e));
                    if attempt + 1 < self.max_retries {
                        tokio::time::sleep(self.retry_delay * (attempt + 1)).await;
                    }
                }
                Err(e) => {
                    return Err(Error::network_with_source("MCP request failed", e));
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| Error::network("MCP request failed after all retries")))
    }

    fn expect_result(response: McpResponse) -> Result<serde_json::Value> {
        if let Some(error) = response.error {
            return Err(Error::protocol(error.code, error.message));
        }
        response
            .result
            .ok_or_else(|| Error::network("MCP response carried neither result nor error"))
    }

    /// Initialize the connection and prefetch the tool list.
    pub async fn initialize(&self) -> Result<serde_json::Value> {
        {
            let state = self.state.lock().await;
            if state.initialized {
                tracing::debug!(endpoint = %self.endpoint, "Client already initialized");
                return Ok(json!({
                    "protocolVersion": state.protocol_version,
                    "serverInfo": state.server_info,
                }));
            }
        }

        let request = McpRequest::new(
            self.next_request_id(),
            "initialize",
            Some(json!({
                "protocolVersion": crate::mcp::protocol::PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": self.client_name,
                    "version": self.client_version,
                },
            })),
        );
        let result = Self::expect_result(self.send_request(&request).await?)?;

        {
            let mut state = self.state.lock().await;
            state.protocol_version = result
                .get("protocolVersion")
                .and_then(|v| v.as_str())
                .map(str::to_owned);
            state.server_info = result.get("serverInfo").cloned();
            state.initialized = true;
        }
        self.refresh_tools().await?;
        tracing::info!(endpoint = %self.endpoint, "Initialized MCP client");
        Ok(result)
    }

    /// Re-fetch the remote tool list.
    pub async fn refresh_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let request = McpRequest::new(self.next_request_id(), "tools/list", None);
        let result = Self::expect_result(self.send_request(&request).await?)?;
        let tools: Vec<ToolDescriptor> = result
            .get("tools")
            .and_then(|v| v.as_array())
            .map(|tools| {
                tools
                    .iter()
                    .filter_map(|t| serde_json::from_value(t.clone()).ok())
                    .collect()
            })
            .unwrap_or_default();
        let count = tools.len();
        self.state.lock().await.tools = tools.clone();
        tracing::info!(endpoint = %self.endpoint, count, "Refreshed tools list");
        Ok(tools)
    }

    /// Cached tool list, initializing on first use.
    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        if !self.is_initialized().await {
            self.initialize().await?;
        }
        Ok(self.state.lock().await.tools.clone())
    }

    /// Invoke a remote tool and unwrap its text content.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value> {
        if !self.is_initialized().await {
            self.initialize().await?;
        }
        let request = McpRequest::new(
            self.next_request_id(),
            "tools/call",
            Some(json!({ "name": name, "arguments": arguments })),
        );
        let result = Self::expect_result(self.send_request(&request).await?)?;

        // Unwrap `{content: [{type: "text", text}]}`; JSON text decodes to
        // its value, anything else passes through as a string.
        if let Some(first) = result
            .get("content")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
        {
            if first.get("type").and_then(|t| t.as_str()) == Some("text") {
                let text = first.get("text").and_then(|t| t.as_str()).unwrap_or_default();
                return Ok(serde_json::from_str(text)
                    .unwrap_or_else(|_| json!({ "text": text })));
            }
        }
        Ok(result)
    }

    /// Drop the session state; the next call re-initializes.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.initialized = false;
        state.tools.clear();
        tracing::info!(endpoint = %self.endpoint, "MCP client closed");
    }
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Shared-ownership alias used by the pool.
pub type SharedMcpClient = Arc<McpClient>;
