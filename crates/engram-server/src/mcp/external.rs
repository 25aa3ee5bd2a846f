//! External tool manager.
//!
//! Loads external tool descriptors from a config store (with a YAML file
//! fallback), resolves `${VAR}` environment references, registers proxy
//! tools that forward through an optional gateway with audit headers, and
//! periodically re-checks health and diffs the config; new tools are
//! registered, removed ones unregistered. The active config snapshot uses
//! copy-on-update semantics.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use dashmap::DashMap;
use engram_domain::constants::time::EXTERNAL_REFRESH_SECS;
use engram_domain::entities::{AuthType, ExternalToolConfig, ToolDescriptor, ToolOrigin};
use engram_domain::error::{Error, Result};
use engram_domain::ports::ToolConfigStore;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::mcp::client::McpClient;
use crate::mcp::metrics::ToolMetrics;
use crate::mcp::registry::{ToolHandler, ToolRegistry};

static ENV_REF: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\$\{([^}]+)\}").unwrap()
});

/// Resolve `${VAR}` references in a string against the process environment.
fn resolve_env(value: &str) -> String {
    ENV_REF
        .replace_all(value, |caps: &regex::Captures<'_>| {
            let var = &caps[1];
            std::env::var(var).unwrap_or_else(|_| {
                tracing::warn!(var, "Environment variable not found in tool config");
                caps[0].to_owned()
            })
        })
        .into_owned()
}

fn resolve_config_env(mut config: ExternalToolConfig) -> ExternalToolConfig {
    config.mcp_endpoint = resolve_env(&config.mcp_endpoint);
    if let Some(proxy) = config.proxy_endpoint.take() {
        config.proxy_endpoint = Some(resolve_env(&proxy));
    }
    let auth = &mut config.auth_config;
    if let Some(key) = auth.api_key.take() {
        auth.api_key = Some(resolve_env(&key));
    }
    if let Some(token) = auth.token.take() {
        auth.token = Some(resolve_env(&token));
    }
    if let Some(token) = auth.access_token.take() {
        auth.access_token = Some(resolve_env(&token));
    }
    config
}

/// Proxy tool forwarding calls to an external MCP endpoint.
pub struct ExternalMcpTool {
    config: ExternalToolConfig,
    client: McpClient,
    metrics: Arc<ToolMetrics>,
    registry: Arc<ToolRegistry>,
}

impl ExternalMcpTool {
    fn new(
        config: ExternalToolConfig,
        metrics: Arc<ToolMetrics>,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        let client = McpClient::new(config.actual_endpoint().to_owned());
        Self {
            config,
            client,
            metrics,
            registry,
        }
    }

    fn request_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();

        // Audit and routing headers for gateway traffic.
        if self.config.proxy_endpoint.is_some() {
            if self.config.proxy_config.audit_enabled {
                headers.insert("X-Audit-Enabled".to_owned(), "true".to_owned());
                headers.insert("X-Tool-Name".to_owned(), self.config.name.clone());
                headers.insert(
                    "X-Real-Endpoint".to_owned(),
                    self.config.mcp_endpoint.clone(),
                );
            }
            if self.config.proxy_config.hide_ip {
                headers.insert("X-Hide-IP".to_owned(), "true".to_owned());
            }
        }

        let auth = &self.config.auth_config;
        match auth.auth_type {
            AuthType::None => {}
            AuthType::ApiKey => {
                if let Some(api_key) = &auth.api_key {
                    let header_name = auth
                        .header_name
                        .clone()
                        .unwrap_or_else(|| "Authorization".to_owned());
                    let value = if header_name == "Authorization" {
                        format!("Bearer {api_key}")
                    } else {
                        api_key.clone()
                    };
                    headers.insert(header_name, value);
                }
            }
            AuthType::Bearer => {
                if let Some(token) = &auth.token {
                    headers.insert("Authorization".to_owned(), format!("Bearer {token}"));
                }
            }
            AuthType::Oauth2 => {
                if let Some(token) = &auth.access_token {
                    headers.insert("Authorization".to_owned(), format!("Bearer {token}"));
                }
            }
        }
        headers
    }

    async fn connect(&self) -> Result<()> {
        self.client.set_headers(self.request_headers()).await;
        self.client.initialize().await.map(|_| ())
    }

    /// Verify the endpoint answers and actually serves the remote tool name.
    pub async fn verify_connection(&self) -> bool {
        if self.connect().await.is_err() {
            return false;
        }
        match self.client.list_tools().await {
            Ok(tools) => {
                let remote = self.config.remote_name();
                let found = tools.iter().any(|t| t.name == remote);
                if !found {
                    tracing::warn!(
                        tool = %self.config.name,
                        remote,
                        endpoint = %self.config.mcp_endpoint,
                        "Tool not found on external server"
                    );
                }
                found
            }
            Err(_) => false,
        }
    }
}

#[async_trait]
impl ToolHandler for ExternalMcpTool {
    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        self.client.set_headers(self.request_headers()).await;
        let start = Instant::now();
        let result = self
            .client
            .call_tool(self.config.remote_name(), arguments)
            .await;
        let latency = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(_) => {
                self.metrics.record_call(&self.config.name, true, latency, None);
                self.registry.record_tool_call(&self.config.name, true);
                tracing::info!(tool = %self.config.name, latency_ms = latency, "External tool executed");
            }
            Err(e) => {
                self.metrics.record_call(
                    &self.config.name,
                    false,
                    latency,
                    Some("external_call_failed"),
                );
                self.registry.record_tool_call(&self.config.name, false);
                tracing::error!(tool = %self.config.name, error = %e, "External tool failed");
            }
        }
        result
    }
}

/// Result counters of one refresh pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshStats {
    /// Tools registered before the pass
    pub total: usize,
    /// Tools whose health check passed
    pub refreshed: usize,
    /// Tools whose health check failed
    pub failed: usize,
    /// Newly registered tools
    pub new_tools: usize,
    /// Unregistered tools
    pub removed_tools: usize,
}

/// Manager for externally-provided MCP tools.
pub struct ExternalToolManager {
    config_store: Arc<dyn ToolConfigStore>,
    registry: Arc<ToolRegistry>,
    metrics: Arc<ToolMetrics>,
    active_configs: ArcSwap<Vec<ExternalToolConfig>>,
    registered: DashMap<String, Arc<ExternalMcpTool>>,
    refresh_interval: Duration,
    shutdown: CancellationToken,
}

impl ExternalToolManager {
    /// Build a manager over a config store and the shared registry.
    #[must_use]
    pub fn new(
        config_store: Arc<dyn ToolConfigStore>,
        registry: Arc<ToolRegistry>,
        metrics: Arc<ToolMetrics>,
    ) -> Self {
        Self {
            config_store,
            registry,
            metrics,
            active_configs: ArcSwap::from_pointee(Vec::new()),
            registered: DashMap::new(),
            refresh_interval: Duration::from_secs(EXTERNAL_REFRESH_SECS),
            shutdown: CancellationToken::new(),
        }
    }

    /// Override the refresh interval.
    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Load enabled descriptors from the store, env-resolved. The snapshot
    /// is swapped atomically.
    pub async fn load_config(&self) -> Result<Vec<ExternalToolConfig>> {
        let configs = self.config_store.load().await?;
        let resolved: Vec<ExternalToolConfig> = configs
            .into_iter()
            .filter(|c| c.enabled)
            .map(resolve_config_env)
            .collect();
        tracing::info!(count = resolved.len(), "Loaded external tool configurations");
        self.active_configs.store(Arc::new(resolved.clone()));
        Ok(resolved)
    }

    /// Register one external tool. Auto-discovery overwrites its declared
    /// input schema from the remote `tools/list`.
    pub async fn register_external_tool(&self, mut config: ExternalToolConfig) -> bool {
        let name = config.name.clone();

        if config.auto_discover {
            match self.discover_tools(&config).await {
                Ok(discovered) => {
                    let remote = config.remote_name().to_owned();
                    if let Some(tool) = discovered.into_iter().find(|t| t.name == remote) {
                        config.input_schema = Some(tool.input_schema);
                    }
                }
                Err(e) => {
                    tracing::warn!(tool = %name, error = %e, "Auto-discovery failed, using declared schema");
                }
            }
        }

        let tool = Arc::new(ExternalMcpTool::new(
            config.clone(),
            Arc::clone(&self.metrics),
            Arc::clone(&self.registry),
        ));
        if !tool.verify_connection().await {
            tracing::warn!(tool = %name, "Connection verification failed, not registering");
            return false;
        }

        let descriptor = ToolDescriptor {
            name: name.clone(),
            description: config.description.clone(),
            input_schema: config.input_schema.clone().unwrap_or_else(|| {
                serde_json::json!({
                    "type": "object",
                    "properties": {},
                })
            }),
            origin: ToolOrigin::External,
            endpoint: Some(config.mcp_endpoint.clone()),
            auth: Some(config.auth_config.clone()),
        };
        self.registry.register(
            descriptor,
            Arc::clone(&tool) as Arc<dyn ToolHandler>,
            Some(config.mcp_endpoint.clone()),
        );
        self.registered.insert(name.clone(), tool);
        tracing::info!(tool = %name, "Registered external tool");
        true
    }

    async fn discover_tools(&self, config: &ExternalToolConfig) -> Result<Vec<ToolDescriptor>> {
        let client = McpClient::new(config.mcp_endpoint.clone());
        client.initialize().await?;
        let tools = client.list_tools().await?;
        client.close().await;
        Ok(tools)
    }

    /// Load config and register every enabled tool; returns the number
    /// registered.
    pub async fn register_all(&self) -> Result<usize> {
        let configs = self.load_config().await?;
        let total = configs.len();
        let mut registered = 0;
        for config in configs {
            if self.register_external_tool(config).await {
                registered += 1;
            }
        }
        tracing::info!(registered, total, "Registered external tools");
        Ok(registered)
    }

    /// Unregister one external tool.
    pub async fn unregister_external_tool(&self, name: &str) -> bool {
        let Some((_, tool)) = self.registered.remove(name) else {
            return false;
        };
        tool.client.close().await;
        self.registry.unregister(name);
        true
    }

    /// One refresh pass: health-check registered tools, then diff the
    /// config; register new entries and unregister removed ones.
    pub async fn refresh(&self) -> RefreshStats {
        let mut stats = RefreshStats {
            total: self.registered.len(),
            ..RefreshStats::default()
        };

        let registered_names: Vec<String> =
            self.registered.iter().map(|t| t.key().clone()).collect();
        for name in &registered_names {
            let Some(tool) = self.registered.get(name).map(|t| Arc::clone(t.value())) else {
                continue;
            };
            if tool.verify_connection().await {
                stats.refreshed += 1;
            } else {
                tracing::warn!(tool = %name, "External tool is unhealthy");
                stats.failed += 1;
            }
        }

        let configs = match self.load_config().await {
            Ok(configs) => configs,
            Err(e) => {
                tracing::error!(error = %e, "Config reload failed during refresh");
                return stats;
            }
        };
        let config_names: std::collections::HashSet<String> =
            configs.iter().map(|c| c.name.clone()).collect();
        let current: std::collections::HashSet<String> = registered_names.into_iter().collect();

        for config in configs {
            if !current.contains(&config.name) && self.register_external_tool(config).await {
                stats.new_tools += 1;
            }
        }
        for name in current.difference(&config_names) {
            if self.unregister_external_tool(name).await {
                stats.removed_tools += 1;
            }
        }

        tracing::info!(?stats, "Refreshed external tools");
        stats
    }

    /// Start the periodic refresh loop.
    pub fn start_refresh_loop(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = tokio::time::sleep(manager.refresh_interval) => {
                        manager.refresh().await;
                    }
                    () = manager.shutdown.cancelled() => break,
                }
            }
        });
    }

    /// Stop the refresh loop and close every external connection.
    pub async fn close(&self) {
        self.shutdown.cancel();
        let names: Vec<String> = self.registered.iter().map(|t| t.key().clone()).collect();
        for name in names {
            self.unregister_external_tool(&name).await;
        }
    }
}

/// YAML-file fallback config store (`external_tools:` list).
pub struct YamlToolConfigStore {
    path: std::path::PathBuf,
}

impl YamlToolConfigStore {
    /// Create a store reading the given file.
    #[must_use]
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ToolConfigStore for YamlToolConfigStore {
    async fn load(&self) -> Result<Vec<ExternalToolConfig>> {
        if !self.path.exists() {
            tracing::warn!(path = %self.path.display(), "External tools config file not found");
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::io_with_source("Failed to read external tools config", e))?;
        let yaml: serde_yaml::Value = serde_yaml::from_str(&content).map_err(|e| {
            Error::configuration_with_source("Failed to parse external tools config", e)
        })?;
        let tools = yaml
            .get("external_tools")
            .cloned()
            .unwrap_or(serde_yaml::Value::Sequence(Vec::new()));
        serde_yaml::from_value(tools).map_err(|e| {
            Error::configuration_with_source("Malformed external tool descriptors", e)
        })
    }
}

/// Static in-memory config store, used by tests and embedded setups.
#[derive(Default)]
pub struct StaticToolConfigStore {
    configs: std::sync::RwLock<Vec<ExternalToolConfig>>,
}

impl StaticToolConfigStore {
    /// Create a store with the given descriptors.
    #[must_use]
    pub fn new(configs: Vec<ExternalToolConfig>) -> Self {
        Self {
            configs: std::sync::RwLock::new(configs),
        }
    }

    /// Replace the descriptor set.
    pub fn set(&self, configs: Vec<ExternalToolConfig>) {
        if let Ok(mut current) = self.configs.write() {
            *current = configs;
        }
    }
}

#[async_trait]
impl ToolConfigStore for StaticToolConfigStore {
    async fn load(&self) -> Result<Vec<ExternalToolConfig>> {
        Ok(self.configs.read().map(|c| c.clone()).unwrap_or_default())
    }
}
