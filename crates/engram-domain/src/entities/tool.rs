//! MCP tool descriptors and external tool configuration.

use serde::{Deserialize, Serialize};

/// Where a registered tool is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolOrigin {
    /// Handler runs in-process
    #[default]
    Internal,
    /// Handler proxies to a remote MCP endpoint
    External,
}

impl ToolOrigin {
    /// Wire name of the origin
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }
}

/// Authentication scheme for an external endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// No authentication
    #[default]
    None,
    /// Static API key in a configurable header
    ApiKey,
    /// Bearer token
    Bearer,
    /// OAuth2 access token (pre-issued)
    Oauth2,
}

/// Authentication configuration for an external tool.
///
/// Secret fields may reference environment variables as `${VAR_NAME}`;
/// resolution happens at registration time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Scheme selector
    #[serde(default)]
    pub auth_type: AuthType,
    /// API key for `ApiKey`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Token for `Bearer`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Access token for `Oauth2`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Header carrying the API key; defaults to `Authorization`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
}

/// Gateway/proxy behavior flags for an external tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Emit audit headers (`X-Audit-Enabled`, `X-Tool-Name`, `X-Real-Endpoint`)
    #[serde(default)]
    pub audit_enabled: bool,
    /// Ask the gateway to hide the caller IP (`X-Hide-IP`)
    #[serde(default)]
    pub hide_ip: bool,
}

/// Descriptor of a callable tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name (local alias for external tools)
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// JSON-Schema for the tool arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
    /// Execution origin
    #[serde(default)]
    pub origin: ToolOrigin,
    /// Remote endpoint for external tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Authentication for external tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

/// Config-table entry describing an external tool to register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalToolConfig {
    /// Local tool name
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Real MCP endpoint
    pub mcp_endpoint: String,
    /// Name on the remote server, when different from the local alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name_on_server: Option<String>,
    /// Gateway endpoint; requests go here when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_endpoint: Option<String>,
    /// Gateway behavior flags
    #[serde(default)]
    pub proxy_config: ProxyConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth_config: AuthConfig,
    /// Declared argument schema; overwritten by discovery when enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<serde_json::Value>,
    /// Fetch the schema from the remote `tools/list` at registration
    #[serde(default = "default_auto_discover")]
    pub auto_discover: bool,
    /// Disabled entries are skipped entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_auto_discover() -> bool {
    true
}

fn default_enabled() -> bool {
    true
}

impl ExternalToolConfig {
    /// Tool name used on the remote server
    #[must_use]
    pub fn remote_name(&self) -> &str {
        self.tool_name_on_server.as_deref().unwrap_or(&self.name)
    }

    /// Endpoint requests are actually sent to (proxy wins over real)
    #[must_use]
    pub fn actual_endpoint(&self) -> &str {
        self.proxy_endpoint.as_deref().unwrap_or(&self.mcp_endpoint)
    }
}
