//! Tool registry.
//!
//! Maps tool names to their descriptors and handlers, and keeps per-tool
//! registration metadata and call counters.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use engram_domain::entities::{ToolDescriptor, ToolOrigin};
use engram_domain::error::Result;
use engram_domain::utils::time;
use serde::Serialize;

/// An invokable tool implementation.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with validated arguments.
    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value>;
}

/// Blanket handler for plain async functions.
pub struct FnToolHandler<F>(pub F);

#[async_trait]
impl<F, Fut> ToolHandler for FnToolHandler<F>
where
    F: Fn(serde_json::Value) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<serde_json::Value>> + Send,
{
    async fn call(&self, arguments: serde_json::Value) -> Result<serde_json::Value> {
        (self.0)(arguments).await
    }
}

/// Registration metadata tracked per tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolRegistration {
    /// Execution origin
    pub origin: ToolOrigin,
    /// Source endpoint for external tools
    pub source: Option<String>,
    /// Registration instant
    pub registered_at: DateTime<Utc>,
    /// Calls routed to the tool
    pub call_count: u64,
    /// Successful calls
    pub success_count: u64,
    /// Failed calls
    pub failure_count: u64,
}

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
    registration: ToolRegistration,
}

/// Concurrent tool registry.
#[derive(Default)]
pub struct ToolRegistry {
    tools: DashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, overwriting an existing registration of the same name.
    pub fn register(
        &self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
        source: Option<String>,
    ) {
        let name = descriptor.name.clone();
        if self.tools.contains_key(&name) {
            tracing::warn!(tool = %name, "Tool already registered, overwriting");
        }
        let origin = descriptor.origin;
        self.tools.insert(
            name.clone(),
            RegisteredTool {
                descriptor,
                handler,
                registration: ToolRegistration {
                    origin,
                    source,
                    registered_at: time::now(),
                    call_count: 0,
                    success_count: 0,
                    failure_count: 0,
                },
            },
        );
        tracing::info!(tool = %name, origin = origin.as_str(), "Registered tool");
    }

    /// Remove a tool. Returns whether it existed.
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.tools.remove(name).is_some();
        if removed {
            tracing::info!(tool = name, "Unregistered tool");
        }
        removed
    }

    /// Fetch a tool's descriptor and handler.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<(ToolDescriptor, Arc<dyn ToolHandler>)> {
        self.tools
            .get(name)
            .map(|t| (t.descriptor.clone(), Arc::clone(&t.handler)))
    }

    /// All registered descriptors, name-sorted for stable listings.
    #[must_use]
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut out: Vec<ToolDescriptor> =
            self.tools.iter().map(|t| t.descriptor.clone()).collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Descriptors filtered by origin.
    #[must_use]
    pub fn descriptors_by_origin(&self, origin: ToolOrigin) -> Vec<ToolDescriptor> {
        self.descriptors()
            .into_iter()
            .filter(|d| d.origin == origin)
            .collect()
    }

    /// Count one routed call against a tool.
    pub fn record_tool_call(&self, name: &str, success: bool) {
        if let Some(mut tool) = self.tools.get_mut(name) {
            tool.registration.call_count += 1;
            if success {
                tool.registration.success_count += 1;
            } else {
                tool.registration.failure_count += 1;
            }
        }
    }

    /// Registration metadata for one tool.
    #[must_use]
    pub fn registration(&self, name: &str) -> Option<ToolRegistration> {
        self.tools.get(name).map(|t| t.registration.clone())
    }

    /// Number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True when no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
