//! Shared server state.

use std::sync::Arc;

use dashmap::DashMap;
use engram_infrastructure::AppContext;

/// State shared by every REST handler.
#[derive(Clone)]
pub struct ServerState {
    /// Composition-root context
    pub ctx: Arc<AppContext>,
    /// Per-user favourite model lists (policy-filtered on write)
    pub model_preferences: Arc<DashMap<String, Vec<String>>>,
}

impl ServerState {
    /// Wrap an application context.
    #[must_use]
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            model_preferences: Arc::new(DashMap::new()),
        }
    }

    /// True when the model passes the deployment policy. An empty allowed
    /// list permits everything.
    #[must_use]
    pub fn model_allowed(&self, model: &str) -> bool {
        let allowed = &self.ctx.config.chat.allowed_models;
        allowed.is_empty() || allowed.iter().any(|m| m == model)
    }
}
