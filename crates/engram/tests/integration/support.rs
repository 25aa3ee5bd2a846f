//! Shared fixtures for the end-to-end suite.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use engram_infrastructure::{AppConfig, AppContext, init_app};
use engram_server::ServerState;
use engram_server::mcp::McpServer;

/// Boot a fully in-process application context.
pub async fn app() -> Arc<AppContext> {
    Arc::new(init_app(AppConfig::default()).await.expect("init app"))
}

/// Boot a context with a custom config mutation.
pub async fn app_with(mutate: impl FnOnce(&mut AppConfig)) -> Arc<AppContext> {
    let mut config = AppConfig::default();
    mutate(&mut config);
    Arc::new(init_app(config).await.expect("init app"))
}

/// The combined HTTP router over a fresh context.
pub async fn router() -> axum::Router {
    let ctx = app().await;
    let mcp = Arc::new(McpServer::new("engram-test", "0.0.1"));
    engram_server::api_router(ServerState::new(ctx)).merge(mcp.router())
}

/// Consent gate spy: configurable answer, counts checks.
pub struct SpyConsent {
    allowed: AtomicBool,
    pub checks: AtomicUsize,
}

impl SpyConsent {
    pub fn new(allowed: bool) -> Arc<Self> {
        Arc::new(Self {
            allowed: AtomicBool::new(allowed),
            checks: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl engram_domain::ports::ConsentGate for SpyConsent {
    async fn memory_allowed(&self, _user_id: &str) -> bool {
        self.checks.fetch_add(1, Ordering::SeqCst);
        self.allowed.load(Ordering::SeqCst)
    }
}
