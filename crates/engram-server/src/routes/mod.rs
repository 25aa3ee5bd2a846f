//! REST routes the core collaborates with

/// Chat entry, session replay, model preferences
pub mod chat;
/// User task CRUD and soft delete
pub mod user_tasks;

use axum::Router;

use crate::state::ServerState;

/// The combined REST router.
#[must_use]
pub fn api_router(state: ServerState) -> Router {
    Router::new()
        .merge(chat::router())
        .merge(user_tasks::router())
        .with_state(state)
}
