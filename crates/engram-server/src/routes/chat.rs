//! Chat REST surface.
//!
//! `POST /api/v1/chat` is the main entry: consent-gated memory retrieval,
//! model policy gate, model invocation with the injected system message
//! plus session history, and turn write-back. The endpoint never fails
//! because of memory or retrieval problems; those degrade to an empty
//! injection and the turn proceeds.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Json, Router, routing::get, routing::post, routing::put};
use engram_application::ChatAttachment;
use engram_domain::entities::{ChatTurn, MessageRole};
use engram_domain::utils::id;
use serde::{Deserialize, Serialize};

use crate::state::ServerState;

/// One request message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageDto {
    /// `user` / `assistant` / `system`
    pub role: String,
    /// Message text
    pub content: String,
}

/// Model selection envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSelector {
    /// Selection mode (`auto`, `manual`)
    #[serde(default)]
    pub mode: String,
    /// Explicit model id for manual mode
    #[serde(default)]
    pub model_id: Option<String>,
}

/// One attachment reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentDto {
    /// Ingested file id
    pub file_id: String,
}

/// Chat request body
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Requesting user
    #[serde(default = "default_user")]
    pub user_id: String,
    /// Conversation messages; the last user message drives retrieval
    pub messages: Vec<ChatMessageDto>,
    /// Session to append to; generated when absent
    #[serde(default)]
    pub session_id: Option<String>,
    /// Owning UI task
    #[serde(default)]
    pub task_id: Option<String>,
    /// Model selection
    #[serde(default)]
    pub model_selector: ModelSelector,
    /// Attached files
    #[serde(default)]
    pub attachments: Vec<AttachmentDto>,
}

fn default_user() -> String {
    "default".to_owned()
}

/// Model routing record
#[derive(Debug, Clone, Serialize)]
pub struct RoutingInfo {
    /// Provider label
    pub provider: String,
    /// Model actually used
    pub model: String,
    /// Routing strategy label
    pub strategy: String,
    /// Model latency
    pub latency_ms: f64,
    /// Whether a fallback path was taken
    pub failover_used: bool,
}

/// Observability envelope returned with every chat response
#[derive(Debug, Clone, Serialize)]
pub struct Observability {
    /// Memory results injected
    pub memory_hit_count: usize,
    /// Sources that contributed
    pub memory_sources: Vec<String>,
    /// Retrieval latency
    pub retrieval_latency_ms: f64,
    /// Model routing record
    pub routing: RoutingInfo,
}

/// Chat response body
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    /// Whether the turn produced an answer
    pub success: bool,
    /// Assistant text
    pub content: String,
    /// Session the turn was appended to
    pub session_id: String,
    /// Error code when the model path failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Observability envelope
    pub observability: Observability,
}

/// Routes under `/api/v1/chat`.
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/v1/chat", post(chat))
        .route("/api/v1/chat/sessions/{session_id}/messages", get(session_messages))
        .route("/api/v1/chat/preferences/models", put(set_model_preferences))
}

async fn chat(
    State(state): State<ServerState>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let config = &state.ctx.config.chat;
    let model = request
        .model_selector
        .model_id
        .clone()
        .unwrap_or_else(|| config.model.clone());

    // Policy gate: authorization failures surface immediately.
    if !state.model_allowed(&model) {
        return (
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({
                "success": false,
                "error_code": "MODEL_NOT_ALLOWED",
                "message": format!("Model '{model}' is not allowed for this deployment"),
            })),
        );
    }

    let session_id = request.session_id.clone().unwrap_or_else(id::generate);
    let user_text = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.clone())
        .unwrap_or_default();

    let recorder = state.ctx.recorder();
    if let Err(e) = recorder
        .record(&session_id, MessageRole::User, user_text.clone(), None)
        .await
    {
        tracing::warn!(error = %e, "Failed to record user message");
    }

    let attachments: Vec<ChatAttachment> = request
        .attachments
        .iter()
        .map(|a| ChatAttachment {
            file_id: a.file_id.clone(),
        })
        .collect();

    // Memory retrieval; failures degrade to an empty injection.
    let chat_memory = state.ctx.chat_memory();
    let retrieval = chat_memory
        .retrieve_for_prompt(
            &request.user_id,
            &session_id,
            request.task_id.as_deref(),
            &user_text,
            &attachments,
        )
        .await;

    // Assemble the model conversation: injection first, then history.
    let mut turns: Vec<ChatTurn> = retrieval.injection_messages.clone();
    match recorder.get_conversation_context(&session_id, Some(20)).await {
        Ok(history) => turns.extend(history),
        Err(e) => {
            tracing::warn!(error = %e, "History read failed, sending current turn only");
            turns.push(ChatTurn::new(MessageRole::User, user_text.clone()));
        }
    }

    let model_start = Instant::now();
    let model_result = match state.ctx.chat_model() {
        Some(provider) => provider.chat(&turns, &model).await,
        None => Err(engram_domain::Error::model("No chat model configured")),
    };
    let model_latency = model_start.elapsed().as_secs_f64() * 1000.0;

    let observability = |failover: bool| Observability {
        memory_hit_count: retrieval.memory_hit_count,
        memory_sources: retrieval.memory_sources.clone(),
        retrieval_latency_ms: retrieval.retrieval_latency_ms,
        routing: RoutingInfo {
            provider: "http".to_owned(),
            model: model.clone(),
            strategy: request.model_selector.mode.clone(),
            latency_ms: model_latency,
            failover_used: failover,
        },
    };

    match model_result {
        Ok(content) => {
            if let Err(e) = recorder
                .record(&session_id, MessageRole::Assistant, content.clone(), None)
                .await
            {
                tracing::warn!(error = %e, "Failed to record assistant message");
            }
            chat_memory
                .write_from_turn(
                    &request.user_id,
                    &session_id,
                    request.task_id.as_deref(),
                    &user_text,
                    &content,
                )
                .await;

            let response = ChatResponse {
                success: true,
                content,
                session_id,
                error_code: None,
                observability: observability(false),
            };
            (
                StatusCode::OK,
                Json(serde_json::to_value(response).unwrap_or_default()),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Chat model call failed");
            let response = ChatResponse {
                success: false,
                content: String::new(),
                session_id,
                error_code: Some("CHAT_HTTP_ERROR".to_owned()),
                observability: observability(true),
            };
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::to_value(response).unwrap_or_default()),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    #[serde(default)]
    limit: Option<usize>,
}

async fn session_messages(
    State(state): State<ServerState>,
    Path(session_id): Path<String>,
    Query(query): Query<SessionQuery>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state
        .ctx
        .recorder()
        .get_history(&session_id, query.limit, None)
        .await
    {
        Ok(messages) => {
            let items: Vec<serde_json::Value> = messages
                .iter()
                .map(|m| {
                    serde_json::json!({
                        "message_id": m.message_id,
                        "role": m.role.as_str(),
                        "content": m.content,
                        "timestamp": m.timestamp,
                    })
                })
                .collect();
            (
                StatusCode::OK,
                Json(serde_json::json!({ "session_id": session_id, "messages": items })),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "success": false,
                "error_code": "INTERNAL_ERROR",
                "message": e.to_string(),
            })),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct ModelPreferencesRequest {
    #[serde(default = "default_user")]
    user_id: String,
    models: Vec<String>,
}

async fn set_model_preferences(
    State(state): State<ServerState>,
    Json(request): Json<ModelPreferencesRequest>,
) -> Json<serde_json::Value> {
    // The policy gate filters before anything persists.
    let filtered: Vec<String> = request
        .models
        .into_iter()
        .filter(|m| state.model_allowed(m))
        .collect();
    state
        .model_preferences
        .insert(request.user_id.clone(), filtered.clone());
    Json(serde_json::json!({ "user_id": request.user_id, "models": filtered }))
}
