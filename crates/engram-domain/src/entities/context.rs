//! Conversation context entities.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{id, time};

/// Role of a conversation participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// End user
    User,
    /// Model output
    Assistant,
    /// Injected system context
    System,
}

impl MessageRole {
    /// Wire name of the role
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            _ => Err(format!("Unknown message role: {s}")),
        }
    }
}

/// One message in a per-session ordered sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextMessage {
    /// Message identity
    pub message_id: String,
    /// Participant role
    pub role: MessageRole,
    /// Message text
    pub content: String,
    /// Append timestamp; monotonic per session
    pub timestamp: DateTime<Utc>,
    /// Producing agent, when a multi-agent pipeline wrote the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    /// Free-form extensions
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ContextMessage {
    /// Create a message with generated id and current timestamp
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            message_id: id::generate(),
            role,
            content: content.into(),
            timestamp: time::now(),
            agent_name: None,
            metadata: HashMap::new(),
        }
    }

    /// Set the producing agent name
    #[must_use]
    pub fn with_agent(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = Some(agent_name.into());
        self
    }
}

/// Session descriptor owning a message sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSession {
    /// Session identity
    pub session_id: String,
    /// Owning user, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// First-message timestamp
    pub created_at: DateTime<Utc>,
    /// Number of live messages
    pub message_count: usize,
    /// Sliding-window cap on retained messages
    pub window_size: usize,
}

/// An LLM-ready `{role, content}` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Participant role as wire string
    pub role: String,
    /// Message text
    pub content: String,
}

impl ChatTurn {
    /// Build a turn from a role and text
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role: role.as_str().to_owned(),
            content: content.into(),
        }
    }
}
