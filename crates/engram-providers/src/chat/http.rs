//! HTTP chat model provider.
//!
//! Ollama-compatible generation endpoint:
//! `POST {base}/api/generate {"model", "prompt", "stream": false, "options"}`
//! → `{"response": ".."}`. Availability is probed through `GET /api/tags`.

use std::time::Duration;

use async_trait::async_trait;
use engram_domain::constants::retry::MODEL_TIMEOUT;
use engram_domain::entities::ChatTurn;
use engram_domain::error::{Error, Result};
use engram_domain::ports::ChatModelProvider;
use serde_json::json;

/// Remote chat model client.
pub struct HttpChatProvider {
    base_url: String,
    client: reqwest::Client,
    temperature: f32,
}

impl HttpChatProvider {
    /// Create a client for the given endpoint.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, MODEL_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    #[must_use]
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
            temperature: 0.2,
        }
    }

    /// Override sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn flatten_prompt(messages: &[ChatTurn]) -> String {
        messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl ChatModelProvider for HttpChatProvider {
    async fn chat(&self, messages: &[ChatTurn], model: &str) -> Result<String> {
        let body = json!({
            "model": model,
            "prompt": Self::flatten_prompt(messages),
            "stream": false,
            "options": { "temperature": self.temperature },
        });
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::network_with_source("Chat request failed", e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::model(format!("Chat endpoint returned {status}")));
        }
        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::network_with_source("Chat response was not JSON", e))?;
        Ok(parsed
            .get("response")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim()
            .to_owned())
    }

    async fn is_available(&self) -> bool {
        let probe = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(2))
            .send()
            .await;
        matches!(probe, Ok(r) if r.status().is_success())
    }
}

impl std::fmt::Debug for HttpChatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChatProvider")
            .field("base_url", &self.base_url)
            .finish()
    }
}
