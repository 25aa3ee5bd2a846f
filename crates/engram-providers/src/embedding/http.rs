//! HTTP embedding provider.
//!
//! Talks to an Ollama-compatible embedding endpoint:
//! `POST {base}/api/embeddings {"model": .., "prompt": ..}` →
//! `{"embedding": [..]}`.

use std::time::Duration;

use async_trait::async_trait;
use engram_domain::constants::retry::ADAPTER_TIMEOUT;
use engram_domain::error::{Error, Result};
use engram_domain::ports::EmbeddingProvider;
use engram_domain::value_objects::Embedding;
use serde_json::json;

/// Remote embedding service client.
pub struct HttpEmbeddingProvider {
    base_url: String,
    model: String,
    dimensions: usize,
    client: reqwest::Client,
}

impl HttpEmbeddingProvider {
    /// Create a client for the given endpoint and model.
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        Self::with_timeout(base_url, model, dimensions, ADAPTER_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    #[must_use]
    pub fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            model: model.into(),
            dimensions,
            client,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let body = json!({ "model": self.model, "prompt": text });
        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::network_with_source("Embedding request failed", e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::embedding(format!(
                "Embedding endpoint returned {status}"
            )));
        }
        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::network_with_source("Embedding response was not JSON", e))?;
        let vector: Vec<f32> = parsed
            .get("embedding")
            .and_then(|v| v.as_array())
            .ok_or_else(|| Error::embedding("Embedding response missing 'embedding' field"))?
            .iter()
            .filter_map(serde_json::Value::as_f64)
            .map(|f| f as f32)
            .collect();
        if vector.is_empty() {
            return Err(Error::embedding("Embedding endpoint returned empty vector"));
        }
        Ok(Embedding::new(vector, self.model.clone()))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use std::sync::Arc;

use engram_domain::registry::embedding::{
    EMBEDDING_PROVIDERS, EmbeddingProviderConfig, EmbeddingProviderEntry,
};

fn http_embedding_factory(
    config: &EmbeddingProviderConfig,
) -> std::result::Result<Arc<dyn EmbeddingProvider>, String> {
    let uri = config
        .uri
        .clone()
        .ok_or_else(|| "HTTP embedding provider requires uri in config".to_owned())?;
    let model = config
        .model
        .clone()
        .unwrap_or_else(|| "all-mpnet-base-v2".to_owned());
    let dimensions = config.dimensions.unwrap_or(768);
    Ok(Arc::new(HttpEmbeddingProvider::new(uri, model, dimensions)))
}

#[linkme::distributed_slice(EMBEDDING_PROVIDERS)]
static HTTP_PROVIDER: EmbeddingProviderEntry = EmbeddingProviderEntry {
    name: "http",
    description: "Remote embedding endpoint (Ollama-compatible)",
    build: http_embedding_factory,
};
