//! HTTP point store speaking a Qdrant-compatible REST surface.
//!
//! Endpoints used:
//! - `PUT  /collections/{name}`; create collection
//! - `PUT  /collections/{name}/points`; upsert points
//! - `POST /collections/{name}/points/search`; similarity query
//! - `POST /collections/{name}/points/scroll`; filtered scan
//! - `PUT  /collections/{name}/points/payload`; payload overwrite
//! - `POST /collections/{name}/points/delete`; filtered delete

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use engram_domain::constants::retry::ADAPTER_TIMEOUT;
use engram_domain::error::{Error, Result};
use engram_domain::ports::VectorStoreProvider;
use engram_domain::value_objects::{PointFilter, ScoredPoint, VectorPoint};
use serde_json::json;

/// Qdrant-style HTTP vector store.
pub struct HttpVectorStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpVectorStore {
    /// Create a store client against a base URL such as `http://localhost:6333`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, ADAPTER_TIMEOUT)
    }

    /// Create a store client with an explicit request timeout.
    #[must_use]
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn filter_json(filter: &PointFilter) -> serde_json::Value {
        let mut must = Vec::new();
        if let Some(file_id) = &filter.file_id {
            must.push(json!({"key": "file_id", "match": {"value": file_id}}));
        }
        if let Some(user_id) = &filter.user_id {
            must.push(json!({"key": "user_id", "match": {"value": user_id}}));
        }
        json!({ "must": must })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<serde_json::Value> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::network_with_source(format!("{operation} failed"), e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::vector_store(format!(
                "{operation} returned {status}: {body}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| Error::network_with_source(format!("{operation} returned bad JSON"), e))
    }

    fn parse_payload(value: &serde_json::Value) -> HashMap<String, serde_json::Value> {
        value
            .get("payload")
            .and_then(|p| p.as_object())
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    fn parse_id(value: &serde_json::Value) -> String {
        match value.get("id") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}

#[async_trait]
impl VectorStoreProvider for HttpVectorStore {
    async fn ensure_collection(&self, collection: &str, dimensions: usize) -> Result<()> {
        let body = json!({
            "vectors": { "size": dimensions, "distance": "Cosine" }
        });
        let request = self
            .client
            .put(self.url(&format!("/collections/{collection}")))
            .json(&body);
        match self.send(request, "create_collection").await {
            Ok(_) => Ok(()),
            // Already-exists conflicts are fine.
            Err(Error::VectorStore { message }) if message.contains("409") => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn upsert_points(&self, collection: &str, points: Vec<VectorPoint>) -> Result<usize> {
        let count = points.len();
        if count == 0 {
            return Ok(0);
        }
        let body = json!({
            "points": points
                .iter()
                .map(|p| json!({"id": p.id, "vector": p.vector, "payload": p.payload}))
                .collect::<Vec<_>>()
        });
        let request = self
            .client
            .put(self.url(&format!("/collections/{collection}/points?wait=true")))
            .json(&body);
        self.send(request, "upsert_points").await?;
        Ok(count)
    }

    async fn query(
        &self,
        collection: &str,
        vector: &[f32],
        filter: &PointFilter,
        limit: usize,
    ) -> Result<Vec<ScoredPoint>> {
        let body = json!({
            "vector": vector,
            "filter": Self::filter_json(filter),
            "limit": limit,
            "with_payload": true,
        });
        let request = self
            .client
            .post(self.url(&format!("/collections/{collection}/points/search")))
            .json(&body);
        let response = self.send(request, "search_points").await?;
        let hits = response
            .get("result")
            .and_then(|r| r.as_array())
            .cloned()
            .unwrap_or_default();
        Ok(hits
            .iter()
            .map(|hit| ScoredPoint {
                id: Self::parse_id(hit),
                // Qdrant scores cosine as similarity; convert to distance.
                distance: 1.0
                    - hit
                        .get("score")
                        .and_then(serde_json::Value::as_f64)
                        .unwrap_or(0.0) as f32,
                payload: Self::parse_payload(hit),
            })
            .collect())
    }

    async fn fetch_points_by_file(
        &self,
        collection: &str,
        file_id: &str,
    ) -> Result<Vec<VectorPoint>> {
        let filter = PointFilter {
            file_id: Some(file_id.to_owned()),
            user_id: None,
        };
        let body = json!({
            "filter": Self::filter_json(&filter),
            "limit": 1000,
            "with_payload": true,
            "with_vector": true,
        });
        let request = self
            .client
            .post(self.url(&format!("/collections/{collection}/points/scroll")))
            .json(&body);
        let response = self.send(request, "scroll_points").await?;
        let points = response
            .get("result")
            .and_then(|r| r.get("points"))
            .and_then(|p| p.as_array())
            .cloned()
            .unwrap_or_default();
        Ok(points
            .iter()
            .map(|p| VectorPoint {
                id: Self::parse_id(p),
                vector: p
                    .get("vector")
                    .and_then(|v| v.as_array())
                    .map(|a| {
                        a.iter()
                            .filter_map(serde_json::Value::as_f64)
                            .map(|f| f as f32)
                            .collect()
                    })
                    .unwrap_or_default(),
                payload: Self::parse_payload(p),
            })
            .collect())
    }

    async fn update_payloads(&self, collection: &str, points: Vec<VectorPoint>) -> Result<usize> {
        let mut updated = 0;
        for point in points {
            let body = json!({
                "payload": point.payload,
                "points": [point.id],
            });
            let request = self
                .client
                .put(self.url(&format!(
                    "/collections/{collection}/points/payload?wait=true"
                )))
                .json(&body);
            self.send(request, "set_payload").await?;
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_by_file(
        &self,
        collection: &str,
        file_id: &str,
        user_id: &str,
    ) -> Result<usize> {
        let filter = PointFilter {
            file_id: Some(file_id.to_owned()),
            user_id: Some(user_id.to_owned()),
        };
        let body = json!({ "filter": Self::filter_json(&filter) });
        let request = self
            .client
            .post(self.url(&format!(
                "/collections/{collection}/points/delete?wait=true"
            )))
            .json(&body);
        self.send(request, "delete_points").await?;
        // The wire response does not carry a count; callers treat success as done.
        Ok(0)
    }
}

impl std::fmt::Debug for HttpVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpVectorStore")
            .field("base_url", &self.base_url)
            .finish()
    }
}
