//! Embedding provider port.
#![allow(missing_docs)]

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::Embedding;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embed a batch of texts, preserving order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Vector dimensionality this provider produces
    fn dimensions(&self) -> usize;

    /// Producing model name
    fn model_name(&self) -> &str;
}
