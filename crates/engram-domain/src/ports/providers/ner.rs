//! Named-entity recognition provider port.
#![allow(missing_docs)]

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::ExtractedEntity;

#[async_trait]
pub trait NerProvider: Send + Sync {
    /// Extract typed entities from free text
    async fn extract_entities(&self, text: &str) -> Result<Vec<ExtractedEntity>>;
}
