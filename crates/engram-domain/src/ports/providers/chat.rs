//! Language model provider port; the external inference contract.
#![allow(missing_docs)]

use async_trait::async_trait;

use crate::entities::ChatTurn;
use crate::error::Result;

#[async_trait]
pub trait ChatModelProvider: Send + Sync {
    /// Run one chat completion and return the assistant text.
    ///
    /// Implementations honour a per-request timeout and are cancellable.
    async fn chat(&self, messages: &[ChatTurn], model: &str) -> Result<String>;

    /// True when the backing service currently answers health probes
    async fn is_available(&self) -> bool;
}
