//! Structured boundary responses.
//!
//! Component boundaries return this envelope instead of raising across the
//! chat-turn boundary; callers can always make progress on a `Partial`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// User-visible error codes carried in boundary responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Requested model is outside the user's policy
    ModelNotAllowed,
    /// Upstream chat HTTP failure
    ChatHttpError,
    /// Query executed but matched nothing
    NoDataFound,
    /// Could not classify the request intent
    IntentUnclear,
    /// A parameter failed format validation
    InvalidParamFormat,
    /// A required parameter is missing
    MissingRequiredParam,
    /// Query would scan too much data
    QueryScopeTooLarge,
    /// Referenced schema does not exist
    SchemaNotFound,
    /// Several independent errors occurred
    MultipleErrors,
    /// Unclassified internal failure
    InternalError,
}

/// Overall outcome of a boundary call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// Fully succeeded
    Success,
    /// Executed with degraded features or empty lookups
    Partial,
    /// Failed
    Error,
}

/// The boundary response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredResponse {
    /// Overall outcome
    pub status: ResponseStatus,
    /// Result payload on success/partial
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Primary error code on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    /// Human-readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Individual errors accumulated along the way
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Non-fatal notes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Extension metadata
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl StructuredResponse {
    /// A success envelope with a payload
    #[must_use]
    pub fn success(result: serde_json::Value) -> Self {
        Self {
            status: ResponseStatus::Success,
            result: Some(result),
            error_code: None,
            message: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// A partial envelope: executed, but with degraded features
    #[must_use]
    pub fn partial(result: serde_json::Value, warning: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Partial,
            result: Some(result),
            error_code: None,
            message: None,
            errors: Vec::new(),
            warnings: vec![warning.into()],
            metadata: HashMap::new(),
        }
    }

    /// An error envelope
    #[must_use]
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: ResponseStatus::Error,
            result: None,
            error_code: Some(code),
            message: Some(message.clone()),
            errors: vec![message],
            warnings: Vec::new(),
            metadata: HashMap::new(),
        }
    }
}
