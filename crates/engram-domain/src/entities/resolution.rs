//! Coreference resolution results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Which pipeline stage produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    /// Query needed no resolution
    None,
    /// Long-term memory supplied the entities
    Aam,
    /// Rule-based substitution
    Rule,
    /// Language-model fallback
    Llm,
}

impl ResolutionMethod {
    /// Wire name of the method
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Aam => "aam",
            Self::Rule => "rule",
            Self::Llm => "llm",
        }
    }
}

/// Outcome of resolving pronouns and ellipses in a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Whether any substitution happened
    pub resolved: bool,
    /// The rewritten query
    pub resolved_query: String,
    /// Structured entities extracted or substituted
    pub entities: HashMap<String, String>,
    /// Producing stage
    pub method: ResolutionMethod,
    /// Confidence in the rewrite, 0..=1
    pub confidence: f32,
}

impl ResolutionResult {
    /// A pass-through result for queries that need no resolution
    #[must_use]
    pub fn unresolved(query: impl Into<String>) -> Self {
        Self {
            resolved: false,
            resolved_query: query.into(),
            entities: HashMap::new(),
            method: ResolutionMethod::None,
            confidence: 1.0,
        }
    }
}
