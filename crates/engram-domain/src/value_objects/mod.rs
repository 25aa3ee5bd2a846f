//! Immutable value objects

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::MemoryRecord;

/// A dense vector representation of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// The vector components
    pub vector: Vec<f32>,
    /// Producing model name
    pub model: String,
    /// Vector dimensionality
    pub dimensions: usize,
}

impl Embedding {
    /// Build an embedding from a vector and model name
    #[must_use]
    pub fn new(vector: Vec<f32>, model: impl Into<String>) -> Self {
        let dimensions = vector.len();
        Self {
            vector,
            model: model.into(),
            dimensions,
        }
    }

    /// Cosine similarity against another vector; 0.0 when either is zero
    #[must_use]
    pub fn cosine_similarity(&self, other: &[f32]) -> f32 {
        cosine_similarity(&self.vector, other)
    }
}

/// Cosine similarity between two raw vectors
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// A named entity extracted from query or document text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    /// Surface text of the entity
    pub text: String,
    /// Type label, when the extractor could assign one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ExtractedEntity {
    /// Build an unlabelled entity
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: None,
        }
    }

    /// Build a labelled entity
    #[must_use]
    pub fn labelled(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: Some(label.into()),
        }
    }
}

/// Action suggested when a new fact conflicts with a stored one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictAction {
    /// New fact is more confident; replace the stored one
    Overwrite,
    /// Stored fact wins; drop the new one
    Ignore,
}

/// A detected near-duplicate between a candidate fact and a stored memory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConflict {
    /// The stored record the candidate collides with
    pub existing: MemoryRecord,
    /// Confidence of the incoming fact
    pub new_confidence: f32,
    /// Embedding cosine similarity between the two
    pub similarity: f32,
    /// Resolution suggestion
    pub suggested_action: ConflictAction,
}

/// One point in a vector collection, as stored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorPoint {
    /// Point identity; stable across payload updates
    pub id: String,
    /// The indexed vector
    pub vector: Vec<f32>,
    /// Flat payload; nested maps are serialised to JSON strings upstream
    pub payload: HashMap<String, serde_json::Value>,
}

/// One similarity hit returned by a vector query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    /// Point identity
    pub id: String,
    /// Distance from the query vector; smaller is closer
    pub distance: f32,
    /// Stored payload
    pub payload: HashMap<String, serde_json::Value>,
}

/// Filter applied to point-level vector queries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PointFilter {
    /// Restrict to one file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// Restrict to one user (isolation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Cluster-wide vector collection naming strategy.
///
/// Mixing strategies within one collection is forbidden; the choice is
/// validated at configuration load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollectionNaming {
    /// One collection per ingested file
    #[default]
    FileBased,
    /// One collection per user
    UserBased,
}

impl CollectionNaming {
    /// Wire name of the strategy
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FileBased => "file_based",
            Self::UserBased => "user_based",
        }
    }
}

impl std::str::FromStr for CollectionNaming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file_based" => Ok(Self::FileBased),
            "user_based" => Ok(Self::UserBased),
            _ => Err(format!("Unknown collection naming strategy: {s}")),
        }
    }
}

/// Retrieval strategy for the hybrid engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    /// Dense track first, graph backfill
    VectorFirst,
    /// Graph track first, dense backfill
    GraphFirst,
    /// Both tracks in parallel, weighted merge
    #[default]
    Hybrid,
}

impl RetrievalStrategy {
    /// Wire name of the strategy
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VectorFirst => "vector_first",
            Self::GraphFirst => "graph_first",
            Self::Hybrid => "hybrid",
        }
    }
}

impl std::str::FromStr for RetrievalStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vector_first" => Ok(Self::VectorFirst),
            "graph_first" => Ok(Self::GraphFirst),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(format!("Unknown retrieval strategy: {s}")),
        }
    }
}
