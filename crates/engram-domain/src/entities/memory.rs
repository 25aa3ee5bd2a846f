//! Memory record; the central entity of the platform.
//!
//! A record lives in exactly one primary tier (short-term KV or long-term
//! vector store) and may be shadowed into the graph document store. Typed
//! long-term records additionally carry `(user_id, entity_type, entity_value)`
//! for exact-match recall and deduplication.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{id, time};

/// Storage tier a memory record is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryTier {
    /// TTL'd KV record, conversation-scoped working memory
    ShortTerm,
    /// Embedded record in the vector store, durable
    LongTerm,
}

impl MemoryTier {
    /// Wire name of the tier
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortTerm => "short_term",
            Self::LongTerm => "long_term",
        }
    }
}

impl std::str::FromStr for MemoryTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short_term" => Ok(Self::ShortTerm),
            "long_term" => Ok(Self::LongTerm),
            _ => Err(format!("Unknown memory tier: {s}")),
        }
    }
}

/// Retrieval priority of a memory record
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum MemoryPriority {
    /// Background detail
    Low,
    /// Regular conversational memory
    #[default]
    Medium,
    /// Explicitly important
    High,
    /// Must never be missed while active
    Critical,
}

impl MemoryPriority {
    /// Wire name of the priority
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Ordinal rank used by retrieval ordering (higher wins)
    #[must_use]
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }

    /// Relevance bonus contributed during real-time scoring
    #[must_use]
    pub fn relevance_bonus(&self) -> f32 {
        match self {
            Self::Low => 0.0,
            Self::Medium => 0.1,
            Self::High => 0.2,
            Self::Critical => 0.3,
        }
    }
}

impl std::str::FromStr for MemoryPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Unknown memory priority: {s}")),
        }
    }
}

/// Lifecycle status of a memory record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStatus {
    /// Live, returned by default retrieval
    #[default]
    Active,
    /// Soft-retired by the review job; never returned by default
    Archived,
    /// Flagged for human confirmation
    Review,
}

impl MemoryStatus {
    /// Wire name of the status
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
            Self::Review => "review",
        }
    }
}

impl std::str::FromStr for MemoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            "review" => Ok(Self::Review),
            _ => Err(format!("Unknown memory status: {s}")),
        }
    }
}

/// A single memory record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Globally unique identity across tiers
    pub memory_id: String,
    /// Embedded and searched text
    pub content: String,
    /// Primary tier routing
    pub tier: MemoryTier,
    /// Retrieval priority
    #[serde(default)]
    pub priority: MemoryPriority,
    /// Isolation key; empty means legacy/global
    #[serde(default)]
    pub user_id: String,
    /// Typed-entity label (`part_number`, `tlf19`, `intent`, `preference`, `context`)
    #[serde(default)]
    pub entity_type: String,
    /// Canonical value for exact-match retrieval
    #[serde(default)]
    pub entity_value: String,
    /// Confidence in the stored fact, used for conflict resolution
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    /// Lifecycle status
    #[serde(default)]
    pub status: MemoryStatus,
    /// Session id, task id, source tag, custom extensions
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Creation timestamp; never changes after the first store
    pub created_at: DateTime<Utc>,
    /// Strictly advances on every update
    pub updated_at: DateTime<Utc>,
    /// Last retrieval timestamp
    #[serde(default)]
    pub accessed_at: Option<DateTime<Utc>>,
    /// Monotonically non-decreasing hotness counter
    #[serde(default)]
    pub access_count: u64,
    /// Transient score set by retrieval, not stored authoritatively
    #[serde(default)]
    pub relevance_score: f32,
}

fn default_confidence() -> f32 {
    0.5
}

impl MemoryRecord {
    /// Create a record with generated id and current timestamps
    #[must_use]
    pub fn new(content: impl Into<String>, tier: MemoryTier) -> Self {
        Self::with_id(id::generate(), content, tier)
    }

    /// Create a record with an explicit id
    #[must_use]
    pub fn with_id(
        memory_id: impl Into<String>,
        content: impl Into<String>,
        tier: MemoryTier,
    ) -> Self {
        let now = time::now();
        Self {
            memory_id: memory_id.into(),
            content: content.into(),
            tier,
            priority: MemoryPriority::Medium,
            user_id: String::new(),
            entity_type: String::new(),
            entity_value: String::new(),
            confidence: 0.5,
            status: MemoryStatus::Active,
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
            accessed_at: None,
            access_count: 0,
            relevance_score: 0.0,
        }
    }

    /// Set the priority
    #[must_use]
    pub fn with_priority(mut self, priority: MemoryPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the isolation key
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Set the typed entity fields
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_value: impl Into<String>,
        confidence: f32,
    ) -> Self {
        self.entity_type = entity_type.into();
        self.entity_value = entity_value.into();
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Attach one metadata entry
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Record one retrieval: bump the counter and refresh `accessed_at`.
    pub fn touch_access(&mut self) {
        self.access_count += 1;
        self.accessed_at = Some(time::now());
    }

    /// Advance `updated_at`, keeping it strictly after the previous value.
    pub fn touch_updated(&mut self) {
        let now = time::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::microseconds(1)
        };
    }

    /// String metadata accessor
    #[must_use]
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// Shallow-merge a metadata delta into the record
    pub fn merge_metadata(&mut self, delta: HashMap<String, serde_json::Value>) {
        self.metadata.extend(delta);
    }

    /// Sort key for retrieval ordering: `(relevance, priority_rank, accessed_at)`
    /// descending. Callers sort with `b.sort_key().partial_cmp(&a.sort_key())`.
    #[must_use]
    pub fn sort_key(&self) -> (f32, u8, i64) {
        (
            self.relevance_score,
            self.priority.rank(),
            self.accessed_at.map_or(0, |t| t.timestamp_micros()),
        )
    }
}

/// Sort records by `(relevance, priority_rank, accessed_at)` descending.
pub fn sort_by_relevance(records: &mut [MemoryRecord]) {
    records.sort_by(|a, b| {
        let (ar, ap, at) = a.sort_key();
        let (br, bp, bt) = b.sort_key();
        br.partial_cmp(&ar)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(bp.cmp(&ap))
            .then(bt.cmp(&at))
    });
}
