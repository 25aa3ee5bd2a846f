//! Graph store entities and traversal read models.
//!
//! Edges form cycles; entities and relations live in arena-style tables
//! keyed by `key` and are looked up on demand, never held as owning
//! references of each other.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A node in the knowledge graph, unique by `key`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEntity {
    /// Primary key inside the entities table
    pub key: String,
    /// Display name, target of text/keyword matching
    pub name: String,
    /// Entity type label
    pub entity_type: String,
    /// Originating file, when extracted from a single document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// Originating files, when merged across documents
    #[serde(default)]
    pub file_ids: Vec<String>,
    /// Free-form attributes
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl GraphEntity {
    /// Create an entity with the given key, name, and type
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            entity_type: entity_type.into(),
            file_id: None,
            file_ids: Vec::new(),
            attributes: HashMap::new(),
        }
    }

    /// True when the entity references the given file either way
    #[must_use]
    pub fn references_file(&self, file_id: &str) -> bool {
        self.file_id.as_deref() == Some(file_id) || self.file_ids.iter().any(|f| f == file_id)
    }
}

/// A directed, typed edge between two entity keys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphRelation {
    /// Source entity key
    pub from: String,
    /// Target entity key
    pub to: String,
    /// Relation type label
    pub relation_type: String,
    /// Originating file, when extracted from a single document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

impl GraphRelation {
    /// Create a relation between two entity keys
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        relation_type: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation_type: relation_type.into(),
            file_id: None,
        }
    }

    /// Given one endpoint key, return the other
    #[must_use]
    pub fn other_end<'a>(&'a self, key: &str) -> &'a str {
        if self.from == key { &self.to } else { &self.from }
    }
}

/// One 1-hop traversal result: the neighbour vertex plus the connecting edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborRecord {
    /// The anchor entity the traversal started from
    pub anchor: GraphEntity,
    /// The connecting relation
    pub relation: GraphRelation,
    /// The neighbour vertex
    pub neighbor: GraphEntity,
}

/// One multi-hop path through the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgraphPath {
    /// Vertices along the path, in order
    pub vertices: Vec<GraphEntity>,
    /// Relations between consecutive vertices
    pub relations: Vec<GraphRelation>,
}

impl SubgraphPath {
    /// Render the path as pipe-joined triples: `A - r1 - B | B - r2 - C`
    #[must_use]
    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        for (i, rel) in self.relations.iter().enumerate() {
            if i + 1 < self.vertices.len() {
                parts.push(format!(
                    "{} - {} - {}",
                    self.vertices[i].name, rel.relation_type, self.vertices[i + 1].name
                ));
            }
        }
        parts.join(" | ")
    }
}
