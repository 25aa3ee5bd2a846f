//! Lexical named-entity extraction.
//!
//! Rule-based extractor tuned for the platform's query mix: part-number
//! style codes, CJK term runs, and capitalised Latin words. A model-backed
//! extractor can replace this behind the same port.

use async_trait::async_trait;
use engram_domain::error::Result;
use engram_domain::ports::NerProvider;
use engram_domain::value_objects::ExtractedEntity;
use once_cell::sync::Lazy;
use regex::Regex;

static PART_NUMBER: Lazy<Regex> = Lazy::new(|| {
    // RM05-008, ABC-123, 10-4567: letter/digit groups joined by dashes.
    #[allow(clippy::unwrap_used)]
    Regex::new(r"[A-Z0-9]{2,}-[A-Z0-9][A-Z0-9-]*").unwrap()
});

static CJK_RUN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"[一-鿿]{2,}").unwrap()
});

static CAPITALIZED_WORD: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\b[A-Z][a-zA-Z]{2,}\b").unwrap()
});

/// Rule-based entity extractor.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalNerProvider;

impl LexicalNerProvider {
    /// Create the extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn extract(text: &str) -> Vec<ExtractedEntity> {
        let mut entities = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for m in PART_NUMBER.find_iter(text) {
            if seen.insert(m.as_str().to_owned()) {
                entities.push(ExtractedEntity::labelled(m.as_str(), "part_number"));
            }
        }
        for m in CJK_RUN.find_iter(text) {
            if seen.insert(m.as_str().to_owned()) {
                entities.push(ExtractedEntity::new(m.as_str()));
            }
        }
        for m in CAPITALIZED_WORD.find_iter(text) {
            if seen.insert(m.as_str().to_owned()) {
                entities.push(ExtractedEntity::new(m.as_str()));
            }
        }
        entities
    }
}

#[async_trait]
impl NerProvider for LexicalNerProvider {
    async fn extract_entities(&self, text: &str) -> Result<Vec<ExtractedEntity>> {
        Ok(Self::extract(text))
    }
}
