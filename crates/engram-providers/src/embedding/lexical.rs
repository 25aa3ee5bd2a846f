//! Deterministic lexical embedding provider.
//!
//! Feature-hashing over word tokens and CJK bigrams into a fixed-size,
//! L2-normalised vector. No model downloads, no network: the same text
//! always produces the same vector, which makes it the default for tests
//! and air-gapped deployments. Shared token features give related texts a
//! meaningful cosine similarity.

use async_trait::async_trait;
use engram_domain::error::Result;
use engram_domain::ports::EmbeddingProvider;
use engram_domain::utils::stable_hash;
use engram_domain::value_objects::Embedding;

const MODEL_NAME: &str = "lexical-hash-v1";

/// Feature-hashing embedder.
pub struct LexicalEmbeddingProvider {
    dimensions: usize,
}

impl LexicalEmbeddingProvider {
    /// Create a provider producing vectors of the given dimensionality.
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(8),
        }
    }

    fn tokens(text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut word = String::new();
        let mut cjk_prev: Option<char> = None;

        for ch in text.chars() {
            if ch.is_alphanumeric() && !is_cjk(ch) {
                word.extend(ch.to_lowercase());
                cjk_prev = None;
                continue;
            }
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            if is_cjk(ch) {
                // Unigram plus bigram with the previous CJK char.
                tokens.push(ch.to_string());
                if let Some(prev) = cjk_prev {
                    tokens.push(format!("{prev}{ch}"));
                }
                cjk_prev = Some(ch);
            } else {
                cjk_prev = None;
            }
        }
        if !word.is_empty() {
            tokens.push(word);
        }
        tokens
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];
        for token in Self::tokens(text) {
            let hash = stable_hash(&token);
            let index = (hash % self.dimensions as u64) as usize;
            // A second hash bit decides the sign so features cancel instead
            // of all piling into the positive quadrant.
            let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

fn is_cjk(ch: char) -> bool {
    matches!(ch as u32, 0x4E00..=0x9FFF | 0x3400..=0x4DBF)
}

#[async_trait]
impl EmbeddingProvider for LexicalEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        Ok(Embedding::new(self.vectorize(text), MODEL_NAME))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use std::sync::Arc;

use engram_domain::registry::embedding::{
    EMBEDDING_PROVIDERS, EmbeddingProviderConfig, EmbeddingProviderEntry,
};

fn lexical_embedding_factory(
    config: &EmbeddingProviderConfig,
) -> std::result::Result<Arc<dyn EmbeddingProvider>, String> {
    let dimensions = config.dimensions.unwrap_or(384);
    Ok(Arc::new(LexicalEmbeddingProvider::new(dimensions)))
}

#[linkme::distributed_slice(EMBEDDING_PROVIDERS)]
static LEXICAL_PROVIDER: EmbeddingProviderEntry = EmbeddingProviderEntry {
    name: "lexical",
    description: "Deterministic feature-hashing embedder",
    build: lexical_embedding_factory,
};
