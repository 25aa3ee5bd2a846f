//! External Provider Ports
//!
//! Ports for external services the domain depends on: caching, embedding,
//! entity extraction, language models, vector stores, and access gates.
//!
//! | Port | Description |
//! | ------ | ------------- |
//! | `CacheProvider` | JSON KV backend (short-term tier, context history, result caches) |
//! | `EmbeddingProvider` | Text embedding generation |
//! | `NerProvider` | Named-entity extraction |
//! | `ChatModelProvider` | LLM inference (`chat(messages, model)`) |
//! | `VectorStoreProvider` | Point-level vector storage and similarity search |
//! | `ConsentGate` / `FileAccessGate` | Consent and ACL collaborators |

/// Cache provider port
pub mod cache;
/// Language model provider port
pub mod chat;
/// Embedding provider port
pub mod embedding;
/// Consent / ACL gate ports
pub mod gates;
/// Named-entity recognition port
pub mod ner;
/// Point-level vector store port
pub mod vector_store;

pub use cache::{CacheEntryConfig, CacheProvider, CacheStats};
pub use chat::ChatModelProvider;
pub use embedding::EmbeddingProvider;
pub use gates::{AllowAll, ConsentGate, FileAccessGate};
pub use ner::NerProvider;
pub use vector_store::VectorStoreProvider;
