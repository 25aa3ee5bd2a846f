//! # Provider Layer
//!
//! Concrete implementations of the domain's provider and adapter ports:
//! cache backends, vector stores, the graph/document store, embedding and
//! entity-extraction providers, and the chat model client.
//!
//! Providers auto-register into the domain's linkme registries; the
//! composition root resolves them by name from configuration.

/// Cache providers (moka, redis)
pub mod cache;
/// Chat model providers
pub mod chat;
/// Embedding providers
pub mod embedding;
/// Graph/document adapters
pub mod graph_store;
/// Conversation history stores
pub mod history;
/// Storage tier adapters
pub mod memory_adapters;
/// Named-entity extraction providers
pub mod ner;
/// Document stores (user tasks, operation log)
pub mod stores;
/// Point-level vector stores
pub mod vector_store;
