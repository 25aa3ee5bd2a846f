//! Provider auto-registration registries
//!
//! Each submodule declares a linkme distributed slice plus a typed config;
//! provider crates contribute entries at link time and the composition root
//! resolves by name.

/// Cache provider registry
pub mod cache;
/// Embedding provider registry
pub mod embedding;
/// Graph memory adapter registry
pub mod graph_memory;
/// Vector memory adapter registry
pub mod vector_memory;
