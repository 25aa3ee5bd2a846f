//! Graph/document adapters

#[cfg(feature = "graphstore-memory")]
mod memory;

#[cfg(feature = "graphstore-memory")]
pub use memory::InMemoryGraphAdapter;
