//! Storage tier adapters over provider backends

mod kv;
mod vector;

pub use kv::KvMemoryAdapter;
pub use vector::EmbeddedMemoryAdapter;
