//! Conversation history stores

mod kv;
mod memory;

pub use kv::KvHistoryStore;
pub use memory::InMemoryHistoryStore;
