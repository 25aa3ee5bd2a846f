//! Configuration loading and typed settings

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    AppConfig, ChatConfig, LoggingConfig, McpConfig, MemoryConfig, RetrievalConfig, ServerConfig,
};
