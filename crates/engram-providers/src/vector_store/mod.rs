//! Point-level vector stores

#[cfg(feature = "vectorstore-http")]
mod http;
#[cfg(feature = "vectorstore-memory")]
mod memory;

#[cfg(feature = "vectorstore-http")]
pub use http::HttpVectorStore;
#[cfg(feature = "vectorstore-memory")]
pub use memory::InMemoryVectorStore;
