//! Embedding providers

mod http;
mod lexical;

pub use http::HttpEmbeddingProvider;
pub use lexical::LexicalEmbeddingProvider;
