//! Chat model providers

mod http;

pub use http::HttpChatProvider;
