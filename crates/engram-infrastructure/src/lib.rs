//! # Infrastructure Layer
//!
//! Configuration loading, logging setup, and the DI composition root that
//! wires providers into application services.

/// Configuration loading and typed settings
pub mod config;
/// Dependency injection
pub mod di;
/// Structured logging setup
pub mod logging;

pub use config::{AppConfig, ConfigLoader};
pub use di::{AppContext, init_app, init_app_with_gates};
pub use logging::init_logging;
