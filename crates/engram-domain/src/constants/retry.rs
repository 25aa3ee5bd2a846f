//! Retry and timeout budgets for outward calls.
//!
//! Timeouts are per-operation, not per-chain.

use std::time::Duration;

/// Default number of attempts for transient back-end failures
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Base delay for linear backoff between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Budget for a single storage adapter call
pub const ADAPTER_TIMEOUT: Duration = Duration::from_secs(5);
/// Budget for a language model call
pub const MODEL_TIMEOUT: Duration = Duration::from_secs(10);
/// Budget for an MCP request
pub const MCP_TIMEOUT: Duration = Duration::from_secs(30);
/// Budget for one retrieval track in the hybrid path
pub const TRACK_TIMEOUT: Duration = Duration::from_secs(5);
