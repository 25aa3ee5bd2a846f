//! Per-tool call statistics.

use std::collections::HashMap;

use dashmap::DashMap;
use engram_domain::utils::time;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
struct ToolStat {
    total_calls: u64,
    success_calls: u64,
    failure_calls: u64,
    total_latency_ms: f64,
    min_latency_ms: Option<f64>,
    max_latency_ms: f64,
    error_types: HashMap<String, u64>,
    last_call_at: Option<i64>,
    last_success_at: Option<i64>,
    last_failure_at: Option<i64>,
}

/// Aggregated view of one tool's statistics
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatsView {
    /// Tool name
    pub tool_name: String,
    /// Total calls
    pub total_calls: u64,
    /// Successful calls
    pub success_calls: u64,
    /// Failed calls
    pub failure_calls: u64,
    /// Success ratio
    pub success_rate: f64,
    /// Mean latency
    pub average_latency_ms: f64,
    /// Minimum latency observed
    pub min_latency_ms: f64,
    /// Maximum latency observed
    pub max_latency_ms: f64,
    /// Failure counts per error type
    pub error_types: HashMap<String, u64>,
}

/// Summary across all tools
#[derive(Debug, Clone, Serialize)]
pub struct ToolMetricsSummary {
    /// Distinct tools observed
    pub total_tools: usize,
    /// Calls across every tool
    pub total_calls: u64,
    /// Successes across every tool
    pub total_success: u64,
    /// Failures across every tool
    pub total_failure: u64,
    /// Overall success ratio
    pub overall_success_rate: f64,
    /// Tool names observed
    pub tools: Vec<String>,
}

/// Concurrent tool metrics collector.
#[derive(Debug, Default)]
pub struct ToolMetrics {
    stats: DashMap<String, ToolStat>,
}

impl ToolMetrics {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tool call.
    pub fn record_call(
        &self,
        tool_name: &str,
        success: bool,
        latency_ms: f64,
        error_type: Option<&str>,
    ) {
        let mut stat = self.stats.entry(tool_name.to_owned()).or_default();
        let now = time::epoch_secs();
        stat.total_calls += 1;
        stat.total_latency_ms += latency_ms;
        stat.last_call_at = Some(now);
        if success {
            stat.success_calls += 1;
            stat.last_success_at = Some(now);
        } else {
            stat.failure_calls += 1;
            stat.last_failure_at = Some(now);
            if let Some(error_type) = error_type {
                *stat.error_types.entry(error_type.to_owned()).or_default() += 1;
            }
        }
        stat.min_latency_ms = Some(stat.min_latency_ms.map_or(latency_ms, |m| m.min(latency_ms)));
        if latency_ms > stat.max_latency_ms {
            stat.max_latency_ms = latency_ms;
        }
    }

    /// Per-tool statistics, when the tool has been called at all.
    #[must_use]
    pub fn stats(&self, tool_name: &str) -> Option<ToolStatsView> {
        let stat = self.stats.get(tool_name)?;
        if stat.total_calls == 0 {
            return None;
        }
        Some(ToolStatsView {
            tool_name: tool_name.to_owned(),
            total_calls: stat.total_calls,
            success_calls: stat.success_calls,
            failure_calls: stat.failure_calls,
            success_rate: stat.success_calls as f64 / stat.total_calls as f64,
            average_latency_ms: stat.total_latency_ms / stat.total_calls as f64,
            min_latency_ms: stat.min_latency_ms.unwrap_or(0.0),
            max_latency_ms: stat.max_latency_ms,
            error_types: stat.error_types.clone(),
        })
    }

    /// Summary across all tools.
    #[must_use]
    pub fn summary(&self) -> ToolMetricsSummary {
        let mut total_calls = 0;
        let mut total_success = 0;
        let mut total_failure = 0;
        let mut tools = Vec::new();
        for entry in self.stats.iter() {
            total_calls += entry.total_calls;
            total_success += entry.success_calls;
            total_failure += entry.failure_calls;
            tools.push(entry.key().clone());
        }
        ToolMetricsSummary {
            total_tools: tools.len(),
            total_calls,
            total_success,
            total_failure,
            overall_success_rate: if total_calls > 0 {
                total_success as f64 / total_calls as f64
            } else {
                0.0
            },
            tools,
        }
    }

    /// Reset one tool's stats, or everything when no name given.
    pub fn reset(&self, tool_name: Option<&str>) {
        match tool_name {
            Some(name) => {
                self.stats.remove(name);
            }
            None => self.stats.clear(),
        }
    }
}
