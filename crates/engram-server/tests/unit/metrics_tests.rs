use engram_server::mcp::ToolMetrics;

#[test]
fn test_stats_aggregate_latency_and_errors() {
    let metrics = ToolMetrics::new();
    metrics.record_call("search", true, 10.0, None);
    metrics.record_call("search", true, 30.0, None);
    metrics.record_call("search", false, 50.0, Some("timeout"));

    let stats = metrics.stats("search").expect("stats");
    assert_eq!(stats.total_calls, 3);
    assert_eq!(stats.success_calls, 2);
    assert_eq!(stats.failure_calls, 1);
    assert!((stats.average_latency_ms - 30.0).abs() < 1e-9);
    assert!((stats.min_latency_ms - 10.0).abs() < 1e-9);
    assert!((stats.max_latency_ms - 50.0).abs() < 1e-9);
    assert_eq!(stats.error_types.get("timeout"), Some(&1));
}

#[test]
fn test_unknown_tool_has_no_stats() {
    let metrics = ToolMetrics::new();
    assert!(metrics.stats("ghost").is_none());
}

#[test]
fn test_summary_spans_tools() {
    let metrics = ToolMetrics::new();
    metrics.record_call("a", true, 1.0, None);
    metrics.record_call("b", false, 2.0, Some("boom"));

    let summary = metrics.summary();
    assert_eq!(summary.total_tools, 2);
    assert_eq!(summary.total_calls, 2);
    assert_eq!(summary.total_success, 1);
    assert_eq!(summary.total_failure, 1);
    assert!((summary.overall_success_rate - 0.5).abs() < 1e-9);
}

#[test]
fn test_reset_scopes_to_one_tool() {
    let metrics = ToolMetrics::new();
    metrics.record_call("a", true, 1.0, None);
    metrics.record_call("b", true, 1.0, None);

    metrics.reset(Some("a"));
    assert!(metrics.stats("a").is_none());
    assert!(metrics.stats("b").is_some());

    metrics.reset(None);
    assert_eq!(metrics.summary().total_tools, 0);
}
