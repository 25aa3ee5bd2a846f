use engram_domain::entities::{ExternalToolConfig, ToolDescriptor, ToolOrigin};

fn sample_config(json: serde_json::Value) -> ExternalToolConfig {
    serde_json::from_value(json).expect("valid tool config")
}

#[test]
fn test_remote_name_defaults_to_local_alias() {
    let config = sample_config(serde_json::json!({
        "name": "weather",
        "mcp_endpoint": "http://tools.internal/mcp",
    }));
    assert_eq!(config.remote_name(), "weather");
    assert_eq!(config.actual_endpoint(), "http://tools.internal/mcp");
    assert!(config.auto_discover);
    assert!(config.enabled);
}

#[test]
fn test_proxy_endpoint_wins() {
    let config = sample_config(serde_json::json!({
        "name": "weather",
        "mcp_endpoint": "http://tools.internal/mcp",
        "proxy_endpoint": "http://gateway.internal/mcp",
        "tool_name_on_server": "get_weather",
    }));
    assert_eq!(config.actual_endpoint(), "http://gateway.internal/mcp");
    assert_eq!(config.remote_name(), "get_weather");
}

#[test]
fn test_descriptor_uses_camel_case_schema_key() {
    let descriptor = ToolDescriptor {
        name: "echo".to_owned(),
        description: "Echo input".to_owned(),
        input_schema: serde_json::json!({"type": "object"}),
        origin: ToolOrigin::Internal,
        endpoint: None,
        auth: None,
    };
    let json = serde_json::to_value(&descriptor).expect("serialize");
    assert!(json.get("inputSchema").is_some());
    assert!(json.get("input_schema").is_none());
}
