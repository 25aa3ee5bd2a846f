use std::sync::Arc;

use engram_domain::entities::ExternalToolConfig;
use engram_domain::ports::ToolConfigStore;
use engram_server::mcp::{ExternalToolManager, StaticToolConfigStore, ToolMetrics, ToolRegistry};
use serial_test::serial;

fn config(json: serde_json::Value) -> ExternalToolConfig {
    serde_json::from_value(json).expect("valid config")
}

fn manager(store: Arc<StaticToolConfigStore>) -> ExternalToolManager {
    ExternalToolManager::new(
        store as Arc<dyn ToolConfigStore>,
        Arc::new(ToolRegistry::new()),
        Arc::new(ToolMetrics::new()),
    )
}

#[tokio::test]
#[serial]
async fn test_env_references_are_resolved_at_load() {
    // Process-global state; serialised with other env-touching tests.
    std::env::set_var("ENGRAM_TEST_TOOL_KEY", "secret-token");

    let store = Arc::new(StaticToolConfigStore::new(vec![config(serde_json::json!({
        "name": "weather",
        "mcp_endpoint": "http://tools.internal/mcp",
        "auth_config": {
            "auth_type": "api_key",
            "api_key": "${ENGRAM_TEST_TOOL_KEY}"
        }
    }))]));
    let manager = manager(store);

    let configs = manager.load_config().await.expect("load");
    assert_eq!(configs.len(), 1);
    assert_eq!(
        configs[0].auth_config.api_key.as_deref(),
        Some("secret-token")
    );

    std::env::remove_var("ENGRAM_TEST_TOOL_KEY");
}

#[tokio::test]
#[serial]
async fn test_unresolvable_reference_is_left_verbatim() {
    let store = Arc::new(StaticToolConfigStore::new(vec![config(serde_json::json!({
        "name": "weather",
        "mcp_endpoint": "${ENGRAM_TEST_MISSING_ENDPOINT}",
    }))]));
    let manager = manager(store);

    let configs = manager.load_config().await.expect("load");
    assert_eq!(configs[0].mcp_endpoint, "${ENGRAM_TEST_MISSING_ENDPOINT}");
}

#[tokio::test]
#[serial]
async fn test_disabled_entries_are_skipped() {
    let store = Arc::new(StaticToolConfigStore::new(vec![
        config(serde_json::json!({
            "name": "on",
            "mcp_endpoint": "http://a/mcp",
        })),
        config(serde_json::json!({
            "name": "off",
            "mcp_endpoint": "http://b/mcp",
            "enabled": false,
        })),
    ]));
    let manager = manager(store);

    let configs = manager.load_config().await.expect("load");
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].name, "on");
}

#[tokio::test]
#[serial]
async fn test_unregister_unknown_tool_is_false() {
    let store = Arc::new(StaticToolConfigStore::new(Vec::new()));
    let manager = manager(store);
    assert!(!manager.unregister_external_tool("ghost").await);
}
