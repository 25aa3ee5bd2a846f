use std::sync::Arc;

use engram_domain::entities::{ToolDescriptor, ToolOrigin};
use engram_server::mcp::{FnToolHandler, ToolHandler, ToolRegistry};

fn descriptor(name: &str, origin: ToolOrigin) -> ToolDescriptor {
    ToolDescriptor {
        name: name.to_owned(),
        description: format!("{name} tool"),
        input_schema: serde_json::json!({"type": "object"}),
        origin,
        endpoint: None,
        auth: None,
    }
}

fn noop_handler() -> Arc<dyn ToolHandler> {
    Arc::new(FnToolHandler(|_args: serde_json::Value| async move {
        Ok(serde_json::json!(null))
    }))
}

#[test]
fn test_register_and_unregister() {
    let registry = ToolRegistry::new();
    registry.register(descriptor("a", ToolOrigin::Internal), noop_handler(), None);
    assert_eq!(registry.len(), 1);
    assert!(registry.get("a").is_some());

    assert!(registry.unregister("a"));
    assert!(!registry.unregister("a"));
    assert!(registry.is_empty());
}

#[test]
fn test_descriptors_are_name_sorted() {
    let registry = ToolRegistry::new();
    for name in ["zeta", "alpha", "mid"] {
        registry.register(descriptor(name, ToolOrigin::Internal), noop_handler(), None);
    }
    let names: Vec<String> = registry.descriptors().iter().map(|d| d.name.clone()).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_origin_filter() {
    let registry = ToolRegistry::new();
    registry.register(descriptor("in", ToolOrigin::Internal), noop_handler(), None);
    registry.register(
        descriptor("out", ToolOrigin::External),
        noop_handler(),
        Some("http://remote/mcp".to_owned()),
    );

    let external = registry.descriptors_by_origin(ToolOrigin::External);
    assert_eq!(external.len(), 1);
    assert_eq!(external[0].name, "out");
}

#[test]
fn test_call_counters() {
    let registry = ToolRegistry::new();
    registry.register(descriptor("a", ToolOrigin::Internal), noop_handler(), None);
    registry.record_tool_call("a", true);
    registry.record_tool_call("a", false);
    registry.record_tool_call("a", true);

    let registration = registry.registration("a").expect("registration");
    assert_eq!(registration.call_count, 3);
    assert_eq!(registration.success_count, 2);
    assert_eq!(registration.failure_count, 1);
}

#[test]
fn test_reregistration_overwrites() {
    let registry = ToolRegistry::new();
    registry.register(descriptor("a", ToolOrigin::Internal), noop_handler(), None);
    registry.register(
        descriptor("a", ToolOrigin::External),
        noop_handler(),
        Some("http://remote/mcp".to_owned()),
    );
    assert_eq!(registry.len(), 1);
    let (descriptor, _) = registry.get("a").expect("tool");
    assert_eq!(descriptor.origin, ToolOrigin::External);
}
