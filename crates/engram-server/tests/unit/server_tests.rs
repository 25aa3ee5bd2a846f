use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use engram_server::mcp::{FnToolHandler, McpRequest, McpServer};

fn request(id: i64, method: &str, params: Option<serde_json::Value>) -> McpRequest {
    McpRequest::new(id, method, params)
}

fn server_with_echo() -> McpServer {
    let server = McpServer::new("engram-test", "0.0.1");
    server.register_tool(
        "echo",
        "Echo the message back",
        serde_json::json!({
            "type": "object",
            "properties": { "message": { "type": "string" } },
            "required": ["message"]
        }),
        Arc::new(FnToolHandler(|args: serde_json::Value| async move {
            Ok(serde_json::json!({ "echoed": args["message"] }))
        })),
    );
    server
}

#[tokio::test]
async fn test_initialize_echoes_id_and_serves_version() {
    let server = McpServer::new("engram-test", "0.0.1");
    let response = server.handle(request(42, "initialize", None)).await;
    assert_eq!(response.id, Some(42));
    let result = response.result.expect("result");
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "engram-test");
}

#[tokio::test]
async fn test_unknown_method_is_32601() {
    let server = McpServer::new("engram-test", "0.0.1");
    let response = server.handle(request(1, "bogus/method", None)).await;
    let error = response.error.expect("error");
    assert_eq!(error.code, -32601);
}

#[tokio::test]
async fn test_tools_list_reports_registered_tools() {
    let server = server_with_echo();
    let response = server.handle(request(2, "tools/list", None)).await;
    let tools = response.result.expect("result")["tools"]
        .as_array()
        .expect("tools array")
        .clone();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "echo");
    assert!(tools[0].get("inputSchema").is_some());
}

#[tokio::test]
async fn test_tool_call_wraps_result_as_text_content() {
    let server = server_with_echo();
    let response = server
        .handle(request(
            3,
            "tools/call",
            Some(serde_json::json!({
                "name": "echo",
                "arguments": { "message": "hi" }
            })),
        ))
        .await;
    let result = response.result.expect("result");
    let content = &result["content"][0];
    assert_eq!(content["type"], "text");
    let text: serde_json::Value =
        serde_json::from_str(content["text"].as_str().expect("text")).expect("json text");
    assert_eq!(text["echoed"], "hi");
}

#[tokio::test]
async fn test_schema_validation_rejects_bad_arguments() {
    let server = server_with_echo();
    let response = server
        .handle(request(
            4,
            "tools/call",
            Some(serde_json::json!({
                "name": "echo",
                "arguments": { "message": 7 }
            })),
        ))
        .await;
    let error = response.error.expect("error");
    assert_eq!(error.code, -32602);
    assert!(error.data.is_some());
}

#[tokio::test]
async fn test_handler_failure_is_32603_with_summary() {
    let server = McpServer::new("engram-test", "0.0.1");
    server.register_tool(
        "broken",
        "Always fails",
        serde_json::json!({"type": "object"}),
        Arc::new(FnToolHandler(|_args: serde_json::Value| async move {
            Err(engram_domain::Error::internal("boom"))
        })),
    );
    let response = server
        .handle(request(
            5,
            "tools/call",
            Some(serde_json::json!({ "name": "broken", "arguments": {} })),
        ))
        .await;
    let error = response.error.expect("error");
    assert_eq!(error.code, -32603);
    let data = error.data.expect("data");
    assert!(data["error"].as_str().expect("summary").contains("boom"));
}

#[tokio::test]
async fn test_unknown_tool_is_internal_error() {
    let server = server_with_echo();
    let response = server
        .handle(request(
            6,
            "tools/call",
            Some(serde_json::json!({ "name": "ghost", "arguments": {} })),
        ))
        .await;
    assert_eq!(response.error.expect("error").code, -32603);
}

#[tokio::test]
async fn test_metrics_callback_observes_method_and_outcome() {
    let calls = Arc::new(AtomicUsize::new(0));
    let errors = Arc::new(AtomicUsize::new(0));
    let calls_cb = Arc::clone(&calls);
    let errors_cb = Arc::clone(&errors);

    let server = McpServer::new("engram-test", "0.0.1").with_metrics_callback(Arc::new(
        move |_method, _latency, is_error| {
            calls_cb.fetch_add(1, Ordering::SeqCst);
            if is_error {
                errors_cb.fetch_add(1, Ordering::SeqCst);
            }
        },
    ));

    server.handle(request(1, "initialize", None)).await;
    server.handle(request(2, "nope", None)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_tool_metrics_accumulate() {
    let server = server_with_echo();
    for i in 0..3 {
        server
            .handle(request(
                i,
                "tools/call",
                Some(serde_json::json!({
                    "name": "echo",
                    "arguments": { "message": "x" }
                })),
            ))
            .await;
    }
    let stats = server.tool_metrics().stats("echo").expect("stats");
    assert_eq!(stats.total_calls, 3);
    assert_eq!(stats.success_calls, 3);
    assert!((stats.success_rate - 1.0).abs() < f64::EPSILON);
}
