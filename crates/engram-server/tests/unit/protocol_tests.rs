use engram_server::mcp::{McpRequest, McpResponse};

#[test]
fn test_request_round_trip() {
    let request = McpRequest::new(7, "tools/list", None);
    let json = serde_json::to_value(&request).expect("serialize");
    assert_eq!(json["jsonrpc"], "2.0");
    assert_eq!(json["id"], 7);
    assert_eq!(json["method"], "tools/list");
    assert!(json.get("params").is_none());

    let back: McpRequest = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back.id, Some(7));
    assert_eq!(back.method, "tools/list");
}

#[test]
fn test_request_accepts_minimal_wire_form() {
    // jsonrpc tag and params are optional on the wire.
    let back: McpRequest =
        serde_json::from_str(r#"{"id": 1, "method": "initialize"}"#).expect("deserialize");
    assert_eq!(back.id, Some(1));
    assert!(back.jsonrpc.is_none());
    assert!(back.params.is_none());
}

#[test]
fn test_response_success_and_failure_shapes() {
    let ok = McpResponse::success(Some(3), serde_json::json!({"tools": []}));
    let json = serde_json::to_value(&ok).expect("serialize");
    assert_eq!(json["id"], 3);
    assert!(json.get("error").is_none());

    let err = McpResponse::failure(Some(3), -32601, "Method not found", None);
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["error"]["code"], -32601);
    assert_eq!(json["error"]["message"], "Method not found");
    assert!(json.get("result").is_none());
}
