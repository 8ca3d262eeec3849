// crates/fhir-bridge-mcp/src/server/tests.rs
// ============================================================================
// Module: Server Unit Tests
// Description: Unit tests for framing and JSON-RPC handling.
// Purpose: Validate frame limits, protocol errors, and top-level error
// shapes.
// Dependencies: fhir-bridge-mcp, fhir-bridge-client
// ============================================================================

//! ## Overview
//! Exercises `Content-Length` framing against in-memory streams and the
//! JSON-RPC handler against a stub store, including the reserved `isError`
//! shape for unknown tools.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::sync::Arc;

use async_trait::async_trait;
use fhir_bridge_client::FhirStore;
use fhir_bridge_core::StoreError;
use serde_json::Value;
use serde_json::json;
use tokio::io::BufReader;

use super::JsonRpcRequest;
use super::handle_request;
use super::read_framed;
use super::write_framed;
use crate::audit::NoopAuditSink;
use crate::tools::ToolRouter;
use crate::tools::build_catalog;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Stub store answering every call with an empty object.
struct StubStore;

#[async_trait]
impl FhirStore for StubStore {
    async fn ensure_session(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn switch_project(&self, _project_id: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn project_context(&self) -> Option<String> {
        None
    }

    async fn create_resource(&self, _kind: &str, _body: Value) -> Result<Value, StoreError> {
        Ok(json!({}))
    }

    async fn read_resource(&self, _kind: &str, _id: &str) -> Result<Value, StoreError> {
        Ok(json!({}))
    }

    async fn update_resource(
        &self,
        _kind: &str,
        _id: &str,
        _body: Value,
    ) -> Result<Value, StoreError> {
        Ok(json!({}))
    }

    async fn delete_resource(&self, _kind: &str, _id: &str) -> Result<Value, StoreError> {
        Ok(json!({}))
    }

    async fn search_resources(&self, _kind: &str, _query: &str) -> Result<Value, StoreError> {
        Ok(json!({}))
    }

    async fn patch_resource(
        &self,
        _kind: &str,
        _id: &str,
        _ops: Value,
    ) -> Result<Value, StoreError> {
        Ok(json!({}))
    }

    async fn get(&self, _path: &str) -> Result<Value, StoreError> {
        Ok(json!({}))
    }

    async fn post(&self, _path: &str, _body: Value) -> Result<Value, StoreError> {
        Ok(json!({}))
    }

    async fn put(&self, _path: &str, _body: Value) -> Result<Value, StoreError> {
        Ok(json!({}))
    }

    async fn patch(&self, _path: &str, _body: Value) -> Result<Value, StoreError> {
        Ok(json!({}))
    }

    async fn delete(&self, _path: &str) -> Result<Value, StoreError> {
        Ok(json!({}))
    }
}

/// Builds a router over the stub store.
fn stub_router() -> ToolRouter {
    let catalog = build_catalog().unwrap();
    ToolRouter::new(Arc::new(catalog), Arc::new(StubStore), Arc::new(NoopAuditSink)).unwrap()
}

/// Builds a JSON-RPC request value.
fn rpc_request(method: &str, params: Value) -> JsonRpcRequest {
    serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    }))
    .unwrap()
}

// ============================================================================
// SECTION: Framing Tests
// ============================================================================

#[tokio::test]
async fn read_framed_rejects_payload_over_limit() {
    let payload = br#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#;
    let framed = format!(
        "Content-Length: {}\r\n\r\n{}",
        payload.len(),
        String::from_utf8_lossy(payload)
    );
    let mut reader = BufReader::new(framed.as_bytes());
    let result = read_framed(&mut reader, payload.len() - 1).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn read_framed_accepts_payload_at_limit() {
    let payload = br#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#;
    let framed = format!(
        "Content-Length: {}\r\n\r\n{}",
        payload.len(),
        String::from_utf8_lossy(payload)
    );
    let mut reader = BufReader::new(framed.as_bytes());
    let bytes = read_framed(&mut reader, payload.len()).await.unwrap().expect("one frame");
    assert_eq!(bytes, payload);
}

#[tokio::test]
async fn read_framed_reports_clean_end_of_stream() {
    let mut reader = BufReader::new(&b""[..]);
    let result = read_framed(&mut reader, 1024).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn write_framed_emits_content_length_header() {
    let mut sink: Vec<u8> = Vec::new();
    write_framed(&mut sink, b"{}").await.unwrap();
    let text = String::from_utf8(sink).unwrap();
    assert_eq!(text, "Content-Length: 2\r\n\r\n{}");
}

// ============================================================================
// SECTION: JSON-RPC Tests
// ============================================================================

#[tokio::test]
async fn unknown_method_yields_protocol_error() {
    let router = stub_router();
    let response = handle_request(&router, rpc_request("tools/unknown", json!({}))).await;
    assert_eq!(response.error.map(|error| error.code), Some(-32601));
}

#[tokio::test]
async fn tools_list_returns_catalog() {
    let router = stub_router();
    let response = handle_request(&router, rpc_request("tools/list", json!({}))).await;
    let result = response.result.expect("list result");
    let tools = result.get("tools").and_then(Value::as_array).expect("tools array");
    assert!(tools.iter().any(|tool| tool.get("name") == Some(&json!("manageResource"))));
}

#[tokio::test]
async fn unknown_tool_yields_top_level_error_shape() {
    let router = stub_router();
    let params = json!({"name": "doesNotExist", "arguments": {}});
    let response = handle_request(&router, rpc_request("tools/call", params)).await;
    let result = response.result.expect("tool result");

    assert_eq!(result.get("isError"), Some(&json!(true)));
    let content = result.get("content").and_then(Value::as_array).expect("content");
    assert_eq!(content[0].get("type"), Some(&json!("text")));
    assert_eq!(
        content[0].get("text").and_then(Value::as_str),
        Some(r#"{"error":"Unknown tool: doesNotExist","success":false}"#)
    );
}

#[tokio::test]
async fn missing_arguments_yield_top_level_error() {
    let router = stub_router();
    let params = json!({"name": "whoAmI"});
    let response = handle_request(&router, rpc_request("tools/call", params)).await;
    let result = response.result.expect("tool result");
    assert_eq!(result.get("isError"), Some(&json!(true)));
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Arguments are required"), "unexpected text {text}");
}

#[tokio::test]
async fn successful_call_carries_serialized_envelope_without_is_error() {
    let router = stub_router();
    let params = json!({"name": "getHealthCheck", "arguments": {}});
    let response = handle_request(&router, rpc_request("tools/call", params)).await;
    let result = response.result.expect("tool result");
    assert_eq!(result.get("isError"), None);
    let text = result["content"][0]["text"].as_str().unwrap();
    let envelope: Value = serde_json::from_str(text).unwrap();
    assert_eq!(envelope.get("success"), Some(&json!(true)));
}
