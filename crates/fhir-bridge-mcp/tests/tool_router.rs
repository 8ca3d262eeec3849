// crates/fhir-bridge-mcp/tests/tool_router.rs
// ============================================================================
// Module: Tool Router Integration Tests
// Description: End-to-end routing tests against a recording store spy.
// Purpose: Validate dispatch, action routing, and envelope normalization.
// Dependencies: fhir-bridge-mcp, fhir-bridge-client, fhir-bridge-core
// ============================================================================

//! ## Overview
//! Drives the router exactly as the transport does: a tool name and a raw
//! argument payload in, one envelope (or top-level rejection) out. The
//! recording store spy asserts which remote calls were (and were not)
//! made.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

mod common;

use common::RecordingStore;
use common::spy_router;
use fhir_bridge_core::StoreError;
use fhir_bridge_mcp::ToolError;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Resource Scenarios
// ============================================================================

#[tokio::test]
async fn create_wraps_created_resource() {
    let created = json!({
        "resourceType": "Patient",
        "id": "p1",
        "name": [{"given": ["Jo"], "family": "Lee"}]
    });
    let store = RecordingStore::with_responses(vec![Ok(created.clone())]);
    let router = spy_router(store.clone());

    let value = router
        .handle_tool_call(
            "manageResource",
            json!({
                "action": "create",
                "resourceType": "Patient",
                "resource": {"name": [{"given": ["Jo"], "family": "Lee"}]}
            }),
        )
        .await
        .unwrap();

    assert_eq!(value["success"], json!(true));
    assert_eq!(value["action"], json!("create"));
    assert_eq!(value["resourceType"], json!("Patient"));
    assert_eq!(value["resource"], created);
    assert_eq!(store.session_checks(), 1);
}

#[tokio::test]
async fn read_not_found_is_success_with_null_resource() {
    let store = RecordingStore::with_responses(vec![Err(StoreError::NotFound {
        outcome: Some(json!({"issue": [{"code": "not-found"}]})),
    })]);
    let router = spy_router(store.clone());

    let value = router
        .handle_tool_call(
            "manageResource",
            json!({"action": "read", "resourceType": "Patient", "id": "ghost"}),
        )
        .await
        .unwrap();

    assert_eq!(value["success"], json!(true));
    assert_eq!(value["action"], json!("read"));
    assert_eq!(value["resourceType"], json!("Patient"));
    assert!(value.get("resource").is_some(), "resource key must be present");
    assert_eq!(value["resource"], Value::Null);
    assert!(value.get("error").is_none());
}

#[tokio::test]
async fn read_other_faults_fail_with_diagnostic_message() {
    let store = RecordingStore::with_responses(vec![Err(StoreError::Operation {
        message: "Forbidden".to_string(),
        outcome: None,
    })]);
    let router = spy_router(store);

    let value = router
        .handle_tool_call(
            "manageResource",
            json!({"action": "read", "resourceType": "Patient", "id": "p1"}),
        )
        .await
        .unwrap();

    assert_eq!(value["success"], json!(false));
    assert_eq!(value["error"], json!("Forbidden"));
}

#[tokio::test]
async fn update_pins_identity_against_partial_payload() {
    let existing = json!({"resourceType": "Patient", "id": "p1", "gender": "female"});
    let store = RecordingStore::with_responses(vec![
        Ok(existing),
        Ok(json!({"resourceType": "Patient", "id": "p1", "gender": "male"})),
    ]);
    let router = spy_router(store.clone());

    let value = router
        .handle_tool_call(
            "manageResource",
            json!({
                "action": "update",
                "resourceType": "Patient",
                "id": "p1",
                "resource": {"resourceType": "Observation", "id": "evil", "gender": "male"}
            }),
        )
        .await
        .unwrap();

    assert_eq!(value["success"], json!(true));
    let calls = store.recorded();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1]["op"], json!("update"));
    assert_eq!(calls[1]["body"]["resourceType"], json!("Patient"));
    assert_eq!(calls[1]["body"]["id"], json!("p1"));
}

#[tokio::test]
async fn search_joins_array_values_and_reports_total() {
    let bundle = json!({
        "resourceType": "Bundle",
        "total": 2,
        "entry": [
            {"resource": {"resourceType": "Observation", "id": "o1"}},
            {"resource": {"resourceType": "Observation", "id": "o2"}}
        ]
    });
    let store = RecordingStore::with_responses(vec![Ok(bundle)]);
    let router = spy_router(store.clone());

    let value = router
        .handle_tool_call(
            "manageResource",
            json!({
                "action": "search",
                "resourceType": "Observation",
                "searchParams": {"status": ["final", "amended"]}
            }),
        )
        .await
        .unwrap();

    assert_eq!(value["success"], json!(true));
    assert_eq!(value["total"], json!(2));
    assert_eq!(value["resources"].as_array().map(Vec::len), Some(2));

    let calls = store.recorded();
    assert_eq!(calls[0]["op"], json!("search"));
    assert_eq!(calls[0]["query"], json!("status=final%2Camended"));
}

#[tokio::test]
async fn missing_conditional_field_short_circuits_without_remote_call() {
    let store = RecordingStore::with_responses(vec![]);
    let router = spy_router(store.clone());

    let value = router
        .handle_tool_call(
            "manageResource",
            json!({"action": "read", "resourceType": "Patient"}),
        )
        .await
        .unwrap();

    assert_eq!(value["success"], json!(false));
    assert_eq!(value["error"], json!("ID is required for read action"));
    assert_eq!(store.call_count(), 0);
}

// ============================================================================
// SECTION: Action Routing
// ============================================================================

#[tokio::test]
async fn unknown_action_lists_valid_actions_and_makes_no_remote_call() {
    let store = RecordingStore::with_responses(vec![]);
    let router = spy_router(store.clone());

    let value = router
        .handle_tool_call(
            "manageResource",
            json!({"action": "explode", "resourceType": "Patient"}),
        )
        .await
        .unwrap();

    assert_eq!(value["success"], json!(false));
    assert_eq!(
        value["error"],
        json!("Unknown action: explode. Valid: create, read, update, delete, search, patch, upsert")
    );
    assert_eq!(store.call_count(), 0);
    assert_eq!(store.session_checks(), 0);
}

#[tokio::test]
async fn deploy_bot_without_code_fails_before_any_remote_call() {
    let store = RecordingStore::with_responses(vec![]);
    let router = spy_router(store.clone());

    let value = router
        .handle_tool_call("manageAutomation", json!({"action": "deploy-bot"}))
        .await
        .unwrap();

    assert_eq!(value["success"], json!(false));
    assert_eq!(value["action"], json!("deploy-bot"));
    assert_eq!(value["error"], json!("botCode is required"));
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn deploy_bot_posts_code_to_deploy_operation() {
    let store = RecordingStore::with_responses(vec![Ok(json!({"ok": true}))]);
    let router = spy_router(store.clone());

    let value = router
        .handle_tool_call(
            "manageAutomation",
            json!({"action": "deploy-bot", "botId": "b1", "botCode": "export {}"}),
        )
        .await
        .unwrap();

    assert_eq!(value["success"], json!(true));
    let calls = store.recorded();
    assert_eq!(calls[0]["op"], json!("post"));
    assert_eq!(calls[0]["path"], json!("fhir/R4/Bot/b1/$deploy"));
    assert_eq!(calls[0]["body"]["filename"], json!("index.js"));
}

#[tokio::test]
async fn start_new_discriminates_on_type_field() {
    let store = RecordingStore::with_responses(vec![]);
    let router = spy_router(store.clone());

    let value = router
        .handle_tool_call("startNew", json!({"type": "galaxy"}))
        .await
        .unwrap();

    assert_eq!(value["success"], json!(false));
    assert_eq!(value["error"], json!("Unknown type: galaxy. Valid: project, user, patient"));
    assert_eq!(store.call_count(), 0);
}

// ============================================================================
// SECTION: Validation Boundary
// ============================================================================

#[tokio::test]
async fn missing_required_field_rejects_before_any_remote_call() {
    let store = RecordingStore::with_responses(vec![]);
    let router = spy_router(store.clone());

    let error = router
        .handle_tool_call("manageResource", json!({"action": "read"}))
        .await
        .unwrap_err();

    assert!(matches!(error, ToolError::InvalidParams(_)));
    assert_eq!(store.call_count(), 0);
    assert_eq!(store.session_checks(), 0);
}

#[tokio::test]
async fn unknown_tool_is_a_top_level_rejection() {
    let store = RecordingStore::with_responses(vec![]);
    let router = spy_router(store.clone());

    let error = router.handle_tool_call("doesNotExist", json!({})).await.unwrap_err();
    assert!(matches!(error, ToolError::UnknownTool(name) if name == "doesNotExist"));
    assert_eq!(store.call_count(), 0);
}

#[tokio::test]
async fn auth_gate_failure_folds_into_envelope_before_remote_calls() {
    let store = RecordingStore::without_session();
    let router = spy_router(store.clone());

    let value = router
        .handle_tool_call(
            "manageResource",
            json!({"action": "read", "resourceType": "Patient", "id": "p1"}),
        )
        .await
        .unwrap();

    assert_eq!(value["success"], json!(false));
    assert_eq!(value["error"], json!("store credentials not configured"));
    assert_eq!(store.call_count(), 0);
    assert_eq!(store.session_checks(), 1);
}

// ============================================================================
// SECTION: Passthrough and Probes
// ============================================================================

#[tokio::test]
async fn call_fhir_api_repeats_array_query_values() {
    let store = RecordingStore::with_responses(vec![Ok(json!({"ok": true}))]);
    let router = spy_router(store.clone());

    let value = router
        .handle_tool_call(
            "callFhirApi",
            json!({
                "method": "GET",
                "path": "/fhir/R4/Observation",
                "queryParams": {"status": ["final", "amended"]}
            }),
        )
        .await
        .unwrap();

    assert_eq!(value["success"], json!(true));
    let calls = store.recorded();
    assert_eq!(calls[0]["op"], json!("get"));
    assert_eq!(calls[0]["path"], json!("fhir/R4/Observation?status=final&status=amended"));
}

#[tokio::test]
async fn who_am_i_unwraps_profile() {
    let me = json!({"profile": {"resourceType": "Practitioner", "id": "pr1"}, "project": {}});
    let store = RecordingStore::with_responses(vec![Ok(me)]);
    let router = spy_router(store.clone());

    let value = router.handle_tool_call("whoAmI", json!({})).await.unwrap();
    assert_eq!(value["success"], json!(true));
    assert_eq!(value["data"]["resourceType"], json!("Practitioner"));
    let calls = store.recorded();
    assert_eq!(calls[0]["path"], json!("auth/me"));
}

#[tokio::test]
async fn terminology_lookup_builds_operation_query() {
    let store = RecordingStore::with_responses(vec![Ok(json!({"name": "LOINC"}))]);
    let router = spy_router(store.clone());

    let value = router
        .handle_tool_call(
            "terminology",
            json!({"action": "lookup", "system": "http://loinc.org", "code": "1234-5"}),
        )
        .await
        .unwrap();

    assert_eq!(value["success"], json!(true));
    let calls = store.recorded();
    let path = calls[0]["path"].as_str().unwrap();
    assert!(path.starts_with("fhir/R4/CodeSystem/$lookup?"), "unexpected path {path}");
    assert!(path.contains("code=1234-5"), "unexpected path {path}");
}

#[tokio::test]
async fn patient_summary_aggregates_key_resources() {
    let patient = json!({"resourceType": "Patient", "id": "p1"});
    let conditions = json!({"entry": [{"resource": {"resourceType": "Condition", "id": "c1"}}]});
    let store = RecordingStore::with_responses(vec![
        Ok(patient),
        Ok(conditions),
        Ok(json!({"entry": []})),
        Ok(json!({"entry": []})),
    ]);
    let router = spy_router(store.clone());

    let value = router
        .handle_tool_call("patientData", json!({"action": "summary", "patientId": "p1"}))
        .await
        .unwrap();

    assert_eq!(value["success"], json!(true));
    assert_eq!(value["data"]["patient"]["id"], json!("p1"));
    assert_eq!(value["data"]["conditions"][0]["id"], json!("c1"));
    assert_eq!(store.call_count(), 4);
}

#[tokio::test]
async fn get_subscription_not_found_is_success_with_null_data() {
    let store = RecordingStore::with_responses(vec![Err(StoreError::NotFound {
        outcome: None,
    })]);
    let router = spy_router(store);

    let value = router
        .handle_tool_call(
            "manageAutomation",
            json!({"action": "get-subscription", "subscriptionId": "s1"}),
        )
        .await
        .unwrap();

    assert_eq!(value["success"], json!(true));
    assert_eq!(value["data"], Value::Null);
}
