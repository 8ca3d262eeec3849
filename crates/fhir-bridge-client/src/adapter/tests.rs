// crates/fhir-bridge-client/src/adapter/tests.rs
// ============================================================================
// Module: Resource Adapter Unit Tests
// Description: Unit tests for adapter merge, not-found, and search behavior.
// Purpose: Validate identity pinning and bundle unwrapping with a store spy.
// Dependencies: fhir-bridge-client, fhir-bridge-core
// ============================================================================

//! ## Overview
//! Exercises the adapter against a recording store spy: identity pinning on
//! update, not-found translation on read, query serialization on search,
//! and bundle unwrapping with and without a total count.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use fhir_bridge_core::StoreError;
use serde_json::Value;
use serde_json::json;

use super::ResourceAdapter;
use super::unwrap_bundle;
use crate::client::FhirStore;

// ============================================================================
// SECTION: Store Spy
// ============================================================================

/// Recording store spy: logs calls and replays queued responses.
struct RecordingStore {
    /// Calls in invocation order, as JSON descriptors.
    calls: Mutex<Vec<Value>>,
    /// Queued responses consumed front-to-back; empty queue yields `{}`.
    responses: Mutex<Vec<Result<Value, StoreError>>>,
}

impl RecordingStore {
    /// Creates a spy with queued responses.
    fn with_responses(responses: Vec<Result<Value, StoreError>>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(responses),
        })
    }

    /// Records a call and pops the next queued response.
    fn next(&self, call: Value) -> Result<Value, StoreError> {
        self.calls.lock().unwrap().push(call);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(json!({}))
        } else {
            responses.remove(0)
        }
    }

    /// Returns the recorded calls.
    fn recorded(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FhirStore for RecordingStore {
    async fn ensure_session(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn switch_project(&self, _project_id: &str) -> Result<(), StoreError> {
        Ok(())
    }

    async fn project_context(&self) -> Option<String> {
        None
    }

    async fn create_resource(&self, kind: &str, body: Value) -> Result<Value, StoreError> {
        self.next(json!({"op": "create", "kind": kind, "body": body}))
    }

    async fn read_resource(&self, kind: &str, id: &str) -> Result<Value, StoreError> {
        self.next(json!({"op": "read", "kind": kind, "id": id}))
    }

    async fn update_resource(
        &self,
        kind: &str,
        id: &str,
        body: Value,
    ) -> Result<Value, StoreError> {
        self.next(json!({"op": "update", "kind": kind, "id": id, "body": body}))
    }

    async fn delete_resource(&self, kind: &str, id: &str) -> Result<Value, StoreError> {
        self.next(json!({"op": "delete", "kind": kind, "id": id}))
    }

    async fn search_resources(&self, kind: &str, query: &str) -> Result<Value, StoreError> {
        self.next(json!({"op": "search", "kind": kind, "query": query}))
    }

    async fn patch_resource(
        &self,
        kind: &str,
        id: &str,
        ops: Value,
    ) -> Result<Value, StoreError> {
        self.next(json!({"op": "patch", "kind": kind, "id": id, "ops": ops}))
    }

    async fn get(&self, path: &str) -> Result<Value, StoreError> {
        self.next(json!({"op": "get", "path": path}))
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, StoreError> {
        self.next(json!({"op": "post", "path": path, "body": body}))
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, StoreError> {
        self.next(json!({"op": "put", "path": path, "body": body}))
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Value, StoreError> {
        self.next(json!({"op": "raw-patch", "path": path, "body": body}))
    }

    async fn delete(&self, path: &str) -> Result<Value, StoreError> {
        self.next(json!({"op": "raw-delete", "path": path}))
    }
}

/// Builds an adapter over a spy with queued responses.
fn adapter_with(responses: Vec<Result<Value, StoreError>>) -> (ResourceAdapter, Arc<RecordingStore>) {
    let store = RecordingStore::with_responses(responses);
    (ResourceAdapter::new(Arc::clone(&store) as Arc<dyn FhirStore>), store)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn create_injects_resource_type() {
    let (adapter, store) = adapter_with(vec![Ok(json!({"resourceType": "Patient", "id": "p1"}))]);
    adapter.create("Patient", json!({"name": [{"family": "Lee"}]})).await.unwrap();

    let calls = store.recorded();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["body"]["resourceType"], "Patient");
    assert_eq!(calls[0]["body"]["name"][0]["family"], "Lee");
}

#[tokio::test]
async fn create_rejects_non_object_payload() {
    let (adapter, store) = adapter_with(vec![]);
    let error = adapter.create("Patient", json!("not an object")).await.unwrap_err();
    assert!(matches!(error, StoreError::Serialization(_)));
    assert!(store.recorded().is_empty(), "no store call for invalid payload");
}

#[tokio::test]
async fn read_translates_not_found_to_none() {
    let (adapter, _store) = adapter_with(vec![Err(StoreError::NotFound {
        outcome: None,
    })]);
    let result = adapter.read("Patient", "ghost").await.unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn read_propagates_other_faults() {
    let (adapter, _store) = adapter_with(vec![Err(StoreError::Operation {
        message: "server exploded".to_string(),
        outcome: None,
    })]);
    let error = adapter.read("Patient", "p1").await.unwrap_err();
    assert_eq!(error.to_string(), "server exploded");
}

#[tokio::test]
async fn update_merges_and_pins_identity() {
    let existing = json!({
        "resourceType": "Patient",
        "id": "p1",
        "name": [{"family": "Lee"}],
        "gender": "female"
    });
    let (adapter, store) = adapter_with(vec![
        Ok(existing),
        Ok(json!({"resourceType": "Patient", "id": "p1"})),
    ]);

    // The partial payload tries to rewrite identity; the merge must win.
    adapter
        .update("Patient", "p1", json!({"resourceType": "Observation", "id": "evil", "gender": "male"}))
        .await
        .unwrap();

    let calls = store.recorded();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0]["op"], "read");
    let submitted = &calls[1]["body"];
    assert_eq!(submitted["resourceType"], "Patient");
    assert_eq!(submitted["id"], "p1");
    assert_eq!(submitted["gender"], "male");
    assert_eq!(submitted["name"][0]["family"], "Lee");
}

#[tokio::test]
async fn search_serializes_params_and_unwraps_bundle() {
    let bundle = json!({
        "resourceType": "Bundle",
        "total": 7,
        "entry": [
            {"resource": {"resourceType": "Observation", "id": "o1"}},
            {"resource": {"resourceType": "Observation", "id": "o2"}}
        ]
    });
    let (adapter, store) = adapter_with(vec![Ok(bundle)]);

    let params = match json!({"status": ["final", "amended"]}) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };
    let page = adapter.search("Observation", &params).await.unwrap();

    assert_eq!(page.total, 7);
    assert_eq!(page.resources.len(), 2);
    let calls = store.recorded();
    assert_eq!(calls[0]["query"], "status=final%2Camended");
}

#[tokio::test]
async fn upsert_puts_against_conditional_path() {
    let (adapter, store) = adapter_with(vec![Ok(json!({"resourceType": "Patient"}))]);
    let search = match json!({"identifier": "mrn|123"}) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };
    adapter.upsert("Patient", json!({"active": true}), &search).await.unwrap();

    let calls = store.recorded();
    assert_eq!(calls[0]["op"], "put");
    assert_eq!(calls[0]["path"], "fhir/R4/Patient?identifier=mrn%7C123");
    assert_eq!(calls[0]["body"]["resourceType"], "Patient");
}

#[test]
fn unwrap_bundle_falls_back_to_entry_count() {
    let bundle = json!({
        "entry": [
            {"resource": {"id": "a"}},
            {"resource": {"id": "b"}},
            {"fullUrl": "urn:no-resource"}
        ]
    });
    let page = unwrap_bundle(bundle);
    assert_eq!(page.resources.len(), 2);
    assert_eq!(page.total, 2);
}
