// crates/fhir-bridge-mcp/tests/common/mod.rs
// ============================================================================
// Module: Integration Test Fixtures
// Description: Recording store spy and router construction helpers.
// Purpose: Drive the router end to end without a remote store.
// Dependencies: fhir-bridge-mcp, fhir-bridge-client
// ============================================================================

//! ## Overview
//! A recording [`FhirStore`] spy: every call is logged as a JSON
//! descriptor, and responses are replayed from a queue (defaulting to an
//! empty object). Session behavior is configurable so the authentication
//! gate can be exercised.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    dead_code,
    reason = "Shared test fixture; not every helper is used by every test binary."
)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use fhir_bridge_client::FhirStore;
use fhir_bridge_core::StoreError;
use fhir_bridge_mcp::NoopAuditSink;
use fhir_bridge_mcp::ToolRouter;
use fhir_bridge_mcp::build_catalog;
use serde_json::Value;
use serde_json::json;

/// Recording store spy with queued responses.
pub struct RecordingStore {
    /// Calls in invocation order, as JSON descriptors.
    calls: Mutex<Vec<Value>>,
    /// Queued responses consumed front-to-back; empty queue yields `{}`.
    responses: Mutex<Vec<Result<Value, StoreError>>>,
    /// Number of session-gate invocations.
    session_checks: AtomicUsize,
    /// Whether the session gate fails.
    deny_session: bool,
}

impl RecordingStore {
    /// Creates a spy with queued responses.
    pub fn with_responses(responses: Vec<Result<Value, StoreError>>) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(responses),
            session_checks: AtomicUsize::new(0),
            deny_session: false,
        })
    }

    /// Creates a spy whose session gate fails closed.
    pub fn without_session() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(Vec::new()),
            session_checks: AtomicUsize::new(0),
            deny_session: true,
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
    pub fn recorded(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the number of remote calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns the number of session-gate checks.
    pub fn session_checks(&self) -> usize {
        self.session_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FhirStore for RecordingStore {
    async fn ensure_session(&self) -> Result<(), StoreError> {
        self.session_checks.fetch_add(1, Ordering::SeqCst);
        if self.deny_session {
            Err(StoreError::Auth("store credentials not configured".to_string()))
        } else {
            Ok(())
        }
    }

    async fn switch_project(&self, project_id: &str) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(json!({"op": "switch", "projectId": project_id}));
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

/// Builds a router over a recording store.
pub fn spy_router(store: Arc<RecordingStore>) -> ToolRouter {
    let catalog = build_catalog().expect("catalog builds");
    ToolRouter::new(Arc::new(catalog), store as Arc<dyn FhirStore>, Arc::new(NoopAuditSink))
        .expect("schemas compile")
}
