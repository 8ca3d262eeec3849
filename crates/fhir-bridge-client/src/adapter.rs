// crates/fhir-bridge-client/src/adapter.rs
// ============================================================================
// Module: Generic Resource Adapter
// Description: Canonical resource operations over the store collaborator.
// Purpose: Implement create/read/update/delete/search/patch/upsert with
// merge and not-found semantics.
// Dependencies: fhir-bridge-core, serde_json
// ============================================================================

//! ## Overview
//! The adapter turns the store's raw primitives into the canonical resource
//! operations the routing core dispatches to. Identity is pinned here:
//! `create` and `upsert` inject the resource kind into the payload, and
//! `update` re-submits the merged document with the original `resourceType`
//! and `id`, so callers can never rewrite identity through a partial
//! payload. `read` is the one operation that treats a remote not-found as
//! an answer rather than a fault.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use fhir_bridge_core::StoreError;
use serde_json::Map;
use serde_json::Value;

use crate::client::FhirStore;
use crate::client::fhir_path;
use crate::query::search_query;

// ============================================================================
// SECTION: Search Page
// ============================================================================

/// Flattened search result: matched resources plus total count.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Matched resources, in bundle order.
    pub resources: Vec<Value>,
    /// Total match count; falls back to the list length when the store
    /// omits it.
    pub total: u64,
}

/// Unwraps a search bundle into a flat page.
#[must_use]
pub fn unwrap_bundle(bundle: Value) -> SearchPage {
    let resources: Vec<Value> = bundle
        .get("entry")
        .and_then(Value::as_array)
        .map(|entries| {
            entries.iter().filter_map(|entry| entry.get("resource")).cloned().collect()
        })
        .unwrap_or_default();
    let total = bundle
        .get("total")
        .and_then(Value::as_u64)
        .unwrap_or_else(|| u64::try_from(resources.len()).unwrap_or(u64::MAX));
    SearchPage {
        resources,
        total,
    }
}

// ============================================================================
// SECTION: Adapter
// ============================================================================

/// Canonical resource operations over a shared store handle.
#[derive(Clone)]
pub struct ResourceAdapter {
    /// Shared store collaborator.
    store: Arc<dyn FhirStore>,
}

impl ResourceAdapter {
    /// Creates an adapter over a store handle.
    #[must_use]
    pub fn new(store: Arc<dyn FhirStore>) -> Self {
        Self {
            store,
        }
    }

    /// Creates a resource, injecting the kind into the payload.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the payload is not an object or the
    /// store rejects the operation.
    pub async fn create(&self, kind: &str, resource: Value) -> Result<Value, StoreError> {
        let body = with_identity(resource, kind, None)?;
        self.store.create_resource(kind, body).await
    }

    /// Reads a resource; a remote not-found becomes `None`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for every fault other than not-found.
    pub async fn read(&self, kind: &str, id: &str) -> Result<Option<Value>, StoreError> {
        match self.store.read_resource(kind, id).await {
            Ok(resource) => Ok(Some(resource)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Merge-updates a resource, pinning its identity.
    ///
    /// Reads the existing document, shallow-merges the partial payload over
    /// it, and re-submits with `resourceType` and `id` forced back to the
    /// originals.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the read or the write fails; a missing
    /// target propagates as [`StoreError::NotFound`].
    pub async fn update(
        &self,
        kind: &str,
        id: &str,
        partial: Value,
    ) -> Result<Value, StoreError> {
        let existing = self.store.read_resource(kind, id).await?;
        let merged = shallow_merge(existing, partial)?;
        let pinned = with_identity(merged, kind, Some(id))?;
        self.store.update_resource(kind, id, pinned).await
    }

    /// Deletes a resource.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects the operation.
    pub async fn delete(&self, kind: &str, id: &str) -> Result<(), StoreError> {
        self.store.delete_resource(kind, id).await.map(|_| ())
    }

    /// Searches resources and unwraps the result bundle.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects the operation.
    pub async fn search(
        &self,
        kind: &str,
        params: &Map<String, Value>,
    ) -> Result<SearchPage, StoreError> {
        let query = search_query(params);
        let bundle = self.store.search_resources(kind, &query).await?;
        Ok(unwrap_bundle(bundle))
    }

    /// Forwards JSON Patch operations verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects the operation.
    pub async fn patch(&self, kind: &str, id: &str, ops: Value) -> Result<Value, StoreError> {
        self.store.patch_resource(kind, id, ops).await
    }

    /// Conditionally updates a resource keyed by a search expression.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the payload is not an object or the
    /// store rejects the operation.
    pub async fn upsert(
        &self,
        kind: &str,
        resource: Value,
        search: &Map<String, Value>,
    ) -> Result<Value, StoreError> {
        let body = with_identity(resource, kind, None)?;
        let path = format!("{}?{}", fhir_path(&[kind]), search_query(search));
        self.store.put(&path, body).await
    }
}

// ============================================================================
// SECTION: Merge Helpers
// ============================================================================

/// Forces `resourceType` (and optionally `id`) onto an object payload.
fn with_identity(resource: Value, kind: &str, id: Option<&str>) -> Result<Value, StoreError> {
    let Value::Object(mut fields) = resource else {
        return Err(StoreError::Serialization("resource payload must be an object".to_string()));
    };
    fields.insert("resourceType".to_string(), Value::String(kind.to_string()));
    if let Some(id) = id {
        fields.insert("id".to_string(), Value::String(id.to_string()));
    }
    Ok(Value::Object(fields))
}

/// Shallow-merges a partial payload over an existing document.
fn shallow_merge(existing: Value, partial: Value) -> Result<Value, StoreError> {
    let Value::Object(mut base) = existing else {
        return Err(StoreError::Serialization("existing resource must be an object".to_string()));
    };
    let Value::Object(updates) = partial else {
        return Err(StoreError::Serialization("update payload must be an object".to_string()));
    };
    for (key, value) in updates {
        base.insert(key, value);
    }
    Ok(Value::Object(base))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
