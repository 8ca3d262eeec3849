// crates/fhir-bridge-core/src/envelope.rs
// ============================================================================
// Module: Result Envelope
// Description: Uniform response envelope and fault normalizer.
// Purpose: Fold every handler outcome into one JSON-serializable shape.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every tool invocation produces exactly one [`ResultEnvelope`]. Handlers
//! build success envelopes directly; faults are folded in by [`normalize`],
//! which matches on the closed [`StoreError`] set. A remote not-found on a
//! read is a successful envelope with an explicit `resource: null`;
//! absence is a valid answer, not a failure.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;

/// Uniform result envelope returned for every tool invocation.
///
/// # Invariants
/// - Always JSON-serializable; never wraps a live fault.
/// - `resource` distinguishes present-and-null (`Some(Value::Null)`) from
///   absent (`None`); only the former serializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Action label for consolidated tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Resource kind the operation targeted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Single-resource payload; an explicit JSON null means "not found".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
    /// Multi-resource payload for search-style operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Value>>,
    /// Free-form payload for operations without a resource shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Total match count for search-style operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Human-readable failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultEnvelope {
    /// Builds a success envelope for an action.
    #[must_use]
    pub fn success(action: impl Into<String>) -> Self {
        Self {
            success: true,
            action: Some(action.into()),
            resource_type: None,
            resource: None,
            resources: None,
            data: None,
            total: None,
            error: None,
        }
    }

    /// Builds a failure envelope for an action.
    #[must_use]
    pub fn failure(action: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            action: Some(action.into()),
            resource_type: None,
            resource: None,
            resources: None,
            data: None,
            total: None,
            error: Some(error.into()),
        }
    }

    /// Builds the uniform rejection for a discriminant value outside its
    /// enumeration, listing the valid labels verbatim.
    #[must_use]
    pub fn unknown_discriminant(field: &str, value: &str, valid: &str) -> Self {
        Self::failure(value, format!("Unknown {field}: {value}. Valid: {valid}"))
    }

    /// Returns the envelope with the resource kind set.
    #[must_use]
    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    /// Returns the envelope with a single-resource payload.
    #[must_use]
    pub fn with_resource(mut self, resource: Value) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Returns the envelope with an explicit `resource: null` payload.
    #[must_use]
    pub fn with_null_resource(mut self) -> Self {
        self.resource = Some(Value::Null);
        self
    }

    /// Returns the envelope with a multi-resource payload and total count.
    #[must_use]
    pub fn with_resources(mut self, resources: Vec<Value>, total: u64) -> Self {
        self.resources = Some(resources);
        self.total = Some(total);
        self
    }

    /// Returns the envelope with a free-form data payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Folds a handler outcome into a result envelope.
///
/// Success passes through unchanged. Faults are classified on the closed
/// [`StoreError`] set: not-found on a read-like operation becomes a
/// successful null-resource envelope; every other fault becomes a failure
/// envelope carrying the fault's diagnostic message. Nothing is re-thrown
/// past this boundary.
#[must_use]
pub fn normalize(
    action: &str,
    resource_type: Option<&str>,
    read_like: bool,
    outcome: Result<ResultEnvelope, StoreError>,
) -> ResultEnvelope {
    match outcome {
        Ok(envelope) => envelope,
        Err(error) if read_like && error.is_not_found() => {
            let envelope = ResultEnvelope::success(action).with_null_resource();
            match resource_type {
                Some(kind) => envelope.with_resource_type(kind),
                None => envelope,
            }
        }
        Err(error) => {
            let envelope = ResultEnvelope::failure(action, error.to_string());
            match resource_type {
                Some(kind) => envelope.with_resource_type(kind),
                None => envelope,
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use serde_json::json;

    use super::ResultEnvelope;
    use super::normalize;
    use crate::error::StoreError;

    #[test]
    fn success_envelope_serializes_minimal_fields() {
        let envelope = ResultEnvelope::success("delete").with_resource_type("Patient");
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({"success": true, "action": "delete", "resourceType": "Patient"}));
    }

    #[test]
    fn null_resource_is_serialized_explicitly() {
        let envelope =
            ResultEnvelope::success("read").with_resource_type("Patient").with_null_resource();
        let text = serde_json::to_string(&envelope).unwrap();
        assert!(text.contains("\"resource\":null"), "missing explicit null in {text}");
    }

    #[test]
    fn normalize_maps_not_found_read_to_null_resource() {
        let outcome = Err(StoreError::NotFound {
            outcome: None,
        });
        let envelope = normalize("read", Some("Patient"), true, outcome);
        assert!(envelope.success);
        assert_eq!(envelope.resource, Some(serde_json::Value::Null));
        assert_eq!(envelope.error, None);
    }

    #[test]
    fn normalize_keeps_not_found_failure_on_writes() {
        let outcome = Err(StoreError::NotFound {
            outcome: None,
        });
        let envelope = normalize("update", Some("Patient"), false, outcome);
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("resource not found"));
    }

    #[test]
    fn normalize_carries_operation_diagnostics() {
        let outcome = Err(StoreError::Operation {
            message: "Invalid code system".to_string(),
            outcome: Some(json!({"issue": []})),
        });
        let envelope = normalize("lookup", None, false, outcome);
        assert_eq!(envelope.error.as_deref(), Some("Invalid code system"));
        assert_eq!(envelope.resource_type, None);
    }

    #[test]
    fn unknown_discriminant_lists_valid_labels() {
        let envelope = ResultEnvelope::unknown_discriminant("action", "fly", "export, import");
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("Unknown action: fly. Valid: export, import"));
    }
}
