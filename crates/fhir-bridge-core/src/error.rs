// crates/fhir-bridge-core/src/error.rs
// ============================================================================
// Module: Store Fault Taxonomy
// Description: Closed fault hierarchy for remote store operations.
// Purpose: Classify remote failures once, at the adapter boundary.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Every failure raised by the remote store adapter is one of the variants
//! below. The envelope normalizer matches on this closed set; nothing above
//! the adapter probes caught faults for ad hoc `message` or `outcome`
//! shapes. Not-found is a distinct variant because read operations translate
//! it into a successful null result.

use serde_json::Value;
use thiserror::Error;

/// Faults raised by remote store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Credentials are missing or the session exchange failed.
    #[error("{0}")]
    Auth(String),
    /// The store reported that the target resource does not exist.
    #[error("resource not found")]
    NotFound {
        /// Operation outcome payload returned by the store, when present.
        outcome: Option<Value>,
    },
    /// The store rejected the operation with a diagnostic payload.
    #[error("{message}")]
    Operation {
        /// Human-readable diagnostic extracted from the store response.
        message: String,
        /// Operation outcome payload returned by the store, when present.
        outcome: Option<Value>,
    },
    /// The request never completed (connect, timeout, protocol).
    #[error("transport error: {0}")]
    Transport(String),
    /// A payload could not be serialized or deserialized.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Returns true for the not-found variant.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Classifies an error-status response body into a fault.
    ///
    /// Issue code `not-found` (and the 404/410 status family) maps to
    /// [`StoreError::NotFound`]; everything else becomes
    /// [`StoreError::Operation`] carrying the outcome diagnostics.
    #[must_use]
    pub fn from_response(status: u16, body: Option<Value>) -> Self {
        let not_found_code = body.as_ref().and_then(outcome_issue_code).is_some_and(|code| {
            code == "not-found"
        });
        if not_found_code || status == 404 || status == 410 {
            return Self::NotFound {
                outcome: body,
            };
        }
        let message = body
            .as_ref()
            .and_then(outcome_message)
            .unwrap_or_else(|| format!("request failed with status {status}"));
        Self::Operation {
            message,
            outcome: body,
        }
    }
}

/// Extracts the first issue code from an operation outcome payload.
#[must_use]
pub fn outcome_issue_code(outcome: &Value) -> Option<&str> {
    outcome.get("issue")?.get(0)?.get("code")?.as_str()
}

/// Extracts a human-readable message from an operation outcome payload.
///
/// Prefers issue diagnostics, then the issue details text.
#[must_use]
pub fn outcome_message(outcome: &Value) -> Option<String> {
    let issue = outcome.get("issue")?.get(0)?;
    if let Some(diagnostics) = issue.get("diagnostics").and_then(Value::as_str) {
        return Some(diagnostics.to_string());
    }
    issue
        .get("details")
        .and_then(|details| details.get("text"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
