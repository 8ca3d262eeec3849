// crates/fhir-bridge-mcp/src/audit.rs
// ============================================================================
// Module: Tool Audit
// Description: Audit events and sinks for tool invocations.
// Purpose: Record one event per invocation without touching stdout.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! One audit event per tool invocation, emitted as a JSON line on stderr.
//! Stdout is reserved for the protocol; diagnostics never go there.

use serde::Serialize;

/// Audit event payload for one tool invocation.
#[derive(Debug, Serialize)]
pub struct ToolAuditEvent {
    /// Event identifier.
    event: &'static str,
    /// Tool name as supplied by the caller.
    tool: String,
    /// Invocation outcome label.
    outcome: &'static str,
    /// Failure detail for rejected or faulted invocations.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ToolAuditEvent {
    /// Builds a completion event.
    #[must_use]
    pub fn completed(tool: &str) -> Self {
        Self {
            event: "tool_call",
            tool: tool.to_string(),
            outcome: "ok",
            error: None,
        }
    }

    /// Builds an event for an envelope-level failure.
    #[must_use]
    pub fn envelope_error(tool: &str) -> Self {
        Self {
            event: "tool_call",
            tool: tool.to_string(),
            outcome: "envelope_error",
            error: None,
        }
    }

    /// Builds an event for a pre-dispatch rejection.
    #[must_use]
    pub fn rejected(tool: &str, error: &str) -> Self {
        Self {
            event: "tool_call",
            tool: tool.to_string(),
            outcome: "rejected",
            error: Some(error.to_string()),
        }
    }

    /// Builds an event for an unknown tool name.
    #[must_use]
    pub fn unknown_tool(tool: &str) -> Self {
        Self {
            event: "tool_call",
            tool: tool.to_string(),
            outcome: "unknown_tool",
            error: None,
        }
    }
}

/// Audit sink for tool invocations.
pub trait ToolAuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &ToolAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl ToolAuditSink for StderrAuditSink {
    fn record(&self, event: &ToolAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            eprintln!("{payload}");
        }
    }
}

/// No-op audit sink for tests.
pub struct NoopAuditSink;

impl ToolAuditSink for NoopAuditSink {
    fn record(&self, _event: &ToolAuditEvent) {}
}
