// crates/fhir-bridge-core/src/lib.rs
// ============================================================================
// Module: FHIR Bridge Core
// Description: Shared vocabulary for the FHIR Bridge MCP server.
// Purpose: Provide tool names, action enumerations, result envelopes, and
// the remote store fault taxonomy shared across crates.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Core types shared by the catalog, the store client, and the MCP server.
//! Tool and action names are part of the external contract surface; the
//! result envelope is the single response shape every invocation produces.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod action;
pub mod envelope;
pub mod error;
pub mod kinds;
pub mod tooling;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use action::AdminTask;
pub use action::ApiMethod;
pub use action::AutomationAction;
pub use action::BulkAction;
pub use action::CastAction;
pub use action::HistoryAction;
pub use action::MediaAction;
pub use action::PatientDataAction;
pub use action::ProjectAction;
pub use action::ProvisionKind;
pub use action::ReportAction;
pub use action::ResourceAction;
pub use action::TerminologyAction;
pub use envelope::ResultEnvelope;
pub use envelope::normalize;
pub use error::StoreError;
pub use error::outcome_issue_code;
pub use error::outcome_message;
pub use kinds::RESOURCE_KINDS;
pub use kinds::is_known_kind;
pub use tooling::ToolName;
