// crates/fhir-bridge-core/src/tooling.rs
// ============================================================================
// Module: Tooling Identifiers
// Description: Canonical MCP tool identifiers for FHIR Bridge.
// Purpose: Shared tool naming across contracts, routing, and config.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Canonical identifiers for the consolidated tool surface. These names are
//! part of the external contract and are matched verbatim by callers;
//! synthesized per-resource-kind CRUD tools are named dynamically by the
//! catalog and do not appear here.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Canonical names for the consolidated FHIR Bridge tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolName {
    /// Create, read, update, delete, search, patch, or upsert any resource.
    ManageResource,
    /// Manage bots, subscriptions, and agents.
    ManageAutomation,
    /// Manage project membership, secrets, and the active profile.
    ManageProject,
    /// Terminology operations (lookup, validation, subsumption, translation).
    Terminology,
    /// Aggregate patient record retrieval.
    PatientData,
    /// Manage diagnostic reports and procedures.
    ManageClinicalReport,
    /// Resource version history retrieval.
    ManageHistory,
    /// Media and attachment handling.
    ManageMedia,
    /// Bulk export and import jobs.
    BulkData,
    /// Provision a new project, user, or patient.
    StartNew,
    /// Server administration tasks.
    ExecuteAdminTask,
    /// FHIRcast context synchronization.
    ManageFhirCast,
    /// Raw API passthrough for endpoints without a resource-shaped body.
    CallFhirApi,
    /// Execute a transaction or batch bundle.
    PostBundle,
    /// Validate a resource against server profiles.
    ValidateResource,
    /// Return the authenticated identity.
    WhoAmI,
    /// Server health probe.
    GetHealthCheck,
}

impl ToolName {
    /// Returns the canonical string name for the tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManageResource => "manageResource",
            Self::ManageAutomation => "manageAutomation",
            Self::ManageProject => "manageProject",
            Self::Terminology => "terminology",
            Self::PatientData => "patientData",
            Self::ManageClinicalReport => "manageClinicalReport",
            Self::ManageHistory => "manageHistory",
            Self::ManageMedia => "manageMedia",
            Self::BulkData => "bulkData",
            Self::StartNew => "startNew",
            Self::ExecuteAdminTask => "executeAdminTask",
            Self::ManageFhirCast => "manageFhirCast",
            Self::CallFhirApi => "callFhirApi",
            Self::PostBundle => "postBundle",
            Self::ValidateResource => "validateResource",
            Self::WhoAmI => "whoAmI",
            Self::GetHealthCheck => "getHealthCheck",
        }
    }

    /// Returns all consolidated tool names in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::ManageResource,
            Self::ManageAutomation,
            Self::ManageProject,
            Self::Terminology,
            Self::PatientData,
            Self::ManageClinicalReport,
            Self::ManageHistory,
            Self::ManageMedia,
            Self::BulkData,
            Self::StartNew,
            Self::ExecuteAdminTask,
            Self::ManageFhirCast,
            Self::CallFhirApi,
            Self::PostBundle,
            Self::ValidateResource,
            Self::WhoAmI,
            Self::GetHealthCheck,
        ]
    }

    /// Parses a tool name from its string representation.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "manageResource" => Some(Self::ManageResource),
            "manageAutomation" => Some(Self::ManageAutomation),
            "manageProject" => Some(Self::ManageProject),
            "terminology" => Some(Self::Terminology),
            "patientData" => Some(Self::PatientData),
            "manageClinicalReport" => Some(Self::ManageClinicalReport),
            "manageHistory" => Some(Self::ManageHistory),
            "manageMedia" => Some(Self::ManageMedia),
            "bulkData" => Some(Self::BulkData),
            "startNew" => Some(Self::StartNew),
            "executeAdminTask" => Some(Self::ExecuteAdminTask),
            "manageFhirCast" => Some(Self::ManageFhirCast),
            "callFhirApi" => Some(Self::CallFhirApi),
            "postBundle" => Some(Self::PostBundle),
            "validateResource" => Some(Self::ValidateResource),
            "whoAmI" => Some(Self::WhoAmI),
            "getHealthCheck" => Some(Self::GetHealthCheck),
            _ => None,
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
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

    use super::ToolName;

    #[test]
    fn parse_round_trips_every_tool_name() {
        for tool in ToolName::all() {
            assert_eq!(ToolName::parse(tool.as_str()), Some(*tool));
        }
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!(ToolName::parse("doesNotExist"), None);
        assert_eq!(ToolName::parse("manageresource"), None);
    }

    #[test]
    fn names_are_unique() {
        let mut seen = std::collections::BTreeSet::new();
        for tool in ToolName::all() {
            assert!(seen.insert(tool.as_str()), "duplicate name {tool}");
        }
    }
}
