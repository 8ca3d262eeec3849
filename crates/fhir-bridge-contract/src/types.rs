// crates/fhir-bridge-contract/src/types.rs
// ============================================================================
// Module: Contract Types
// Description: Descriptor and routing-binding shapes for the tool catalog.
// Purpose: Provide canonical shapes for discovery listings and dispatch.
// Dependencies: fhir-bridge-core, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ToolDefinition`] is what discovery returns; a [`ToolEntry`] pairs it
//! with the routing binding the dispatcher needs and, for consolidated
//! tools, the discriminant declaration. Discriminants are declared here at
//! registration time; routing never infers the discriminant field from
//! argument names at call time.

use fhir_bridge_core::ToolName;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Descriptors
// ============================================================================

/// Tool definition used by discovery listings.
///
/// # Invariants
/// - `name` is unique within a catalog.
/// - `input_schema` is a JSON Schema payload for the tool input shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name matched verbatim by callers.
    pub name: String,
    /// Tool description for clients.
    pub description: String,
    /// JSON schema for tool input.
    pub input_schema: Value,
}

/// Declared discriminant for a consolidated tool.
///
/// # Invariants
/// - `allowed` matches the corresponding action enumeration's labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminant {
    /// Field name carrying the discriminant (`action`, `type`, ...).
    pub field: &'static str,
    /// Closed set of accepted values, in canonical order.
    pub allowed: Vec<String>,
}

impl Discriminant {
    /// Builds a discriminant declaration from labels.
    #[must_use]
    pub fn new(field: &'static str, allowed: &[&str]) -> Self {
        Self {
            field,
            allowed: allowed.iter().map(|label| (*label).to_string()).collect(),
        }
    }

    /// Returns the comma-joined list of accepted values.
    #[must_use]
    pub fn valid_list(&self) -> String {
        self.allowed.join(", ")
    }
}

// ============================================================================
// SECTION: Routing Bindings
// ============================================================================

/// Canonical CRUD operations synthesized per resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudOp {
    /// Create a resource of the bound kind.
    Create,
    /// Read a resource of the bound kind by identifier.
    Read,
    /// Merge-update a resource of the bound kind.
    Update,
    /// Delete a resource of the bound kind.
    Delete,
    /// Search resources of the bound kind.
    Search,
}

impl CrudOp {
    /// Returns the action label reported in envelopes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Search => "search",
        }
    }
}

/// Routing binding for a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolBinding {
    /// One of the fixed consolidated tools.
    Consolidated(ToolName),
    /// A synthesized per-resource-kind CRUD tool.
    Generic {
        /// Resource kind the tool is bound to.
        kind: String,
        /// CRUD operation the tool performs.
        op: CrudOp,
    },
}

/// Catalog entry: descriptor plus routing metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolEntry {
    /// Descriptor returned by discovery.
    pub definition: ToolDefinition,
    /// Routing binding used by the dispatcher.
    pub binding: ToolBinding,
    /// Discriminant declaration for consolidated tools.
    pub discriminant: Option<Discriminant>,
}
