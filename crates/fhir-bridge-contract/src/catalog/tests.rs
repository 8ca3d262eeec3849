// crates/fhir-bridge-contract/src/catalog/tests.rs
// ============================================================================
// Module: Catalog Unit Tests
// Description: Unit tests for catalog construction and generic expansion.
// Purpose: Validate uniqueness, precedence, and lookup totality.
// Dependencies: fhir-bridge-contract
// ============================================================================

//! ## Overview
//! Exercises the builder's duplicate rejection, the precedence of specific
//! registrations over synthesized entries, and lookup behavior.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use serde_json::json;

use super::CatalogBuilder;
use super::CatalogError;
use crate::tooling::tool_entries;
use crate::types::CrudOp;
use crate::types::ToolBinding;
use crate::types::ToolDefinition;
use crate::types::ToolEntry;

/// Builds a minimal specific entry for tests.
fn specific_entry(name: &str) -> ToolEntry {
    ToolEntry {
        definition: ToolDefinition {
            name: name.to_string(),
            description: "test entry".to_string(),
            input_schema: json!({"type": "object", "properties": {}}),
        },
        binding: ToolBinding::Generic {
            kind: "Patient".to_string(),
            op: CrudOp::Read,
        },
        discriminant: None,
    }
}

#[test]
fn duplicate_registration_fails() {
    let mut builder = CatalogBuilder::new();
    builder.register(specific_entry("getPatient")).unwrap();
    let result = builder.register(specific_entry("getPatient"));
    assert!(matches!(result, Err(CatalogError::DuplicateTool(name)) if name == "getPatient"));
}

#[test]
fn lookup_returns_exactly_one_entry_per_name() {
    let mut builder = CatalogBuilder::new();
    for entry in tool_entries() {
        builder.register(entry).unwrap();
    }
    builder.expand_generic(&["Patient", "Observation"]);
    let catalog = builder.build();

    for definition in catalog.definitions() {
        let entry = catalog.lookup(&definition.name).expect("registered name resolves");
        assert_eq!(entry.definition.name, definition.name);
    }
    assert!(catalog.lookup("doesNotExist").is_none());
}

#[test]
fn expansion_synthesizes_five_tools_per_kind() {
    let mut builder = CatalogBuilder::new();
    builder.expand_generic(&["Patient"]);
    let catalog = builder.build();

    assert_eq!(catalog.len(), 5);
    for name in ["createPatient", "getPatient", "updatePatient", "deletePatient", "searchPatient"] {
        assert!(catalog.lookup(name).is_some(), "missing synthesized tool {name}");
    }
}

#[test]
fn specific_registration_takes_precedence_over_expansion() {
    let mut builder = CatalogBuilder::new();
    builder.register(specific_entry("createPatient")).unwrap();
    builder.expand_generic(&["Patient"]);
    let catalog = builder.build();

    let entry = catalog.lookup("createPatient").expect("entry exists");
    assert_eq!(entry.definition.description, "test entry");
    assert_eq!(catalog.len(), 5);
}

#[test]
fn expansion_skips_do_not_renumber_later_entries() {
    let mut builder = CatalogBuilder::new();
    builder.register(specific_entry("getPatient")).unwrap();
    builder.expand_generic(&["Patient"]);
    let catalog = builder.build();

    // Every synthesized name after the skipped one must still resolve to
    // the entry carrying that name.
    let search = catalog.lookup("searchPatient").expect("searchPatient resolves");
    assert_eq!(search.definition.name, "searchPatient");
    assert!(matches!(
        &search.binding,
        ToolBinding::Generic { kind, op: CrudOp::Search } if kind == "Patient"
    ));
}
