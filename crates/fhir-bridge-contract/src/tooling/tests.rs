// crates/fhir-bridge-contract/src/tooling/tests.rs
// ============================================================================
// Module: Tool Contract Unit Tests
// Description: Unit tests for the consolidated tool contracts.
// Purpose: Validate naming, schema shape, and discriminant declarations.
// Dependencies: fhir-bridge-contract, fhir-bridge-core
// ============================================================================

//! ## Overview
//! Checks that every consolidated tool is declared once, that declared
//! discriminants agree with their schema enums, and that schemas are
//! well-formed objects.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::collections::BTreeSet;

use fhir_bridge_core::ToolName;
use serde_json::Value;

use super::tool_entries;
use crate::types::ToolBinding;

#[test]
fn every_consolidated_tool_is_declared_exactly_once() {
    let entries = tool_entries();
    assert_eq!(entries.len(), ToolName::all().len());

    let mut seen = BTreeSet::new();
    for entry in &entries {
        assert!(seen.insert(entry.definition.name.clone()), "duplicate {}", entry.definition.name);
        let ToolBinding::Consolidated(tool) = &entry.binding else {
            panic!("consolidated entry {} has generic binding", entry.definition.name);
        };
        assert_eq!(tool.as_str(), entry.definition.name);
    }
    for tool in ToolName::all() {
        assert!(seen.contains(tool.as_str()), "missing contract for {tool}");
    }
}

#[test]
fn schemas_are_objects_with_properties() {
    for entry in tool_entries() {
        let schema = &entry.definition.input_schema;
        assert_eq!(schema.get("type").and_then(Value::as_str), Some("object"));
        assert!(schema.get("properties").is_some(), "{} lacks properties", entry.definition.name);
    }
}

#[test]
fn discriminants_match_schema_enums() {
    for entry in tool_entries() {
        let Some(discriminant) = &entry.discriminant else {
            continue;
        };
        let schema_enum = entry
            .definition
            .input_schema
            .get("properties")
            .and_then(|properties| properties.get(discriminant.field))
            .and_then(|field| field.get("enum"))
            .and_then(Value::as_array)
            .unwrap_or_else(|| {
                panic!("{} discriminant lacks schema enum", entry.definition.name)
            });
        let schema_labels: Vec<String> =
            schema_enum.iter().filter_map(Value::as_str).map(str::to_string).collect();
        assert_eq!(
            schema_labels, discriminant.allowed,
            "{} discriminant mismatch",
            entry.definition.name
        );
    }
}

#[test]
fn discriminated_tools_require_their_discriminant_field() {
    for entry in tool_entries() {
        let Some(discriminant) = &entry.discriminant else {
            continue;
        };
        let required: Vec<&str> = entry
            .definition
            .input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        assert!(
            required.contains(&discriminant.field),
            "{} does not require {}",
            entry.definition.name,
            discriminant.field
        );
    }
}
