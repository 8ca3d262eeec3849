// crates/fhir-bridge-contract/src/catalog.rs
// ============================================================================
// Module: Tool Catalog
// Description: Built-once catalog of invocable tools with generic expansion.
// Purpose: Provide total name lookup and discovery listings for dispatch.
// Dependencies: fhir-bridge-core, serde_json
// ============================================================================

//! ## Overview
//! The catalog is assembled by a pure builder at startup and frozen. Names
//! are unique; registering a duplicate fails, which is fatal during catalog
//! construction. Generic expansion synthesizes create/get/update/delete/
//! search tools for every resource kind in the store's type table, skipping
//! names a specific registration already claimed.

use std::collections::BTreeMap;

use serde_json::json;
use thiserror::Error;

use crate::types::CrudOp;
use crate::types::ToolBinding;
use crate::types::ToolDefinition;
use crate::types::ToolEntry;

/// Catalog construction errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A tool name was registered twice.
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Assembles a frozen tool catalog.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    /// Entries in registration order.
    entries: Vec<ToolEntry>,
    /// Name index into `entries`.
    index: BTreeMap<String, usize>,
}

impl CatalogBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a specific tool entry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateTool`] when the name is taken.
    pub fn register(&mut self, entry: ToolEntry) -> Result<(), CatalogError> {
        let name = entry.definition.name.clone();
        if self.index.contains_key(&name) {
            return Err(CatalogError::DuplicateTool(name));
        }
        self.index.insert(name, self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Synthesizes per-kind CRUD entries for every resource kind.
    ///
    /// Specific registrations take precedence: a synthesized entry whose
    /// name already exists is skipped, never overwritten.
    pub fn expand_generic(&mut self, kinds: &[&str]) {
        for kind in kinds {
            for entry in generic_entries(kind) {
                if self.index.contains_key(&entry.definition.name) {
                    continue;
                }
                self.index.insert(entry.definition.name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Freezes the builder into an immutable catalog.
    #[must_use]
    pub fn build(self) -> ToolCatalog {
        ToolCatalog {
            entries: self.entries,
            index: self.index,
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Immutable, built-once table of invocable tools.
///
/// # Invariants
/// - Names are unique; `lookup` returns at most one entry.
/// - Never mutated after [`CatalogBuilder::build`].
#[derive(Debug)]
pub struct ToolCatalog {
    /// Entries in registration order.
    entries: Vec<ToolEntry>,
    /// Name index into `entries`.
    index: BTreeMap<String, usize>,
}

impl ToolCatalog {
    /// Looks up a tool entry by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ToolEntry> {
        self.index.get(name).map(|position| &self.entries[*position])
    }

    /// Returns all descriptors for discovery, in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.entries.iter().map(|entry| entry.definition.clone()).collect()
    }

    /// Returns all entries, in registration order.
    #[must_use]
    pub fn entries(&self) -> &[ToolEntry] {
        &self.entries
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// SECTION: Generic Expansion
// ============================================================================

/// Builds the five synthesized CRUD entries for a resource kind.
fn generic_entries(kind: &str) -> Vec<ToolEntry> {
    vec![
        generic_entry(
            format!("create{kind}"),
            format!("Creates a new {kind} resource."),
            json!({
                "type": "object",
                "properties": {
                    "resource": {
                        "type": "object",
                        "description": "The resource data.",
                        "additionalProperties": true
                    }
                },
                "required": ["resource"]
            }),
            kind,
            CrudOp::Create,
        ),
        generic_entry(
            format!("get{kind}"),
            format!("Retrieves a {kind} resource by its ID."),
            json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "The unique ID of the resource."
                    }
                },
                "required": ["id"]
            }),
            kind,
            CrudOp::Read,
        ),
        generic_entry(
            format!("update{kind}"),
            format!("Updates an existing {kind} resource."),
            json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "The unique ID of the resource."
                    },
                    "updates": {
                        "type": "object",
                        "description": "The fields to update.",
                        "additionalProperties": true
                    }
                },
                "required": ["id", "updates"]
            }),
            kind,
            CrudOp::Update,
        ),
        generic_entry(
            format!("delete{kind}"),
            format!("Deletes a {kind} resource."),
            json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "string",
                        "description": "The unique ID of the resource."
                    }
                },
                "required": ["id"]
            }),
            kind,
            CrudOp::Delete,
        ),
        generic_entry(
            format!("search{kind}"),
            format!("Searches {kind} resources with query parameters."),
            json!({
                "type": "object",
                "properties": {
                    "searchParams": {
                        "type": "object",
                        "description": "Search parameters; array values are joined with commas.",
                        "additionalProperties": true
                    }
                }
            }),
            kind,
            CrudOp::Search,
        ),
    ]
}

/// Builds one synthesized entry.
fn generic_entry(
    name: String,
    description: String,
    input_schema: serde_json::Value,
    kind: &str,
    op: CrudOp,
) -> ToolEntry {
    ToolEntry {
        definition: ToolDefinition {
            name,
            description,
            input_schema,
        },
        binding: ToolBinding::Generic {
            kind: kind.to_string(),
            op,
        },
        discriminant: None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
