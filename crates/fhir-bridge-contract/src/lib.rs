// crates/fhir-bridge-contract/src/lib.rs
// ============================================================================
// Module: FHIR Bridge Contract
// Description: Tool catalog and canonical tool contracts.
// Purpose: Provide the immutable, built-once tool surface for discovery and
// dispatch.
// Dependencies: fhir-bridge-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The contract crate owns the tool surface: descriptor types, the frozen
//! catalog with its builder and generic per-resource-kind expansion, and the
//! declarative contracts for the consolidated tools. The catalog is built
//! once at startup and never mutated afterwards.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod tooling;
pub mod types;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::CatalogBuilder;
pub use catalog::CatalogError;
pub use catalog::ToolCatalog;
pub use tooling::tool_entries;
pub use types::CrudOp;
pub use types::Discriminant;
pub use types::ToolBinding;
pub use types::ToolDefinition;
pub use types::ToolEntry;
