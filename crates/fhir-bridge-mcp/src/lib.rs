// crates/fhir-bridge-mcp/src/lib.rs
// ============================================================================
// Module: FHIR Bridge MCP
// Description: MCP server exposing the remote clinical-data store as tools.
// Purpose: Provide the tool router, argument validation, configuration, and
// the stdio transport.
// Dependencies: fhir-bridge-core, fhir-bridge-contract, fhir-bridge-client,
// jsonschema, tokio
// ============================================================================

//! ## Overview
//! The MCP crate wires the pieces together: the catalog from the contract
//! crate, the store client from the client crate, JSON Schema argument
//! validation, consolidated-tool routing, and a framed stdio JSON-RPC
//! transport. Every invocation yields exactly one response; tool-level
//! failures are folded into result envelopes, and only faults that precede
//! the envelope machinery surface as top-level errors.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod config;
pub mod server;
pub mod tools;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::ToolAuditEvent;
pub use audit::ToolAuditSink;
pub use config::BridgeConfig;
pub use config::ConfigError;
pub use server::McpServer;
pub use server::McpServerError;
pub use tools::ToolError;
pub use tools::ToolRouter;
pub use tools::build_catalog;
pub use validation::SchemaValidator;
pub use validation::ValidationError;
