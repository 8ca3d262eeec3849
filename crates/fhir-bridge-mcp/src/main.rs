// crates/fhir-bridge-mcp/src/main.rs
// ============================================================================
// Module: Server Binary
// Description: Entry point for the FHIR Bridge MCP server.
// Purpose: Load configuration and serve tool calls over stdio.
// Dependencies: fhir-bridge-mcp, tokio
// ============================================================================

//! ## Overview
//! Loads configuration (TOML file plus environment overrides), builds the
//! server, and serves the stdio transport until the stream closes. All
//! logging goes to stderr; stdout carries only protocol frames.

use fhir_bridge_mcp::BridgeConfig;
use fhir_bridge_mcp::McpServer;
use fhir_bridge_mcp::McpServerError;

/// Loads configuration and runs the stdio server.
#[tokio::main]
async fn main() -> Result<(), McpServerError> {
    let config = BridgeConfig::load(None)
        .map_err(|err| McpServerError::Config(err.to_string()))?;
    let server = McpServer::from_config(config)?;
    eprintln!("fhir-bridge-mcp: serving on stdio");
    server.serve().await
}
