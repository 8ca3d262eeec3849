// crates/fhir-bridge-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: Framed stdio JSON-RPC transport for the tool router.
// Purpose: Carry one response per request; stdout is protocol-only.
// Dependencies: fhir-bridge-client, serde_json, tokio
// ============================================================================

//! ## Overview
//! The server speaks JSON-RPC 2.0 over stdin/stdout with `Content-Length`
//! framing. Tool-level failures ride inside result envelopes; the
//! `isError` content shape is reserved for faults that occur before the
//! envelope machinery engages: an unknown tool name, a schema-validation
//! rejection, or an internal serialization failure. All diagnostics go to
//! stderr.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use fhir_bridge_client::HttpFhirStore;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;

use crate::audit::StderrAuditSink;
use crate::config::BridgeConfig;
use crate::tools::ToolRouter;
use crate::tools::build_catalog;

// ============================================================================
// SECTION: MCP Server
// ============================================================================

/// MCP server instance.
pub struct McpServer {
    /// Server configuration.
    config: BridgeConfig,
    /// Tool router for request dispatch.
    router: ToolRouter,
}

impl McpServer {
    /// Builds a new MCP server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when initialization fails.
    pub fn from_config(config: BridgeConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let store = HttpFhirStore::new(config.store_config())
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        let catalog =
            build_catalog().map_err(|err| McpServerError::Init(err.to_string()))?;
        let router = ToolRouter::new(Arc::new(catalog), Arc::new(store), Arc::new(StderrAuditSink))
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        if !config.has_credentials() {
            eprintln!(
                "fhir-bridge-mcp: WARNING: store credentials not configured; tool calls will \
                 fail until FHIR_BRIDGE_CLIENT_ID and FHIR_BRIDGE_CLIENT_SECRET are set"
            );
        }
        Ok(Self {
            config,
            router,
        })
    }

    /// Serves requests over stdin/stdout until the stream closes.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the transport fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        let mut reader = BufReader::new(tokio::io::stdin());
        let mut writer = tokio::io::stdout();
        let max_body_bytes = self.config.server.max_body_bytes;
        loop {
            let Some(bytes) = read_framed(&mut reader, max_body_bytes).await? else {
                return Ok(());
            };
            let response = match serde_json::from_slice::<JsonRpcRequest>(&bytes) {
                Ok(request) => handle_request(&self.router, request).await,
                Err(_) => protocol_error(Value::Null, -32600, "invalid json-rpc request"),
            };
            let payload = serde_json::to_vec(&response)
                .map_err(|_| McpServerError::Transport("json-rpc serialization failed".to_string()))?;
            write_framed(&mut writer, &payload).await?;
        }
    }
}

// ============================================================================
// SECTION: JSON-RPC Handling
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    pub(crate) jsonrpc: String,
    /// Request identifier.
    pub(crate) id: Value,
    /// Method name.
    pub(crate) method: String,
    /// Optional parameters payload.
    pub(crate) params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcError {
    /// Error code.
    pub(crate) code: i64,
    /// Human-readable error message.
    pub(crate) message: String,
}

/// Tool call parameters for JSON-RPC requests.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments.
    arguments: Option<Value>,
}

/// Tool list response payload.
#[derive(Debug, Serialize)]
struct ToolListResult {
    /// Registered tool definitions.
    tools: Vec<fhir_bridge_contract::ToolDefinition>,
}

/// Tool call response payload.
#[derive(Debug, Serialize)]
struct ToolCallResult {
    /// Tool output content.
    content: Vec<ToolContent>,
    /// Set when the fault occurred before an envelope could be built.
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    is_error: Option<bool>,
}

/// Tool output payloads for JSON-RPC responses.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolContent {
    /// Serialized JSON text output.
    Text {
        /// Serialized envelope or top-level error.
        text: String,
    },
}

/// Top-level error payload carried inside `isError` content.
#[derive(Debug, Serialize)]
struct TopLevelError {
    /// Human-readable error message.
    error: String,
    /// Always false.
    success: bool,
}

/// Dispatches a JSON-RPC request to the tool router.
pub(crate) async fn handle_request(
    router: &ToolRouter,
    request: JsonRpcRequest,
) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return protocol_error(request.id, -32600, "invalid json-rpc version");
    }
    match request.method.as_str() {
        "tools/list" => {
            let tools = router.list_tools();
            match serde_json::to_value(ToolListResult {
                tools,
            }) {
                Ok(value) => success_response(request.id, value),
                Err(_) => protocol_error(request.id, -32060, "serialization failed"),
            }
        }
        "tools/call" => {
            let id = request.id;
            let params = request.params.unwrap_or(Value::Null);
            let Ok(call) = serde_json::from_value::<ToolCallParams>(params) else {
                return protocol_error(id, -32602, "invalid tool params");
            };
            let Some(arguments) = call.arguments else {
                return tool_response(id, top_level_error("Arguments are required"));
            };
            let result = router.handle_tool_call(&call.name, arguments).await;
            let call_result = match result {
                Ok(envelope) => match serde_json::to_string(&envelope) {
                    Ok(text) => ToolCallResult {
                        content: vec![ToolContent::Text {
                            text,
                        }],
                        is_error: None,
                    },
                    Err(_) => top_level_error("serialization failed"),
                },
                Err(error) => top_level_error(&error.to_string()),
            };
            tool_response(id, call_result)
        }
        _ => protocol_error(request.id, -32601, "method not found"),
    }
}

/// Builds a successful JSON-RPC response.
fn success_response(id: Value, result: Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: Some(result),
        error: None,
    }
}

/// Wraps a tool call result into a JSON-RPC response.
fn tool_response(id: Value, result: ToolCallResult) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => success_response(id, value),
        Err(_) => protocol_error(id, -32060, "serialization failed"),
    }
}

/// Builds the `isError` content shape for pre-envelope faults.
fn top_level_error(message: &str) -> ToolCallResult {
    let payload = TopLevelError {
        error: message.to_string(),
        success: false,
    };
    let text = serde_json::to_string(&payload).unwrap_or_else(|_| {
        "{\"error\":\"serialization failed\",\"success\":false}".to_string()
    });
    ToolCallResult {
        content: vec![ToolContent::Text {
            text,
        }],
        is_error: Some(true),
    }
}

/// Builds a JSON-RPC protocol error response.
fn protocol_error(id: Value, code: i64, message: &str) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.to_string(),
        }),
    }
}

// ============================================================================
// SECTION: Framing Helpers
// ============================================================================

/// Reads a framed payload using `Content-Length` headers.
///
/// Returns `Ok(None)` on a clean end of stream at a frame boundary.
pub(crate) async fn read_framed<R>(
    reader: &mut BufReader<R>,
    max_body_bytes: usize,
) -> Result<Option<Vec<u8>>, McpServerError>
where
    R: AsyncRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .await
            .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        if bytes == 0 {
            if content_length.is_some() {
                return Err(McpServerError::Transport("stdio closed mid-frame".to_string()));
            }
            return Ok(None);
        }
        if line.trim().is_empty() {
            break;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            let parsed = value
                .trim()
                .parse::<usize>()
                .map_err(|_| McpServerError::Transport("invalid content length".to_string()))?;
            content_length = Some(parsed);
        }
    }
    let len = content_length
        .ok_or_else(|| McpServerError::Transport("missing content length".to_string()))?;
    if len > max_body_bytes {
        return Err(McpServerError::Transport("payload too large".to_string()));
    }
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
    Ok(Some(buf))
}

/// Writes a framed payload using `Content-Length` headers.
pub(crate) async fn write_framed<W>(
    writer: &mut W,
    payload: &[u8],
) -> Result<(), McpServerError>
where
    W: AsyncWrite + Unpin,
{
    let header = format!("Content-Length: {}\r\n\r\n", payload.len());
    writer
        .write_all(header.as_bytes())
        .await
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer
        .write_all(payload)
        .await
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer.flush().await.map_err(|_| McpServerError::Transport("stdio write failed".to_string()))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
