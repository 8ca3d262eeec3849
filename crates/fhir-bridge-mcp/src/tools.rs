// crates/fhir-bridge-mcp/src/tools.rs
// ============================================================================
// Module: Tool Router
// Description: Catalog lookup, validation, and dispatch for tool calls.
// Purpose: Route every invocation to its handler and guarantee an envelope
// comes back.
// Dependencies: fhir-bridge-core, fhir-bridge-contract, fhir-bridge-client
// ============================================================================

//! ## Overview
//! The router owns the invocation pipeline: catalog lookup, schema
//! validation, the session gate, consolidated action routing, and envelope
//! normalization. Handlers for the consolidated tools live in the
//! submodules; synthesized per-kind CRUD tools are handled here directly.
//! A handler either returns a [`ResultEnvelope`] value or a [`ToolError`]
//! that the transport folds into a top-level error; unnormalized faults
//! never cross this boundary.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub(crate) mod automation;
pub(crate) mod exchange;
pub(crate) mod project;
pub(crate) mod records;
pub(crate) mod resource;
pub(crate) mod terminology;


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use fhir_bridge_client::FhirStore;
use fhir_bridge_client::ResourceAdapter;
use fhir_bridge_contract::CatalogBuilder;
use fhir_bridge_contract::CatalogError;
use fhir_bridge_contract::CrudOp;
use fhir_bridge_contract::ToolBinding;
use fhir_bridge_contract::ToolCatalog;
use fhir_bridge_contract::ToolDefinition;
use fhir_bridge_contract::tool_entries;
use fhir_bridge_core::RESOURCE_KINDS;
use fhir_bridge_core::ResultEnvelope;
use fhir_bridge_core::ToolName;
use fhir_bridge_core::normalize;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::audit::ToolAuditEvent;
use crate::audit::ToolAuditSink;
use crate::validation::SchemaValidator;
use crate::validation::ValidationError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Faults surfaced to the transport instead of an envelope.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool name is not in the catalog.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    /// Arguments were rejected before dispatch.
    #[error("{0}")]
    InvalidParams(String),
    /// A payload could not be serialized.
    #[error("serialization failed")]
    Serialization,
    /// An internal invariant failed.
    #[error("internal error: {0}")]
    Internal(String),
}

// ============================================================================
// SECTION: Catalog Construction
// ============================================================================

/// Builds the full tool catalog: consolidated contracts plus generic
/// per-kind CRUD expansion.
///
/// # Errors
///
/// Returns [`CatalogError`] when a consolidated name is registered twice.
pub fn build_catalog() -> Result<ToolCatalog, CatalogError> {
    let mut builder = CatalogBuilder::new();
    for entry in tool_entries() {
        builder.register(entry)?;
    }
    builder.expand_generic(RESOURCE_KINDS);
    Ok(builder.build())
}

// ============================================================================
// SECTION: Tool Router
// ============================================================================

/// Routes tool calls through validation to their handlers.
pub struct ToolRouter {
    /// Frozen tool catalog.
    pub(crate) catalog: Arc<ToolCatalog>,
    /// Compiled argument validator.
    pub(crate) validator: SchemaValidator,
    /// Remote store collaborator.
    pub(crate) store: Arc<dyn FhirStore>,
    /// Generic resource adapter over the store.
    pub(crate) adapter: ResourceAdapter,
    /// Audit sink for invocation events.
    pub(crate) audit: Arc<dyn ToolAuditSink>,
}

impl ToolRouter {
    /// Creates a router over a catalog and store handle.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a catalog schema fails to compile.
    pub fn new(
        catalog: Arc<ToolCatalog>,
        store: Arc<dyn FhirStore>,
        audit: Arc<dyn ToolAuditSink>,
    ) -> Result<Self, ValidationError> {
        let validator = SchemaValidator::compile(&catalog)?;
        let adapter = ResourceAdapter::new(Arc::clone(&store));
        Ok(Self {
            catalog,
            validator,
            store,
            adapter,
            audit,
        })
    }

    /// Lists all tool descriptors for discovery.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.catalog.definitions()
    }

    /// Handles a tool call by name with a raw argument payload.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] for unknown tools and pre-dispatch rejections;
    /// every other failure comes back as a `success:false` envelope value.
    pub async fn handle_tool_call(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<Value, ToolError> {
        let Some(entry) = self.catalog.lookup(name) else {
            self.audit.record(&ToolAuditEvent::unknown_tool(name));
            return Err(ToolError::UnknownTool(name.to_string()));
        };
        match self.validator.validate(name, &arguments) {
            Ok(()) => {}
            Err(ValidationError::UnknownDiscriminant {
                field,
                value,
                valid,
            }) => {
                // Reported as an envelope: the action router owns unknown
                // discriminant values, not the transport.
                let envelope = unknown_discriminant_envelope(&field, &value, &valid, &arguments);
                self.audit.record(&ToolAuditEvent::envelope_error(name));
                return to_value(envelope);
            }
            Err(error) => {
                let message = error.to_string();
                self.audit.record(&ToolAuditEvent::rejected(name, &message));
                return Err(ToolError::InvalidParams(message));
            }
        }
        let result = match &entry.binding {
            ToolBinding::Generic {
                kind,
                op,
            } => {
                let kind = kind.clone();
                let op = *op;
                self.handle_generic(&kind, op, arguments).await
            }
            ToolBinding::Consolidated(tool) => match tool {
                ToolName::ManageResource => self.handle_manage_resource(arguments).await,
                ToolName::ManageAutomation => self.handle_manage_automation(arguments).await,
                ToolName::ManageProject => self.handle_manage_project(arguments).await,
                ToolName::Terminology => self.handle_terminology(arguments).await,
                ToolName::PatientData => self.handle_patient_data(arguments).await,
                ToolName::ManageClinicalReport => {
                    self.handle_manage_clinical_report(arguments).await
                }
                ToolName::ManageHistory => self.handle_manage_history(arguments).await,
                ToolName::ManageMedia => self.handle_manage_media(arguments).await,
                ToolName::BulkData => self.handle_bulk_data(arguments).await,
                ToolName::StartNew => self.handle_start_new(arguments).await,
                ToolName::ExecuteAdminTask => self.handle_execute_admin_task(arguments).await,
                ToolName::ManageFhirCast => self.handle_manage_fhir_cast(arguments).await,
                ToolName::CallFhirApi => self.handle_call_fhir_api(arguments).await,
                ToolName::PostBundle => self.handle_post_bundle(arguments).await,
                ToolName::ValidateResource => self.handle_validate_resource(arguments).await,
                ToolName::WhoAmI => self.handle_who_am_i(arguments).await,
                ToolName::GetHealthCheck => self.handle_get_health_check(arguments).await,
            },
        };
        match &result {
            Ok(value) => {
                let event = if value.get("success") == Some(&Value::Bool(false)) {
                    ToolAuditEvent::envelope_error(name)
                } else {
                    ToolAuditEvent::completed(name)
                };
                self.audit.record(&event);
            }
            Err(error) => {
                self.audit.record(&ToolAuditEvent::rejected(name, &error.to_string()));
            }
        }
        result
    }

    /// Ensures a live session, folding auth faults into an envelope.
    pub(crate) async fn ensure_session_for(
        &self,
        action: &str,
        resource_type: Option<&str>,
    ) -> Result<(), ResultEnvelope> {
        self.store
            .ensure_session()
            .await
            .map_err(|error| normalize(action, resource_type, false, Err(error)))
    }

    /// Handles a synthesized per-kind CRUD tool.
    async fn handle_generic(
        &self,
        kind: &str,
        op: CrudOp,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let action = op.as_str();
        if let Err(envelope) = self.ensure_session_for(action, Some(kind)).await {
            return to_value(envelope);
        }
        let read_like = matches!(op, CrudOp::Read);
        let outcome = match op {
            CrudOp::Create => {
                let args: GenericCreateArgs = decode(payload)?;
                self.adapter.create(kind, args.resource).await.map(|created| {
                    ResultEnvelope::success(action)
                        .with_resource_type(kind)
                        .with_resource(created)
                })
            }
            CrudOp::Read => {
                let args: GenericIdArgs = decode(payload)?;
                self.adapter.read(kind, &args.id).await.map(|found| match found {
                    Some(resource) => ResultEnvelope::success(action)
                        .with_resource_type(kind)
                        .with_resource(resource),
                    None => {
                        ResultEnvelope::success(action).with_resource_type(kind).with_null_resource()
                    }
                })
            }
            CrudOp::Update => {
                let args: GenericUpdateArgs = decode(payload)?;
                self.adapter.update(kind, &args.id, args.updates).await.map(|updated| {
                    ResultEnvelope::success(action)
                        .with_resource_type(kind)
                        .with_resource(updated)
                })
            }
            CrudOp::Delete => {
                let args: GenericIdArgs = decode(payload)?;
                self.adapter
                    .delete(kind, &args.id)
                    .await
                    .map(|()| ResultEnvelope::success(action).with_resource_type(kind))
            }
            CrudOp::Search => {
                let args: GenericSearchArgs = decode(payload)?;
                let params = args.search_params.unwrap_or_default();
                self.adapter.search(kind, &params).await.map(|page| {
                    ResultEnvelope::success(action)
                        .with_resource_type(kind)
                        .with_resources(page.resources, page.total)
                })
            }
        };
        to_value(normalize(action, Some(kind), read_like, outcome))
    }
}

// ============================================================================
// SECTION: Generic Tool Arguments
// ============================================================================

/// Arguments for synthesized create tools.
#[derive(Debug, Deserialize)]
struct GenericCreateArgs {
    /// Resource payload.
    resource: Value,
}

/// Arguments for synthesized read and delete tools.
#[derive(Debug, Deserialize)]
struct GenericIdArgs {
    /// Resource identifier.
    id: String,
}

/// Arguments for synthesized update tools.
#[derive(Debug, Deserialize)]
struct GenericUpdateArgs {
    /// Resource identifier.
    id: String,
    /// Partial payload merged over the existing resource.
    updates: Value,
}

/// Arguments for synthesized search tools.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenericSearchArgs {
    /// Search parameters.
    #[serde(default)]
    search_params: Option<Map<String, Value>>,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a payload into typed arguments.
pub(crate) fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, ToolError> {
    serde_json::from_value(payload).map_err(|err| ToolError::InvalidParams(err.to_string()))
}

/// Serializes an envelope into the response value.
pub(crate) fn to_value(envelope: ResultEnvelope) -> Result<Value, ToolError> {
    serde_json::to_value(envelope).map_err(|_| ToolError::Serialization)
}

/// Reads a discriminant field as a string, empty when absent.
pub(crate) fn discriminant_value(payload: &Value, field: &str) -> String {
    payload.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Builds the uniform unknown-discriminant envelope, carrying the target
/// resource type when the payload names one.
pub(crate) fn unknown_discriminant_envelope(
    field: &str,
    value: &str,
    valid: &str,
    payload: &Value,
) -> ResultEnvelope {
    let envelope = ResultEnvelope::unknown_discriminant(field, value, valid);
    match payload.get("resourceType").and_then(Value::as_str) {
        Some(kind) => envelope.with_resource_type(kind),
        None => envelope,
    }
}
