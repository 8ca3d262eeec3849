// crates/fhir-bridge-mcp/src/tools/resource.rs
// ============================================================================
// Module: Resource Tool
// Description: Handlers for the consolidated manageResource tool.
// Purpose: Route resource actions to the generic adapter with per-action
// required-field checks.
// Dependencies: fhir-bridge-core, fhir-bridge-client
// ============================================================================

//! ## Overview
//! `manageResource` multiplexes the seven canonical resource operations.
//! The validated payload decodes into one closed variant per action; each
//! per-action handler checks the fields that action needs and
//! short-circuits with a failure envelope, without any remote call, when
//! one is absent.

use fhir_bridge_core::ResourceAction;
use fhir_bridge_core::ResultEnvelope;
use fhir_bridge_core::normalize;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use crate::tools::ToolError;
use crate::tools::ToolRouter;
use crate::tools::decode;
use crate::tools::discriminant_value;
use crate::tools::to_value;
use crate::tools::unknown_discriminant_envelope;

/// Validated arguments for `manageResource`, one variant per action.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub(crate) enum ResourceRequest {
    /// Create a resource.
    #[serde(rename_all = "camelCase")]
    Create {
        /// Resource kind to create.
        resource_type: String,
        /// Resource payload.
        resource: Option<Value>,
    },
    /// Read a resource by identifier.
    #[serde(rename_all = "camelCase")]
    Read {
        /// Resource kind to read.
        resource_type: String,
        /// Resource identifier.
        id: Option<String>,
    },
    /// Merge-update a resource.
    #[serde(rename_all = "camelCase")]
    Update {
        /// Resource kind to update.
        resource_type: String,
        /// Resource identifier.
        id: Option<String>,
        /// Partial payload merged over the existing resource.
        resource: Option<Value>,
    },
    /// Delete a resource.
    #[serde(rename_all = "camelCase")]
    Delete {
        /// Resource kind to delete.
        resource_type: String,
        /// Resource identifier.
        id: Option<String>,
    },
    /// Search resources.
    #[serde(rename_all = "camelCase")]
    Search {
        /// Resource kind to search.
        resource_type: String,
        /// Search parameters.
        #[serde(default)]
        search_params: Option<Map<String, Value>>,
    },
    /// Apply JSON Patch operations.
    #[serde(rename_all = "camelCase")]
    Patch {
        /// Resource kind to patch.
        resource_type: String,
        /// Resource identifier.
        id: Option<String>,
        /// JSON Patch operations.
        patch: Option<Value>,
    },
    /// Conditionally update keyed by a search expression.
    #[serde(rename_all = "camelCase")]
    Upsert {
        /// Resource kind to upsert.
        resource_type: String,
        /// Resource payload.
        resource: Option<Value>,
        /// Search expression keying the upsert.
        #[serde(default)]
        upsert_search: Option<Map<String, Value>>,
    },
}

impl ResourceRequest {
    /// Returns the targeted resource kind.
    fn resource_type(&self) -> &str {
        match self {
            Self::Create {
                resource_type, ..
            }
            | Self::Read {
                resource_type, ..
            }
            | Self::Update {
                resource_type, ..
            }
            | Self::Delete {
                resource_type, ..
            }
            | Self::Search {
                resource_type, ..
            }
            | Self::Patch {
                resource_type, ..
            }
            | Self::Upsert {
                resource_type, ..
            } => resource_type,
        }
    }
}

impl ToolRouter {
    /// Handles `manageResource` invocations.
    pub(crate) async fn handle_manage_resource(
        &self,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let label = discriminant_value(&payload, "action");
        if ResourceAction::parse(&label).is_none() {
            return to_value(unknown_discriminant_envelope(
                "action",
                &label,
                &ResourceAction::valid_list(),
                &payload,
            ));
        }
        let request: ResourceRequest = decode(payload)?;
        let kind = request.resource_type().to_string();
        if let Err(envelope) = self.ensure_session_for(&label, Some(&kind)).await {
            return to_value(envelope);
        }
        match request {
            ResourceRequest::Create {
                resource_type,
                resource,
            } => {
                let Some(resource) = resource else {
                    return to_value(
                        ResultEnvelope::failure("create", "Resource data is required")
                            .with_resource_type(&resource_type),
                    );
                };
                let outcome = self.adapter.create(&resource_type, resource).await.map(|created| {
                    ResultEnvelope::success("create")
                        .with_resource_type(&resource_type)
                        .with_resource(created)
                });
                to_value(normalize("create", Some(&resource_type), false, outcome))
            }
            ResourceRequest::Read {
                resource_type,
                id,
            } => {
                let Some(id) = id else {
                    return to_value(
                        ResultEnvelope::failure("read", "ID is required for read action")
                            .with_resource_type(&resource_type),
                    );
                };
                let outcome = self.adapter.read(&resource_type, &id).await.map(|found| {
                    match found {
                        Some(resource) => ResultEnvelope::success("read")
                            .with_resource_type(&resource_type)
                            .with_resource(resource),
                        None => ResultEnvelope::success("read")
                            .with_resource_type(&resource_type)
                            .with_null_resource(),
                    }
                });
                to_value(normalize("read", Some(&resource_type), true, outcome))
            }
            ResourceRequest::Update {
                resource_type,
                id,
                resource,
            } => {
                let Some(id) = id else {
                    return to_value(
                        ResultEnvelope::failure("update", "ID is required for update action")
                            .with_resource_type(&resource_type),
                    );
                };
                let Some(resource) = resource else {
                    return to_value(
                        ResultEnvelope::failure("update", "Resource data is required")
                            .with_resource_type(&resource_type),
                    );
                };
                let outcome =
                    self.adapter.update(&resource_type, &id, resource).await.map(|updated| {
                        ResultEnvelope::success("update")
                            .with_resource_type(&resource_type)
                            .with_resource(updated)
                    });
                to_value(normalize("update", Some(&resource_type), false, outcome))
            }
            ResourceRequest::Delete {
                resource_type,
                id,
            } => {
                let Some(id) = id else {
                    return to_value(
                        ResultEnvelope::failure("delete", "ID is required for delete action")
                            .with_resource_type(&resource_type),
                    );
                };
                let outcome = self
                    .adapter
                    .delete(&resource_type, &id)
                    .await
                    .map(|()| ResultEnvelope::success("delete").with_resource_type(&resource_type));
                to_value(normalize("delete", Some(&resource_type), false, outcome))
            }
            ResourceRequest::Search {
                resource_type,
                search_params,
            } => {
                let params = search_params.unwrap_or_default();
                let outcome = self.adapter.search(&resource_type, &params).await.map(|page| {
                    ResultEnvelope::success("search")
                        .with_resource_type(&resource_type)
                        .with_resources(page.resources, page.total)
                });
                to_value(normalize("search", Some(&resource_type), false, outcome))
            }
            ResourceRequest::Patch {
                resource_type,
                id,
                patch,
            } => {
                let Some(id) = id else {
                    return to_value(
                        ResultEnvelope::failure("patch", "ID is required for patch action")
                            .with_resource_type(&resource_type),
                    );
                };
                let Some(patch) = patch else {
                    return to_value(
                        ResultEnvelope::failure(
                            "patch",
                            "Patch operations are required for patch action",
                        )
                        .with_resource_type(&resource_type),
                    );
                };
                let outcome =
                    self.adapter.patch(&resource_type, &id, patch).await.map(|patched| {
                        ResultEnvelope::success("patch")
                            .with_resource_type(&resource_type)
                            .with_resource(patched)
                    });
                to_value(normalize("patch", Some(&resource_type), false, outcome))
            }
            ResourceRequest::Upsert {
                resource_type,
                resource,
                upsert_search,
            } => {
                let Some(resource) = resource else {
                    return to_value(
                        ResultEnvelope::failure("upsert", "Resource data is required")
                            .with_resource_type(&resource_type),
                    );
                };
                let Some(search) = upsert_search else {
                    return to_value(
                        ResultEnvelope::failure(
                            "upsert",
                            "upsertSearch is required for upsert action",
                        )
                        .with_resource_type(&resource_type),
                    );
                };
                let outcome =
                    self.adapter.upsert(&resource_type, resource, &search).await.map(|upserted| {
                        ResultEnvelope::success("upsert")
                            .with_resource_type(&resource_type)
                            .with_resource(upserted)
                    });
                to_value(normalize("upsert", Some(&resource_type), false, outcome))
            }
        }
    }
}
