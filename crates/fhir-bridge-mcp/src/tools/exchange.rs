// crates/fhir-bridge-mcp/src/tools/exchange.rs
// ============================================================================
// Module: Data Exchange Tools
// Description: Handlers for bulkData, manageMedia, postBundle, callFhirApi,
// whoAmI, and getHealthCheck.
// Purpose: Route bulk jobs, media handling, bundles, and raw passthrough.
// Dependencies: fhir-bridge-core, fhir-bridge-client
// ============================================================================

//! ## Overview
//! The exchange surface: bulk export/import jobs, media and attachment
//! handling, batch bundle execution, the raw API passthrough, and the two
//! no-argument identity/health probes.

use fhir_bridge_client::api_query;
use fhir_bridge_client::fhir_path;
use fhir_bridge_core::ApiMethod;
use fhir_bridge_core::BulkAction;
use fhir_bridge_core::MediaAction;
use fhir_bridge_core::ResultEnvelope;
use fhir_bridge_core::normalize;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::tools::ToolError;
use crate::tools::ToolRouter;
use crate::tools::decode;
use crate::tools::discriminant_value;
use crate::tools::to_value;
use crate::tools::unknown_discriminant_envelope;

// ============================================================================
// SECTION: Bulk Data
// ============================================================================

/// Validated arguments for `bulkData`, one variant per action.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub(crate) enum BulkRequest {
    /// Start a bulk export job.
    #[serde(rename_all = "camelCase")]
    Export {
        /// Resource types to export.
        resource_types: Option<Vec<String>>,
        /// Only include resources modified after this instant.
        since: Option<String>,
        /// Requested output format.
        output_format: Option<String>,
    },
    /// Start a bulk import job.
    Import {
        /// Source URL for the import.
        url: Option<String>,
    },
}

impl ToolRouter {
    /// Handles `bulkData` invocations.
    pub(crate) async fn handle_bulk_data(&self, payload: Value) -> Result<Value, ToolError> {
        let label = discriminant_value(&payload, "action");
        if BulkAction::parse(&label).is_none() {
            return to_value(unknown_discriminant_envelope(
                "action",
                &label,
                &BulkAction::valid_list(),
                &payload,
            ));
        }
        let request: BulkRequest = decode(payload)?;
        if let Err(envelope) = self.ensure_session_for(&label, None).await {
            return to_value(envelope);
        }
        let outcome = match request {
            BulkRequest::Export {
                resource_types,
                since,
                output_format,
            } => {
                let mut params = Map::new();
                if let Some(types) = resource_types
                    && !types.is_empty()
                {
                    params.insert("_type".to_string(), Value::String(types.join(",")));
                }
                if let Some(since) = since {
                    params.insert("_since".to_string(), Value::String(since));
                }
                if let Some(format) = output_format {
                    params.insert("_outputFormat".to_string(), Value::String(format));
                }
                let query = api_query(&params);
                let path = if query.is_empty() {
                    fhir_path(&["$export"])
                } else {
                    format!("{}?{query}", fhir_path(&["$export"]))
                };
                self.store
                    .get(&path)
                    .await
                    .map(|result| ResultEnvelope::success("export").with_data(result))
            }
            BulkRequest::Import {
                url,
            } => {
                let Some(url) = url else {
                    return to_value(ResultEnvelope::failure(
                        "import",
                        "url is required for import",
                    ));
                };
                let body = json!({
                    "resourceType": "Parameters",
                    "parameter": [{"name": "input", "valueUrl": url}],
                });
                self.store
                    .post(&fhir_path(&["$import"]), body)
                    .await
                    .map(|result| ResultEnvelope::success("import").with_data(result))
            }
        };
        to_value(normalize(&label, None, false, outcome))
    }
}

// ============================================================================
// SECTION: Media
// ============================================================================

/// Validated arguments for `manageMedia`, one variant per action.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub(crate) enum MediaRequest {
    /// Create a media resource wrapping an attachment.
    #[serde(rename_all = "camelCase")]
    CreateMedia {
        /// Attachment content.
        content: Option<Value>,
        /// MIME content type.
        content_type: Option<String>,
    },
    /// Build an attachment value without storing it.
    #[serde(rename_all = "camelCase")]
    CreateAttachment {
        /// Raw data, a string or an object.
        data: Option<Value>,
        /// MIME content type.
        content_type: Option<String>,
        /// Optional filename used as the attachment title.
        filename: Option<String>,
    },
    /// Upload raw content as a binary resource.
    #[serde(rename_all = "camelCase")]
    Upload {
        /// Raw data, a string or an object.
        data: Option<Value>,
        /// MIME content type.
        content_type: Option<String>,
    },
}

impl ToolRouter {
    /// Handles `manageMedia` invocations.
    pub(crate) async fn handle_manage_media(&self, payload: Value) -> Result<Value, ToolError> {
        let label = discriminant_value(&payload, "action");
        if MediaAction::parse(&label).is_none() {
            return to_value(unknown_discriminant_envelope(
                "action",
                &label,
                &MediaAction::valid_list(),
                &payload,
            ));
        }
        let request: MediaRequest = decode(payload)?;
        if let Err(envelope) = self.ensure_session_for(&label, None).await {
            return to_value(envelope);
        }
        let outcome = match request {
            MediaRequest::CreateMedia {
                content,
                content_type,
            } => {
                let (Some(content), Some(_)) = (content, content_type) else {
                    return to_value(ResultEnvelope::failure(
                        "create-media",
                        "content and contentType are required",
                    ));
                };
                let media = json!({"status": "completed", "content": content});
                self.adapter
                    .create("Media", media)
                    .await
                    .map(|created| ResultEnvelope::success("create-media").with_data(created))
            }
            MediaRequest::CreateAttachment {
                data,
                content_type,
                filename,
            } => {
                let (Some(data), Some(content_type)) = (data, content_type) else {
                    return to_value(ResultEnvelope::failure(
                        "create-attachment",
                        "data and contentType are required",
                    ));
                };
                // Built locally; the attachment value is the result.
                let mut attachment = json!({
                    "contentType": content_type,
                    "data": attachment_text(&data),
                });
                if let Some(filename) = filename
                    && let Some(fields) = attachment.as_object_mut()
                {
                    fields.insert("title".to_string(), Value::String(filename));
                }
                Ok(ResultEnvelope::success("create-attachment").with_data(attachment))
            }
            MediaRequest::Upload {
                data,
                content_type,
            } => {
                let (Some(data), Some(content_type)) = (data, content_type) else {
                    return to_value(ResultEnvelope::failure(
                        "upload",
                        "data and contentType are required",
                    ));
                };
                let binary = json!({
                    "contentType": content_type,
                    "data": attachment_text(&data),
                });
                self.adapter
                    .create("Binary", binary)
                    .await
                    .map(|created| ResultEnvelope::success("upload").with_data(created))
            }
        };
        to_value(normalize(&label, None, false, outcome))
    }
}

/// Renders attachment data: strings pass through, objects serialize.
fn attachment_text(data: &Value) -> String {
    match data {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// SECTION: Bundles and Passthrough
// ============================================================================

/// Validated arguments for `postBundle`.
#[derive(Debug, Deserialize)]
pub(crate) struct BundleArgs {
    /// Bundle to execute.
    bundle: Value,
}

/// Validated arguments for `callFhirApi`, one variant per method.
#[derive(Debug, Deserialize)]
#[serde(tag = "method", rename_all = "UPPERCASE")]
pub(crate) enum ApiRequest {
    /// Raw GET.
    #[serde(rename_all = "camelCase")]
    Get {
        /// Relative request path.
        path: String,
        /// Query parameters; array values repeat the key.
        #[serde(default)]
        query_params: Option<Map<String, Value>>,
    },
    /// Raw POST.
    #[serde(rename_all = "camelCase")]
    Post {
        /// Relative request path.
        path: String,
        /// Query parameters; array values repeat the key.
        #[serde(default)]
        query_params: Option<Map<String, Value>>,
        /// Request body.
        body: Option<Value>,
    },
    /// Raw PUT.
    #[serde(rename_all = "camelCase")]
    Put {
        /// Relative request path.
        path: String,
        /// Query parameters; array values repeat the key.
        #[serde(default)]
        query_params: Option<Map<String, Value>>,
        /// Request body.
        body: Option<Value>,
    },
    /// Raw PATCH.
    #[serde(rename_all = "camelCase")]
    Patch {
        /// Relative request path.
        path: String,
        /// Query parameters; array values repeat the key.
        #[serde(default)]
        query_params: Option<Map<String, Value>>,
        /// Request body.
        body: Option<Value>,
    },
    /// Raw DELETE.
    #[serde(rename_all = "camelCase")]
    Delete {
        /// Relative request path.
        path: String,
        /// Query parameters; array values repeat the key.
        #[serde(default)]
        query_params: Option<Map<String, Value>>,
    },
}

impl ToolRouter {
    /// Handles `postBundle` invocations.
    pub(crate) async fn handle_post_bundle(&self, payload: Value) -> Result<Value, ToolError> {
        let request: BundleArgs = decode(payload)?;
        if let Err(envelope) = self.ensure_session_for("postBundle", None).await {
            return to_value(envelope);
        }
        let outcome = self
            .store
            .post("fhir/R4", request.bundle)
            .await
            .map(|result| ResultEnvelope::success("postBundle").with_data(result));
        to_value(normalize("postBundle", None, false, outcome))
    }

    /// Handles `callFhirApi` invocations.
    pub(crate) async fn handle_call_fhir_api(&self, payload: Value) -> Result<Value, ToolError> {
        let label = discriminant_value(&payload, "method");
        if ApiMethod::parse(&label).is_none() {
            return to_value(unknown_discriminant_envelope(
                "method",
                &label,
                &ApiMethod::valid_list(),
                &payload,
            ));
        }
        let request: ApiRequest = decode(payload)?;
        if let Err(envelope) = self.ensure_session_for(&label, None).await {
            return to_value(envelope);
        }
        let outcome = match request {
            ApiRequest::Get {
                path,
                query_params,
            } => {
                let target = request_path(&path, query_params.as_ref());
                self.store
                    .get(&target)
                    .await
                    .map(|result| ResultEnvelope::success("GET").with_data(result))
            }
            ApiRequest::Post {
                path,
                query_params,
                body,
            } => {
                let target = request_path(&path, query_params.as_ref());
                self.store
                    .post(&target, body.unwrap_or(Value::Null))
                    .await
                    .map(|result| ResultEnvelope::success("POST").with_data(result))
            }
            ApiRequest::Put {
                path,
                query_params,
                body,
            } => {
                let target = request_path(&path, query_params.as_ref());
                self.store
                    .put(&target, body.unwrap_or(Value::Null))
                    .await
                    .map(|result| ResultEnvelope::success("PUT").with_data(result))
            }
            ApiRequest::Patch {
                path,
                query_params,
                body,
            } => {
                let target = request_path(&path, query_params.as_ref());
                self.store
                    .patch(&target, body.unwrap_or(Value::Null))
                    .await
                    .map(|result| ResultEnvelope::success("PATCH").with_data(result))
            }
            ApiRequest::Delete {
                path,
                query_params,
            } => {
                let target = request_path(&path, query_params.as_ref());
                self.store
                    .delete(&target)
                    .await
                    .map(|result| ResultEnvelope::success("DELETE").with_data(result))
            }
        };
        to_value(normalize(&label, None, false, outcome))
    }

    /// Handles `whoAmI` invocations.
    pub(crate) async fn handle_who_am_i(&self, _payload: Value) -> Result<Value, ToolError> {
        if let Err(envelope) = self.ensure_session_for("whoAmI", None).await {
            return to_value(envelope);
        }
        let outcome = self.store.get("auth/me").await.map(|me| {
            let profile = me.get("profile").cloned().unwrap_or(me);
            ResultEnvelope::success("whoAmI").with_data(profile)
        });
        to_value(normalize("whoAmI", None, false, outcome))
    }

    /// Handles `getHealthCheck` invocations.
    pub(crate) async fn handle_get_health_check(
        &self,
        _payload: Value,
    ) -> Result<Value, ToolError> {
        if let Err(envelope) = self.ensure_session_for("getHealthCheck", None).await {
            return to_value(envelope);
        }
        let outcome = self
            .store
            .get("healthcheck")
            .await
            .map(|result| ResultEnvelope::success("getHealthCheck").with_data(result));
        to_value(normalize("getHealthCheck", None, false, outcome))
    }
}

/// Normalizes a raw request path and appends its query string.
fn request_path(path: &str, query_params: Option<&Map<String, Value>>) -> String {
    let normalized = path.trim_start_matches('/');
    match query_params {
        Some(params) if !params.is_empty() => {
            format!("{normalized}?{}", api_query(params))
        }
        _ => normalized.to_string(),
    }
}
