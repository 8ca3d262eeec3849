// crates/fhir-bridge-mcp/src/tools/terminology.rs
// ============================================================================
// Module: Terminology Tools
// Description: Handlers for terminology and validateResource.
// Purpose: Route terminology operations and resource validation.
// Dependencies: fhir-bridge-core, fhir-bridge-client
// ============================================================================

//! ## Overview
//! Terminology operations are read-only GETs against the store's
//! `CodeSystem`, `ValueSet`, and `ConceptMap` operation endpoints;
//! `validateResource` posts the resource to `$validate` without storing it.

use fhir_bridge_client::api_query;
use fhir_bridge_client::fhir_path;
use fhir_bridge_core::ResultEnvelope;
use fhir_bridge_core::TerminologyAction;
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

/// Validated arguments for `terminology`, one variant per action.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub(crate) enum TerminologyRequest {
    /// Look up a code within a code system.
    Lookup {
        /// Code system URL.
        system: Option<String>,
        /// Code value.
        code: Option<String>,
    },
    /// Validate a code against a value set.
    ValidateCode {
        /// Value set URL.
        url: Option<String>,
        /// Code system URL.
        system: Option<String>,
        /// Code value.
        code: Option<String>,
    },
    /// Test subsumption between two codes.
    #[serde(rename_all = "camelCase")]
    Subsumes {
        /// Code system URL.
        system: Option<String>,
        /// First code.
        code_a: Option<String>,
        /// Second code.
        code_b: Option<String>,
    },
    /// Translate a code through a concept map.
    #[serde(rename_all = "camelCase")]
    Translate {
        /// Concept map URL.
        concept_map_url: Option<String>,
        /// Code system URL.
        system: Option<String>,
        /// Code value.
        code: Option<String>,
        /// Source value set.
        source: Option<String>,
        /// Target value set.
        target: Option<String>,
    },
    /// Expand a value set.
    Expand {
        /// Value set URL.
        url: Option<String>,
        /// Text filter.
        filter: Option<String>,
    },
}

impl ToolRouter {
    /// Handles `terminology` invocations.
    pub(crate) async fn handle_terminology(&self, payload: Value) -> Result<Value, ToolError> {
        let label = discriminant_value(&payload, "action");
        if TerminologyAction::parse(&label).is_none() {
            return to_value(unknown_discriminant_envelope(
                "action",
                &label,
                &TerminologyAction::valid_list(),
                &payload,
            ));
        }
        let request: TerminologyRequest = decode(payload)?;
        if let Err(envelope) = self.ensure_session_for(&label, None).await {
            return to_value(envelope);
        }
        let outcome = match request {
            TerminologyRequest::Lookup {
                system,
                code,
            } => {
                let (Some(system), Some(code)) = (system, code) else {
                    return to_value(ResultEnvelope::failure(
                        "lookup",
                        "system and code are required",
                    ));
                };
                let query = params(&[("system", &system), ("code", &code)]);
                self.store
                    .get(&operation_path("CodeSystem", "$lookup", &query))
                    .await
                    .map(|result| ResultEnvelope::success("lookup").with_data(result))
            }
            TerminologyRequest::ValidateCode {
                url,
                system,
                code,
            } => {
                let (Some(url), Some(system), Some(code)) = (url, system, code) else {
                    return to_value(ResultEnvelope::failure(
                        "validate-code",
                        "url, system, and code are required",
                    ));
                };
                let query = params(&[("url", &url), ("system", &system), ("code", &code)]);
                self.store
                    .get(&operation_path("ValueSet", "$validate-code", &query))
                    .await
                    .map(|result| ResultEnvelope::success("validate-code").with_data(result))
            }
            TerminologyRequest::Subsumes {
                system,
                code_a,
                code_b,
            } => {
                let (Some(system), Some(code_a), Some(code_b)) = (system, code_a, code_b) else {
                    return to_value(ResultEnvelope::failure(
                        "subsumes",
                        "system, codeA, and codeB are required",
                    ));
                };
                let query =
                    params(&[("system", &system), ("codeA", &code_a), ("codeB", &code_b)]);
                self.store
                    .get(&operation_path("CodeSystem", "$subsumes", &query))
                    .await
                    .map(|result| ResultEnvelope::success("subsumes").with_data(result))
            }
            TerminologyRequest::Translate {
                concept_map_url,
                system,
                code,
                source,
                target,
            } => {
                let (Some(map_url), Some(system), Some(code)) = (concept_map_url, system, code)
                else {
                    return to_value(ResultEnvelope::failure(
                        "translate",
                        "conceptMapUrl, system, and code are required",
                    ));
                };
                let mut pairs = vec![("url", map_url), ("system", system), ("code", code)];
                if let Some(source) = source {
                    pairs.push(("source", source));
                }
                if let Some(target) = target {
                    pairs.push(("target", target));
                }
                let owned: Vec<(&str, &str)> =
                    pairs.iter().map(|(key, value)| (*key, value.as_str())).collect();
                let query = params(&owned);
                self.store
                    .get(&operation_path("ConceptMap", "$translate", &query))
                    .await
                    .map(|result| ResultEnvelope::success("translate").with_data(result))
            }
            TerminologyRequest::Expand {
                url,
                filter,
            } => {
                let Some(url) = url else {
                    return to_value(ResultEnvelope::failure("expand", "url is required"));
                };
                let mut pairs = vec![("url", url)];
                if let Some(filter) = filter {
                    pairs.push(("filter", filter));
                }
                let owned: Vec<(&str, &str)> =
                    pairs.iter().map(|(key, value)| (*key, value.as_str())).collect();
                let query = params(&owned);
                self.store
                    .get(&operation_path("ValueSet", "$expand", &query))
                    .await
                    .map(|result| ResultEnvelope::success("expand").with_data(result))
            }
        };
        to_value(normalize(&label, None, false, outcome))
    }

    /// Handles `validateResource` invocations.
    pub(crate) async fn handle_validate_resource(
        &self,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let request: ValidateArgs = decode(payload)?;
        if let Err(envelope) =
            self.ensure_session_for("validate", Some(&request.resource_type)).await
        {
            return to_value(envelope);
        }
        let outcome = self
            .store
            .post(&fhir_path(&[&request.resource_type, "$validate"]), request.resource)
            .await
            .map(|result| {
                ResultEnvelope::success("validate")
                    .with_resource_type(&request.resource_type)
                    .with_data(result)
            });
        to_value(normalize("validate", Some(&request.resource_type), false, outcome))
    }
}

/// Validated arguments for `validateResource`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateArgs {
    /// Resource kind to validate against.
    resource_type: String,
    /// Resource payload.
    resource: Value,
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a query map from string pairs.
fn params(pairs: &[(&str, &str)]) -> String {
    let mut map = Map::new();
    for (key, value) in pairs {
        map.insert((*key).to_string(), Value::String((*value).to_string()));
    }
    api_query(&map)
}

/// Joins a terminology operation path with its query string.
fn operation_path(kind: &str, operation: &str, query: &str) -> String {
    format!("{}?{query}", fhir_path(&[kind, operation]))
}
