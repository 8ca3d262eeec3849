// crates/fhir-bridge-mcp/src/tools/records.rs
// ============================================================================
// Module: Record Retrieval Tools
// Description: Handlers for patientData, manageHistory, and
// manageClinicalReport.
// Purpose: Route aggregate record reads and clinical report CRUD.
// Dependencies: fhir-bridge-core, fhir-bridge-client
// ============================================================================

//! ## Overview
//! Aggregate patient reads (`$everything`, a summary aggregation, and
//! `$docref`), version history access (`_history`), and the clinical
//! report CRUD surface restricted to `DiagnosticReport` and `Procedure`.

use fhir_bridge_client::fhir_path;
use fhir_bridge_client::unwrap_bundle;
use fhir_bridge_core::HistoryAction;
use fhir_bridge_core::PatientDataAction;
use fhir_bridge_core::ReportAction;
use fhir_bridge_core::ResultEnvelope;
use fhir_bridge_core::StoreError;
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
// SECTION: Patient Data
// ============================================================================

/// Validated arguments for `patientData`, one variant per action.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub(crate) enum PatientDataRequest {
    /// Full compartment export.
    #[serde(rename_all = "camelCase")]
    Everything {
        /// Target patient.
        patient_id: String,
    },
    /// Key clinical resources summarized.
    #[serde(rename_all = "camelCase")]
    Summary {
        /// Target patient.
        patient_id: String,
    },
    /// Document-reference export.
    #[serde(rename_all = "camelCase")]
    Ccda {
        /// Target patient.
        patient_id: String,
    },
}

impl ToolRouter {
    /// Handles `patientData` invocations.
    pub(crate) async fn handle_patient_data(&self, payload: Value) -> Result<Value, ToolError> {
        let label = discriminant_value(&payload, "action");
        if PatientDataAction::parse(&label).is_none() {
            return to_value(unknown_discriminant_envelope(
                "action",
                &label,
                &PatientDataAction::valid_list(),
                &payload,
            ));
        }
        let request: PatientDataRequest = decode(payload)?;
        if let Err(envelope) = self.ensure_session_for(&label, None).await {
            return to_value(envelope);
        }
        let outcome = match request {
            PatientDataRequest::Everything {
                patient_id,
            } => self
                .store
                .get(&fhir_path(&["Patient", &patient_id, "$everything"]))
                .await
                .map(|bundle| ResultEnvelope::success("everything").with_data(bundle)),
            PatientDataRequest::Summary {
                patient_id,
            } => self
                .patient_summary(&patient_id)
                .await
                .map(|summary| ResultEnvelope::success("summary").with_data(summary)),
            PatientDataRequest::Ccda {
                patient_id,
            } => self
                .store
                .get(&fhir_path(&["Patient", &patient_id, "$docref"]))
                .await
                .map(|documents| ResultEnvelope::success("ccda").with_data(documents)),
        };
        to_value(normalize(&label, None, false, outcome))
    }

    /// Aggregates the key clinical resources for a patient.
    async fn patient_summary(&self, patient_id: &str) -> Result<Value, StoreError> {
        let patient = self.store.read_resource("Patient", patient_id).await?;
        let reference = format!("patient=Patient/{patient_id}");
        let conditions = self.store.search_resources("Condition", &reference).await?;
        let medications = self.store.search_resources("MedicationRequest", &reference).await?;
        let observations = self
            .store
            .search_resources("Observation", &format!("{reference}&_count=10&_sort=-date"))
            .await?;
        Ok(json!({
            "patient": patient,
            "conditions": unwrap_bundle(conditions).resources,
            "medications": unwrap_bundle(medications).resources,
            "recentObservations": unwrap_bundle(observations).resources,
        }))
    }
}

// ============================================================================
// SECTION: History
// ============================================================================

/// Validated arguments for `manageHistory`, one variant per action.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub(crate) enum HistoryRequest {
    /// List the version history of a resource.
    #[serde(rename_all = "camelCase")]
    List {
        /// Resource kind.
        resource_type: String,
        /// Resource identifier.
        id: String,
    },
    /// Read a specific resource version.
    #[serde(rename_all = "camelCase")]
    ReadVersion {
        /// Resource kind.
        resource_type: String,
        /// Resource identifier.
        id: String,
        /// Version identifier.
        version_id: Option<String>,
    },
}

impl ToolRouter {
    /// Handles `manageHistory` invocations.
    pub(crate) async fn handle_manage_history(
        &self,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let label = discriminant_value(&payload, "action");
        if HistoryAction::parse(&label).is_none() {
            return to_value(unknown_discriminant_envelope(
                "action",
                &label,
                &HistoryAction::valid_list(),
                &payload,
            ));
        }
        let request: HistoryRequest = decode(payload)?;
        if let Err(envelope) = self.ensure_session_for(&label, None).await {
            return to_value(envelope);
        }
        let outcome = match request {
            HistoryRequest::List {
                resource_type,
                id,
            } => self
                .store
                .get(&fhir_path(&[&resource_type, &id, "_history"]))
                .await
                .map(|history| {
                    ResultEnvelope::success("list")
                        .with_resource_type(&resource_type)
                        .with_data(history)
                }),
            HistoryRequest::ReadVersion {
                resource_type,
                id,
                version_id,
            } => {
                let Some(version_id) = version_id else {
                    return to_value(
                        ResultEnvelope::failure(
                            "read-version",
                            "versionId is required for read-version",
                        )
                        .with_resource_type(&resource_type),
                    );
                };
                self.store
                    .get(&fhir_path(&[&resource_type, &id, "_history", &version_id]))
                    .await
                    .map(|version| {
                        ResultEnvelope::success("read-version")
                            .with_resource_type(&resource_type)
                            .with_data(version)
                    })
            }
        };
        to_value(normalize(&label, None, false, outcome))
    }
}

// ============================================================================
// SECTION: Clinical Reports
// ============================================================================

/// Validated arguments for `manageClinicalReport`, one variant per action.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub(crate) enum ReportRequest {
    /// Create a report resource.
    #[serde(rename_all = "camelCase")]
    Create {
        /// Report resource kind.
        resource_type: String,
        /// Resource payload.
        data: Option<Value>,
    },
    /// Read a report by identifier.
    #[serde(rename_all = "camelCase")]
    Read {
        /// Report resource kind.
        resource_type: String,
        /// Resource identifier.
        id: Option<String>,
    },
    /// Merge-update a report.
    #[serde(rename_all = "camelCase")]
    Update {
        /// Report resource kind.
        resource_type: String,
        /// Resource identifier.
        id: Option<String>,
        /// Partial payload merged over the existing resource.
        data: Option<Value>,
    },
    /// Delete a report.
    #[serde(rename_all = "camelCase")]
    Delete {
        /// Report resource kind.
        resource_type: String,
        /// Resource identifier.
        id: Option<String>,
    },
    /// Search reports.
    #[serde(rename_all = "camelCase")]
    Search {
        /// Report resource kind.
        resource_type: String,
        /// Search parameters.
        #[serde(default)]
        search_params: Option<Map<String, Value>>,
    },
}

impl ToolRouter {
    /// Handles `manageClinicalReport` invocations.
    pub(crate) async fn handle_manage_clinical_report(
        &self,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let label = discriminant_value(&payload, "action");
        if ReportAction::parse(&label).is_none() {
            return to_value(unknown_discriminant_envelope(
                "action",
                &label,
                &ReportAction::valid_list(),
                &payload,
            ));
        }
        let request: ReportRequest = decode(payload)?;
        if let Err(envelope) = self.ensure_session_for(&label, None).await {
            return to_value(envelope);
        }
        match request {
            ReportRequest::Create {
                resource_type,
                data,
            } => {
                let Some(data) = data else {
                    return to_value(
                        ResultEnvelope::failure("create", "Data is required for create action")
                            .with_resource_type(&resource_type),
                    );
                };
                let outcome = self.adapter.create(&resource_type, data).await.map(|created| {
                    ResultEnvelope::success("create")
                        .with_resource_type(&resource_type)
                        .with_resource(created)
                });
                to_value(normalize("create", Some(&resource_type), false, outcome))
            }
            ReportRequest::Read {
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
            ReportRequest::Update {
                resource_type,
                id,
                data,
            } => {
                let Some(id) = id else {
                    return to_value(
                        ResultEnvelope::failure("update", "ID is required for update action")
                            .with_resource_type(&resource_type),
                    );
                };
                let Some(data) = data else {
                    return to_value(
                        ResultEnvelope::failure("update", "Data is required for update action")
                            .with_resource_type(&resource_type),
                    );
                };
                let outcome =
                    self.adapter.update(&resource_type, &id, data).await.map(|updated| {
                        ResultEnvelope::success("update")
                            .with_resource_type(&resource_type)
                            .with_resource(updated)
                    });
                to_value(normalize("update", Some(&resource_type), false, outcome))
            }
            ReportRequest::Delete {
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
            ReportRequest::Search {
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
        }
    }
}
