// crates/fhir-bridge-contract/src/tooling.rs
// ============================================================================
// Module: Consolidated Tool Contracts
// Description: Canonical definitions and schemas for the consolidated tools.
// Purpose: Drive discovery listings and argument validation.
// Dependencies: fhir-bridge-core, serde_json
// ============================================================================

//! ## Overview
//! The canonical consolidated tool surface. The order is intentional and
//! preserved in discovery listings; append new tools at the end. Each
//! contract declares its discriminant (when it has one) alongside the
//! descriptor, so routing resolves the discriminant at registration time.

use fhir_bridge_core::AdminTask;
use fhir_bridge_core::ApiMethod;
use fhir_bridge_core::AutomationAction;
use fhir_bridge_core::BulkAction;
use fhir_bridge_core::CastAction;
use fhir_bridge_core::HistoryAction;
use fhir_bridge_core::MediaAction;
use fhir_bridge_core::PatientDataAction;
use fhir_bridge_core::ProjectAction;
use fhir_bridge_core::ProvisionKind;
use fhir_bridge_core::ReportAction;
use fhir_bridge_core::ResourceAction;
use fhir_bridge_core::TerminologyAction;
use fhir_bridge_core::ToolName;
use serde_json::Value;
use serde_json::json;

use crate::types::Discriminant;
use crate::types::ToolBinding;
use crate::types::ToolDefinition;
use crate::types::ToolEntry;

/// Returns the canonical consolidated tool entries.
#[must_use]
pub fn tool_entries() -> Vec<ToolEntry> {
    vec![
        manage_resource_entry(),
        manage_automation_entry(),
        manage_project_entry(),
        terminology_entry(),
        patient_data_entry(),
        manage_clinical_report_entry(),
        manage_history_entry(),
        manage_media_entry(),
        bulk_data_entry(),
        start_new_entry(),
        execute_admin_task_entry(),
        manage_fhir_cast_entry(),
        call_fhir_api_entry(),
        post_bundle_entry(),
        validate_resource_entry(),
        who_am_i_entry(),
        get_health_check_entry(),
    ]
}

// ============================================================================
// SECTION: Entry Builders
// ============================================================================

/// Builds the contract for `manageResource`.
fn manage_resource_entry() -> ToolEntry {
    let actions = labels(&ResourceAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>());
    consolidated(
        ToolName::ManageResource,
        "Manages any FHIR resource: create, read, update, delete, search, patch, or upsert.",
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "The operation to perform.",
                    "enum": actions
                },
                "resourceType": {
                    "type": "string",
                    "description": "The FHIR resource type (e.g., Patient, Observation)."
                },
                "id": {
                    "type": "string",
                    "description": "Resource ID; required for read, update, delete, and patch."
                },
                "resource": {
                    "type": "object",
                    "description": "Resource data for create, update, and upsert.",
                    "additionalProperties": true
                },
                "searchParams": {
                    "type": "object",
                    "description": "Search parameters; array values are joined with commas.",
                    "additionalProperties": {
                        "oneOf": [
                            {"type": "string"},
                            {"type": "number"},
                            {"type": "boolean"},
                            {"type": "array", "items": {"type": "string"}}
                        ]
                    }
                },
                "patch": {
                    "type": "array",
                    "description": "JSON Patch operations for the patch action.",
                    "items": {"type": "object", "additionalProperties": true}
                },
                "upsertSearch": {
                    "type": "object",
                    "description": "Search expression keying the upsert action.",
                    "additionalProperties": true
                }
            },
            "required": ["action", "resourceType"]
        }),
        Some(resource_discriminant()),
    )
}

/// Builds the contract for `manageAutomation`.
fn manage_automation_entry() -> ToolEntry {
    let actions = labels(&AutomationAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>());
    consolidated(
        ToolName::ManageAutomation,
        "Manages automation resources: bots, subscriptions, and agents.",
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "The automation operation to perform.",
                    "enum": actions
                },
                "botId": {"type": "string", "description": "Bot ID for deploy and execute."},
                "botCode": {"type": "string", "description": "Executable code for deploy-bot."},
                "botFilename": {"type": "string", "description": "Deployed filename; defaults to index.js."},
                "botInput": {
                    "type": "object",
                    "description": "Input payload for execute-bot.",
                    "additionalProperties": true
                },
                "botName": {"type": "string", "description": "Bot name for create-bot."},
                "botDescription": {"type": "string", "description": "Bot description for create-bot."},
                "subscriptionId": {"type": "string", "description": "Subscription ID."},
                "subscriptionCriteria": {"type": "string", "description": "FHIR search criteria the subscription watches."},
                "subscriptionEndpoint": {"type": "string", "description": "Rest-hook endpoint URL."},
                "subscriptionReason": {"type": "string", "description": "Human-readable subscription reason."},
                "subscriptionStatus": {
                    "type": "string",
                    "description": "New subscription status.",
                    "enum": ["active", "off", "error"]
                },
                "agentId": {"type": "string", "description": "Agent ID for reload-agent."}
            },
            "required": ["action"]
        }),
        Some(automation_discriminant()),
    )
}

/// Builds the contract for `manageProject`.
fn manage_project_entry() -> ToolEntry {
    let actions = labels(&ProjectAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>());
    consolidated(
        ToolName::ManageProject,
        "Manages projects: listing, switching, membership invites, and secrets.",
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "The project operation to perform.",
                    "enum": actions
                },
                "projectId": {"type": "string", "description": "Project ID."},
                "email": {"type": "string", "description": "Invitee email address."},
                "resourceType": {
                    "type": "string",
                    "description": "Profile resource type for the invitee.",
                    "enum": ["Patient", "Practitioner", "RelatedPerson"]
                },
                "accessPolicy": {
                    "type": "object",
                    "description": "Access policy reference for the invitee.",
                    "additionalProperties": true
                },
                "firstName": {"type": "string", "description": "Invitee first name."},
                "lastName": {"type": "string", "description": "Invitee last name."},
                "sendEmail": {"type": "boolean", "description": "Whether to send an invite email."},
                "admin": {"type": "boolean", "description": "Whether the invitee is a project admin."},
                "secretName": {"type": "string", "description": "Secret name for add-secret."},
                "secretValue": {"type": "string", "description": "Secret value for add-secret."}
            },
            "required": ["action"]
        }),
        Some(project_discriminant()),
    )
}

/// Builds the contract for `terminology`.
fn terminology_entry() -> ToolEntry {
    let actions = labels(&TerminologyAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>());
    consolidated(
        ToolName::Terminology,
        "Terminology operations: code lookup, validation, subsumption, translation, and value set expansion.",
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "The terminology operation to perform.",
                    "enum": actions
                },
                "system": {"type": "string", "description": "Code system URL."},
                "code": {"type": "string", "description": "Code value."},
                "codeA": {"type": "string", "description": "First code for subsumes."},
                "codeB": {"type": "string", "description": "Second code for subsumes."},
                "conceptMapUrl": {"type": "string", "description": "Concept map URL for translate."},
                "source": {"type": "string", "description": "Source value set for translate."},
                "target": {"type": "string", "description": "Target value set for translate."},
                "display": {"type": "string", "description": "Display string for validate-code."},
                "url": {"type": "string", "description": "Value set URL for validate-code and expand."},
                "filter": {"type": "string", "description": "Text filter for expand."}
            },
            "required": ["action"]
        }),
        Some(terminology_discriminant()),
    )
}

/// Builds the contract for `patientData`.
fn patient_data_entry() -> ToolEntry {
    let actions = labels(&PatientDataAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>());
    consolidated(
        ToolName::PatientData,
        "Retrieves aggregate patient data: full compartment, summary, or document references.",
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "The retrieval to perform.",
                    "enum": actions
                },
                "patientId": {"type": "string", "description": "The patient's unique ID."}
            },
            "required": ["action", "patientId"]
        }),
        Some(patient_data_discriminant()),
    )
}

/// Builds the contract for `manageClinicalReport`.
fn manage_clinical_report_entry() -> ToolEntry {
    let actions = labels(&ReportAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>());
    consolidated(
        ToolName::ManageClinicalReport,
        "Manages diagnostic reports and procedures.",
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "The operation to perform.",
                    "enum": actions
                },
                "resourceType": {
                    "type": "string",
                    "description": "The clinical report resource type.",
                    "enum": ["DiagnosticReport", "Procedure"]
                },
                "id": {"type": "string", "description": "Resource ID; required for read, update, and delete."},
                "data": {
                    "type": "object",
                    "description": "Resource data for create and update.",
                    "additionalProperties": true
                },
                "searchParams": {
                    "type": "object",
                    "description": "Search parameters; array values are joined with commas.",
                    "additionalProperties": true
                }
            },
            "required": ["action", "resourceType"]
        }),
        Some(report_discriminant()),
    )
}

/// Builds the contract for `manageHistory`.
fn manage_history_entry() -> ToolEntry {
    let actions = labels(&HistoryAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>());
    consolidated(
        ToolName::ManageHistory,
        "Reads resource version history or a specific version.",
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "The history operation to perform.",
                    "enum": actions
                },
                "resourceType": {"type": "string", "description": "The resource type."},
                "id": {"type": "string", "description": "The resource ID."},
                "versionId": {"type": "string", "description": "Version ID for read-version."}
            },
            "required": ["action", "resourceType", "id"]
        }),
        Some(history_discriminant()),
    )
}

/// Builds the contract for `manageMedia`.
fn manage_media_entry() -> ToolEntry {
    let actions = labels(&MediaAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>());
    consolidated(
        ToolName::ManageMedia,
        "Handles media: media resources, attachment values, and binary uploads.",
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "The media operation to perform.",
                    "enum": actions
                },
                "content": {
                    "type": "object",
                    "description": "Attachment content for create-media.",
                    "additionalProperties": true
                },
                "data": {
                    "description": "Raw data for create-attachment and upload.",
                    "oneOf": [
                        {"type": "string"},
                        {"type": "object", "additionalProperties": true}
                    ]
                },
                "contentType": {"type": "string", "description": "MIME content type."},
                "filename": {"type": "string", "description": "Optional filename."}
            },
            "required": ["action", "contentType"]
        }),
        Some(media_discriminant()),
    )
}

/// Builds the contract for `bulkData`.
fn bulk_data_entry() -> ToolEntry {
    let actions = labels(&BulkAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>());
    consolidated(
        ToolName::BulkData,
        "Starts bulk export or import jobs.",
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "The bulk operation to perform.",
                    "enum": actions
                },
                "resourceTypes": {
                    "type": "array",
                    "description": "Resource types to export.",
                    "items": {"type": "string"}
                },
                "since": {"type": "string", "description": "Only include resources modified after this instant."},
                "outputFormat": {"type": "string", "description": "Requested export output format."},
                "url": {"type": "string", "description": "Source URL for import."}
            },
            "required": ["action"]
        }),
        Some(bulk_discriminant()),
    )
}

/// Builds the contract for `startNew`.
fn start_new_entry() -> ToolEntry {
    let kinds = labels(&ProvisionKind::all().iter().map(|k| k.as_str()).collect::<Vec<_>>());
    consolidated(
        ToolName::StartNew,
        "Provisions a new project, user, or patient.",
        json!({
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "description": "What to provision.",
                    "enum": kinds
                },
                "login": {"type": "string", "description": "Login ID for project provisioning."},
                "projectName": {"type": "string", "description": "Name for the new project."},
                "user": {
                    "type": "object",
                    "description": "New user details.",
                    "additionalProperties": true
                },
                "patient": {
                    "type": "object",
                    "description": "New patient details.",
                    "additionalProperties": true
                }
            },
            "required": ["type"]
        }),
        Some(provision_discriminant()),
    )
}

/// Builds the contract for `executeAdminTask`.
fn execute_admin_task_entry() -> ToolEntry {
    let tasks = labels(&AdminTask::all().iter().map(|t| t.as_str()).collect::<Vec<_>>());
    consolidated(
        ToolName::ExecuteAdminTask,
        "Executes a server administration task (super admin only).",
        json!({
            "type": "object",
            "properties": {
                "task": {
                    "type": "string",
                    "description": "The task to perform.",
                    "enum": tasks
                },
                "parameters": {
                    "type": "object",
                    "description": "Parameters for the task.",
                    "additionalProperties": true
                }
            },
            "required": ["task", "parameters"]
        }),
        Some(admin_discriminant()),
    )
}

/// Builds the contract for `manageFhirCast`.
fn manage_fhir_cast_entry() -> ToolEntry {
    let actions = labels(&CastAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>());
    consolidated(
        ToolName::ManageFhirCast,
        "Manages FHIRcast subscriptions and events.",
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "description": "The FHIRcast operation to perform.",
                    "enum": actions
                },
                "topic": {"type": "string", "description": "FHIRcast topic."},
                "event": {
                    "type": "object",
                    "description": "Event payload for publish.",
                    "additionalProperties": true
                },
                "events": {
                    "type": "array",
                    "description": "Event names for subscribe.",
                    "items": {"type": "string"}
                },
                "subscriptionRequest": {
                    "type": "object",
                    "description": "Subscription request to cancel.",
                    "additionalProperties": true
                }
            },
            "required": ["action"]
        }),
        Some(cast_discriminant()),
    )
}

/// Builds the contract for `callFhirApi`.
fn call_fhir_api_entry() -> ToolEntry {
    let methods = labels(&ApiMethod::all().iter().map(|m| m.as_str()).collect::<Vec<_>>());
    consolidated(
        ToolName::CallFhirApi,
        "Executes a raw API request against any server endpoint (FHIR, admin, auth).",
        json!({
            "type": "object",
            "properties": {
                "method": {
                    "type": "string",
                    "description": "HTTP method to use.",
                    "enum": methods
                },
                "path": {
                    "type": "string",
                    "description": "Relative path (e.g., fhir/R4/Patient or admin/projects). Leading slashes are optional."
                },
                "queryParams": {
                    "type": "object",
                    "description": "Query parameters; array values are repeated.",
                    "additionalProperties": true
                },
                "body": {
                    "description": "Request body for write methods."
                }
            },
            "required": ["method", "path"]
        }),
        Some(api_discriminant()),
    )
}

/// Builds the contract for `postBundle`.
fn post_bundle_entry() -> ToolEntry {
    consolidated(
        ToolName::PostBundle,
        "Executes a FHIR bundle (transaction or batch).",
        json!({
            "type": "object",
            "properties": {
                "bundle": {
                    "type": "object",
                    "description": "The bundle to execute.",
                    "additionalProperties": true
                }
            },
            "required": ["bundle"]
        }),
        None,
    )
}

/// Builds the contract for `validateResource`.
fn validate_resource_entry() -> ToolEntry {
    consolidated(
        ToolName::ValidateResource,
        "Validates a resource against server profiles without storing it.",
        json!({
            "type": "object",
            "properties": {
                "resourceType": {"type": "string", "description": "The resource type to validate."},
                "resource": {
                    "type": "object",
                    "description": "The resource data to validate.",
                    "additionalProperties": true
                }
            },
            "required": ["resourceType", "resource"]
        }),
        None,
    )
}

/// Builds the contract for `whoAmI`.
fn who_am_i_entry() -> ToolEntry {
    consolidated(
        ToolName::WhoAmI,
        "Returns the current authenticated identity and project membership.",
        json!({"type": "object", "properties": {}}),
        None,
    )
}

/// Builds the contract for `getHealthCheck`.
fn get_health_check_entry() -> ToolEntry {
    consolidated(
        ToolName::GetHealthCheck,
        "Performs a health check against the server.",
        json!({"type": "object", "properties": {}}),
        None,
    )
}

// ============================================================================
// SECTION: Discriminant Declarations
// ============================================================================

/// Discriminant declaration for `manageResource`.
#[must_use]
pub fn resource_discriminant() -> Discriminant {
    Discriminant::new(
        "action",
        &ResourceAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>(),
    )
}

/// Discriminant declaration for `manageAutomation`.
#[must_use]
pub fn automation_discriminant() -> Discriminant {
    Discriminant::new(
        "action",
        &AutomationAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>(),
    )
}

/// Discriminant declaration for `manageProject`.
#[must_use]
pub fn project_discriminant() -> Discriminant {
    Discriminant::new(
        "action",
        &ProjectAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>(),
    )
}

/// Discriminant declaration for `terminology`.
#[must_use]
pub fn terminology_discriminant() -> Discriminant {
    Discriminant::new(
        "action",
        &TerminologyAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>(),
    )
}

/// Discriminant declaration for `patientData`.
#[must_use]
pub fn patient_data_discriminant() -> Discriminant {
    Discriminant::new(
        "action",
        &PatientDataAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>(),
    )
}

/// Discriminant declaration for `manageClinicalReport`.
#[must_use]
pub fn report_discriminant() -> Discriminant {
    Discriminant::new(
        "action",
        &ReportAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>(),
    )
}

/// Discriminant declaration for `manageHistory`.
#[must_use]
pub fn history_discriminant() -> Discriminant {
    Discriminant::new(
        "action",
        &HistoryAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>(),
    )
}

/// Discriminant declaration for `manageMedia`.
#[must_use]
pub fn media_discriminant() -> Discriminant {
    Discriminant::new(
        "action",
        &MediaAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>(),
    )
}

/// Discriminant declaration for `bulkData`.
#[must_use]
pub fn bulk_discriminant() -> Discriminant {
    Discriminant::new("action", &BulkAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>())
}

/// Discriminant declaration for `startNew`.
#[must_use]
pub fn provision_discriminant() -> Discriminant {
    Discriminant::new("type", &ProvisionKind::all().iter().map(|k| k.as_str()).collect::<Vec<_>>())
}

/// Discriminant declaration for `executeAdminTask`.
#[must_use]
pub fn admin_discriminant() -> Discriminant {
    Discriminant::new("task", &AdminTask::all().iter().map(|t| t.as_str()).collect::<Vec<_>>())
}

/// Discriminant declaration for `manageFhirCast`.
#[must_use]
pub fn cast_discriminant() -> Discriminant {
    Discriminant::new("action", &CastAction::all().iter().map(|a| a.as_str()).collect::<Vec<_>>())
}

/// Discriminant declaration for `callFhirApi`.
#[must_use]
pub fn api_discriminant() -> Discriminant {
    Discriminant::new("method", &ApiMethod::all().iter().map(|m| m.as_str()).collect::<Vec<_>>())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a consolidated tool entry.
fn consolidated(
    tool: ToolName,
    description: &str,
    input_schema: Value,
    discriminant: Option<Discriminant>,
) -> ToolEntry {
    ToolEntry {
        definition: ToolDefinition {
            name: tool.as_str().to_string(),
            description: description.to_string(),
            input_schema,
        },
        binding: ToolBinding::Consolidated(tool),
        discriminant,
    }
}

/// Converts labels into a JSON array value for schema `enum` clauses.
fn labels(values: &[&str]) -> Value {
    Value::Array(values.iter().map(|value| Value::String((*value).to_string())).collect())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
