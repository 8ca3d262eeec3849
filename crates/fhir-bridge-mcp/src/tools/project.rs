// crates/fhir-bridge-mcp/src/tools/project.rs
// ============================================================================
// Module: Project and Provisioning Tools
// Description: Handlers for manageProject, startNew, and executeAdminTask.
// Purpose: Route workspace administration operations.
// Dependencies: fhir-bridge-core, fhir-bridge-client
// ============================================================================

//! ## Overview
//! Project management (memberships, invites, secrets, the active project
//! context), provisioning of new projects/users/patients, and the
//! super-admin task surface. Provisioning discriminates on `type` and the
//! admin surface on `task`; both reuse the same routing pattern as the
//! `action` tools.

use fhir_bridge_client::unwrap_bundle;
use fhir_bridge_core::AdminTask;
use fhir_bridge_core::ProjectAction;
use fhir_bridge_core::ProvisionKind;
use fhir_bridge_core::ResultEnvelope;
use fhir_bridge_core::normalize;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::tools::ToolError;
use crate::tools::ToolRouter;
use crate::tools::decode;
use crate::tools::discriminant_value;
use crate::tools::to_value;
use crate::tools::unknown_discriminant_envelope;

// ============================================================================
// SECTION: Project Management
// ============================================================================

/// Validated arguments for `manageProject`, one variant per action.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub(crate) enum ProjectRequest {
    /// List project memberships.
    List {},
    /// Switch the active project context.
    #[serde(rename_all = "camelCase")]
    Switch {
        /// Project to switch to.
        project_id: Option<String>,
    },
    /// Fetch the active project details.
    Get {},
    /// Fetch the caller's profile.
    GetProfile {},
    /// Invite a user into a project.
    #[serde(rename_all = "camelCase")]
    Invite {
        /// Target project.
        project_id: Option<String>,
        /// Invitee email address.
        email: Option<String>,
        /// Profile resource type for the invitee.
        resource_type: Option<String>,
        /// Access policy reference.
        access_policy: Option<Value>,
        /// Invitee first name.
        first_name: Option<String>,
        /// Invitee last name.
        last_name: Option<String>,
        /// Whether to send an invite email.
        send_email: Option<bool>,
        /// Whether the invitee is a project admin.
        admin: Option<bool>,
    },
    /// Add or replace a project secret.
    #[serde(rename_all = "camelCase")]
    AddSecret {
        /// Target project.
        project_id: Option<String>,
        /// Secret name.
        secret_name: Option<String>,
        /// Secret value.
        secret_value: Option<String>,
    },
}

impl ToolRouter {
    /// Handles `manageProject` invocations.
    pub(crate) async fn handle_manage_project(
        &self,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let label = discriminant_value(&payload, "action");
        if ProjectAction::parse(&label).is_none() {
            return to_value(unknown_discriminant_envelope(
                "action",
                &label,
                &ProjectAction::valid_list(),
                &payload,
            ));
        }
        let request: ProjectRequest = decode(payload)?;
        if let Err(envelope) = self.ensure_session_for(&label, None).await {
            return to_value(envelope);
        }
        let outcome = match request {
            ProjectRequest::List {} => {
                self.store.search_resources("ProjectMembership", "_count=100").await.map(
                    |bundle| {
                        let page = unwrap_bundle(bundle);
                        ResultEnvelope::success("list").with_data(Value::Array(page.resources))
                    },
                )
            }
            ProjectRequest::Switch {
                project_id,
            } => {
                let Some(project_id) = project_id else {
                    return to_value(ResultEnvelope::failure(
                        "switch",
                        "projectId is required for switch action",
                    ));
                };
                self.store.switch_project(&project_id).await.map(|()| {
                    ResultEnvelope::success("switch").with_data(json!({"projectId": project_id}))
                })
            }
            ProjectRequest::Get {} => match self.store.project_context().await {
                Some(project_id) => self
                    .store
                    .read_resource("Project", &project_id)
                    .await
                    .map(|project| ResultEnvelope::success("get").with_data(project)),
                None => self.store.get("auth/me").await.map(|me| {
                    let project = me.get("project").cloned().unwrap_or(me);
                    ResultEnvelope::success("get").with_data(project)
                }),
            },
            ProjectRequest::GetProfile {} => self.store.get("auth/me").await.map(|me| {
                let profile = me.get("profile").cloned().unwrap_or(me);
                ResultEnvelope::success("get-profile").with_data(profile)
            }),
            ProjectRequest::Invite {
                project_id,
                email,
                resource_type,
                access_policy,
                first_name,
                last_name,
                send_email,
                admin,
            } => {
                let (Some(project_id), Some(email)) = (project_id, email) else {
                    return to_value(ResultEnvelope::failure(
                        "invite",
                        "projectId and email are required",
                    ));
                };
                let mut body = json!({
                    "resourceType": resource_type
                        .unwrap_or_else(|| "Practitioner".to_string()),
                    "firstName": first_name.unwrap_or_default(),
                    "lastName": last_name.unwrap_or_default(),
                    "email": email,
                    "sendEmail": send_email.unwrap_or(true),
                    "admin": admin.unwrap_or(false),
                });
                if let Some(policy) = access_policy
                    && let Some(fields) = body.as_object_mut()
                {
                    fields.insert("accessPolicy".to_string(), policy);
                }
                self.store
                    .post(&format!("admin/projects/{project_id}/invite"), body)
                    .await
                    .map(|result| ResultEnvelope::success("invite").with_data(result))
            }
            ProjectRequest::AddSecret {
                project_id,
                secret_name,
                secret_value,
            } => {
                let (Some(project_id), Some(name), Some(value)) =
                    (project_id, secret_name, secret_value)
                else {
                    return to_value(ResultEnvelope::failure(
                        "add-secret",
                        "projectId, secretName, and secretValue are required",
                    ));
                };
                self.add_project_secret(&project_id, &name, &value)
                    .await
                    .map(|updated| ResultEnvelope::success("add-secret").with_data(updated))
            }
        };
        to_value(normalize(&label, None, false, outcome))
    }

    /// Adds or replaces one secret on a project and re-submits it.
    async fn add_project_secret(
        &self,
        project_id: &str,
        name: &str,
        value: &str,
    ) -> Result<Value, fhir_bridge_core::StoreError> {
        let mut project = self.store.read_resource("Project", project_id).await?;
        let entry = json!({"name": name, "valueString": value});
        if let Some(fields) = project.as_object_mut() {
            let secrets = fields
                .entry("secret".to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Some(items) = secrets.as_array_mut() {
                let position = items
                    .iter()
                    .position(|item| item.get("name").and_then(Value::as_str) == Some(name));
                match position {
                    Some(index) => items[index] = entry,
                    None => items.push(entry),
                }
            }
        }
        self.store.update_resource("Project", project_id, project).await
    }
}

// ============================================================================
// SECTION: Provisioning
// ============================================================================

/// Validated arguments for `startNew`, one variant per provisioning kind.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub(crate) enum ProvisionRequest {
    /// Provision a new project.
    #[serde(rename_all = "camelCase")]
    Project {
        /// Login ID owning the project.
        login: Option<String>,
        /// Name for the new project.
        project_name: Option<String>,
    },
    /// Provision a new user.
    User {
        /// New user details.
        user: Option<Value>,
    },
    /// Provision a new patient.
    Patient {
        /// New patient details.
        patient: Option<Value>,
    },
}

impl ToolRouter {
    /// Handles `startNew` invocations.
    pub(crate) async fn handle_start_new(&self, payload: Value) -> Result<Value, ToolError> {
        let label = discriminant_value(&payload, "type");
        if ProvisionKind::parse(&label).is_none() {
            return to_value(unknown_discriminant_envelope(
                "type",
                &label,
                &ProvisionKind::valid_list(),
                &payload,
            ));
        }
        let request: ProvisionRequest = decode(payload)?;
        if let Err(envelope) = self.ensure_session_for(&label, None).await {
            return to_value(envelope);
        }
        let outcome = match request {
            ProvisionRequest::Project {
                login,
                project_name,
            } => {
                let (Some(login), Some(project_name)) = (login, project_name) else {
                    return to_value(ResultEnvelope::failure(
                        "project",
                        "login and projectName are required",
                    ));
                };
                self.store
                    .post("auth/newproject", json!({"login": login, "projectName": project_name}))
                    .await
                    .map(|result| ResultEnvelope::success("project").with_data(result))
            }
            ProvisionRequest::User {
                user,
            } => {
                let Some(user) = user else {
                    return to_value(ResultEnvelope::failure("user", "user object is required"));
                };
                self.store
                    .post("auth/newuser", user)
                    .await
                    .map(|result| ResultEnvelope::success("user").with_data(result))
            }
            ProvisionRequest::Patient {
                patient,
            } => {
                let Some(patient) = patient else {
                    return to_value(ResultEnvelope::failure(
                        "patient",
                        "patient object is required",
                    ));
                };
                self.store
                    .post("auth/newpatient", patient)
                    .await
                    .map(|result| ResultEnvelope::success("patient").with_data(result))
            }
        };
        to_value(normalize(&label, None, false, outcome))
    }
}

// ============================================================================
// SECTION: Admin Tasks
// ============================================================================

/// Validated arguments for `executeAdminTask`, one variant per task.
#[derive(Debug, Deserialize)]
#[serde(tag = "task", rename_all = "kebab-case")]
pub(crate) enum AdminTaskRequest {
    /// Rebuild search indexes.
    Reindex {
        /// Task parameters.
        parameters: Option<Value>,
    },
    /// Rebuild compartment membership.
    RebuildCompartments {
        /// Task parameters.
        parameters: Option<Value>,
    },
    /// Purge resource versions.
    Purge {
        /// Task parameters.
        parameters: Option<Value>,
    },
    /// Force-set a user password.
    ForceSetPassword {
        /// Task parameters.
        parameters: Option<Value>,
    },
}

impl ToolRouter {
    /// Handles `executeAdminTask` invocations.
    pub(crate) async fn handle_execute_admin_task(
        &self,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let label = discriminant_value(&payload, "task");
        if AdminTask::parse(&label).is_none() {
            return to_value(unknown_discriminant_envelope(
                "task",
                &label,
                &AdminTask::valid_list(),
                &payload,
            ));
        }
        let request: AdminTaskRequest = decode(payload)?;
        if let Err(envelope) = self.ensure_session_for(&label, None).await {
            return to_value(envelope);
        }
        let outcome = match request {
            AdminTaskRequest::Reindex {
                parameters,
            } => {
                let parameters = parameters.unwrap_or_else(|| json!({}));
                let body = json!({
                    "resourceTypes": parameters.get("resourceTypes").cloned()
                        .unwrap_or(Value::Null),
                });
                self.store
                    .post("admin/super/reindex", body)
                    .await
                    .map(|result| ResultEnvelope::success("reindex").with_data(result))
            }
            AdminTaskRequest::RebuildCompartments {
                parameters,
            } => {
                let parameters = parameters.unwrap_or_else(|| json!({}));
                let (Some(resource_type), Some(id)) = (
                    parameters.get("resourceType").and_then(Value::as_str),
                    parameters.get("id").and_then(Value::as_str),
                ) else {
                    return to_value(ResultEnvelope::failure(
                        "rebuild-compartments",
                        "resourceType and id are required",
                    ));
                };
                let body = json!({"resourceType": resource_type, "id": id});
                self.store
                    .post("admin/super/rebuild-compartments", body)
                    .await
                    .map(|result| ResultEnvelope::success("rebuild-compartments").with_data(result))
            }
            AdminTaskRequest::Purge {
                parameters,
            } => {
                let parameters = parameters.unwrap_or_else(|| json!({}));
                let (Some(resource_type), Some(before)) = (
                    parameters.get("resourceType").and_then(Value::as_str),
                    parameters.get("before").and_then(Value::as_str),
                ) else {
                    return to_value(ResultEnvelope::failure(
                        "purge",
                        "resourceType and before are required",
                    ));
                };
                let body = json!({"resourceType": resource_type, "before": before});
                self.store
                    .post("admin/super/purge", body)
                    .await
                    .map(|result| ResultEnvelope::success("purge").with_data(result))
            }
            AdminTaskRequest::ForceSetPassword {
                parameters,
            } => {
                let parameters = parameters.unwrap_or_else(|| json!({}));
                let (Some(user_id), Some(password)) = (
                    parameters.get("userId").and_then(Value::as_str),
                    parameters.get("password").and_then(Value::as_str),
                ) else {
                    return to_value(ResultEnvelope::failure(
                        "force-set-password",
                        "userId and password are required",
                    ));
                };
                let body = json!({
                    "user": {"reference": format!("User/{user_id}")},
                    "password": password,
                });
                self.store
                    .post("admin/super/setpassword", body)
                    .await
                    .map(|result| ResultEnvelope::success("force-set-password").with_data(result))
            }
        };
        to_value(normalize(&label, None, false, outcome))
    }
}
