// crates/fhir-bridge-core/src/action.rs
// ============================================================================
// Module: Action Enumerations
// Description: Closed discriminant sets for consolidated tools.
// Purpose: Shared action naming for routing and unknown-action reporting.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Each consolidated tool multiplexes a closed set of logical operations
//! behind a discriminant field. The enumerations here are that closed set:
//! routing parses the discriminant into one of these values, and rejection
//! messages enumerate the valid labels verbatim via the `valid_list`
//! helpers.

use serde::Deserialize;
use serde::Serialize;

/// Joins action labels for "Valid: ..." rejection messages.
fn join_labels(labels: &[&str]) -> String {
    labels.join(", ")
}

// ============================================================================
// SECTION: Resource Actions
// ============================================================================

/// Operations multiplexed by the `manageResource` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceAction {
    /// Create a new resource.
    Create,
    /// Read a resource by identifier.
    Read,
    /// Merge-update an existing resource.
    Update,
    /// Delete a resource by identifier.
    Delete,
    /// Search resources by query parameters.
    Search,
    /// Apply JSON Patch operations.
    Patch,
    /// Conditional update keyed by a search expression.
    Upsert,
}

impl ResourceAction {
    /// Returns the canonical label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Search => "search",
            Self::Patch => "patch",
            Self::Upsert => "upsert",
        }
    }

    /// Returns all resource actions in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Create,
            Self::Read,
            Self::Update,
            Self::Delete,
            Self::Search,
            Self::Patch,
            Self::Upsert,
        ]
    }

    /// Parses an action from its canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().iter().find(|action| action.as_str() == label).copied()
    }

    /// Returns the comma-joined list of valid labels.
    #[must_use]
    pub fn valid_list() -> String {
        join_labels(&Self::all().iter().map(|action| action.as_str()).collect::<Vec<_>>())
    }
}

// ============================================================================
// SECTION: Automation Actions
// ============================================================================

/// Operations multiplexed by the `manageAutomation` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutomationAction {
    /// Deploy executable code to a bot.
    DeployBot,
    /// Execute a bot with an input payload.
    ExecuteBot,
    /// Create a bot resource.
    CreateBot,
    /// Create a rest-hook subscription.
    CreateSubscription,
    /// Read a subscription by identifier.
    GetSubscription,
    /// Merge-update a subscription.
    UpdateSubscription,
    /// Delete a subscription.
    DeleteSubscription,
    /// Reload an agent's configuration.
    ReloadAgent,
}

impl AutomationAction {
    /// Returns the canonical label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeployBot => "deploy-bot",
            Self::ExecuteBot => "execute-bot",
            Self::CreateBot => "create-bot",
            Self::CreateSubscription => "create-subscription",
            Self::GetSubscription => "get-subscription",
            Self::UpdateSubscription => "update-subscription",
            Self::DeleteSubscription => "delete-subscription",
            Self::ReloadAgent => "reload-agent",
        }
    }

    /// Returns all automation actions in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::DeployBot,
            Self::ExecuteBot,
            Self::CreateBot,
            Self::CreateSubscription,
            Self::GetSubscription,
            Self::UpdateSubscription,
            Self::DeleteSubscription,
            Self::ReloadAgent,
        ]
    }

    /// Parses an action from its canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().iter().find(|action| action.as_str() == label).copied()
    }

    /// Returns the comma-joined list of valid labels.
    #[must_use]
    pub fn valid_list() -> String {
        join_labels(&Self::all().iter().map(|action| action.as_str()).collect::<Vec<_>>())
    }
}

// ============================================================================
// SECTION: Project Actions
// ============================================================================

/// Operations multiplexed by the `manageProject` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectAction {
    /// List project memberships for the caller.
    List,
    /// Switch the active project context.
    Switch,
    /// Fetch the active project details.
    Get,
    /// Fetch the caller's profile.
    GetProfile,
    /// Invite a user into a project.
    Invite,
    /// Add or replace a project secret.
    AddSecret,
}

impl ProjectAction {
    /// Returns the canonical label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Switch => "switch",
            Self::Get => "get",
            Self::GetProfile => "get-profile",
            Self::Invite => "invite",
            Self::AddSecret => "add-secret",
        }
    }

    /// Returns all project actions in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::List, Self::Switch, Self::Get, Self::GetProfile, Self::Invite, Self::AddSecret]
    }

    /// Parses an action from its canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().iter().find(|action| action.as_str() == label).copied()
    }

    /// Returns the comma-joined list of valid labels.
    #[must_use]
    pub fn valid_list() -> String {
        join_labels(&Self::all().iter().map(|action| action.as_str()).collect::<Vec<_>>())
    }
}

// ============================================================================
// SECTION: Terminology Actions
// ============================================================================

/// Operations multiplexed by the `terminology` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminologyAction {
    /// Look up a code within a code system.
    Lookup,
    /// Validate a code against a value set.
    ValidateCode,
    /// Test subsumption between two codes.
    Subsumes,
    /// Translate a code through a concept map.
    Translate,
    /// Expand a value set.
    Expand,
}

impl TerminologyAction {
    /// Returns the canonical label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lookup => "lookup",
            Self::ValidateCode => "validate-code",
            Self::Subsumes => "subsumes",
            Self::Translate => "translate",
            Self::Expand => "expand",
        }
    }

    /// Returns all terminology actions in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Lookup, Self::ValidateCode, Self::Subsumes, Self::Translate, Self::Expand]
    }

    /// Parses an action from its canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().iter().find(|action| action.as_str() == label).copied()
    }

    /// Returns the comma-joined list of valid labels.
    #[must_use]
    pub fn valid_list() -> String {
        join_labels(&Self::all().iter().map(|action| action.as_str()).collect::<Vec<_>>())
    }
}

// ============================================================================
// SECTION: Patient Data Actions
// ============================================================================

/// Operations multiplexed by the `patientData` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatientDataAction {
    /// Full compartment export for a patient.
    Everything,
    /// Key clinical resources summarized.
    Summary,
    /// Document-reference export for a patient.
    Ccda,
}

impl PatientDataAction {
    /// Returns the canonical label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Everything => "everything",
            Self::Summary => "summary",
            Self::Ccda => "ccda",
        }
    }

    /// Returns all patient data actions in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Everything, Self::Summary, Self::Ccda]
    }

    /// Parses an action from its canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().iter().find(|action| action.as_str() == label).copied()
    }

    /// Returns the comma-joined list of valid labels.
    #[must_use]
    pub fn valid_list() -> String {
        join_labels(&Self::all().iter().map(|action| action.as_str()).collect::<Vec<_>>())
    }
}

// ============================================================================
// SECTION: Clinical Report Actions
// ============================================================================

/// Operations multiplexed by the `manageClinicalReport` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportAction {
    /// Create a report resource.
    Create,
    /// Read a report by identifier.
    Read,
    /// Merge-update a report.
    Update,
    /// Delete a report.
    Delete,
    /// Search reports by query parameters.
    Search,
}

impl ReportAction {
    /// Returns the canonical label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Search => "search",
        }
    }

    /// Returns all report actions in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Create, Self::Read, Self::Update, Self::Delete, Self::Search]
    }

    /// Parses an action from its canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().iter().find(|action| action.as_str() == label).copied()
    }

    /// Returns the comma-joined list of valid labels.
    #[must_use]
    pub fn valid_list() -> String {
        join_labels(&Self::all().iter().map(|action| action.as_str()).collect::<Vec<_>>())
    }
}

// ============================================================================
// SECTION: History Actions
// ============================================================================

/// Operations multiplexed by the `manageHistory` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryAction {
    /// List the version history of a resource.
    List,
    /// Read a specific resource version.
    ReadVersion,
}

impl HistoryAction {
    /// Returns the canonical label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::ReadVersion => "read-version",
        }
    }

    /// Returns all history actions in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::List, Self::ReadVersion]
    }

    /// Parses an action from its canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().iter().find(|action| action.as_str() == label).copied()
    }

    /// Returns the comma-joined list of valid labels.
    #[must_use]
    pub fn valid_list() -> String {
        join_labels(&Self::all().iter().map(|action| action.as_str()).collect::<Vec<_>>())
    }
}

// ============================================================================
// SECTION: Media Actions
// ============================================================================

/// Operations multiplexed by the `manageMedia` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaAction {
    /// Create a media resource wrapping an attachment.
    CreateMedia,
    /// Build an attachment value without storing it.
    CreateAttachment,
    /// Upload raw content as a binary resource.
    Upload,
}

impl MediaAction {
    /// Returns the canonical label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateMedia => "create-media",
            Self::CreateAttachment => "create-attachment",
            Self::Upload => "upload",
        }
    }

    /// Returns all media actions in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::CreateMedia, Self::CreateAttachment, Self::Upload]
    }

    /// Parses an action from its canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().iter().find(|action| action.as_str() == label).copied()
    }

    /// Returns the comma-joined list of valid labels.
    #[must_use]
    pub fn valid_list() -> String {
        join_labels(&Self::all().iter().map(|action| action.as_str()).collect::<Vec<_>>())
    }
}

// ============================================================================
// SECTION: Bulk Data Actions
// ============================================================================

/// Operations multiplexed by the `bulkData` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BulkAction {
    /// Start a bulk export job.
    Export,
    /// Start a bulk import job.
    Import,
}

impl BulkAction {
    /// Returns the canonical label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Export => "export",
            Self::Import => "import",
        }
    }

    /// Returns all bulk actions in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Export, Self::Import]
    }

    /// Parses an action from its canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().iter().find(|action| action.as_str() == label).copied()
    }

    /// Returns the comma-joined list of valid labels.
    #[must_use]
    pub fn valid_list() -> String {
        join_labels(&Self::all().iter().map(|action| action.as_str()).collect::<Vec<_>>())
    }
}

// ============================================================================
// SECTION: Provisioning Kinds
// ============================================================================

/// Provisioning targets multiplexed by the `startNew` tool (`type` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProvisionKind {
    /// Provision a new project.
    Project,
    /// Provision a new user.
    User,
    /// Provision a new patient.
    Patient,
}

impl ProvisionKind {
    /// Returns the canonical label for the provisioning kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::User => "user",
            Self::Patient => "patient",
        }
    }

    /// Returns all provisioning kinds in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Project, Self::User, Self::Patient]
    }

    /// Parses a provisioning kind from its canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().iter().find(|kind| kind.as_str() == label).copied()
    }

    /// Returns the comma-joined list of valid labels.
    #[must_use]
    pub fn valid_list() -> String {
        join_labels(&Self::all().iter().map(|kind| kind.as_str()).collect::<Vec<_>>())
    }
}

// ============================================================================
// SECTION: Admin Tasks
// ============================================================================

/// Administrative tasks multiplexed by the `executeAdminTask` tool (`task`
/// field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdminTask {
    /// Rebuild search indexes for resource types.
    Reindex,
    /// Rebuild compartment membership for a resource.
    RebuildCompartments,
    /// Purge resource versions before a cutoff.
    Purge,
    /// Force-set a user password.
    ForceSetPassword,
}

impl AdminTask {
    /// Returns the canonical label for the task.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reindex => "reindex",
            Self::RebuildCompartments => "rebuild-compartments",
            Self::Purge => "purge",
            Self::ForceSetPassword => "force-set-password",
        }
    }

    /// Returns all admin tasks in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Reindex, Self::RebuildCompartments, Self::Purge, Self::ForceSetPassword]
    }

    /// Parses a task from its canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().iter().find(|task| task.as_str() == label).copied()
    }

    /// Returns the comma-joined list of valid labels.
    #[must_use]
    pub fn valid_list() -> String {
        join_labels(&Self::all().iter().map(|task| task.as_str()).collect::<Vec<_>>())
    }
}

// ============================================================================
// SECTION: FHIRcast Actions
// ============================================================================

/// Operations multiplexed by the `manageFhirCast` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CastAction {
    /// Publish an event to a topic.
    Publish,
    /// Subscribe to topic events.
    Subscribe,
    /// Cancel a subscription.
    Unsubscribe,
    /// Fetch the current context for a topic.
    GetContext,
}

impl CastAction {
    /// Returns the canonical label for the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::GetContext => "get-context",
        }
    }

    /// Returns all FHIRcast actions in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Publish, Self::Subscribe, Self::Unsubscribe, Self::GetContext]
    }

    /// Parses an action from its canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().iter().find(|action| action.as_str() == label).copied()
    }

    /// Returns the comma-joined list of valid labels.
    #[must_use]
    pub fn valid_list() -> String {
        join_labels(&Self::all().iter().map(|action| action.as_str()).collect::<Vec<_>>())
    }
}

// ============================================================================
// SECTION: API Methods
// ============================================================================

/// HTTP methods multiplexed by the `callFhirApi` tool (`method` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiMethod {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP PATCH.
    Patch,
    /// HTTP DELETE.
    Delete,
}

impl ApiMethod {
    /// Returns the canonical label for the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Returns all methods in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Get, Self::Post, Self::Put, Self::Patch, Self::Delete]
    }

    /// Parses a method from its canonical label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().iter().find(|method| method.as_str() == label).copied()
    }

    /// Returns the comma-joined list of valid labels.
    #[must_use]
    pub fn valid_list() -> String {
        join_labels(&Self::all().iter().map(|method| method.as_str()).collect::<Vec<_>>())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use super::AutomationAction;
    use super::ProvisionKind;
    use super::ResourceAction;

    #[test]
    fn resource_actions_round_trip() {
        for action in ResourceAction::all() {
            assert_eq!(ResourceAction::parse(action.as_str()), Some(*action));
        }
        assert_eq!(ResourceAction::parse("merge"), None);
    }

    #[test]
    fn valid_list_matches_declared_order() {
        assert_eq!(
            ResourceAction::valid_list(),
            "create, read, update, delete, search, patch, upsert"
        );
        assert_eq!(ProvisionKind::valid_list(), "project, user, patient");
    }

    #[test]
    fn automation_labels_use_kebab_case() {
        assert_eq!(AutomationAction::DeployBot.as_str(), "deploy-bot");
        assert_eq!(AutomationAction::parse("deploy-bot"), Some(AutomationAction::DeployBot));
    }
}
