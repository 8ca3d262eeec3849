// crates/fhir-bridge-mcp/src/tools/automation.rs
// ============================================================================
// Module: Automation Tools
// Description: Handlers for manageAutomation and manageFhirCast.
// Purpose: Route bot, subscription, agent, and FHIRcast operations.
// Dependencies: fhir-bridge-core, fhir-bridge-client
// ============================================================================

//! ## Overview
//! `manageAutomation` covers bots (`$deploy`, `$execute`), subscriptions
//! (CRUD over the Subscription kind), and agents (`$reload-config`).
//! `manageFhirCast` covers context synchronization against the store's
//! FHIRcast hub. Both follow the consolidated pattern: parse the action,
//! gate the session, check per-action required fields, call the store,
//! normalize.

use fhir_bridge_client::fhir_path;
use fhir_bridge_core::AutomationAction;
use fhir_bridge_core::CastAction;
use fhir_bridge_core::ResultEnvelope;
use fhir_bridge_core::StoreError;
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

/// FHIRcast hub prefix on the remote store.
const FHIRCAST_PREFIX: &str = "fhircast/STU3";

// ============================================================================
// SECTION: Automation
// ============================================================================

/// Validated arguments for `manageAutomation`, one variant per action.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub(crate) enum AutomationRequest {
    /// Deploy executable code to a bot.
    #[serde(rename_all = "camelCase")]
    DeployBot {
        /// Target bot identifier.
        bot_id: Option<String>,
        /// Executable code to deploy.
        bot_code: Option<String>,
        /// Deployed filename.
        bot_filename: Option<String>,
    },
    /// Execute a bot.
    #[serde(rename_all = "camelCase")]
    ExecuteBot {
        /// Target bot identifier.
        bot_id: Option<String>,
        /// Input payload.
        bot_input: Option<Value>,
    },
    /// Create a bot resource.
    #[serde(rename_all = "camelCase")]
    CreateBot {
        /// Bot name.
        bot_name: Option<String>,
        /// Bot description.
        bot_description: Option<String>,
    },
    /// Create a rest-hook subscription.
    #[serde(rename_all = "camelCase")]
    CreateSubscription {
        /// Search criteria the subscription watches.
        subscription_criteria: Option<String>,
        /// Rest-hook endpoint URL.
        subscription_endpoint: Option<String>,
        /// Human-readable reason.
        subscription_reason: Option<String>,
    },
    /// Read a subscription.
    #[serde(rename_all = "camelCase")]
    GetSubscription {
        /// Subscription identifier.
        subscription_id: Option<String>,
    },
    /// Merge-update a subscription.
    #[serde(rename_all = "camelCase")]
    UpdateSubscription {
        /// Subscription identifier.
        subscription_id: Option<String>,
        /// New status value.
        subscription_status: Option<String>,
        /// New search criteria.
        subscription_criteria: Option<String>,
        /// New rest-hook endpoint.
        subscription_endpoint: Option<String>,
    },
    /// Delete a subscription.
    #[serde(rename_all = "camelCase")]
    DeleteSubscription {
        /// Subscription identifier.
        subscription_id: Option<String>,
    },
    /// Reload an agent's configuration.
    #[serde(rename_all = "camelCase")]
    ReloadAgent {
        /// Agent identifier.
        agent_id: Option<String>,
    },
}

impl ToolRouter {
    /// Handles `manageAutomation` invocations.
    pub(crate) async fn handle_manage_automation(
        &self,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let label = discriminant_value(&payload, "action");
        if AutomationAction::parse(&label).is_none() {
            return to_value(unknown_discriminant_envelope(
                "action",
                &label,
                &AutomationAction::valid_list(),
                &payload,
            ));
        }
        let request: AutomationRequest = decode(payload)?;
        if let Err(envelope) = self.ensure_session_for(&label, None).await {
            return to_value(envelope);
        }
        let outcome = match request {
            AutomationRequest::DeployBot {
                bot_id,
                bot_code,
                bot_filename,
            } => {
                let Some(code) = bot_code else {
                    return to_value(ResultEnvelope::failure("deploy-bot", "botCode is required"));
                };
                let Some(id) = bot_id else {
                    return to_value(ResultEnvelope::failure("deploy-bot", "botId is required"));
                };
                let body = json!({
                    "code": code,
                    "filename": bot_filename.unwrap_or_else(|| "index.js".to_string()),
                });
                self.store
                    .post(&fhir_path(&["Bot", &id, "$deploy"]), body)
                    .await
                    .map(|result| ResultEnvelope::success("deploy-bot").with_data(result))
            }
            AutomationRequest::ExecuteBot {
                bot_id,
                bot_input,
            } => {
                let Some(id) = bot_id else {
                    return to_value(ResultEnvelope::failure("execute-bot", "botId is required"));
                };
                let input = bot_input.unwrap_or_else(|| json!({}));
                self.store
                    .post(&fhir_path(&["Bot", &id, "$execute"]), input)
                    .await
                    .map(|result| ResultEnvelope::success("execute-bot").with_data(result))
            }
            AutomationRequest::CreateBot {
                bot_name,
                bot_description,
            } => {
                let Some(name) = bot_name else {
                    return to_value(ResultEnvelope::failure("create-bot", "botName is required"));
                };
                let mut bot = json!({"name": name});
                if let Some(description) = bot_description
                    && let Some(fields) = bot.as_object_mut()
                {
                    fields.insert("description".to_string(), Value::String(description));
                }
                self.adapter
                    .create("Bot", bot)
                    .await
                    .map(|created| ResultEnvelope::success("create-bot").with_data(created))
            }
            AutomationRequest::CreateSubscription {
                subscription_criteria,
                subscription_endpoint,
                subscription_reason,
            } => {
                let Some(criteria) = subscription_criteria else {
                    return to_value(ResultEnvelope::failure(
                        "create-subscription",
                        "subscriptionCriteria is required",
                    ));
                };
                let Some(endpoint) = subscription_endpoint else {
                    return to_value(ResultEnvelope::failure(
                        "create-subscription",
                        "subscriptionEndpoint is required",
                    ));
                };
                let subscription = json!({
                    "status": "active",
                    "criteria": criteria,
                    "reason": subscription_reason
                        .unwrap_or_else(|| "Created via MCP".to_string()),
                    "channel": {"type": "rest-hook", "endpoint": endpoint},
                });
                self.adapter.create("Subscription", subscription).await.map(|created| {
                    ResultEnvelope::success("create-subscription").with_data(created)
                })
            }
            AutomationRequest::GetSubscription {
                subscription_id,
            } => {
                let Some(id) = subscription_id else {
                    return to_value(ResultEnvelope::failure(
                        "get-subscription",
                        "subscriptionId is required",
                    ));
                };
                self.adapter.read("Subscription", &id).await.map(|found| {
                    ResultEnvelope::success("get-subscription")
                        .with_data(found.unwrap_or(Value::Null))
                })
            }
            AutomationRequest::UpdateSubscription {
                subscription_id,
                subscription_status,
                subscription_criteria,
                subscription_endpoint,
            } => {
                let Some(id) = subscription_id else {
                    return to_value(ResultEnvelope::failure(
                        "update-subscription",
                        "subscriptionId is required",
                    ));
                };
                self.update_subscription(
                    &id,
                    subscription_status,
                    subscription_criteria,
                    subscription_endpoint,
                )
                .await
                .map(|updated| {
                    ResultEnvelope::success("update-subscription").with_data(updated)
                })
            }
            AutomationRequest::DeleteSubscription {
                subscription_id,
            } => {
                let Some(id) = subscription_id else {
                    return to_value(ResultEnvelope::failure(
                        "delete-subscription",
                        "subscriptionId is required",
                    ));
                };
                self.adapter
                    .delete("Subscription", &id)
                    .await
                    .map(|()| ResultEnvelope::success("delete-subscription"))
            }
            AutomationRequest::ReloadAgent {
                agent_id,
            } => {
                let Some(id) = agent_id else {
                    return to_value(ResultEnvelope::failure("reload-agent", "agentId is required"));
                };
                self.store
                    .post(&fhir_path(&["Agent", &id, "$reload-config"]), json!({}))
                    .await
                    .map(|result| ResultEnvelope::success("reload-agent").with_data(result))
            }
        };
        to_value(normalize(&label, None, false, outcome))
    }

    /// Reads a subscription, applies the requested field changes, and
    /// re-submits it.
    async fn update_subscription(
        &self,
        id: &str,
        status: Option<String>,
        criteria: Option<String>,
        endpoint: Option<String>,
    ) -> Result<Value, StoreError> {
        let mut existing = self.store.read_resource("Subscription", id).await?;
        if let Some(fields) = existing.as_object_mut() {
            if let Some(status) = status {
                fields.insert("status".to_string(), Value::String(status));
            }
            if let Some(criteria) = criteria {
                fields.insert("criteria".to_string(), Value::String(criteria));
            }
            if let Some(endpoint) = endpoint {
                let channel = fields.entry("channel".to_string()).or_insert_with(|| json!({}));
                if let Some(channel_fields) = channel.as_object_mut() {
                    channel_fields.insert("endpoint".to_string(), Value::String(endpoint));
                }
            }
        }
        self.store.update_resource("Subscription", id, existing).await
    }
}

// ============================================================================
// SECTION: FHIRcast
// ============================================================================

/// Validated arguments for `manageFhirCast`, one variant per action.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub(crate) enum CastRequest {
    /// Publish an event to a topic.
    Publish {
        /// Target topic.
        topic: Option<String>,
        /// Event payload.
        event: Option<Value>,
    },
    /// Subscribe to topic events.
    Subscribe {
        /// Target topic.
        topic: Option<String>,
        /// Event names to subscribe to.
        events: Option<Vec<String>>,
    },
    /// Cancel a subscription.
    #[serde(rename_all = "camelCase")]
    Unsubscribe {
        /// Subscription request to cancel.
        subscription_request: Option<Value>,
    },
    /// Fetch the current context for a topic.
    GetContext {
        /// Target topic.
        topic: Option<String>,
    },
}

impl ToolRouter {
    /// Handles `manageFhirCast` invocations.
    pub(crate) async fn handle_manage_fhir_cast(
        &self,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let label = discriminant_value(&payload, "action");
        if CastAction::parse(&label).is_none() {
            return to_value(unknown_discriminant_envelope(
                "action",
                &label,
                &CastAction::valid_list(),
                &payload,
            ));
        }
        let request: CastRequest = decode(payload)?;
        if let Err(envelope) = self.ensure_session_for(&label, None).await {
            return to_value(envelope);
        }
        let outcome = match request {
            CastRequest::Publish {
                topic,
                event,
            } => {
                let Some(topic) = topic else {
                    return to_value(ResultEnvelope::failure("publish", "topic is required"));
                };
                let Some(event) = event else {
                    return to_value(ResultEnvelope::failure("publish", "event is required"));
                };
                self.store
                    .post(&format!("{FHIRCAST_PREFIX}/{topic}"), event)
                    .await
                    .map(|result| ResultEnvelope::success("publish").with_data(result))
            }
            CastRequest::Subscribe {
                topic,
                events,
            } => {
                let Some(topic) = topic else {
                    return to_value(ResultEnvelope::failure("subscribe", "topic is required"));
                };
                let Some(events) = events else {
                    return to_value(ResultEnvelope::failure("subscribe", "events are required"));
                };
                let body = json!({
                    "hub.channel.type": "websocket",
                    "hub.mode": "subscribe",
                    "hub.topic": topic,
                    "hub.events": events.join(","),
                });
                self.store
                    .post(FHIRCAST_PREFIX, body)
                    .await
                    .map(|result| ResultEnvelope::success("subscribe").with_data(result))
            }
            CastRequest::Unsubscribe {
                subscription_request,
            } => {
                let Some(mut request) = subscription_request else {
                    return to_value(ResultEnvelope::failure(
                        "unsubscribe",
                        "subscriptionRequest is required",
                    ));
                };
                if let Some(fields) = request.as_object_mut() {
                    fields.insert("hub.mode".to_string(), Value::String("unsubscribe".to_string()));
                }
                self.store
                    .post(FHIRCAST_PREFIX, request)
                    .await
                    .map(|result| ResultEnvelope::success("unsubscribe").with_data(result))
            }
            CastRequest::GetContext {
                topic,
            } => {
                let Some(topic) = topic else {
                    return to_value(ResultEnvelope::failure("get-context", "topic is required"));
                };
                self.store
                    .get(&format!("{FHIRCAST_PREFIX}/{topic}"))
                    .await
                    .map(|result| ResultEnvelope::success("get-context").with_data(result))
            }
        };
        to_value(normalize(&label, None, false, outcome))
    }
}
