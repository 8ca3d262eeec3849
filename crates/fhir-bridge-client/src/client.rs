// crates/fhir-bridge-client/src/client.rs
// ============================================================================
// Module: Remote Store Client
// Description: Store collaborator interface and its HTTP implementation.
// Purpose: Provide resource primitives, raw requests, and the lazy session
// gate over the remote clinical-data store.
// Dependencies: fhir-bridge-core, reqwest, tokio
// ============================================================================

//! ## Overview
//! [`FhirStore`] is the narrow interface the routing core consumes; the
//! production implementation [`HttpFhirStore`] issues JSON requests against
//! the store's REST surface with bearer auth. Sessions are established
//! lazily through an OAuth2 client-credentials exchange and shared across
//! in-flight invocations; establishment is idempotent and safe to race
//! (last writer wins).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use fhir_bridge_core::StoreError;
use reqwest::Client;
use reqwest::Method;
use reqwest::Response;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// FHIR REST prefix on the remote store.
const FHIR_PREFIX: &str = "fhir/R4";
/// OAuth2 token endpoint on the remote store.
const TOKEN_PATH: &str = "oauth2/token";

/// Joins FHIR path segments under the store's REST prefix.
#[must_use]
pub fn fhir_path(segments: &[&str]) -> String {
    let mut path = String::from(FHIR_PREFIX);
    for segment in segments {
        path.push('/');
        path.push_str(segment);
    }
    path
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Remote store connection settings.
///
/// # Invariants
/// - `base_url` is an absolute http(s) URL; trailing slashes are ignored.
/// - Missing credentials are surfaced by the session gate, not here.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Store base URL.
    pub base_url: String,
    /// OAuth2 client identifier.
    pub client_id: Option<String>,
    /// OAuth2 client secret.
    pub client_secret: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.medplum.com".to_string(),
            client_id: None,
            client_secret: None,
            timeout_ms: 30_000,
            user_agent: "fhir-bridge/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Collaborator Interface
// ============================================================================

/// Narrow interface over the remote clinical-data store.
///
/// Resource primitives operate on `(kind, id)` pairs; raw methods cover
/// endpoints without a resource-shaped body (admin, auth, terminology,
/// bulk data). Every method requires a live session; handlers call
/// [`FhirStore::ensure_session`] before their first store access.
#[async_trait]
pub trait FhirStore: Send + Sync {
    /// Ensures a live session exists, establishing one lazily.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Auth`] when credentials are missing or the
    /// exchange fails.
    async fn ensure_session(&self) -> Result<(), StoreError>;

    /// Switches the active project context for subsequent calls.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the switch cannot be recorded.
    async fn switch_project(&self, project_id: &str) -> Result<(), StoreError>;

    /// Returns the active project context, when one was selected.
    async fn project_context(&self) -> Option<String>;

    /// Creates a resource of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects the operation.
    async fn create_resource(&self, kind: &str, body: Value) -> Result<Value, StoreError>;

    /// Reads a resource by kind and identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for absent resources and
    /// [`StoreError`] for every other fault.
    async fn read_resource(&self, kind: &str, id: &str) -> Result<Value, StoreError>;

    /// Replaces a resource by kind and identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects the operation.
    async fn update_resource(&self, kind: &str, id: &str, body: Value)
    -> Result<Value, StoreError>;

    /// Deletes a resource by kind and identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects the operation.
    async fn delete_resource(&self, kind: &str, id: &str) -> Result<Value, StoreError>;

    /// Searches resources of a kind with a pre-serialized query string.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects the operation.
    async fn search_resources(&self, kind: &str, query: &str) -> Result<Value, StoreError>;

    /// Applies JSON Patch operations to a resource.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store rejects the operation.
    async fn patch_resource(&self, kind: &str, id: &str, ops: Value)
    -> Result<Value, StoreError>;

    /// Issues a raw GET against a store-relative path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the request fails.
    async fn get(&self, path: &str) -> Result<Value, StoreError>;

    /// Issues a raw POST against a store-relative path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the request fails.
    async fn post(&self, path: &str, body: Value) -> Result<Value, StoreError>;

    /// Issues a raw PUT against a store-relative path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the request fails.
    async fn put(&self, path: &str, body: Value) -> Result<Value, StoreError>;

    /// Issues a raw PATCH against a store-relative path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the request fails.
    async fn patch(&self, path: &str, body: Value) -> Result<Value, StoreError>;

    /// Issues a raw DELETE against a store-relative path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the request fails.
    async fn delete(&self, path: &str) -> Result<Value, StoreError>;
}

// ============================================================================
// SECTION: HTTP Implementation
// ============================================================================

/// Session state established by the credential exchange.
#[derive(Debug, Clone)]
struct Session {
    /// Bearer token attached to store requests.
    access_token: String,
}

/// Token endpoint response payload.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    /// Issued access token.
    access_token: String,
}

/// HTTP implementation of the store collaborator interface.
pub struct HttpFhirStore {
    /// Connection settings.
    config: StoreConfig,
    /// Base URL with the trailing slash removed.
    base: String,
    /// Shared HTTP client.
    http: Client,
    /// Lazily established session; last writer wins on races.
    session: RwLock<Option<Session>>,
    /// Active project context selected through `switch_project`.
    active_project: RwLock<Option<String>>,
}

impl HttpFhirStore {
    /// Creates a store client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        let base = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            config,
            base,
            http,
            session: RwLock::new(None),
            active_project: RwLock::new(None),
        })
    }

    /// Issues a JSON request against a store-relative path.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, StoreError> {
        let url = format!("{}/{}", self.base, path.trim_start_matches('/'));
        let mut request = self.http.request(method, &url);
        if let Some(session) = self.session.read().await.as_ref() {
            request = request.bearer_auth(&session.access_token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response =
            request.send().await.map_err(|err| StoreError::Transport(err.to_string()))?;
        decode_response(response).await
    }
}

#[async_trait]
impl FhirStore for HttpFhirStore {
    async fn ensure_session(&self) -> Result<(), StoreError> {
        if self.session.read().await.is_some() {
            return Ok(());
        }
        let (Some(client_id), Some(client_secret)) =
            (self.config.client_id.as_ref(), self.config.client_secret.as_ref())
        else {
            return Err(StoreError::Auth(
                "store credentials not configured; set FHIR_BRIDGE_CLIENT_ID and \
                 FHIR_BRIDGE_CLIENT_SECRET"
                    .to_string(),
            ));
        };
        let url = format!("{}/{TOKEN_PATH}", self.base);
        let response = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|err| StoreError::Auth(format!("session exchange failed: {err}")))?;
        if !response.status().is_success() {
            return Err(StoreError::Auth(format!(
                "session exchange failed with status {}",
                response.status().as_u16()
            )));
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| StoreError::Auth(format!("session exchange failed: {err}")))?;
        *self.session.write().await = Some(Session {
            access_token: token.access_token,
        });
        Ok(())
    }

    async fn switch_project(&self, project_id: &str) -> Result<(), StoreError> {
        *self.active_project.write().await = Some(project_id.to_string());
        Ok(())
    }

    async fn project_context(&self) -> Option<String> {
        self.active_project.read().await.clone()
    }

    async fn create_resource(&self, kind: &str, body: Value) -> Result<Value, StoreError> {
        self.request(Method::POST, &fhir_path(&[kind]), Some(&body)).await
    }

    async fn read_resource(&self, kind: &str, id: &str) -> Result<Value, StoreError> {
        self.request(Method::GET, &fhir_path(&[kind, id]), None).await
    }

    async fn update_resource(
        &self,
        kind: &str,
        id: &str,
        body: Value,
    ) -> Result<Value, StoreError> {
        self.request(Method::PUT, &fhir_path(&[kind, id]), Some(&body)).await
    }

    async fn delete_resource(&self, kind: &str, id: &str) -> Result<Value, StoreError> {
        self.request(Method::DELETE, &fhir_path(&[kind, id]), None).await
    }

    async fn search_resources(&self, kind: &str, query: &str) -> Result<Value, StoreError> {
        let path = if query.is_empty() {
            fhir_path(&[kind])
        } else {
            format!("{}?{query}", fhir_path(&[kind]))
        };
        self.request(Method::GET, &path, None).await
    }

    async fn patch_resource(
        &self,
        kind: &str,
        id: &str,
        ops: Value,
    ) -> Result<Value, StoreError> {
        let url = format!("{}/{}", self.base, fhir_path(&[kind, id]));
        let payload = serde_json::to_vec(&ops)
            .map_err(|err| StoreError::Serialization(err.to_string()))?;
        let mut request = self
            .http
            .patch(&url)
            .header(CONTENT_TYPE, "application/json-patch+json")
            .body(payload);
        if let Some(session) = self.session.read().await.as_ref() {
            request = request.bearer_auth(&session.access_token);
        }
        let response =
            request.send().await.map_err(|err| StoreError::Transport(err.to_string()))?;
        decode_response(response).await
    }

    async fn get(&self, path: &str) -> Result<Value, StoreError> {
        self.request(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, StoreError> {
        self.request(Method::POST, path, Some(&body)).await
    }

    async fn put(&self, path: &str, body: Value) -> Result<Value, StoreError> {
        self.request(Method::PUT, path, Some(&body)).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Value, StoreError> {
        self.request(Method::PATCH, path, Some(&body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value, StoreError> {
        self.request(Method::DELETE, path, None).await
    }
}

// ============================================================================
// SECTION: Response Decoding
// ============================================================================

/// Decodes a store response into a value or a classified fault.
async fn decode_response(response: Response) -> Result<Value, StoreError> {
    let status = response.status();
    let bytes =
        response.bytes().await.map_err(|err| StoreError::Transport(err.to_string()))?;
    let body = if bytes.is_empty() {
        None
    } else {
        serde_json::from_slice::<Value>(&bytes).ok()
    };
    if status.is_success() {
        return Ok(body.unwrap_or(Value::Null));
    }
    Err(StoreError::from_response(status.as_u16(), body))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
