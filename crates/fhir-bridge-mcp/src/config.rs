// crates/fhir-bridge-mcp/src/config.rs
// ============================================================================
// Module: Bridge Configuration
// Description: Configuration loading and validation for the MCP server.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: fhir-bridge-client, serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration comes from an optional TOML file plus environment
//! overrides. The file is size-capped and must be UTF-8; invalid settings
//! fail closed at startup. Credentials are read from the environment and
//! are allowed to be absent; the session gate reports that on first use
//! rather than blocking startup.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use fhir_bridge_client::StoreConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "fhir-bridge.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "FHIR_BRIDGE_CONFIG";
/// Environment variable overriding the store base URL.
pub(crate) const BASE_URL_ENV_VAR: &str = "FHIR_BRIDGE_BASE_URL";
/// Environment variable supplying the OAuth2 client identifier.
pub(crate) const CLIENT_ID_ENV_VAR: &str = "FHIR_BRIDGE_CLIENT_ID";
/// Environment variable supplying the OAuth2 client secret.
pub(crate) const CLIENT_SECRET_ENV_VAR: &str = "FHIR_BRIDGE_CLIENT_SECRET";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Minimum framed request body limit in bytes.
const MIN_BODY_BYTES: usize = 1024;
/// Maximum framed request body limit in bytes.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;
/// Minimum store request timeout in milliseconds.
const MIN_STORE_TIMEOUT_MS: u64 = 100;
/// Maximum store request timeout in milliseconds.
const MAX_STORE_TIMEOUT_MS: u64 = 600_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// FHIR Bridge MCP configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeConfig {
    /// Server transport settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Remote store settings.
    #[serde(default)]
    pub store: StoreSettings,
}

/// Server transport settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Maximum allowed framed request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Remote store settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Store base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// OAuth2 client identifier; usually supplied via the environment.
    #[serde(default)]
    pub client_id: Option<String>,
    /// OAuth2 client secret; usually supplied via the environment.
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            client_id: None,
            client_secret: None,
        }
    }
}

/// Default framed request body limit.
const fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Default store base URL.
fn default_base_url() -> String {
    "https://api.medplum.com".to_string()
}

/// Default store request timeout.
const fn default_timeout_ms() -> u64 {
    30_000
}

/// Default user agent.
fn default_user_agent() -> String {
    "fhir-bridge/0.1".to_string()
}

impl BridgeConfig {
    /// Loads configuration from disk and applies environment overrides.
    ///
    /// Resolution order: explicit path, then `FHIR_BRIDGE_CONFIG`, then the
    /// default filename when it exists, then built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading, parsing, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path);
        let mut config = match resolved {
            Some(file) => Self::from_file(&file)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML file with strict limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when reading or parsing fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies environment overrides for the base URL and credentials.
    pub fn apply_env(&mut self) {
        if let Ok(base_url) = env::var(BASE_URL_ENV_VAR)
            && !base_url.is_empty()
        {
            self.store.base_url = base_url;
        }
        if let Ok(client_id) = env::var(CLIENT_ID_ENV_VAR)
            && !client_id.is_empty()
        {
            self.store.client_id = Some(client_id);
        }
        if let Ok(client_secret) = env::var(CLIENT_SECRET_ENV_VAR)
            && !client_secret.is_empty()
        {
            self.store.client_secret = Some(client_secret);
        }
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = Url::parse(&self.store.base_url)
            .map_err(|_| ConfigError::Invalid("store base_url is not a valid URL".to_string()))?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(ConfigError::Invalid("store base_url must be http(s)".to_string()));
        }
        if self.server.max_body_bytes < MIN_BODY_BYTES
            || self.server.max_body_bytes > MAX_BODY_BYTES
        {
            return Err(ConfigError::Invalid("server max_body_bytes out of range".to_string()));
        }
        if self.store.timeout_ms < MIN_STORE_TIMEOUT_MS
            || self.store.timeout_ms > MAX_STORE_TIMEOUT_MS
        {
            return Err(ConfigError::Invalid("store timeout_ms out of range".to_string()));
        }
        if self.store.user_agent.is_empty() {
            return Err(ConfigError::Invalid("store user_agent must not be empty".to_string()));
        }
        Ok(())
    }

    /// Returns true when store credentials are present.
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.store.client_id.is_some() && self.store.client_secret.is_some()
    }

    /// Builds the store client configuration.
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            base_url: self.store.base_url.clone(),
            client_id: self.store.client_id.clone(),
            client_secret: self.store.client_secret.clone(),
            timeout_ms: self.store.timeout_ms,
            user_agent: self.store.user_agent.clone(),
        }
    }
}

/// Resolves the configuration file path.
fn resolve_path(path: Option<&Path>) -> Option<PathBuf> {
    if let Some(explicit) = path {
        return Some(explicit.to_path_buf());
    }
    if let Ok(from_env) = env::var(CONFIG_ENV_VAR)
        && !from_env.is_empty()
    {
        return Some(PathBuf::from(from_env));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_NAME);
    default.exists().then_some(default)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File read errors.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parse errors.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Semantic validation errors.
    #[error("invalid config: {0}")]
    Invalid(String),
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

    use std::io::Write;

    use super::BridgeConfig;
    use super::ConfigError;

    #[test]
    fn defaults_validate() {
        let config = BridgeConfig::default();
        config.validate().unwrap();
        assert_eq!(config.store.base_url, "https://api.medplum.com");
        assert!(!config.has_credentials());
    }

    #[test]
    fn file_settings_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[store]\nbase_url = \"https://fhir.example.org\"\ntimeout_ms = 5000\n\n[server]\nmax_body_bytes = 4096\n"
        )
        .unwrap();
        let config = BridgeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.store.base_url, "https://fhir.example.org");
        assert_eq!(config.store.timeout_ms, 5000);
        assert_eq!(config.server.max_body_bytes, 4096);
    }

    #[test]
    fn invalid_base_url_fails_closed() {
        let mut config = BridgeConfig::default();
        config.store.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn out_of_range_body_limit_fails_closed() {
        let mut config = BridgeConfig::default();
        config.server.max_body_bytes = 16;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn oversized_config_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let filler = format!("# {}\n", "x".repeat(super::MAX_CONFIG_FILE_SIZE));
        file.write_all(filler.as_bytes()).unwrap();
        assert!(matches!(
            BridgeConfig::from_file(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
