//! TOML Configuration File Support
//!
//! Centralized configuration loading for the PickSmart client, backed by a
//! TOML file at `~/.config/picksmart/client.toml`.
//!
//! # Configuration Priority
//!
//! Highest first:
//! 1. CLI arguments (applied by the caller through [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! url = "http://localhost:8000"
//! endpoint = "/api/chat"
//! user = "user"
//! request_timeout_secs = 120
//!
//! [reveal]
//! cadence_ms = 20
//!
//! [messages]
//! fallback_error = "An error occurred."
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::DEFAULT_FALLBACK_ERROR;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the effective configuration came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[backend]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// Base URL of the assistant service
    pub url: Option<String>,
    /// Chat endpoint path
    pub endpoint: Option<String>,
    /// User identifier sent with each request
    pub user: Option<String>,
    /// Request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// `[reveal]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealToml {
    /// Milliseconds between revealed words
    pub cadence_ms: Option<u64>,
}

/// `[messages]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesToml {
    /// Text shown for failures that carry no message
    pub fallback_error: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientToml {
    /// Backend section
    pub backend: BackendToml,
    /// Reveal section
    pub reveal: RevealToml,
    /// Messages section
    pub messages: MessagesToml,
}

// =============================================================================
// Effective Configuration
// =============================================================================

/// Resolved backend settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendSettings {
    /// Base URL of the assistant service
    pub url: String,
    /// Chat endpoint path
    pub endpoint: String,
    /// User identifier sent with each request
    pub user: String,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            endpoint: "/api/chat".to_string(),
            user: "user".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Effective client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backend settings
    pub backend: BackendSettings,
    /// Milliseconds between revealed words
    pub cadence_ms: u64,
    /// Text shown for failures that carry no message
    pub fallback_error: String,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    source: ConfigSource,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            cadence_ms: 20,
            fallback_error: DEFAULT_FALLBACK_ERROR.to_string(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ClientConfig {
    /// Create a configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest-priority source that contributed a value
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Reveal cadence as a duration
    #[must_use]
    pub fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }

    /// Reject values the client cannot run with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for an empty or non-HTTP backend
    /// URL, a zero cadence or a zero request timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend.url.trim();
        if url.is_empty() {
            return Err(ConfigError::Validation(
                "backend url must not be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "backend url must start with http:// or https://, got {url:?}"
            )));
        }
        if self.cadence_ms == 0 {
            return Err(ConfigError::Validation(
                "reveal cadence must be at least 1 ms".to_string(),
            ));
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/picksmart/client.toml`, usually
/// `~/.config/picksmart/client.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("picksmart").join("client.toml"))
}

/// Load configuration from the default path, then the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
/// A missing config file is not an error.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from_path(default_config_path().as_deref())
}

/// Load configuration from a specific path, then the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_config_from_path(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration from a specific path and an environment lookup
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_config_with_env<F>(path: Option<&Path>, env: F) -> Result<ClientConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ClientConfig::default();

    if let Some(config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::Read {
                    path: config_path.to_path_buf(),
                    source: e,
                })?;

            let toml_config: ClientToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.to_path_buf());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);

    Ok(config)
}

/// Apply TOML values to the config
fn apply_toml_config(config: &mut ClientConfig, toml: &ClientToml) {
    if let Some(ref url) = toml.backend.url {
        config.backend.url.clone_from(url);
    }
    if let Some(ref endpoint) = toml.backend.endpoint {
        config.backend.endpoint.clone_from(endpoint);
    }
    if let Some(ref user) = toml.backend.user {
        config.backend.user.clone_from(user);
    }
    if let Some(timeout) = toml.backend.request_timeout_secs {
        config.backend.request_timeout_secs = timeout;
    }
    if let Some(cadence) = toml.reveal.cadence_ms {
        config.cadence_ms = cadence;
    }
    if let Some(ref fallback) = toml.messages.fallback_error {
        config.fallback_error.clone_from(fallback);
    }
}

/// Apply environment overrides to the config
fn apply_env_config<F>(config: &mut ClientConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env("PICKSMART_BACKEND_URL") {
        config.backend.url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(endpoint) = env("PICKSMART_ENDPOINT") {
        config.backend.endpoint = endpoint;
        config.source = ConfigSource::Env;
    }
    if let Some(user) = env("PICKSMART_USER") {
        config.backend.user = user;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env("PICKSMART_REQUEST_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.backend.request_timeout_secs = secs;
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %timeout, "Ignoring unparsable PICKSMART_REQUEST_TIMEOUT_SECS");
        }
    }
    if let Some(cadence) = env("PICKSMART_REVEAL_CADENCE_MS") {
        if let Ok(ms) = cadence.parse::<u64>() {
            config.cadence_ms = ms;
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %cadence, "Ignoring unparsable PICKSMART_REVEAL_CADENCE_MS");
        }
    }
    if let Some(fallback) = env("PICKSMART_FALLBACK_ERROR") {
        config.fallback_error = fallback;
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Command-line overrides, applied after [`load_config`]
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Backend URL override
    pub backend_url: Option<String>,
    /// Reveal cadence override (milliseconds)
    pub cadence_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create an empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set backend URL override
    #[must_use]
    pub fn with_backend_url(mut self, url: String) -> Self {
        self.backend_url = Some(url);
        self
    }

    /// Set cadence override
    #[must_use]
    pub fn with_cadence_ms(mut self, ms: u64) -> Self {
        self.cadence_ms = Some(ms);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ClientConfig) {
        if let Some(ref url) = self.backend_url {
            config.backend.url.clone_from(url);
            config.source = ConfigSource::Cli;
        }
        if let Some(ms) = self.cadence_ms {
            config.cadence_ms = ms;
            config.source = ConfigSource::Cli;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();

        assert_eq!(config.backend.url, "http://localhost:8000");
        assert_eq!(config.backend.endpoint, "/api/chat");
        assert_eq!(config.backend.user, "user");
        assert_eq!(config.backend.request_timeout_secs, 120);
        assert_eq!(config.cadence(), Duration::from_millis(20));
        assert_eq!(config.fallback_error, "An error occurred.");
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config =
            load_config_with_env(Some(Path::new("/nonexistent/picksmart.toml")), no_env).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
[backend]
url = "https://picksmart.example"
user = "shopper"

[reveal]
cadence_ms = 35

[messages]
fallback_error = "Something broke."
"#,
        );

        let config = load_config_with_env(Some(file.path()), no_env).unwrap();
        assert_eq!(config.backend.url, "https://picksmart.example");
        assert_eq!(config.backend.user, "shopper");
        assert_eq!(config.backend.endpoint, "/api/chat");
        assert_eq!(config.cadence_ms, 35);
        assert_eq!(config.fallback_error, "Something broke.");
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let file = write_config("[backend\nurl = ");
        let result = load_config_with_env(Some(file.path()), no_env);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config("[reveal]\ncadence_ms = 35\n");
        let env: HashMap<&str, &str> = HashMap::from([
            ("PICKSMART_REVEAL_CADENCE_MS", "50"),
            ("PICKSMART_BACKEND_URL", "http://10.0.0.2:9000"),
            ("PICKSMART_REQUEST_TIMEOUT_SECS", "soon"),
        ]);

        let config = load_config_with_env(Some(file.path()), |key| {
            env.get(key).map(ToString::to_string)
        })
        .unwrap();

        assert_eq!(config.cadence_ms, 50);
        assert_eq!(config.backend.url, "http://10.0.0.2:9000");
        assert_eq!(config.backend.request_timeout_secs, 120);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_cli_overrides_everything() {
        let env = |key: &str| (key == "PICKSMART_REVEAL_CADENCE_MS").then(|| "50".to_string());
        let mut config = load_config_with_env(None, env).unwrap();

        ConfigOverrides::new()
            .with_cadence_ms(5)
            .with_backend_url("http://cli.example".to_string())
            .apply(&mut config);

        assert_eq!(config.cadence_ms, 5);
        assert_eq!(config.backend.url, "http://cli.example");
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ClientConfig::default();
        config.cadence_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = ClientConfig::default();
        config.backend.url = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = ClientConfig::default();
        config.backend.url = "localhost:8000".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = ClientConfig::default();
        config.backend.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("picksmart/client.toml"));
        }
    }
}
