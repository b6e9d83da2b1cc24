//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CLEMENTINE_API_URL` - Base URL of the storefront API
//!   (e.g. `https://api.clementinemarket.example`)
//!
//! ## Optional
//! - `CLEMENTINE_DATA_DIR` - Directory for the local state file
//!   (default: `.clementine` in the current directory)
//! - `CLEMENTINE_TIMEOUT_SECS` - Per-request timeout in seconds
//!   (default: 30). A hung request fails like any other transport
//!   failure instead of spinning forever.
//! - `CLEMENTINE_NOTIFICATION_TTL_SECS` - How long a notification
//!   stays active before auto-dismissing (default: 5)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_DATA_DIR: &str = ".clementine";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_NOTIFICATION_TTL_SECS: u64 = 5;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the remote storefront API.
    pub api_base_url: Url,
    /// Directory holding the local state file.
    pub data_dir: PathBuf,
    /// Timeout applied to every outgoing request.
    pub request_timeout: Duration,
    /// Display lifetime of transient notifications.
    pub notification_ttl: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or
    /// unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_required_env("CLEMENTINE_API_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CLEMENTINE_API_URL".to_owned(), e.to_string())
            })?;
        let data_dir =
            PathBuf::from(get_env_or_default("CLEMENTINE_DATA_DIR", DEFAULT_DATA_DIR));
        let request_timeout = Duration::from_secs(parse_secs(
            "CLEMENTINE_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?);
        let notification_ttl = Duration::from_secs(parse_secs(
            "CLEMENTINE_NOTIFICATION_TTL_SECS",
            DEFAULT_NOTIFICATION_TTL_SECS,
        )?);

        Ok(Self {
            api_base_url,
            data_dir,
            request_timeout,
            notification_ttl,
        })
    }

    /// Build a configuration directly, with default timeouts. Useful
    /// for tests and embedding.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_base_url` is not a valid URL.
    pub fn new(
        api_base_url: &str,
        data_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let api_base_url = api_base_url.parse::<Url>().map_err(|e| {
            ConfigError::InvalidEnvVar("api_base_url".to_owned(), e.to_string())
        })?;
        Ok(Self {
            api_base_url,
            data_dir: data_dir.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            notification_ttl: Duration::from_secs(DEFAULT_NOTIFICATION_TTL_SECS),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse a seconds-valued environment variable with a default.
fn parse_secs(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
        Err(_) => Ok(default),
    }
}
