//! Client configuration from environment variables.

use std::env;

/// Base URL of the public NoteHub API.
pub const DEFAULT_BASE_URL: &str = "https://notehub-public.goit.study/api";

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "NOTEHUB_TOKEN";

/// Environment variable overriding the base URL.
pub const URL_ENV: &str = "NOTEHUB_URL";

/// Immutable client configuration.
///
/// Built once at process start and shared by reference with every API
/// call; there is no per-call override of the endpoint or credential.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL without a trailing slash.
    base_url: String,
    /// Bearer token, without the `Bearer ` prefix.
    token: String,
}

impl ClientConfig {
    /// Creates a configuration from explicit values.
    ///
    /// A trailing slash on `base_url` and a leading `Bearer ` on `token`
    /// are stripped so both spellings of either are accepted.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: URL_ENV.to_string(),
                reason: "base URL is empty".to_string(),
            });
        }

        let token = token.into();
        let token = token.strip_prefix("Bearer ").unwrap_or(&token).trim().to_string();
        if token.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: TOKEN_ENV.to_string(),
                reason: "token is empty".to_string(),
            });
        }

        Ok(Self { base_url, token })
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `NOTEHUB_TOKEN`: API token
    ///
    /// Optional:
    /// - `NOTEHUB_URL`: API base URL (default: [`DEFAULT_BASE_URL`])
    pub fn from_env() -> Result<Self, ConfigError> {
        let token =
            env::var(TOKEN_ENV).map_err(|_| ConfigError::MissingEnvVar(TOKEN_ENV.to_string()))?;
        let base_url = env::var(URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Self::new(base_url, token)
    }

    /// Base URL of the API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Value of the `Authorization` header sent on every request.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Absolute URL for an API path such as `/notes`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}
