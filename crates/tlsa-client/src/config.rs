//! Provider configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use tlsa_core::{Result, TlsaError};

/// Default provider API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.transip.nl/v6";

/// Environment variable consulted when no token is configured
pub const DEFAULT_TOKEN_ENV: &str = "TLSA_PROVIDER_TOKEN";

/// Connection settings for the DNS provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Access token, stored inline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Name of an environment variable holding the access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            token_env: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for `base_url` with an inline token
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: Some(token.into()),
            ..Self::default()
        }
    }

    /// Request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve the access token: inline value first, then the configured
    /// environment variable, then [`DEFAULT_TOKEN_ENV`].
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(token.clone());
        }

        let var = self.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV);
        std::env::var(var)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                TlsaError::Config(format!(
                    "no provider token configured (set `token` or the {var} environment variable)"
                ))
            })
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.token.is_none());
    }

    #[test]
    fn test_inline_token_wins() {
        let config = ClientConfig {
            token_env: Some("TLSA_CLIENT_TEST_UNSET_VAR".into()),
            ..ClientConfig::new("http://localhost", "secret")
        };
        assert_eq!(config.resolve_token().unwrap(), "secret");
    }

    #[test]
    fn test_token_from_named_env_var() {
        std::env::set_var("TLSA_CLIENT_TEST_TOKEN_A", "from-env");
        let config = ClientConfig {
            token_env: Some("TLSA_CLIENT_TEST_TOKEN_A".into()),
            ..ClientConfig::default()
        };
        assert_eq!(config.resolve_token().unwrap(), "from-env");
    }

    #[test]
    fn test_missing_token_is_config_error() {
        let config = ClientConfig {
            token_env: Some("TLSA_CLIENT_TEST_TOKEN_NEVER_SET".into()),
            ..ClientConfig::default()
        };
        assert!(matches!(config.resolve_token(), Err(TlsaError::Config(_))));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ClientConfig = serde_json::from_str(r#"{"token_env":"MY_TOKEN"}"#).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token_env.as_deref(), Some("MY_TOKEN"));
        assert_eq!(config.timeout_secs, 30);
    }
}
