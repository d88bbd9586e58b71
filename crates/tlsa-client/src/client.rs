//! DNS provider REST client implementation.

use crate::api::DnsApi;
use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tlsa_core::{Result, TlsaError};
use tracing::{debug, warn};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for the DNS provider
#[derive(Clone)]
pub struct ProviderClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    token: String,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ProviderClient {
    /// Create a new client with the given access token using default settings
    pub fn new(token: impl Into<String>) -> Result<Self> {
        ProviderClientBuilder::new(token).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder(token: impl Into<String>) -> ProviderClientBuilder {
        ProviderClientBuilder::new(token)
    }

    /// Create a client from a [`ClientConfig`], resolving its token
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        ProviderClientBuilder::new(config.resolve_token()?)
            .base_url(&config.base_url)
            .timeout(config.timeout())
            .build()
    }

    /// Access DNS zone endpoints
    #[must_use]
    pub fn dns(&self) -> DnsApi<'_> {
        DnsApi::new(self)
    }

    /// Perform a GET request
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, resource: &str) -> Result<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "GET request");

        let response = self
            .inner
            .http
            .get(url)
            .bearer_auth(&self.inner.token)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        self.handle_response(response, resource).await
    }

    /// Perform a PUT request with JSON body, expecting no content back
    pub(crate) async fn put<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        resource: &str,
    ) -> Result<()> {
        let url = self.build_url(path)?;
        debug!(url = %url, "PUT request");

        let response = self
            .inner
            .http
            .put(url)
            .bearer_auth(&self.inner.token)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        self.handle_empty_response(response, resource).await
    }

    /// Map a failed transfer to [`TlsaError::Timeout`] or [`TlsaError::Http`]
    fn transport_error(&self, err: &reqwest::Error) -> TlsaError {
        if err.is_timeout() {
            warn!(timeout_secs = self.inner.timeout.as_secs(), "provider request timed out");
            TlsaError::Timeout(self.inner.timeout.as_secs())
        } else {
            TlsaError::Http(err.to_string())
        }
    }

    /// Join the base URL and an endpoint path
    fn build_url(&self, path: &str) -> Result<url::Url> {
        let raw = format!("{}{}", self.inner.base_url.trim_end_matches('/'), path);
        url::Url::parse(&raw).map_err(|e| TlsaError::Config(format!("invalid URL {raw}: {e}")))
    }

    /// Handle an API response that returns JSON
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| self.transport_error(&e))?;
            serde_json::from_str(&body).map_err(TlsaError::Json)
        } else {
            self.handle_error(status.as_u16(), response, resource).await
        }
    }

    /// Handle an API response that returns no body
    async fn handle_empty_response(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            self.handle_error(status.as_u16(), response, resource).await
        }
    }

    /// Convert an error response to a TlsaError
    async fn handle_error<T>(
        &self,
        status: u16,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T> {
        let body = response.text().await.unwrap_or_default();

        // Try to parse error message from JSON
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or(body);

        match status {
            401 | 403 => {
                warn!(status, "provider rejected credentials");
                Err(TlsaError::Unauthorized)
            }
            404 => Err(TlsaError::ZoneNotFound {
                zone: resource.to_string(),
            }),
            _ => Err(TlsaError::Api {
                code: status,
                message,
            }),
        }
    }
}

/// Builder for configuring a [`ProviderClient`]
pub struct ProviderClientBuilder {
    token: String,
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl ProviderClientBuilder {
    /// Create a new builder with the given access token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("update-tlsa/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set the base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ProviderClient> {
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .gzip(true)
            .build()
            .map_err(|e| TlsaError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(ProviderClient {
            inner: Arc::new(ClientInner {
                http,
                token: self.token,
                base_url: self.base_url,
                timeout: self.timeout,
            }),
        })
    }
}
