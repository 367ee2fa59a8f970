//! Configuration types for the backend client.

use std::time::Duration;

/// Connection settings for the indexing service.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the service, e.g. `http://127.0.0.1:7700`.
    pub url: String,
    /// API key sent as a bearer token. `None` for an unprotected instance.
    pub api_key: Option<String>,
    /// Timeout applied to each individual HTTP request.
    pub request_timeout: Duration,
}

impl BackendConfig {
    /// Create a config for the given URL with no API key.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}
