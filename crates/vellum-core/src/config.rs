//! Client configuration
//!
//! Resolves the endpoints a client needs from environment variables:
//! `VELLUM_API_URL`/`VELLUM_API_TOKEN` for the cloud API and
//! `VELLUM_REMOTE_URL`/`VELLUM_REMOTE_TOKEN` for replica sync.

use crate::api::{ApiClient, ApiResult};
use crate::db::RemoteConfig;

/// Runtime client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: Option<String>,
    pub api_token: Option<String>,
    pub remote_url: Option<String>,
    pub remote_token: Option<String>,
}

impl ClientConfig {
    /// Resolve configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration through a lookup function.
    ///
    /// Public for testability — callers can exercise resolution without
    /// touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_base_url: normalize_text_option(lookup("VELLUM_API_URL")),
            api_token: normalize_text_option(lookup("VELLUM_API_TOKEN")),
            remote_url: normalize_text_option(lookup("VELLUM_REMOTE_URL")),
            remote_token: normalize_text_option(lookup("VELLUM_REMOTE_TOKEN")),
        }
    }

    /// Replica sync configuration, when both remote values are present.
    #[must_use]
    pub fn remote_config(&self) -> Option<RemoteConfig> {
        match (&self.remote_url, &self.remote_token) {
            (Some(url), Some(token)) => Some(RemoteConfig::new(url, token)),
            _ => None,
        }
    }

    /// Cloud API client, when a base URL is configured.
    pub fn api_client(&self) -> ApiResult<Option<ApiClient>> {
        match &self.api_base_url {
            Some(url) => Ok(Some(ApiClient::new(url, self.api_token.clone())?)),
            None => Ok(None),
        }
    }
}

/// Normalize optional text by trimming whitespace and removing empties.
pub(crate) fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
