//! Cloud API client
//!
//! Thin typed call-throughs to the Vellum cloud REST endpoints. Requests are
//! plain JSON over HTTP; failures surface as [`ApiError`] and are never
//! retried.

mod teams;

pub use teams::{
    DocBookmarkResponse, EditRequestResponse, RemoteDoc, TeamInvite, TeamInviteResponse,
};

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::normalize_text_option;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API configuration: {0}")]
    InvalidConfiguration(String),
    #[error("API HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {0}")]
    Api(String),
    #[error("Invalid API payload: {0}")]
    InvalidPayload(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// HTTP client for the cloud API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for the given base URL and optional bearer token.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            token: normalize_text_option(token),
            client: reqwest::Client::builder().build()?,
        })
    }

    pub(crate) async fn post(&self, path: &str) -> ApiResult<String> {
        self.send(Method::POST, path, None::<&()>).await
    }

    pub(crate) async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> ApiResult<String> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub(crate) async fn delete(&self, path: &str) -> ApiResult<String> {
        self.send(Method::DELETE, path, None::<&()>).await
    }

    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<String> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self
            .client
            .request(method, &url)
            .header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ApiError::Api(parse_api_error(status, &text)));
        }

        Ok(text)
    }
}

fn normalize_base_url(base_url: String) -> ApiResult<String> {
    let base_url = base_url.trim().trim_end_matches('/').to_string();
    if base_url.is_empty() {
        return Err(ApiError::InvalidConfiguration(
            "API base URL must not be empty".to_string(),
        ));
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ApiError::InvalidConfiguration(format!(
            "API base URL must be http(s): {base_url}"
        )));
    }
    Ok(base_url)
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        let compact: String = trimmed.chars().take(180).collect();
        format!("{compact} ({})", status.as_u16())
    }
}
