//! Shared HTTP plumbing for backend adapters and the transcript client.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::{Error, Result};

/// Where and how to reach a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Join a path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Build a client whose timeout covers the whole request.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Whether a status means "try again later".
pub(crate) fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// Map a non-success backend status to a classified error.
pub(crate) fn status_error(provider: &'static str, status: StatusCode, body: &str) -> Error {
    let message = format!("HTTP {}: {}", status, snippet(body));
    if is_transient_status(status) {
        Error::provider_unavailable(provider, message)
    } else {
        Error::provider_rejected(provider, message)
    }
}

/// Map a transport-level failure to a classified error.
pub(crate) fn transport_error(provider: &'static str, error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::provider_unavailable(provider, format!("Request timed out: {}", error))
    } else if error.is_connect() || error.is_request() {
        Error::provider_unavailable(provider, format!("Connection error: {}", error))
    } else if error.is_decode() {
        Error::provider_rejected(provider, format!("Unreadable response: {}", error))
    } else {
        Error::provider_unavailable(provider, format!("Request error: {}", error))
    }
}

/// First 200 characters of a response body, for error messages.
pub(crate) fn snippet(body: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}
