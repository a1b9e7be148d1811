//! HTTP client for the radio backend REST API.
//!
//! This module handles transport and response classification. Higher-level
//! polling behavior lives in the service layer; the client's job is turning
//! HTTP responses into typed outcomes, including the backend's convention of
//! reporting an intentionally offline station as a 404 with a marker body.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use super::traits::{StationDirectorySource, StationStatusSource, StationWakeControl};
use super::types::{StationStatus, StationSummary};
use crate::auth::{AuthResult, TokenManager};
use crate::context::ApiContext;
use crate::protocol_constants::ASLEEP_BODY_SENTINEL;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur while fetching station status or the directory.
#[derive(Debug, Error)]
pub enum StatusError {
    /// HTTP request to the backend failed (transport level).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an unexpected HTTP status.
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),

    /// Backend reported the station as intentionally asleep.
    #[error("Station is not broadcasting")]
    StationAsleep,

    /// Backend response body could not be parsed.
    #[error("Failed to parse status response: {0}")]
    Parse(String),

    /// Request could not be authorized or was rejected as unauthorized.
    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// Convenient Result alias for status operations.
pub type StatusResult<T> = Result<T, StatusError>;

/// Errors that can occur while waking a station.
#[derive(Debug, Error)]
pub enum WakeError {
    /// HTTP request to the backend failed (transport level).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned an unexpected HTTP status.
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),

    /// Request could not be authorized or was rejected as unauthorized.
    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// Convenient Result alias for wake operations.
pub type WakeResult<T> = Result<T, WakeError>;

// ─────────────────────────────────────────────────────────────────────────────
// Response Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Classifies a status endpoint response.
///
/// The asleep marker is checked before generic status handling: the backend
/// reports an intentionally offline station as a 404 whose body carries the
/// marker phrase, and that is an expected outcome rather than a failure.
/// A 404 without the marker (unknown slug, misrouted request) stays an error.
fn interpret_status_response(status: u16, body: &str) -> StatusResult<StationStatus> {
    if status == 404 && body.contains(ASLEEP_BODY_SENTINEL) {
        return Err(StatusError::StationAsleep);
    }

    match status {
        200..=299 => serde_json::from_str(body).map_err(|e| StatusError::Parse(e.to_string())),
        401 | 403 => Err(StatusError::Auth(format!("HTTP {status}"))),
        _ => Err(StatusError::HttpStatus(status, truncate_body(body))),
    }
}

/// Truncates a response body for error messages, respecting char boundaries.
fn truncate_body(body: &str) -> String {
    const MAX_LEN: usize = 200;
    if body.len() <= MAX_LEN {
        return body.to_string();
    }
    let mut end = MAX_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the radio backend.
///
/// Cheap to clone the inner `reqwest::Client`; one instance is shared by all
/// services. When a token manager is attached, every request carries a bearer
/// token and a 401/403 response drops the cached token so the next request
/// starts from a fresh one.
pub struct RadioHttpClient {
    http: Client,
    context: ApiContext,
    tokens: Option<Arc<TokenManager>>,
}

impl RadioHttpClient {
    /// Creates a client for an unauthenticated backend.
    #[must_use]
    pub fn new(http: Client, context: ApiContext) -> Self {
        Self {
            http,
            context,
            tokens: None,
        }
    }

    /// Creates a client that authorizes every request via `tokens`.
    #[must_use]
    pub fn with_token_manager(http: Client, context: ApiContext, tokens: Arc<TokenManager>) -> Self {
        Self {
            http,
            context,
            tokens: Some(tokens),
        }
    }

    /// Returns the endpoint context this client talks to.
    #[must_use]
    pub fn context(&self) -> &ApiContext {
        &self.context
    }

    /// Attaches a bearer token to the request if a token manager is configured.
    async fn authorize(&self, request: reqwest::RequestBuilder) -> AuthResult<reqwest::RequestBuilder> {
        match &self.tokens {
            Some(manager) => {
                let token = manager.bearer_token().await?;
                Ok(request.bearer_auth(token))
            }
            None => Ok(request),
        }
    }

    /// Drops the cached token after the backend rejected it.
    async fn invalidate_token(&self) {
        if let Some(manager) = &self.tokens {
            manager.invalidate().await;
        }
    }
}

#[async_trait]
impl StationStatusSource for RadioHttpClient {
    async fn fetch_status(&self, slug: &str) -> StatusResult<StationStatus> {
        let url = self.context.status_url(slug);
        log::debug!("[RadioClient] GET {}", url);

        let request = self
            .authorize(self.http.get(&url))
            .await
            .map_err(|e| StatusError::Auth(e.to_string()))?;
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        let outcome = interpret_status_response(status, &body);
        if matches!(outcome, Err(StatusError::Auth(_))) {
            self.invalidate_token().await;
        }
        outcome
    }
}

#[async_trait]
impl StationDirectorySource for RadioHttpClient {
    async fn fetch_stations(&self) -> StatusResult<Vec<StationSummary>> {
        let url = self.context.stations_url();
        log::debug!("[RadioClient] GET {}", url);

        let request = self
            .authorize(self.http.get(&url))
            .await
            .map_err(|e| StatusError::Auth(e.to_string()))?;
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        match status {
            200..=299 => serde_json::from_str(&body).map_err(|e| StatusError::Parse(e.to_string())),
            401 | 403 => {
                self.invalidate_token().await;
                Err(StatusError::Auth(format!("HTTP {status}")))
            }
            _ => Err(StatusError::HttpStatus(status, truncate_body(&body))),
        }
    }
}

#[async_trait]
impl StationWakeControl for RadioHttpClient {
    async fn wake(&self, slug: &str) -> WakeResult<()> {
        let url = self.context.wakeup_url(slug);
        log::info!("[RadioClient] PUT {}", url);

        let request = self
            .authorize(self.http.put(&url))
            .await
            .map_err(|e| WakeError::Auth(e.to_string()))?;
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        match status {
            200..=299 => Ok(()),
            401 | 403 => {
                self.invalidate_token().await;
                Err(WakeError::Auth(format!("HTTP {status}")))
            }
            _ => Err(WakeError::HttpStatus(status, truncate_body(&body))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_response_parses_payload() {
        let body = r#"{"name": "Bratan", "currentStatus": "ON_LINE"}"#;
        let status = interpret_status_response(200, body).unwrap();
        assert_eq!(status.name, "Bratan");
        assert_eq!(status.current_status.as_deref(), Some("ON_LINE"));
    }

    #[test]
    fn not_found_with_marker_means_asleep() {
        let body = format!("<html>{ASLEEP_BODY_SENTINEL}</html>");
        assert!(matches!(
            interpret_status_response(404, &body),
            Err(StatusError::StationAsleep)
        ));
    }

    #[test]
    fn not_found_without_marker_is_an_http_error() {
        assert!(matches!(
            interpret_status_response(404, "no such station"),
            Err(StatusError::HttpStatus(404, _))
        ));
    }

    #[test]
    fn malformed_payload_is_a_parse_error() {
        assert!(matches!(
            interpret_status_response(200, "<html>not json</html>"),
            Err(StatusError::Parse(_))
        ));
    }

    #[test]
    fn unauthorized_statuses_map_to_auth_errors() {
        assert!(matches!(
            interpret_status_response(401, ""),
            Err(StatusError::Auth(_))
        ));
        assert!(matches!(
            interpret_status_response(403, ""),
            Err(StatusError::Auth(_))
        ));
    }

    #[test]
    fn server_errors_keep_their_status() {
        match interpret_status_response(503, "maintenance") {
            Err(StatusError::HttpStatus(status, body)) => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn long_bodies_are_truncated_for_errors() {
        let body = "x".repeat(500);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        let body = "é".repeat(200);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert!(truncated.chars().all(|c| c == 'é' || c == '.'));
    }
}
