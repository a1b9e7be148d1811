//! Bearer token management for authenticated backend requests.
//!
//! Tokens are cached and reused until they come within a configured refresh
//! margin of expiry, so request paths rarely pay a refresh round-trip and
//! never send a token that is about to lapse mid-flight.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::utils::now_millis;

/// Errors from token acquisition.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token source failed to produce a fresh token.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
}

/// Convenient Result alias for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// A bearer token together with its expiry time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken {
    /// Opaque token value sent in the `Authorization` header.
    pub token: String,
    /// Unix timestamp in milliseconds at which the token expires.
    pub expires_at_ms: u64,
}

impl BearerToken {
    /// Creates a token that never expires.
    #[must_use]
    pub fn perpetual(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at_ms: u64::MAX,
        }
    }

    /// Returns true if the token remains valid for at least `margin` from now.
    #[must_use]
    pub fn valid_for(&self, margin: Duration) -> bool {
        let margin_ms = margin.as_millis() as u64;
        self.expires_at_ms.saturating_sub(now_millis()) >= margin_ms
    }
}

/// Trait for producing bearer tokens.
///
/// Implementations wrap whatever credential flow the embedder uses: a fixed
/// config-file token, an OAuth refresh exchange, a keychain lookup.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Produces a fresh bearer token.
    async fn issue(&self) -> AuthResult<BearerToken>;
}

/// Token source backed by a fixed, pre-issued token that never expires.
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    /// Creates a source that always hands out `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn issue(&self) -> AuthResult<BearerToken> {
        Ok(BearerToken::perpetual(self.token.clone()))
    }
}

/// Caches bearer tokens and refreshes them ahead of expiry.
///
/// A cached token is reused while it stays valid for at least the configured
/// minimum validity window; once it slips inside that window, a replacement
/// is requested from the source before the pending request proceeds.
pub struct TokenManager {
    source: Arc<dyn TokenSource>,
    min_validity: Duration,
    cached: Mutex<Option<BearerToken>>,
}

impl TokenManager {
    /// Creates a manager over `source` with the given minimum validity window.
    pub fn new(source: Arc<dyn TokenSource>, min_validity: Duration) -> Self {
        Self {
            source,
            min_validity,
            cached: Mutex::new(None),
        }
    }

    /// Returns a token value valid for at least the minimum validity window.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable token is cached and the source fails to
    /// issue a replacement.
    pub async fn bearer_token(&self) -> AuthResult<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.valid_for(self.min_validity) {
                return Ok(token.token.clone());
            }
            log::debug!("[TokenManager] Cached token inside refresh margin, refreshing");
        }

        let fresh = self.source.issue().await?;
        let value = fresh.token.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    /// Drops the cached token so the next request forces a refresh.
    ///
    /// Called when the backend rejects a token the manager still considered
    /// valid (revocation, server-side clock skew).
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
