//! Centralized error types for the Mixpla player core.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Exposes machine-readable error codes for UI surfaces
//! - Converts module-level errors into the application-wide [`MixplaError`]

use serde::Serialize;
use thiserror::Error;

use crate::auth::AuthError;
use crate::player::engine::EngineError;
use crate::station::client::{StatusError, WakeError};
use crate::utils::SlugValidationError;

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code for UI surfaces.
    fn code(&self) -> &'static str;
}

impl ErrorCode for StatusError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_, _) => "http_error_status",
            Self::StationAsleep => "station_asleep",
            Self::Parse(_) => "status_parse_error",
            Self::Auth(_) => "authentication_failed",
        }
    }
}

impl ErrorCode for WakeError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_, _) => "http_error_status",
            Self::Auth(_) => "authentication_failed",
        }
    }
}

impl ErrorCode for AuthError {
    fn code(&self) -> &'static str {
        match self {
            Self::RefreshFailed(_) => "token_refresh_failed",
        }
    }
}

impl ErrorCode for EngineError {
    fn code(&self) -> &'static str {
        match self {
            Self::Command(_) => "engine_command_failed",
        }
    }
}

/// Application-wide error type for the Mixpla player core.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum MixplaError {
    /// Station status could not be fetched.
    #[error("Status fetch failed: {0}")]
    Status(String),

    /// Wake-up request failed.
    #[error("Wake-up failed: {0}")]
    Wake(String),

    /// Authentication with the backend failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Playback engine command failed.
    #[error("Playback failed: {0}")]
    Playback(String),

    /// Requested station does not exist in the directory.
    #[error("Station not found: {0}")]
    StationNotFound(String),

    /// Station slug failed validation.
    ///
    /// Slugs are embedded in endpoint paths, so anything that could alter
    /// the path is rejected before a request is built.
    #[error("Invalid station slug: {0}")]
    InvalidSlug(String),

    /// Caller supplied an invalid or malformed request.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Player configuration error (missing or out-of-range settings).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MixplaError {
    /// Returns a machine-readable error code for UI surfaces.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Status(_) => "status_fetch_failed",
            Self::Wake(_) => "wake_failed",
            Self::Auth(_) => "authentication_failed",
            Self::Playback(_) => "playback_failed",
            Self::StationNotFound(_) => "station_not_found",
            Self::InvalidSlug(_) => "invalid_slug",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Result Type Aliases
// ─────────────────────────────────────────────────────────────────────────────

// Re-export Result type aliases from their defining modules
pub use crate::auth::AuthResult;
pub use crate::player::engine::EngineResult;
pub use crate::station::client::{StatusResult, WakeResult};

/// Convenient Result alias for application-wide operations.
pub type MixplaResult<T> = Result<T, MixplaError>;

impl From<StatusError> for MixplaError {
    fn from(err: StatusError) -> Self {
        match err {
            StatusError::Auth(msg) => Self::Auth(msg),
            other => Self::Status(other.to_string()),
        }
    }
}

impl From<WakeError> for MixplaError {
    fn from(err: WakeError) -> Self {
        match err {
            WakeError::Auth(msg) => Self::Auth(msg),
            other => Self::Wake(other.to_string()),
        }
    }
}

impl From<AuthError> for MixplaError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err.to_string())
    }
}

impl From<EngineError> for MixplaError {
    fn from(err: EngineError) -> Self {
        Self::Playback(err.to_string())
    }
}

impl From<SlugValidationError> for MixplaError {
    fn from(err: SlugValidationError) -> Self {
        Self::InvalidSlug(err.to_string())
    }
}
