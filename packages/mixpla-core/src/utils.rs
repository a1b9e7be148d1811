//! General utilities shared across the application.

use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Time Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the current Unix timestamp in milliseconds.
///
/// Returns 0 if the system clock is before the Unix epoch (shouldn't happen in practice).
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Station Slug Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum accepted length of a station slug.
const MAX_SLUG_LEN: usize = 64;

/// Errors from station slug validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugValidationError {
    /// Slug is empty or whitespace-only.
    #[error("Station slug is empty")]
    Empty,

    /// Slug contains a character outside `[A-Za-z0-9_-]`.
    #[error("Station slug contains invalid character '{0}'")]
    InvalidCharacter(char),

    /// Slug exceeds the maximum length.
    #[error("Station slug is too long ({0} > {MAX_SLUG_LEN} characters)")]
    TooLong(usize),
}

/// Validates a station slug before it is interpolated into a backend URL.
///
/// Slugs are single path segments (`sexta`, `aizoo`, ...); anything that
/// could alter the request path is rejected.
pub fn validate_station_slug(slug: &str) -> Result<(), SlugValidationError> {
    if slug.trim().is_empty() {
        return Err(SlugValidationError::Empty);
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(SlugValidationError::TooLong(slug.len()));
    }
    for c in slug.chars() {
        if !(c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(SlugValidationError::InvalidCharacter(c));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_millis_is_monotonic_enough() {
        let a = now_millis();
        let b = now_millis();
        assert!(b >= a);
    }

    #[test]
    fn accepts_known_station_slugs() {
        for slug in ["sexta", "aizoo", "bratan", "labirints", "lo-fi_24"] {
            assert!(validate_station_slug(slug).is_ok(), "rejected {slug}");
        }
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert_eq!(validate_station_slug(""), Err(SlugValidationError::Empty));
        assert_eq!(validate_station_slug("  "), Err(SlugValidationError::Empty));
    }

    #[test]
    fn rejects_path_altering_characters() {
        assert_eq!(
            validate_station_slug("a/b"),
            Err(SlugValidationError::InvalidCharacter('/'))
        );
        assert_eq!(
            validate_station_slug("a b"),
            Err(SlugValidationError::InvalidCharacter(' '))
        );
        assert_eq!(
            validate_station_slug("a?x=1"),
            Err(SlugValidationError::InvalidCharacter('?'))
        );
    }

    #[test]
    fn rejects_oversized_slug() {
        let slug = "x".repeat(65);
        assert_eq!(
            validate_station_slug(&slug),
            Err(SlugValidationError::TooLong(65))
        );
    }
}
