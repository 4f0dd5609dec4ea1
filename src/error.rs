//! Error types for Dirgraph
//!
//! This module defines all error types used throughout the crate, using
//! `thiserror` for ergonomic error handling. The variant names mirror the
//! failure taxonomy of the public facade: configuration problems are fatal
//! and never retried, token-exchange failures may be retried by the caller,
//! and membership mutations report conflict/not-found/transport separately
//! so the caller can decide what is terminal for a given call.

use thiserror::Error;

/// Main error type for Dirgraph operations
///
/// Encompasses all failures that can occur during configuration loading,
/// token acquisition, query construction, and directory read/write calls.
/// The crate never swallows errors; every failure propagates to the caller
/// carrying its kind. Retry policy is the caller's responsibility.
#[derive(Error, Debug)]
pub enum DirGraphError {
    /// Missing or malformed credential configuration. Fatal; fix the
    /// configuration rather than retrying.
    #[error("Auth configuration error: {0}")]
    AuthConfig(String),

    /// Token exchange rejected or failed (network failure, invalid
    /// credential, denied scope). The caller may retry with backoff.
    #[error("Authentication failure: {0}")]
    AuthFailure(String),

    /// Malformed query parameters. Fatal for the call; the caller must fix
    /// its input.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A membership mutation hit a service-reported conflict, e.g. adding a
    /// principal that is already a member.
    #[error("Membership conflict: {0}")]
    MembershipConflict(String),

    /// The group or the referenced principal does not exist. For removals
    /// this also covers "was not a member".
    #[error("Membership target not found: {0}")]
    MembershipNotFound(String),

    /// Network or auth failure while talking to the membership endpoints.
    /// May be retried by the caller.
    #[error("Membership transport error: {0}")]
    MembershipTransport(String),

    /// The directory service returned a non-success status for a read
    /// operation. May be retried by the caller.
    #[error("Service error: {0}")]
    Service(String),

    /// An operation was invoked on a facade that has not been initialized.
    #[error("Facade not initialized: {0}")]
    NotInitialized(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for Dirgraph operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

/// Caps a response body excerpt so a large error page does not flood error
/// messages or logs. Cuts on a character boundary.
pub(crate) fn excerpt(body: &str, max: usize) -> &str {
    match body.char_indices().nth(max) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_error_display() {
        let error = DirGraphError::AuthConfig("tenant id is empty".to_string());
        assert_eq!(
            error.to_string(),
            "Auth configuration error: tenant id is empty"
        );
    }

    #[test]
    fn test_auth_failure_display() {
        let error = DirGraphError::AuthFailure("invalid_client".to_string());
        assert_eq!(error.to_string(), "Authentication failure: invalid_client");
    }

    #[test]
    fn test_validation_error_display() {
        let error = DirGraphError::Validation("top exceeds cap".to_string());
        assert_eq!(error.to_string(), "Validation error: top exceeds cap");
    }

    #[test]
    fn test_membership_conflict_display() {
        let error = DirGraphError::MembershipConflict("already a member".to_string());
        assert_eq!(error.to_string(), "Membership conflict: already a member");
    }

    #[test]
    fn test_membership_not_found_display() {
        let error = DirGraphError::MembershipNotFound("group G".to_string());
        assert_eq!(error.to_string(), "Membership target not found: group G");
    }

    #[test]
    fn test_membership_transport_display() {
        let error = DirGraphError::MembershipTransport("HTTP 503".to_string());
        assert_eq!(error.to_string(), "Membership transport error: HTTP 503");
    }

    #[test]
    fn test_service_error_display() {
        let error = DirGraphError::Service("HTTP 502".to_string());
        assert_eq!(error.to_string(), "Service error: HTTP 502");
    }

    #[test]
    fn test_not_initialized_display() {
        let error = DirGraphError::NotInitialized("call initialize() first".to_string());
        assert_eq!(
            error.to_string(),
            "Facade not initialized: call initialize() first"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: DirGraphError = json_error.into();
        assert!(matches!(error, DirGraphError::Serialization(_)));
    }

    #[test]
    fn test_url_error_conversion() {
        let url_error = url::Url::parse("not a url").unwrap_err();
        let error: DirGraphError = url_error.into();
        assert!(matches!(error, DirGraphError::Url(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DirGraphError>();
    }

    // -----------------------------------------------------------------------
    // excerpt
    // -----------------------------------------------------------------------

    #[test]
    fn test_excerpt_short_body_unchanged() {
        assert_eq!(excerpt("short", 256), "short");
    }

    #[test]
    fn test_excerpt_caps_long_body() {
        let long = "x".repeat(300);
        assert_eq!(excerpt(&long, 256).len(), 256);
    }
}
