//! Bearer token value object

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bearer access token together with its expiry.
///
/// Derived from a [`Credential`](crate::auth::Credential) on demand by the
/// [`CredentialProvider`](crate::auth::CredentialProvider). The provider
/// never hands out a token past its expiry; callers can treat a returned
/// token as valid at the moment of return.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use dirgraph::auth::Token;
///
/// let token = Token {
///     value: "tok".to_string(),
///     expires_at: Utc::now() + Duration::hours(1),
/// };
/// assert!(!token.is_expired());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// The access token string issued by the authorization server.
    pub value: String,

    /// UTC timestamp at which the access token expires.
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Returns `true` when the token is expired or about to expire.
    ///
    /// A 60-second buffer is applied so that a token returned from the
    /// cache is still accepted by the resource server for the duration of
    /// the request that uses it.
    pub fn is_expired(&self) -> bool {
        let buffer = chrono::Duration::seconds(60);
        Utc::now() >= self.expires_at - buffer
    }

    /// Formats the token as an `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }
}
