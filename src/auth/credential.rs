//! Client-credentials token acquisition and caching
//!
//! [`CredentialProvider`] wraps the OAuth2 client-credentials grant for a
//! confidential application. It owns the [`Credential`] exclusively,
//! performs the token exchange against the authority's token endpoint, and
//! caches one [`Token`] per distinct scope set so repeated facade calls do
//! not re-authenticate.
//!
//! # Thread safety
//!
//! The token cache sits behind a `tokio::sync::Mutex`, so concurrent
//! callers sharing one provider through an `Arc` are serialized on cache
//! reads and refreshes; no caller can observe a half-updated token.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::auth::token::Token;
use crate::error::{excerpt, DirGraphError, Result};

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// The confidential application's identity: tenant, client id, and client
/// secret. Immutable once constructed.
///
/// Construction validates that no field is empty; a malformed credential is
/// rejected before any network call is possible.
///
/// # Examples
///
/// ```
/// use dirgraph::auth::Credential;
///
/// let credential = Credential::new("tenant", "client", "secret").unwrap();
/// assert_eq!(credential.tenant_id(), "tenant");
///
/// assert!(Credential::new("tenant", "", "secret").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Credential {
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

impl Credential {
    /// Builds a credential, rejecting empty or whitespace-only fields.
    ///
    /// # Errors
    ///
    /// Returns [`DirGraphError::AuthConfig`] naming the offending field.
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        let credential = Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        };
        for (name, value) in [
            ("tenant_id", &credential.tenant_id),
            ("client_id", &credential.client_id),
            ("client_secret", &credential.client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(DirGraphError::AuthConfig(format!(
                    "{} must not be empty",
                    name
                ))
                .into());
            }
        }
        Ok(credential)
    }

    /// The directory tenant this credential authenticates against.
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Token endpoint success response (RFC 6749 §5.1 subset).
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Lifetime of the access token in seconds.
    expires_in: i64,
}

// ---------------------------------------------------------------------------
// CredentialProvider
// ---------------------------------------------------------------------------

/// Produces bearer tokens on demand via the client-credentials grant.
///
/// Holds the only copy of the client secret in the process. One token is
/// cached per distinct scope set and transparently refreshed once it nears
/// expiry.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use dirgraph::auth::{Credential, CredentialProvider};
///
/// # async fn example() -> dirgraph::error::Result<()> {
/// let credential = Credential::new("tenant", "client", "secret")?;
/// let provider = CredentialProvider::new(
///     Arc::new(reqwest::Client::new()),
///     credential,
///     "https://login.microsoftonline.com",
/// )?;
///
/// let scopes = ["https://graph.microsoft.com/.default".to_string()];
/// let token = provider.get_token(&scopes).await?;
/// println!("bearer: {}", token.value);
/// # Ok(())
/// # }
/// ```
pub struct CredentialProvider {
    /// Shared HTTP client used for all token exchanges.
    http: Arc<reqwest::Client>,

    /// The application credential. Never leaves this struct.
    credential: Credential,

    /// Fully resolved token endpoint URL.
    token_endpoint: url::Url,

    /// Cached tokens keyed by canonical scope-set key.
    cache: Mutex<HashMap<String, Token>>,
}

impl CredentialProvider {
    /// Creates a provider for the given credential and authority base.
    ///
    /// The token endpoint is derived as
    /// `{authority_base}/{tenant_id}/oauth2/v2.0/token`. No network I/O is
    /// performed at construction time.
    ///
    /// # Errors
    ///
    /// Returns [`DirGraphError::AuthConfig`] when the authority base does
    /// not parse as a URL.
    pub fn new(
        http: Arc<reqwest::Client>,
        credential: Credential,
        authority_base: &str,
    ) -> Result<Self> {
        let base = url::Url::parse(authority_base).map_err(|e| {
            DirGraphError::AuthConfig(format!("authority base is not a valid URL: {}", e))
        })?;
        let token_endpoint = url::Url::parse(&format!(
            "{}/{}/oauth2/v2.0/token",
            base.as_str().trim_end_matches('/'),
            credential.tenant_id(),
        ))?;

        Ok(Self {
            http,
            credential,
            token_endpoint,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Returns a valid bearer token for the given scope set.
    ///
    /// The resolution order is:
    ///
    /// 1. Look up the cached token for this scope set.
    /// 2. If present and not expired, return it without a network call.
    /// 3. Otherwise perform a client-credentials exchange, cache the new
    ///    token, and return it.
    ///
    /// The cache lock is held across the refresh so that concurrent callers
    /// with the same scope set trigger at most one exchange.
    ///
    /// # Errors
    ///
    /// Returns [`DirGraphError::AuthFailure`] on network failure, a rejected
    /// credential, or a denied scope.
    pub async fn get_token(&self, scopes: &[String]) -> Result<Token> {
        let key = scope_key(scopes);

        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.get(&key) {
            if !token.is_expired() {
                tracing::debug!(scopes = %key, "reusing cached token");
                return Ok(token.clone());
            }
        }

        tracing::debug!(scopes = %key, "requesting new token");
        let token = self.exchange(&key).await?;
        cache.insert(key, token.clone());
        Ok(token)
    }

    /// Performs the client-credentials exchange against the token endpoint.
    async fn exchange(&self, scope: &str) -> Result<Token> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.credential.client_id.as_str()),
            ("client_secret", self.credential.client_secret.as_str()),
            ("scope", scope),
        ];

        let response = self
            .http
            .post(self.token_endpoint.as_str())
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!(DirGraphError::AuthFailure(format!(
                    "token request failed: {}",
                    e
                )))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirGraphError::AuthFailure(format!(
                "token endpoint returned HTTP {}: {}",
                status,
                excerpt(&body, 256),
            ))
            .into());
        }

        let parsed: TokenResponse = response.json().await.map_err(|e| {
            anyhow::anyhow!(DirGraphError::AuthFailure(format!(
                "malformed token response: {}",
                e
            )))
        })?;

        // A token that is already expired on arrival is useless and would
        // poison the cache with a permanently stale entry.
        if parsed.expires_in <= 0 {
            return Err(DirGraphError::AuthFailure(format!(
                "token endpoint returned non-positive expires_in: {}",
                parsed.expires_in
            ))
            .into());
        }

        Ok(Token {
            value: parsed.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(parsed.expires_in),
        })
    }
}

/// Canonical cache key for a scope set: sorted, deduplicated, space-joined.
///
/// Two calls naming the same scopes in different order share one cache slot
/// and one wire-format `scope` parameter.
fn scope_key(scopes: &[String]) -> String {
    let mut sorted: Vec<&str> = scopes.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.join(" ")
}
