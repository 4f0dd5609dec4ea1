//! Authenticated session over the directory service
//!
//! A [`Session`] binds one [`CredentialProvider`] to one shared
//! `reqwest::Client` and the service base URL. Every request built through
//! the session carries a freshly validated bearer token; the token cache
//! inside the provider makes this cheap for back-to-back calls.
//!
//! The session is the crate's request-adapter seam: everything above it
//! (facade, membership client) expresses operations as paths and payloads,
//! and everything below it (token exchange, HTTP transport) stays
//! replaceable in tests by pointing the base URLs at a mock server.

use std::sync::Arc;

use reqwest::Method;

use crate::auth::{CredentialProvider, Token};
use crate::error::{DirGraphError, Result};

/// One authenticated binding of credential to service.
///
/// Lives for the lifetime of the facade that owns it; holds no per-call
/// state. Dropping the session releases everything, there is no explicit
/// teardown.
pub struct Session {
    /// Shared HTTP client, also used by the credential provider.
    http: Arc<reqwest::Client>,

    /// Token source for this session's scope set.
    credentials: Arc<CredentialProvider>,

    /// Directory service base URL, e.g. `https://graph.microsoft.com/v1.0`.
    service_base: url::Url,

    /// Scope set requested for every token.
    scopes: Vec<String>,
}

impl Session {
    /// Binds a credential provider to a service base.
    ///
    /// # Errors
    ///
    /// Returns [`DirGraphError::AuthConfig`] when `service_base` does not
    /// parse as a URL.
    pub fn new(
        http: Arc<reqwest::Client>,
        credentials: Arc<CredentialProvider>,
        service_base: &str,
        scopes: Vec<String>,
    ) -> Result<Self> {
        let service_base = url::Url::parse(service_base).map_err(|e| {
            DirGraphError::AuthConfig(format!("service base is not a valid URL: {}", e))
        })?;
        Ok(Self {
            http,
            credentials,
            service_base,
            scopes,
        })
    }

    /// The service base URL this session talks to.
    pub fn service_base(&self) -> &url::Url {
        &self.service_base
    }

    /// Returns a valid bearer token for this session's scope set.
    ///
    /// Delegates to the credential provider, which reuses its cached token
    /// while it remains valid.
    pub async fn bearer(&self) -> Result<Token> {
        self.credentials.get_token(&self.scopes).await
    }

    /// Resolves a service-relative path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<url::Url> {
        let url = url::Url::parse(&format!(
            "{}/{}",
            self.service_base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/'),
        ))?;
        Ok(url)
    }

    /// Builds a request for `path` with a validated bearer token attached.
    ///
    /// The caller finishes the request (query pairs, JSON body) and sends
    /// it. Cancellation propagates naturally: dropping the returned future
    /// aborts the underlying I/O, and the shared client's per-request
    /// timeout bounds a stalled call.
    pub async fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder> {
        let token = self.bearer().await?;
        let url = self.endpoint(path)?;
        Ok(self
            .http
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, token.bearer()))
    }
}
