//! Public facade over the directory graph service
//!
//! [`DirectoryFacade`] composes the credential provider, query builder, and
//! membership client into the crate's public operations. It is a two-state
//! machine: constructed `Uninitialized`, it becomes `Authenticated` once
//! [`initialize`](DirectoryFacade::initialize) binds a validated
//! configuration to a [`Session`]. Every subsequent query or mutation runs
//! in the `Authenticated` state and re-validates its token through the
//! provider; a failed initialization leaves the facade uninitialized.
//!
//! # Examples
//!
//! ```no_run
//! use dirgraph::config::DirectoryConfig;
//! use dirgraph::facade::DirectoryFacade;
//! use dirgraph::query::DirectoryQueryBuilder;
//!
//! # async fn example() -> dirgraph::error::Result<()> {
//! let mut facade = DirectoryFacade::new();
//! facade.initialize(DirectoryConfig::from_env())?;
//!
//! let query = DirectoryQueryBuilder::default()
//!     .user_list_query(&["displayName", "id", "mail"], 25, &["displayName"])?;
//! for user in facade.list_users(&query).await? {
//!     println!("{}", user.display_name.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::Deserialize;

use crate::auth::{Credential, CredentialProvider, Token};
use crate::config::DirectoryConfig;
use crate::error::{DirGraphError, Result};
use crate::membership::{MembershipReferenceClient, PrincipalReference};
use crate::query::QueryParameters;
use crate::session::Session;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One directory user as returned by the user-listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Directory object identifier.
    pub id: String,

    /// Display name; absent for some service principals.
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,

    /// Primary mail address, when the directory has one on record.
    #[serde(default)]
    pub mail: Option<String>,
}

/// Collection envelope used by listing endpoints.
#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

// ---------------------------------------------------------------------------
// DirectoryFacade
// ---------------------------------------------------------------------------

/// The crate's single entry point for directory operations.
///
/// Owns the authenticated [`Session`] exclusively. Constructing a second
/// facade with its own configuration yields a fully independent session, so
/// multiple tenants can be driven from one process.
#[derive(Default)]
pub struct DirectoryFacade {
    /// `None` until [`initialize`](Self::initialize) succeeds.
    session: Option<Session>,
}

impl DirectoryFacade {
    /// Creates an uninitialized facade.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once a session is bound.
    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Validates the configuration and binds an authenticated session.
    ///
    /// Builds the shared HTTP client (with the configured per-request
    /// timeout), the [`CredentialProvider`], and the [`Session`]. No token
    /// is fetched yet; the first operation triggers the exchange. On any
    /// failure the facade remains uninitialized.
    ///
    /// # Errors
    ///
    /// Returns [`DirGraphError::AuthConfig`] for missing or malformed
    /// configuration. No network I/O is performed on the failure path.
    pub fn initialize(&mut self, config: DirectoryConfig) -> Result<()> {
        config.validate()?;

        let credential = Credential::new(
            config.tenant_id.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        )?;

        let http = Arc::new(
            reqwest::Client::builder()
                .timeout(Duration::from_secs(config.timeout_seconds))
                .build()
                .map_err(DirGraphError::Http)?,
        );

        let provider = Arc::new(CredentialProvider::new(
            Arc::clone(&http),
            credential,
            &config.authority_base,
        )?);

        let session = Session::new(
            http,
            provider,
            &config.service_base,
            config.default_scopes(),
        )?;

        tracing::info!(tenant = %config.tenant_id, "directory session initialized");
        self.session = Some(session);
        Ok(())
    }

    /// Returns a valid bearer token for the session's scope set.
    ///
    /// Exposed so callers can inspect expiry or hand the token to tooling;
    /// normal operations obtain their token internally.
    pub async fn app_token(&self) -> Result<Token> {
        self.require_session()?.bearer().await
    }

    /// Lists directory users according to the given parameter set.
    ///
    /// The parameters must come from
    /// [`DirectoryQueryBuilder`](crate::query::DirectoryQueryBuilder), which
    /// has already validated them; this call performs the I/O only.
    ///
    /// # Errors
    ///
    /// Returns [`DirGraphError::AuthFailure`] when the token exchange
    /// fails, or an HTTP-level error for a failed listing call.
    pub async fn list_users(&self, query: &QueryParameters) -> Result<Vec<User>> {
        let session = self.require_session()?;

        let response = session
            .request(Method::GET, "users")
            .await?
            .query(&query.to_pairs())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirGraphError::Service(format!(
                "user listing returned HTTP {}: {}",
                status,
                body.chars().take(256).collect::<String>(),
            ))
            .into());
        }

        let collection: Collection<User> = response.json().await?;
        tracing::debug!(count = collection.value.len(), "listed users");
        Ok(collection.value)
    }

    /// Lists a group's members as canonical principal references.
    ///
    /// An empty group yields an empty `Vec`, not an error.
    pub async fn list_group_members(&self, group_id: &str) -> Result<Vec<PrincipalReference>> {
        let session = self.require_session()?;
        MembershipReferenceClient::new(session)
            .list_members(group_id)
            .await
    }

    /// Adds a principal to a group by reference.
    pub async fn add_group_member(
        &self,
        group_id: &str,
        principal: &PrincipalReference,
    ) -> Result<()> {
        let session = self.require_session()?;
        MembershipReferenceClient::new(session)
            .add_member(group_id, principal)
            .await
    }

    /// Removes a principal's membership reference from a group.
    pub async fn remove_group_member(
        &self,
        group_id: &str,
        principal: &PrincipalReference,
    ) -> Result<()> {
        let session = self.require_session()?;
        MembershipReferenceClient::new(session)
            .remove_member(group_id, principal)
            .await
    }

    /// Builds the canonical reference for an object id under this session's
    /// service base.
    pub fn principal(&self, object_id: &str) -> Result<PrincipalReference> {
        let session = self.require_session()?;
        PrincipalReference::directory_object(session.service_base(), object_id)
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Returns the bound session, or an error when the facade is still
    /// uninitialized.
    fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or_else(|| {
            DirGraphError::NotInitialized("call initialize() before issuing operations".to_string())
                .into()
        })
    }
}
