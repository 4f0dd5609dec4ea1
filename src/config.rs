//! Configuration management for Dirgraph
//!
//! This module holds the explicit configuration struct consumed by the
//! facade at initialization. The three required secrets are validated once,
//! at construction, instead of being read from the environment at call
//! sites; absence of any secret is a fatal configuration error.

use serde::{Deserialize, Serialize};

use crate::error::{DirGraphError, Result};

/// Environment variable holding the directory tenant identifier.
pub const ENV_TENANT_ID: &str = "TENANT_ID";
/// Environment variable holding the application (client) identifier.
pub const ENV_CLIENT_ID: &str = "CLIENT_ID";
/// Environment variable holding the application client secret.
pub const ENV_CLIENT_SECRET: &str = "CLIENT_SECRET";

/// Configuration for one directory service session
///
/// Carries the confidential-application credentials plus the two endpoint
/// bases the facade talks to. The endpoint bases default to the public
/// Microsoft identity platform and Graph endpoints and exist mainly so that
/// tests can point the facade at a mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Directory (tenant) identifier the application authenticates against.
    pub tenant_id: String,

    /// Application (client) identifier of the confidential app registration.
    pub client_id: String,

    /// Client secret of the confidential app registration.
    pub client_secret: String,

    /// Base URL of the token-issuing authority.
    ///
    /// The token endpoint is derived as
    /// `{authority_base}/{tenant_id}/oauth2/v2.0/token`.
    #[serde(default = "default_authority_base")]
    pub authority_base: String,

    /// Base URL of the directory graph service (users, groups).
    #[serde(default = "default_service_base")]
    pub service_base: String,

    /// Per-request timeout applied to every HTTP call, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_authority_base() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_service_base() -> String {
    "https://graph.microsoft.com/v1.0".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl DirectoryConfig {
    /// Creates a configuration with the default public endpoints.
    ///
    /// Validation is deferred to [`validate`](Self::validate), which the
    /// facade runs during initialization.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirgraph::config::DirectoryConfig;
    ///
    /// let config = DirectoryConfig::new("tenant", "client", "secret");
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority_base: default_authority_base(),
            service_base: default_service_base(),
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// Builds a configuration from the `TENANT_ID`, `CLIENT_ID`, and
    /// `CLIENT_SECRET` environment variables.
    ///
    /// Missing variables become empty strings so that [`validate`]
    /// (Self::validate) reports exactly which field is absent.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var(ENV_TENANT_ID).unwrap_or_default(),
            std::env::var(ENV_CLIENT_ID).unwrap_or_default(),
            std::env::var(ENV_CLIENT_SECRET).unwrap_or_default(),
        )
    }

    /// Overrides the token authority base URL. Useful for tests and local
    /// mocks.
    pub fn with_authority_base(mut self, base: impl Into<String>) -> Self {
        self.authority_base = base.into();
        self
    }

    /// Overrides the directory service base URL. Useful for tests and local
    /// mocks.
    pub fn with_service_base(mut self, base: impl Into<String>) -> Self {
        self.service_base = base.into();
        self
    }

    /// Validates the configuration.
    ///
    /// Each of the three secrets must be non-empty after trimming. The
    /// endpoint bases must parse as URLs. No network I/O is performed.
    ///
    /// # Errors
    ///
    /// Returns [`DirGraphError::AuthConfig`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("tenant_id", &self.tenant_id),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ] {
            if value.trim().is_empty() {
                return Err(DirGraphError::AuthConfig(format!(
                    "{} must not be empty",
                    name
                ))
                .into());
            }
        }

        url::Url::parse(&self.authority_base).map_err(|e| {
            DirGraphError::AuthConfig(format!("authority_base is not a valid URL: {}", e))
        })?;
        url::Url::parse(&self.service_base).map_err(|e| {
            DirGraphError::AuthConfig(format!("service_base is not a valid URL: {}", e))
        })?;

        Ok(())
    }

    /// Returns the default scope set for app-only access to the configured
    /// service: the service origin with the `.default` suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use dirgraph::config::DirectoryConfig;
    ///
    /// let config = DirectoryConfig::new("t", "c", "s");
    /// assert_eq!(
    ///     config.default_scopes(),
    ///     vec!["https://graph.microsoft.com/.default".to_string()],
    /// );
    /// ```
    pub fn default_scopes(&self) -> Vec<String> {
        match url::Url::parse(&self.service_base) {
            Ok(base) => vec![format!("{}/.default", origin_of(&base))],
            Err(_) => vec![format!("{}/.default", self.service_base)],
        }
    }
}

/// Returns `scheme://host[:port]` for a URL, without any path component.
fn origin_of(url: &url::Url) -> String {
    let mut origin = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());
    if let Some(port) = url.port() {
        origin.push_str(&format!(":{}", port));
    }
    origin
}
