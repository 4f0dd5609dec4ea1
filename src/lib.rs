//! Dirgraph - directory graph service client library
//!
//! This library provides a thin, testable facade over a remote directory
//! graph service: app-only OAuth2 authentication, parameterized user
//! listings, and group membership expressed as relationship-reference
//! operations.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: client-credentials token acquisition and caching
//! - `query`: read-query shaping (projection, page cap, ordering)
//! - `membership`: membership reference mutations and listings
//! - `session`: the authenticated binding of credential to service
//! - `facade`: the public operations composed from the above
//! - `config`: explicit configuration with up-front validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use dirgraph::{DirectoryConfig, DirectoryFacade};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut facade = DirectoryFacade::new();
//!     facade.initialize(DirectoryConfig::from_env())?;
//!
//!     let token = facade.app_token().await?;
//!     println!("token expires at {}", token.expires_at);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod facade;
pub mod membership;
pub mod query;
pub mod session;

// Re-export commonly used types
pub use auth::{Credential, CredentialProvider, Token};
pub use config::DirectoryConfig;
pub use error::{DirGraphError, Result};
pub use facade::{DirectoryFacade, User};
pub use membership::PrincipalReference;
pub use query::{DirectoryQueryBuilder, QueryParameters};
pub use session::Session;
