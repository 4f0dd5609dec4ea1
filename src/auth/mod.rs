//! App-only OAuth2 authentication
//!
//! Client-credentials token acquisition for the directory facade. All
//! secret material lives inside [`credential::CredentialProvider`]; the
//! rest of the crate only ever sees opaque bearer [`token::Token`] values.

pub mod credential;
pub mod token;

pub use credential::{Credential, CredentialProvider};
pub use token::Token;
