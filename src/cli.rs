//! Command-line interface definition for Dirgraph
//!
//! This module defines the CLI structure using clap's derive API, providing
//! commands for token display, user listing, and group membership
//! management. The three required secrets come from flags or from the
//! `TENANT_ID` / `CLIENT_ID` / `CLIENT_SECRET` environment variables.

use clap::{Parser, Subcommand};

use crate::config::DirectoryConfig;

/// Dirgraph - directory graph service client
///
/// Authenticates a confidential application with app-only credentials and
/// issues read/write operations against the directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "dirgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory (tenant) identifier
    #[arg(long, env = "TENANT_ID", hide_env_values = true)]
    pub tenant_id: String,

    /// Application (client) identifier
    #[arg(long, env = "CLIENT_ID", hide_env_values = true)]
    pub client_id: String,

    /// Application client secret
    #[arg(long, env = "CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Dirgraph
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Display the app-only access token and its expiry
    Token,

    /// List directory users
    Users {
        /// Maximum number of results (service cap: 25)
        #[arg(short, long, default_value_t = 25)]
        top: u32,
    },

    /// List the members of a group
    Members {
        /// Group identifier
        #[arg(short, long)]
        group: String,
    },

    /// Add a directory object to a group
    AddMember {
        /// Group identifier
        #[arg(short, long)]
        group: String,

        /// Directory object identifier of the member to add
        #[arg(short, long)]
        member: String,
    },

    /// Remove a directory object from a group
    RemoveMember {
        /// Group identifier
        #[arg(short, long)]
        group: String,

        /// Directory object identifier of the member to remove
        #[arg(short, long)]
        member: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Builds the facade configuration from the parsed secrets.
    pub fn to_config(&self) -> DirectoryConfig {
        DirectoryConfig::new(
            self.tenant_id.clone(),
            self.client_id.clone(),
            self.client_secret.clone(),
        )
    }
}
