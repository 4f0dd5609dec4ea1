//! Dirgraph - directory graph service client CLI
//!
//! Main entry point for the dirgraph command-line tool.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dirgraph::cli::{Cli, Commands};
use dirgraph::facade::DirectoryFacade;
use dirgraph::query::DirectoryQueryBuilder;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let mut facade = DirectoryFacade::new();
    facade.initialize(cli.to_config())?;

    match &cli.command {
        Commands::Token => {
            let token = facade.app_token().await?;
            println!("{}", token.value);
            tracing::info!(expires_at = %token.expires_at, "token acquired");
        }
        Commands::Users { top } => {
            let query = DirectoryQueryBuilder::default().user_list_query(
                &["displayName", "id", "mail"],
                *top,
                &["displayName"],
            )?;
            let users = facade.list_users(&query).await?;
            for user in &users {
                println!(
                    "{}\t{}\t{}",
                    user.id,
                    user.display_name.as_deref().unwrap_or("-"),
                    user.mail.as_deref().unwrap_or("-"),
                );
            }
            tracing::info!(count = users.len(), "listed users");
        }
        Commands::Members { group } => {
            let members = facade.list_group_members(group).await?;
            if members.is_empty() {
                println!("group {} has no members", group);
            }
            for member in &members {
                println!("{}", member.uri());
            }
        }
        Commands::AddMember { group, member } => {
            let principal = facade.principal(member)?;
            facade.add_group_member(group, &principal).await?;
            println!("added {} to group {}", member, group);
        }
        Commands::RemoveMember { group, member } => {
            let principal = facade.principal(member)?;
            facade.remove_group_member(group, &principal).await?;
            println!("removed {} from group {}", member, group);
        }
    }

    Ok(())
}

/// Initializes tracing with an env-filterable subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
