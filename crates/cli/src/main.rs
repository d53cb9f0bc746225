//! Store Ratings CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sr-cli migrate
//!
//! # Create an admin account (password from RATINGS_ADMIN_PASSWORD)
//! sr-cli admin create -n "System Administrator Account" -e admin@example.com -a "Admin Office"
//!
//! # Insert sample owners, users, stores and ratings
//! sr-cli seed
//! ```
//!
//! # Environment Variables
//!
//! - `RATINGS_DATABASE_URL` - `PostgreSQL` connection string
//! - `RATINGS_ADMIN_PASSWORD` - Password for `admin create`

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sr-cli")]
#[command(author, version, about = "Store Ratings CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Seed the database with sample data (skips rows that already exist)
    Seed,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Display name (20-60 characters)
        #[arg(short, long)]
        name: String,

        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Postal address
        #[arg(short, long)]
        address: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                name,
                email,
                address,
            } => {
                commands::admin::create_admin(&name, &email, &address).await?;
            }
        },
        Commands::Seed => commands::seed::run().await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_admin_create_short_flags() {
        let cli = Cli::try_parse_from([
            "sr-cli",
            "admin",
            "create",
            "-n",
            "System Administrator Account",
            "-e",
            "admin@example.com",
            "-a",
            "Admin Office, Main Building",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Admin {
                action: AdminAction::Create { .. }
            })
        ));
    }
}
