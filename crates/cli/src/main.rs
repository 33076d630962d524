//! StackFood CLI - Database migrations and account management.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! stackfood-cli migrate
//!
//! # Create an account
//! stackfood-cli account create -e jean@stackfood.cm -n "Jean Paul Martin" -p "+237699001122" --password motdepasse
//!
//! # Delete an account
//! stackfood-cli account delete -e jean@stackfood.cm
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "stackfood-cli")]
#[command(author, version, about = "StackFood CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Create a new account
    Create {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Display name ("Jean Paul Martin")
        #[arg(short, long)]
        name: String,

        /// Phone number
        #[arg(short, long)]
        phone: String,

        /// Password (at least 8 characters)
        #[arg(long, env = "STACKFOOD_ACCOUNT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Delete an account by email
    Delete {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Account { action } => match action {
            AccountAction::Create {
                email,
                name,
                phone,
                password,
            } => commands::account::create(&email, &name, &phone, &password).await?,
            AccountAction::Delete { email } => commands::account::delete(&email).await?,
        },
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
    fn test_parse_account_create() {
        let cli = Cli::try_parse_from([
            "stackfood-cli",
            "account",
            "create",
            "-e",
            "jean@stackfood.cm",
            "-n",
            "Jean Paul Martin",
            "-p",
            "+237699001122",
            "--password",
            "motdepasse",
        ]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Account {
                action: AccountAction::Create { .. }
            })
        ));
    }
}
