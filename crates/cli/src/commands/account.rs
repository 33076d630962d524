//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an account
//! stackfood-cli account create -e jean@stackfood.cm -n "Jean Paul Martin" -p "+237699001122" --password motdepasse
//!
//! # Delete an account
//! stackfood-cli account delete -e jean@stackfood.cm
//! ```
//!
//! Accounts go through the same service as the web sign-up, so passwords are
//! hashed identically and emails are normalized the same way.

use std::sync::Arc;

use thiserror::Error;

use stackfood_core::{Email, EmailError};
use stackfood_web::config::{ConfigError, database_url_from_env};
use stackfood_web::db::{PgAccountStore, create_pool};
use stackfood_web::models::NewAccount;
use stackfood_web::services::registration::split_name;
use stackfood_web::services::{AccountError, AccountService};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountCommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Account(#[from] AccountError),
}

async fn service() -> Result<(AccountService, sqlx::PgPool), AccountCommandError> {
    let database_url = database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;
    let store = Arc::new(PgAccountStore::new(pool.clone()));

    Ok((AccountService::new(store), pool))
}

/// Create an account with a password.
///
/// # Errors
///
/// Returns an error if the input is invalid, the email is already
/// registered, or the database fails.
pub async fn create(
    email: &str,
    name: &str,
    phone: &str,
    password: &str,
) -> Result<(), AccountCommandError> {
    let email = Email::parse(email)?;
    let (first_name, last_name) = split_name(name);
    if first_name.is_empty() {
        return Err(AccountCommandError::EmptyName);
    }

    let (service, pool) = service().await?;

    let account = service
        .create(
            &NewAccount {
                email,
                phone: phone.trim().to_owned(),
                first_name,
                last_name,
            },
            password,
        )
        .await;
    pool.close().await;
    let account = account?;

    tracing::info!("Account created successfully!");
    tracing::info!("  ID: {}", account.id);
    tracing::info!("  Email: {}", account.email);
    tracing::info!("  Name: {}", account.display_name());
    tracing::info!("  Role: {}", account.role);

    Ok(())
}

/// Delete the account registered under an email.
///
/// # Errors
///
/// Returns an error if the email is invalid, no account matches, or the
/// database fails.
pub async fn delete(email: &str) -> Result<(), AccountCommandError> {
    let email = Email::parse(email)?;

    let (service, pool) = service().await?;
    let result = service.delete_by_email(&email).await;
    pool.close().await;
    result?;

    tracing::info!("Account {} deleted", email);
    Ok(())
}
