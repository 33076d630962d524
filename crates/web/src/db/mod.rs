//! Account storage for the StackFood `PostgreSQL` database.
//!
//! # Database: `stackfood`
//!
//! ## Tables
//!
//! - `stackfood.account` - Registered accounts (email is the natural key)
//! - `tower_sessions.session` - Tower-sessions storage (created at startup)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p stackfood-cli -- migrate
//! ```
//!
//! # Stores
//!
//! Route handlers and services never talk to `sqlx` directly. They hold an
//! [`AccountStore`] trait object, which is either [`PgAccountStore`] in
//! production or `MemoryAccountStore` in tests (behind the `test-support`
//! feature).

pub mod accounts;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use stackfood_core::{AccountId, Email};

use crate::models::account::{Account, NewAccount};

pub use accounts::PgAccountStore;
#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryAccountStore;

/// Errors from account storage operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Query/command interface to the account store.
///
/// Every method is a single store operation. Uniqueness of `email` is
/// enforced by the store itself and reported as [`RepositoryError::Conflict`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Get an account by its ID.
    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Get an account by its email address.
    async fn get_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError>;

    /// Get an account together with its password hash.
    ///
    /// Returns `None` if the account doesn't exist or has no password set.
    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError>;

    /// Insert a new account with an already-hashed password.
    async fn create(
        &self,
        account: &NewAccount,
        password_hash: &str,
    ) -> Result<Account, RepositoryError>;

    /// Delete the account with this email.
    ///
    /// Returns [`RepositoryError::NotFound`] if no account matched.
    async fn delete_by_email(&self, email: &Email) -> Result<(), RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
