//! Account service error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during account operations.
///
/// A failed credential check is not an error: `verify_credentials` returns
/// `Ok(None)` so callers cannot tell "no such account" from "wrong password".
#[derive(Debug, Error)]
pub enum AccountError {
    /// An account with this email already exists.
    #[error("email already in use")]
    EmailTaken,

    /// No account matched.
    #[error("account not found")]
    NotFound,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
