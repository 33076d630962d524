//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::AccountError;

/// Application-level error type for the web server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Account operation failed.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Account(AccountError::EmailTaken) => StatusCode::CONFLICT,
            Self::Account(AccountError::NotFound) => StatusCode::NOT_FOUND,
            Self::Account(AccountError::WeakPassword(_)) => StatusCode::BAD_REQUEST,
            Self::Account(AccountError::PasswordHash | AccountError::Repository(_))
            | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose error details to clients
        let message = status.canonical_reason().unwrap_or("Error");

        (status, message).into_response()
    }
}

/// Set the Sentry user context for the signed-in account.
///
/// Call this after successful authentication to associate errors with accounts.
pub fn set_sentry_user(account_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(account_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the account.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
