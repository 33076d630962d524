//! Authentication extractors and session helpers.
//!
//! The signed-in account lives in the session under
//! [`session_keys::CURRENT_ACCOUNT`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::{Expiry, Session};

use super::session::remembered_expiry;
use crate::models::{CurrentAccount, session_keys};

/// Extractor that requires a signed-in account.
///
/// If nobody is signed in, the request is redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(account): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Bonjour, {} !", account.first_name)
/// }
/// ```
pub struct RequireAuth(pub CurrentAccount);

/// Error returned when authentication is required but nobody is signed in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// The session layer is missing from the router.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::MissingSession => {
                tracing::error!("session layer missing for authenticated route");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        let account: CurrentAccount = session
            .get(session_keys::CURRENT_ACCOUNT)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection::RedirectToLogin)?;

        Ok(Self(account))
    }
}

/// Extractor that optionally gets the signed-in account.
///
/// Unlike `RequireAuth`, this does not reject anonymous requests.
pub struct OptionalAuth(pub Option<CurrentAccount>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let account = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAccount>(session_keys::CURRENT_ACCOUNT)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(account))
    }
}

/// Sign an account in.
///
/// Issues a fresh session id (so a pre-login id cannot be reused), stores the
/// account and picks the cookie lifetime: 30 days of inactivity when
/// `remember` is set, the browser session otherwise.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_account(
    session: &Session,
    account: &CurrentAccount,
    remember: bool,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.set_expiry(Some(if remember {
        remembered_expiry()
    } else {
        Expiry::OnSessionEnd
    }));
    session
        .insert(session_keys::CURRENT_ACCOUNT, account)
        .await
}

/// Sign the current account out and destroy the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_account(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAccount>(session_keys::CURRENT_ACCOUNT)
        .await?;
    session.flush().await
}
