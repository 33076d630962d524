//! Authentication route handlers.
//!
//! Handles sign-in, sign-up and sign-out against the local account store.

use std::fmt;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::ACCEPT},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use stackfood_core::Email;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_account, set_current_account};
use crate::models::CurrentAccount;
use crate::services::registration::{self, FieldErrors, RegisterError, RegisterForm};
use crate::state::AppState;

/// Value the "remember me" checkbox posts when ticked.
const REMEMBER_ME_CHECKED: &str = "on";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(rename = "remember-me")]
    pub remember_me: Option<String>,
}

impl LoginForm {
    fn remember(&self) -> bool {
        self.remember_me.as_deref() == Some(REMEMBER_ME_CHECKED)
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Map a login error code to the message shown above the form.
///
/// Unknown codes show nothing, so the query string cannot inject text.
fn login_error_message(code: &str) -> Option<&'static str> {
    match code {
        "credentials" => Some("Email ou mot de passe incorrect"),
        "session" => Some("Impossible d'ouvrir votre session, veuillez réessayer"),
        _ => None,
    }
}

/// Map a login success code to the message shown above the form.
fn login_success_message(code: &str) -> Option<&'static str> {
    match code {
        "registered" => Some("Votre compte a été créé. Vous pouvez maintenant vous connecter."),
        _ => None,
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Values echoed back into the registration form after a rejected
/// submission. Passwords are never echoed.
#[derive(Debug, Default)]
pub struct RegisterValues {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub terms: bool,
}

impl From<&RegisterForm> for RegisterValues {
    fn from(form: &RegisterForm) -> Self {
        Self {
            name: form.name.clone(),
            email: form.email.clone(),
            phone: form.phone.clone(),
            terms: form.terms.is_some(),
        }
    }
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub errors: FieldErrors,
    pub values: RegisterValues,
}

// =============================================================================
// Content Negotiation
// =============================================================================

/// Whether the client asked for JSON rather than HTML.
///
/// The first of `application/json` and `text/html` listed in `Accept` wins;
/// a missing header or one naming neither means HTML.
fn wants_json(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(ACCEPT).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    accept
        .split(',')
        .map(|range| range.split(';').next().unwrap_or_default().trim())
        .find_map(|media_type| match media_type {
            "application/json" => Some(true),
            "text/html" => Some(false),
            _ => None,
        })
        .unwrap_or(false)
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
///
/// Visitors who are already signed in go straight to their account.
pub async fn login_page(
    OptionalAuth(account): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if account.is_some() {
        return Redirect::to("/account").into_response();
    }

    LoginTemplate {
        error: query.error.as_deref().and_then(login_error_message),
        success: query.success.as_deref().and_then(login_success_message),
    }
    .into_response()
}

/// Handle login form submission.
///
/// Every credential failure (malformed email, unknown account, wrong
/// password) redirects with the same `credentials` error.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let Ok(email) = Email::parse(&form.email) else {
        tracing::debug!("login rejected: malformed email");
        return Ok(Redirect::to("/auth/login?error=credentials").into_response());
    };

    let Some(account) = state
        .accounts()
        .verify_credentials(&email, &form.password)
        .await?
    else {
        tracing::info!("login failed");
        return Ok(Redirect::to("/auth/login?error=credentials").into_response());
    };

    let current = CurrentAccount::from(&account);
    if let Err(e) = set_current_account(&session, &current, form.remember()).await {
        tracing::error!("Failed to set session: {}", e);
        return Ok(Redirect::to("/auth/login?error=session").into_response());
    }

    set_sentry_user(&account.id, Some(account.email.as_str()));
    tracing::info!(account_id = %account.id, "signed in");

    Ok(Redirect::to("/account").into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(OptionalAuth(account): OptionalAuth) -> Response {
    if account.is_some() {
        return Redirect::to("/account").into_response();
    }

    RegisterTemplate {
        errors: FieldErrors::default(),
        values: RegisterValues::default(),
    }
    .into_response()
}

/// Handle registration form submission.
///
/// On success redirects to the login page. Rejected submissions answer
/// `400 Bad Request` with per-field messages: as `{"errors": {...}}` when the
/// client asked for JSON, otherwise by re-rendering the form.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let values = RegisterValues::from(&form);

    match registration::register(state.accounts(), form).await {
        Ok(_) => Ok(Redirect::to("/auth/login?success=registered").into_response()),
        Err(RegisterError::Invalid(errors)) => {
            if wants_json(&headers) {
                let body = serde_json::json!({ "errors": errors });
                Ok((StatusCode::BAD_REQUEST, Json(body)).into_response())
            } else {
                Ok((StatusCode::BAD_REQUEST, RegisterTemplate { errors, values }).into_response())
            }
        }
        Err(RegisterError::Account(e)) => Err(e.into()),
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Destroys the session and returns to the landing page.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_account(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }

    clear_sentry_user();

    Redirect::to("/").into_response()
}
