//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Landing page
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (account store ping)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action (rate limited)
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action (rate limited)
//! POST /auth/logout            - Logout action
//!
//! # Account (requires auth)
//! GET  /account                - Account overview
//!
//! GET  /static/*               - Stylesheet and images
//! ```

pub mod account;
pub mod auth;
pub mod health;
pub mod home;

use std::path::Path;

use axum::{
    Router,
    extract::Request,
    routing::{get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::SessionStore;

use crate::config::WebConfig;
use crate::middleware::{
    auth_rate_limiter, create_session_layer, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Create the auth routes router.
///
/// Form submissions share one per-IP rate limiter when `config.rate_limit`
/// is set.
pub fn auth_routes(config: &WebConfig) -> Router<AppState> {
    let mut login = post(auth::login);
    let mut register = post(auth::register);

    if config.rate_limit {
        let limiter = auth_rate_limiter(config.trusted_proxy);
        login = login.layer(limiter.clone());
        register = register.layer(limiter);
    }

    Router::new()
        .route("/login", get(auth::login_page).merge(login))
        .route("/register", get(auth::register_page).merge(register))
        .route("/logout", post(auth::logout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new().route("/", get(account::index))
}

/// Create all page routes.
pub fn routes(config: &WebConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/auth", auth_routes(config))
        .nest("/account", account_routes())
}

/// Build the complete application: routes, static files, sessions and the
/// request-scoped middleware.
///
/// Sentry layers are added by the binary on top of this.
pub fn app<S>(state: AppState, session_store: S, static_dir: impl AsRef<Path>) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(session_store, state.config());
    let page_routes = routes(state.config());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(page_routes)
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}
