//! Session middleware configuration.
//!
//! Sessions are stored server-side (`PostgreSQL` in production); the cookie
//! only carries the random session id.

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::WebConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "stackfood_session";

/// Session expiry time in seconds for "remember me" sign-ins (30 days).
pub const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Expiry applied to sessions by default and kept for "remember me" sign-ins.
#[must_use]
pub fn remembered_expiry() -> Expiry {
    Expiry::OnInactivity(tower_sessions::cookie::time::Duration::seconds(
        SESSION_EXPIRY_SECONDS,
    ))
}

/// Create the session layer over a session store.
///
/// # Arguments
///
/// * `store` - Session store (`PostgresStore` in production, `MemoryStore` in tests)
/// * `config` - Web configuration (an `https` base URL marks cookies secure)
#[must_use]
pub fn create_session_layer<S: SessionStore>(
    store: S,
    config: &WebConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(remembered_expiry())
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
