//! Integration tests for StackFood.
//!
//! These tests drive a running `stackfood-web` server over HTTP and clean up
//! after themselves through the account service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p stackfood-cli -- migrate
//! STACKFOOD_RATE_LIMIT=false cargo run -p stackfood-web &
//! cargo test -p stackfood-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STACKFOOD_TEST_BASE_URL` - Server under test (default: `http://localhost:3000`)
//! - `STACKFOOD_DATABASE_URL` / `DATABASE_URL` - Database used for cleanup

use std::sync::Arc;

use reqwest::Client;

use stackfood_core::Email;
use stackfood_web::config::database_url_from_env;
use stackfood_web::db::{PgAccountStore, create_pool};
use stackfood_web::services::{AccountError, AccountService};

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("STACKFOOD_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// HTTP client that keeps cookies and does not follow redirects, so tests
/// can assert on `Location` headers.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique, valid email address for one test run.
#[must_use]
pub fn unique_email() -> String {
    format!("test-{}@stackfood.example", uuid::Uuid::new_v4().simple())
}

/// Connect an account service to the test database.
///
/// # Panics
///
/// Panics if the database URL is missing or the database is unreachable.
pub async fn account_service() -> AccountService {
    let database_url = database_url_from_env().expect("Database URL not configured");
    let pool = create_pool(&database_url)
        .await
        .expect("Failed to connect to test database");
    AccountService::new(Arc::new(PgAccountStore::new(pool)))
}

/// Delete a test account, ignoring accounts that no longer exist.
///
/// # Panics
///
/// Panics if the email is invalid or the database operation fails.
pub async fn delete_account(email: &str) {
    let email = Email::parse(email).expect("Invalid test email");
    match account_service().await.delete_by_email(&email).await {
        Ok(()) | Err(AccountError::NotFound) => {}
        Err(e) => panic!("Failed to delete test account: {e}"),
    }
}

/// Registration form fields for a valid sign-up.
#[must_use]
pub fn registration_form(email: &str) -> Vec<(&'static str, String)> {
    vec![
        ("name", "Jean Paul Martin".to_owned()),
        ("email", email.to_owned()),
        ("phone", "+237699001122".to_owned()),
        ("password", "motdepasse".to_owned()),
        ("confirmPassword", "motdepasse".to_owned()),
        ("terms", "on".to_owned()),
    ]
}
