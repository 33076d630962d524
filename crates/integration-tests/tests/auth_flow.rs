//! End-to-end tests for registration and sign-in.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - The web server running with rate limiting off
//!   (`STACKFOOD_RATE_LIMIT=false cargo run -p stackfood-web`)

use reqwest::{StatusCode, header};
use serde_json::Value;

use stackfood_integration_tests::{
    base_url, client, delete_account, registration_form, unique_email,
};

fn location(resp: &reqwest::Response) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
#[ignore = "Requires running web server and database"]
async fn test_health_endpoints() {
    let client = client();
    let base_url = base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to call /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to call /health/ready");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running web server and database"]
async fn test_register_then_login() {
    let client = client();
    let base_url = base_url();
    let email = unique_email();

    let resp = client
        .post(format!("{base_url}/auth/register"))
        .form(&registration_form(&email))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login?success=registered");

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email.as_str()), ("password", "motdepasse")])
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/account");

    let resp = client
        .get(format!("{base_url}/account"))
        .send()
        .await
        .expect("Failed to load account page");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Bonjour, Jean !"));
    assert!(body.contains(&email));

    delete_account(&email).await;
}

#[tokio::test]
#[ignore = "Requires running web server and database"]
async fn test_duplicate_registration_is_rejected() {
    let client = client();
    let base_url = base_url();
    let email = unique_email();

    let resp = client
        .post(format!("{base_url}/auth/register"))
        .form(&registration_form(&email))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = client
        .post(format!("{base_url}/auth/register"))
        .header(header::ACCEPT, "application/json")
        .form(&registration_form(&email.to_uppercase()))
        .send()
        .await
        .expect("Failed to register again");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Expected JSON body");
    assert_eq!(
        body["errors"]["email"][0],
        "Cette adresse email est déjà utilisée"
    );

    delete_account(&email).await;
}

#[tokio::test]
#[ignore = "Requires running web server and database"]
async fn test_wrong_password_is_generic_failure() {
    let client = client();
    let base_url = base_url();
    let email = unique_email();

    client
        .post(format!("{base_url}/auth/register"))
        .form(&registration_form(&email))
        .send()
        .await
        .expect("Failed to register");

    for (login_email, password) in [
        (email.as_str(), "mauvaispasse"),
        ("nobody@stackfood.example", "motdepasse"),
    ] {
        let resp = client
            .post(format!("{base_url}/auth/login"))
            .form(&[("email", login_email), ("password", password)])
            .send()
            .await
            .expect("Failed to log in");
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/auth/login?error=credentials");
    }

    delete_account(&email).await;
}
