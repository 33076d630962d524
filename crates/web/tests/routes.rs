//! In-process tests for the full router.
//!
//! The app is built exactly as in production except for the stores: accounts
//! live in a `MemoryAccountStore` and sessions in a `tower_sessions::MemoryStore`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::ConnectInfo,
    http::{
        HeaderMap, Request, StatusCode,
        header::{ACCEPT, CONTENT_SECURITY_POLICY, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
    response::Response,
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use url::Url;

use stackfood_core::Email;
use stackfood_web::config::WebConfig;
use stackfood_web::db::MemoryAccountStore;
use stackfood_web::middleware::request_id::REQUEST_ID_HEADER;
use stackfood_web::middleware::session::SESSION_COOKIE_NAME;
use stackfood_web::models::NewAccount;
use stackfood_web::routes;
use stackfood_web::state::AppState;

// =============================================================================
// Helpers
// =============================================================================

struct TestApp {
    router: Router,
    store: Arc<MemoryAccountStore>,
    state: AppState,
}

fn config() -> WebConfig {
    WebConfig {
        database_url: SecretString::from("postgres://unused"),
        host: IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: Url::parse("http://localhost:3000").unwrap(),
        rate_limit: false,
        trusted_proxy: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

fn test_app_with(config: WebConfig) -> TestApp {
    let store = Arc::new(MemoryAccountStore::new());
    let state = AppState::new(config, store.clone());
    let router = routes::app(state.clone(), MemoryStore::default(), "static");
    TestApp {
        router,
        store,
        state,
    }
}

fn test_app() -> TestApp {
    test_app_with(config())
}

fn rate_limited_app(trusted_proxy: bool) -> TestApp {
    test_app_with(WebConfig {
        rate_limit: true,
        trusted_proxy,
        ..config()
    })
}

fn form_body(fields: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

fn valid_registration() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Jean Paul Martin"),
        ("email", "jean@stackfood.cm"),
        ("phone", "+237699001122"),
        ("password", "motdepasse"),
        ("confirmPassword", "motdepasse"),
        ("terms", "on"),
    ]
}

fn with_field<'a>(
    mut fields: Vec<(&'a str, &'a str)>,
    name: &str,
    value: &'a str,
) -> Vec<(&'a str, &'a str)> {
    for field in &mut fields {
        if field.0 == name {
            field.1 = value;
        }
    }
    fields
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, fields: &[(&str, &str)], headers: HeaderMap) -> Response {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form_body(fields)))
            .unwrap();
        request.headers_mut().extend(headers);
        self.send(request).await
    }

    /// Submit a failing login as if sent from `peer`.
    async fn login_attempt_from(&self, peer: SocketAddr, forwarded_for: &str) -> StatusCode {
        let mut request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("x-forwarded-for", forwarded_for)
            .body(Body::from(form_body(&[
                ("email", "ghost@stackfood.cm"),
                ("password", "motdepasse"),
            ])))
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        self.send(request).await.status()
    }

    async fn create_account(&self, email: &str, password: &str) {
        self.state
            .accounts()
            .create(
                &NewAccount {
                    email: Email::parse(email).unwrap(),
                    phone: "+237699001122".to_owned(),
                    first_name: "Jean".to_owned(),
                    last_name: "Paul Martin".to_owned(),
                },
                password,
            )
            .await
            .unwrap();
    }

    /// Log in and return the `name=value` session cookie.
    async fn login(&self, email: &str, password: &str) -> String {
        let response = self
            .post_form(
                "/auth/login",
                &[("email", email), ("password", password)],
                HeaderMap::new(),
            )
            .await;
        assert_eq!(location(&response), "/account");
        session_cookie(&response).unwrap()
    }
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn set_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

fn session_cookie(response: &Response) -> Option<String> {
    set_cookie(response).and_then(|c| c.split(';').next().map(str::to_owned))
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_accept() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, "application/json".parse().unwrap());
    headers
}

// =============================================================================
// Landing Page & Infrastructure
// =============================================================================

#[tokio::test]
async fn test_landing_page_content() {
    let app = test_app();

    let response = app.get("/", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Savourez l'instant, sans attendre"));
    assert!(body.contains("Pourquoi commander chez nous ?"));
    assert!(body.contains("Livraison ultra-rapide"));
    assert!(body.contains("Pizzeria Napoli"));
    assert!(body.contains("⭐⭐⭐⭐⭐ (342)"));
    assert!(body.contains("Comment ça marche ?"));
    assert!(body.contains("Marie L."));
    assert!(body.contains("Prêt à vous régaler ?"));
    assert!(body.contains(r#"href="/auth/login">Commander maintenant"#));
}

#[tokio::test]
async fn test_responses_carry_security_headers_and_request_id() {
    let app = test_app();

    let response = app.get("/", None).await;

    assert!(response.headers().contains_key(CONTENT_SECURITY_POLICY));
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert!(!response.headers()[REQUEST_ID_HEADER].is_empty());
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = test_app();

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let response = app.get("/health/ready", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stylesheet_is_served() {
    let app = test_app();

    let response = app.get("/static/css/main.css", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("@media (max-width: 768px)"));
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_success_redirects_to_login() {
    let app = test_app();

    let response = app
        .post_form("/auth/register", &valid_registration(), HeaderMap::new())
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login?success=registered");

    let account = app
        .state
        .accounts()
        .get_by_email(&Email::parse("jean@stackfood.cm").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.first_name, "Jean");
    assert_eq!(account.last_name, "Paul Martin");
    assert_eq!(account.phone, "+237699001122");
}

#[tokio::test]
async fn test_register_page_renders_form() {
    let app = test_app();

    let response = app.get("/auth/register", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"name="confirmPassword""#));
    assert!(body.contains(r#"name="terms""#));
}

#[tokio::test]
async fn test_register_invalid_json_errors() {
    let app = test_app();
    let fields = with_field(valid_registration(), "confirmPassword", "autrechose");

    let response = app.post_form("/auth/register", &fields, json_accept()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(
        body["errors"]["confirmPassword"][0],
        "Les mots de passe ne correspondent pas"
    );
    assert!(body["errors"].get("password").is_none());
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_register_invalid_rerenders_form_without_passwords() {
    let app = test_app();
    let fields = with_field(valid_registration(), "confirmPassword", "autrechose");

    let response = app
        .post_form("/auth/register", &fields, HeaderMap::new())
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_text(response).await;
    assert!(body.contains("Les mots de passe ne correspondent pas"));
    assert!(body.contains(r#"value="Jean Paul Martin""#));
    assert!(!body.contains("motdepasse"));
    assert!(!body.contains("autrechose"));
}

#[tokio::test]
async fn test_register_reports_all_failures() {
    let app = test_app();
    let fields = [("name", "J"), ("email", "nope"), ("phone", "123")];

    let response = app.post_form("/auth/register", &fields, json_accept()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    let errors = body["errors"].as_object().unwrap();
    for field in ["name", "email", "phone", "password", "terms"] {
        assert!(errors.contains_key(field), "missing error for {field}");
    }
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = test_app();
    app.create_account("jean@stackfood.cm", "motdepasse").await;
    let fields = with_field(valid_registration(), "email", "Jean@StackFood.cm");

    let response = app.post_form("/auth/register", &fields, json_accept()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(
        body["errors"]["email"][0],
        "Cette adresse email est déjà utilisée"
    );
    assert_eq!(app.store.len().await, 1);
}

// =============================================================================
// Login / Logout
// =============================================================================

#[tokio::test]
async fn test_login_opens_session_and_shows_account() {
    let app = test_app();
    app.create_account("jean@stackfood.cm", "motdepasse").await;

    let cookie = app.login("jean@stackfood.cm", "motdepasse").await;
    assert!(cookie.starts_with(SESSION_COOKIE_NAME));

    let response = app.get("/account", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Bonjour, Jean !"));
    assert!(body.contains("jean@stackfood.cm"));
    assert!(body.contains("Client"));
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = test_app();
    app.create_account("jean@stackfood.cm", "motdepasse").await;

    for (email, password) in [
        ("jean@stackfood.cm", "mauvaispasse"),
        ("ghost@stackfood.cm", "motdepasse"),
        ("not-an-email", "motdepasse"),
    ] {
        let response = app
            .post_form(
                "/auth/login",
                &[("email", email), ("password", password)],
                HeaderMap::new(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth/login?error=credentials");
        assert!(set_cookie(&response).is_none());
    }
}

#[tokio::test]
async fn test_login_page_shows_known_messages_only() {
    let app = test_app();

    let body = body_text(app.get("/auth/login?error=credentials", None).await).await;
    assert!(body.contains("Email ou mot de passe incorrect"));

    let body = body_text(app.get("/auth/login?error=%3Cscript%3E", None).await).await;
    assert!(!body.contains("<script>"));
    assert!(!body.contains("alert-error"));
}

#[tokio::test]
async fn test_remember_me_controls_cookie_lifetime() {
    let app = test_app();
    app.create_account("jean@stackfood.cm", "motdepasse").await;

    let response = app
        .post_form(
            "/auth/login",
            &[
                ("email", "jean@stackfood.cm"),
                ("password", "motdepasse"),
                ("remember-me", "on"),
            ],
            HeaderMap::new(),
        )
        .await;
    let remembered = set_cookie(&response).unwrap().to_ascii_lowercase();
    assert!(remembered.contains("max-age"));

    let response = app
        .post_form(
            "/auth/login",
            &[("email", "jean@stackfood.cm"), ("password", "motdepasse")],
            HeaderMap::new(),
        )
        .await;
    let browser_session = set_cookie(&response).unwrap().to_ascii_lowercase();
    assert!(!browser_session.contains("max-age"));
    assert!(browser_session.contains("httponly"));
}

#[tokio::test]
async fn test_signed_in_visitor_skips_login_page() {
    let app = test_app();
    app.create_account("jean@stackfood.cm", "motdepasse").await;
    let cookie = app.login("jean@stackfood.cm", "motdepasse").await;

    let response = app.get("/auth/login", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/account");
}

#[tokio::test]
async fn test_account_requires_login() {
    let app = test_app();

    let response = app.get("/account", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = test_app();
    app.create_account("jean@stackfood.cm", "motdepasse").await;
    let cookie = app.login("jean@stackfood.cm", "motdepasse").await;

    let mut request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .body(Body::empty())
        .unwrap();
    request
        .headers_mut()
        .insert(COOKIE, cookie.parse().unwrap());
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = app.get("/account", Some(&cookie)).await;
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn test_deleted_account_session_is_ended() {
    let app = test_app();
    app.create_account("jean@stackfood.cm", "motdepasse").await;
    let cookie = app.login("jean@stackfood.cm", "motdepasse").await;

    app.state
        .accounts()
        .delete_by_email(&Email::parse("jean@stackfood.cm").unwrap())
        .await
        .unwrap();

    let response = app.get("/account", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");
}

// =============================================================================
// Rate Limiting
// =============================================================================

#[tokio::test]
async fn test_rotating_forwarded_for_does_not_escape_limit() {
    let app = rate_limited_app(false);
    let peer = SocketAddr::from(([198, 51, 100, 20], 40000));

    let mut statuses = Vec::new();
    for i in 0..6 {
        let spoofed = format!("203.0.113.{i}");
        statuses.push(app.login_attempt_from(peer, &spoofed).await);
    }

    assert!(statuses[..5].iter().all(|s| *s == StatusCode::SEE_OTHER));
    assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);

    // Pages themselves are not limited
    let response = app.get("/auth/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_trusted_proxy_limits_each_forwarded_client() {
    let app = rate_limited_app(true);
    let proxy = SocketAddr::from(([10, 0, 0, 2], 40000));

    for _ in 0..5 {
        assert_eq!(
            app.login_attempt_from(proxy, "203.0.113.9").await,
            StatusCode::SEE_OTHER
        );
    }

    assert_eq!(
        app.login_attempt_from(proxy, "203.0.113.9").await,
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        app.login_attempt_from(proxy, "203.0.113.10").await,
        StatusCode::SEE_OTHER
    );
}
