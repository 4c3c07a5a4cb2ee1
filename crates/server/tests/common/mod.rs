#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`TestApp`] runs the real router, session layer and templates over the
//! in-memory store, so these tests need no database. Tests that exercise
//! PostgreSQL build their own state and skip when `DATABASE_URL` is unset.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use http_body_util::BodyExt;
use tower::ServiceExt;

use ezvacancy::config::{Config, Environment};
use ezvacancy::content::MemoryStore;
use ezvacancy::models::{Post, PostDraft};
use ezvacancy::state::{AdminSettings, AppState};
use ezvacancy::theme::ThemeEngine;
use ezvacancy_test_utils::{csrf_token_in, login_form};

pub const ADMIN_EMAIL: &str = "editor@ezgovtjob.in";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// Project root `templates/` directory.
pub fn templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

/// Configuration for tests: in-memory sessions, admin under `/admin`.
pub fn test_config() -> Config {
    Config {
        port: 0,
        database_url: std::env::var("DATABASE_URL").unwrap_or_default(),
        database_max_connections: 5,
        redis_url: None,
        cors_allowed_origins: vec!["*".to_string()],
        session_secret: "test-session-secret-0123456789abcdef".to_string(),
        admin_email: ADMIN_EMAIL.to_string(),
        admin_password: ADMIN_PASSWORD.to_string(),
        admin_root: "/admin".to_string(),
        environment: Environment::Development,
        cookie_same_site: "lax".to_string(),
        templates_dir: templates_dir(),
    }
}

/// Test application over a fresh in-memory store.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new());
        let theme = ThemeEngine::new(&config.templates_dir).expect("Failed to load templates");
        let state = AppState::with_store(
            store.clone(),
            theme,
            AdminSettings::from_config(&config),
            None,
        );

        let router = ezvacancy::build_app(state.clone(), &config)
            .await
            .expect("Failed to build app");

        Self {
            router,
            store,
            state,
        }
    }

    /// Create a post through the service (unique slug, default post date).
    pub async fn create_post(&self, draft: PostDraft) -> Post {
        self.state
            .post_service()
            .create(&draft)
            .await
            .expect("Failed to create post")
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_with_cookies(&self, uri: &str, cookies: &str) -> Response {
        self.request(
            Request::get(uri)
                .header(header::COOKIE, cookies)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_form(&self, uri: &str, body: String, cookies: &str) -> Response {
        let mut request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        if !cookies.is_empty() {
            request
                .headers_mut()
                .insert(header::COOKIE, cookies.parse().unwrap());
        }
        self.request(request).await
    }

    /// Fetch a page and return the session cookie and the first CSRF token
    /// on it.
    pub async fn page_token(&self, uri: &str, cookies: &str) -> (String, String) {
        let response = self.get_with_cookies(uri, cookies).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri} failed");
        let new_cookies = extract_cookies(&response);
        let html = body_text(response).await;
        let token = csrf_token_in(&html).expect("page has no CSRF token");
        let cookies = if new_cookies.is_empty() {
            cookies.to_string()
        } else {
            new_cookies
        };
        (cookies, token)
    }

    /// Log in as the configured operator and return session cookies.
    pub async fn login(&self) -> String {
        let (cookies, token) = self.page_token("/admin/login", "").await;
        let response = self
            .post_form(
                "/admin/login",
                login_form(ADMIN_EMAIL, ADMIN_PASSWORD, &token),
                &cookies,
            )
            .await;
        assert_eq!(
            response.status(),
            StatusCode::SEE_OTHER,
            "login failed (status {})",
            response.status()
        );
        extract_cookies(&response)
    }
}

/// Extract Set-Cookie headers from a response for use in subsequent requests.
pub fn extract_cookies(response: &Response) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
