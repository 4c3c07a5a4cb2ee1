//! Shared route helpers for admin pages.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use subtle::ConstantTimeEq;
use tower_sessions::Session;

use crate::form::generate_csrf_token;
use crate::state::{AdminSettings, AppState};

/// Session key holding the logged-in operator's email.
pub const SESSION_OPERATOR: &str = "operator";

/// Require a logged-in operator, or redirect to the login page.
pub async fn require_operator(state: &AppState, session: &Session) -> Result<String, Response> {
    let operator: Option<String> = session.get(SESSION_OPERATOR).await.ok().flatten();

    match operator {
        Some(email) => Ok(email),
        None => Err(Redirect::to(&format!("{}/login", state.admin().root)).into_response()),
    }
}

/// Compare submitted credentials with the configured operator, in constant
/// time. Emails compare case-insensitively.
pub fn credentials_match(admin: &AdminSettings, email: &str, password: &str) -> bool {
    let email_ok = email
        .trim()
        .to_lowercase()
        .as_bytes()
        .ct_eq(admin.email.to_lowercase().as_bytes());
    let password_ok = password.as_bytes().ct_eq(admin.password.as_bytes());
    bool::from(email_ok & password_ok)
}

/// Render an admin template with the common context (`admin_root`, and a
/// `logout_token` for the header form when an operator is logged in).
pub async fn render_admin_template(
    state: &AppState,
    session: &Session,
    template: &str,
    mut context: tera::Context,
) -> Response {
    context.insert("admin_root", &state.admin().root);

    let logged_in = session
        .get::<String>(SESSION_OPERATOR)
        .await
        .ok()
        .flatten()
        .is_some();
    if logged_in {
        match generate_csrf_token(session).await {
            Ok(token) => context.insert("logout_token", &token),
            Err(e) => return server_error(e),
        }
    }

    match state.theme().render(template, &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => server_error(e),
    }
}

/// Same as [`render_admin_template`] with an explicit status code.
pub async fn render_admin_with_status(
    state: &AppState,
    session: &Session,
    status: StatusCode,
    template: &str,
    context: tera::Context,
) -> Response {
    let mut response = render_admin_template(state, session, template, context).await;
    if response.status().is_success() {
        *response.status_mut() = status;
    }
    response
}

/// Log an internal failure and return an opaque 500 page.
pub fn server_error(err: anyhow::Error) -> Response {
    tracing::error!(error = ?err, "admin request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html("<h1>Internal server error</h1>"),
    )
        .into_response()
}

/// HTML-escape a string for safe output.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
