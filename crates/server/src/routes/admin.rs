//! Admin console: login, logout and the dashboard.
//!
//! Resource pages live in [`super::admin_post`] and
//! [`super::admin_sub_category`]; this router merges them.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::admin_resource::EXPIRED_FORM;
use super::helpers::{
    SESSION_OPERATOR, credentials_match, render_admin_with_status, require_operator, server_error,
};
use super::{admin_post, admin_sub_category};
use crate::form::{generate_csrf_token, verify_csrf_token};
use crate::models::PostType;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(rename = "_token", default)]
    token: String,
}

#[derive(Debug, Deserialize)]
struct LogoutForm {
    #[serde(rename = "_token", default)]
    token: String,
}

#[derive(Debug, Serialize)]
struct TypeCount {
    label: &'static str,
    post_type: &'static str,
    count: i64,
}

/// GET /login
async fn login_form(State(state): State<AppState>, session: Session) -> Response {
    if require_operator(&state, &session).await.is_ok() {
        return Redirect::to(&dashboard_path(&state)).into_response();
    }
    render_login(&state, &session, None, "", StatusCode::OK).await
}

/// POST /login
async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match verify_csrf_token(&session, &form.token).await {
        Ok(true) => {}
        Ok(false) => {
            return render_login(
                &state,
                &session,
                Some(EXPIRED_FORM),
                &form.email,
                StatusCode::FORBIDDEN,
            )
            .await;
        }
        Err(e) => return server_error(e),
    }

    if !credentials_match(state.admin(), &form.email, &form.password) {
        tracing::warn!(email = %form.email.trim(), "failed admin login");
        return render_login(
            &state,
            &session,
            Some(INVALID_CREDENTIALS),
            &form.email,
            StatusCode::UNAUTHORIZED,
        )
        .await;
    }

    // New id on privilege change.
    if let Err(e) = session.cycle_id().await {
        return server_error(e.into());
    }
    if let Err(e) = session
        .insert(SESSION_OPERATOR, state.admin().email.clone())
        .await
    {
        return server_error(e.into());
    }

    tracing::info!(email = %state.admin().email, "operator logged in");
    Redirect::to(&dashboard_path(&state)).into_response()
}

/// POST /logout
async fn logout(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LogoutForm>,
) -> Response {
    match verify_csrf_token(&session, &form.token).await {
        Ok(true) => {}
        Ok(false) => return (StatusCode::FORBIDDEN, EXPIRED_FORM).into_response(),
        Err(e) => return server_error(e),
    }

    if let Err(e) = session.flush().await {
        return server_error(e.into());
    }
    Redirect::to(&format!("{}/login", state.admin().root)).into_response()
}

/// GET /
async fn dashboard(State(state): State<AppState>, session: Session) -> Result<Response, Response> {
    require_operator(&state, &session).await?;

    let stored = state.posts().count_by_type().await.map_err(server_error)?;
    // Types without posts still get a row.
    let counts: Vec<TypeCount> = PostType::ALL
        .into_iter()
        .map(|post_type| TypeCount {
            label: post_type.label(),
            post_type: post_type.as_str(),
            count: stored
                .iter()
                .find(|(t, _)| *t == post_type)
                .map_or(0, |(_, n)| *n),
        })
        .collect();
    let total: i64 = counts.iter().map(|c| c.count).sum();

    let mut context = tera::Context::new();
    context.insert("counts", &counts);
    context.insert("total", &total);

    Ok(render_admin_with_status(
        &state,
        &session,
        StatusCode::OK,
        "admin/dashboard.html",
        context,
    )
    .await)
}

async fn render_login(
    state: &AppState,
    session: &Session,
    error: Option<&str>,
    email: &str,
    status: StatusCode,
) -> Response {
    let token = match generate_csrf_token(session).await {
        Ok(token) => token,
        Err(e) => return server_error(e),
    };

    let mut context = tera::Context::new();
    context.insert("csrf_token", &token);
    context.insert("email", email.trim());
    if let Some(error) = error {
        context.insert("error", error);
    }

    render_admin_with_status(state, session, status, "admin/login.html", context).await
}

fn dashboard_path(state: &AppState) -> String {
    state.admin().root.clone()
}

/// Create the admin router, to be nested under the admin root.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/login", get(login_form).post(login_submit))
        .route("/logout", post(logout))
        .merge(admin_post::router())
        .merge(admin_sub_category::router())
}
