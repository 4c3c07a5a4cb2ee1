//! ezvacancy content backend.
//!
//! Public JSON API for government job postings and an operator admin
//! console. The `ezvacancy` binary wires [`build_app`] to a listener; the
//! library is exposed for integration testing.

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod form;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod theme;

use std::any::Any;

use anyhow::Result;
use axum::Router;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::error::ErrorBody;
use crate::state::AppState;

/// Assemble the application: routes, sessions, CORS and the panic and trace
/// layers.
pub async fn build_app(state: AppState, config: &Config) -> Result<Router> {
    let app = routes::router(&config.admin_root).with_state(state);

    // Middleware layers (last added = first executed in request flow):
    // TraceLayer → catch panic → CORS → session → routes
    let app = session::attach(app, config).await?;
    Ok(app
        .layer(build_cors_layer(config))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http()))
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
            .expose_headers([routes::api::TOTAL_COUNT_HEADER])
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        // Credentials rule out wildcard headers.
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .expose_headers([routes::api::TOTAL_COUNT_HEADER])
            .allow_credentials(true)
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(ErrorBody {
            message: "internal server error".to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn panics_become_json_500() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "internal server error");
    }
}
