//! HTTP route handlers.

pub mod admin;
pub mod admin_post;
pub mod admin_resource;
pub mod admin_sub_category;
pub mod api;
pub mod category;
pub mod health;
pub mod helpers;
pub mod search;

use axum::Router;

use crate::error::AppError;
use crate::state::AppState;

/// Every route: the public API at the root and the admin console nested
/// under `admin_root`.
pub fn router(admin_root: &str) -> Router<AppState> {
    Router::new()
        .merge(api::router())
        .merge(category::router())
        .merge(search::router())
        .merge(health::router())
        .nest(admin_root, admin::router())
        .fallback(|| async { AppError::not_found("Route") })
}
