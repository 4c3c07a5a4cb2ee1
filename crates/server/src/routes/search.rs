//! Title search across every post type.

use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use super::api::list_response;
use crate::error::{AppError, AppResult};
use crate::models::PostFilter;
use crate::state::AppState;

/// Shortest accepted query, in characters.
pub const MIN_QUERY_CHARS: usize = 2;

/// Results returned per search.
pub const SEARCH_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Response> {
    let needle = query.q.as_deref().map(str::trim).unwrap_or_default();
    if needle.chars().count() < MIN_QUERY_CHARS {
        return Err(AppError::BadRequest(format!(
            "Search query must be at least {MIN_QUERY_CHARS} characters"
        )));
    }

    let filter = PostFilter {
        title_contains: Some(needle.to_string()),
        ..PostFilter::default()
    }
    .page(1, SEARCH_LIMIT);

    list_response(&state, &filter).await
}

/// Create the search router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/search", get(search))
}
