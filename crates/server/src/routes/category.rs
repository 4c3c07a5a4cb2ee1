//! Category endpoints.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::api::{ListQuery, list_response};
use crate::error::{AppError, AppResult};
use crate::models::{Category, SubCategory};
use crate::state::AppState;

#[derive(Debug, Serialize)]
struct CategoryInfo {
    name: &'static str,
    slug: &'static str,
}

async fn list_categories() -> Json<Vec<CategoryInfo>> {
    Json(
        Category::ALL
            .into_iter()
            .map(|c| CategoryInfo {
                name: c.as_str(),
                slug: c.slug(),
            })
            .collect(),
    )
}

fn category_from_path(slug: &str) -> AppResult<Category> {
    Category::from_slug(slug).ok_or_else(|| AppError::not_found("Category"))
}

/// Posts in a category, newest first. A `category` query parameter is
/// ignored in favour of the path.
async fn category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let category = category_from_path(&slug)?;
    let query = ListQuery {
        category: None,
        ..query
    };
    let mut filter = query.to_filter(None)?;
    filter.category = Some(category);
    list_response(&state, &filter).await
}

async fn category_sub_categories(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Vec<SubCategory>>> {
    let category = category_from_path(&slug)?;
    let subs = state
        .sub_categories()
        .list_sub_categories(Some(category))
        .await?;
    Ok(Json(subs))
}

/// Create the category router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories))
        .route("/api/category/{category_slug}", get(category_posts))
        .route(
            "/api/subcategories/{category_slug}",
            get(category_sub_categories),
        )
}
