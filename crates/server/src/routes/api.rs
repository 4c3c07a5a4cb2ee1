//! Public read API for posts.
//!
//! - `GET /api/{plural}` and `GET /api/{plural}/{slug}` for every post type
//! - `GET /api/homepage-sections`
//! - `GET /api/posts/{slug}` and `GET /api/posts/type/{postType}`

use axum::extract::{Path, Query, State};
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::post::{DEFAULT_LIMIT, MAX_LIMIT};
use crate::models::{Category, Post, PostFilter, PostType};
use crate::state::AppState;

/// Response header carrying the unpaged match count.
pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// Posts per homepage section.
const HOMEPAGE_SECTION_LIMIT: i64 = 10;

/// Listing query parameters.
///
/// Kept as strings so malformed values produce a JSON 400 rather than an
/// extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
}

impl ListQuery {
    /// Build a filter for posts of `post_type` (or every type).
    pub fn to_filter(&self, post_type: Option<PostType>) -> AppResult<PostFilter> {
        let limit = parse_positive(self.limit.as_deref(), "limit")?.unwrap_or(DEFAULT_LIMIT);
        let page = parse_positive(self.page.as_deref(), "page")?.unwrap_or(1);

        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<Category>()
                    .map_err(|_| AppError::BadRequest(format!("Invalid category: {raw}")))?,
            ),
        };

        let title_contains = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        Ok(PostFilter {
            post_type,
            category,
            title_contains,
            ..PostFilter::default()
        }
        .page(page, limit.min(MAX_LIMIT)))
    }
}

fn parse_positive(value: Option<&str>, name: &str) -> AppResult<Option<i64>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n >= 1 => Ok(Some(n)),
            _ => Err(AppError::BadRequest(format!(
                "{name} must be a positive integer"
            ))),
        },
    }
}

/// Run a listing and attach the total count header.
pub async fn list_response(state: &AppState, filter: &PostFilter) -> AppResult<Response> {
    let posts = state.posts().list_posts(filter).await?;
    let total = state.posts().count_posts(filter).await?;

    let mut response = Json(posts).into_response();
    response
        .headers_mut()
        .insert(TOTAL_COUNT_HEADER, HeaderValue::from(total));
    Ok(response)
}

async fn list_of_type(
    state: AppState,
    query: ListQuery,
    post_type: PostType,
) -> AppResult<Response> {
    let filter = query.to_filter(Some(post_type))?;
    list_response(&state, &filter).await
}

async fn show_of_type(state: AppState, slug: String, post_type: PostType) -> AppResult<Json<Post>> {
    match state.posts().find_post_by_slug(&slug).await? {
        Some(post) if post.post_type == post_type => Ok(Json(post)),
        _ => Err(AppError::not_found(post_type.label())),
    }
}

/// Homepage bundle.
#[derive(Debug, Serialize)]
pub struct HomepageSections {
    pub ssc: Vec<Post>,
    pub railway: Vec<Post>,
    pub banking: Vec<Post>,
}

async fn homepage_sections(State(state): State<AppState>) -> AppResult<Json<HomepageSections>> {
    let section =
        |category: Category| PostFilter::in_category(category).page(1, HOMEPAGE_SECTION_LIMIT);
    let (ssc_filter, railway_filter, banking_filter) = (
        section(Category::Ssc),
        section(Category::Railway),
        section(Category::Banking),
    );
    let posts = state.posts();

    let (ssc, railway, banking) = tokio::try_join!(
        posts.list_posts(&ssc_filter),
        posts.list_posts(&railway_filter),
        posts.list_posts(&banking_filter),
    )?;

    Ok(Json(HomepageSections {
        ssc,
        railway,
        banking,
    }))
}

async fn post_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Post>> {
    state
        .posts()
        .find_post_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Post"))
}

async fn posts_by_type(
    State(state): State<AppState>,
    Path(post_type): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Response> {
    let post_type = post_type
        .parse::<PostType>()
        .map_err(|_| AppError::BadRequest("Invalid post type".to_string()))?;
    list_of_type(state, query, post_type).await
}

/// Create the post API router.
pub fn router() -> Router<AppState> {
    let mut router = Router::new()
        .route("/api/homepage-sections", get(homepage_sections))
        .route("/api/posts/{slug}", get(post_by_slug))
        .route("/api/posts/type/{post_type}", get(posts_by_type));

    for post_type in PostType::ALL {
        let collection = format!("/api/{}", post_type.plural());
        router = router
            .route(
                &collection,
                get(
                    move |State(state): State<AppState>, Query(query): Query<ListQuery>| {
                        list_of_type(state, query, post_type)
                    },
                ),
            )
            .route(
                &format!("{collection}/{{slug}}"),
                get(
                    move |State(state): State<AppState>, Path(slug): Path<String>| {
                        show_of_type(state, slug, post_type)
                    },
                ),
            );
    }

    router
}
