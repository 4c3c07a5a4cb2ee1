//! Admin pages for posts.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;
use serde_json::Value;
use tower_sessions::Session;
use uuid::Uuid;

use super::admin_resource::{
    ADMIN_PAGE_SIZE, EXPIRED_FORM, check_token, list_row, page_number, record_params,
    redirect_to_record, render_form, render_list, render_missing, render_rejected, render_show,
    resource_path,
};
use super::helpers::{require_operator, server_error};
use crate::form::{Action, POSTS, Params, Pipeline, params_from_form};
use crate::models::{PostDraft, PostFilter, PostInput, PostType};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    page: Option<String>,
    q: Option<String>,
    post_type: Option<String>,
}

/// GET /resources/posts
async fn list(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListParams>,
) -> Result<Response, Response> {
    require_operator(&state, &session).await?;

    let page = page_number(params.page.as_deref());
    let search = params.q.as_deref().map(str::trim).unwrap_or_default();
    let post_type = params
        .post_type
        .as_deref()
        .and_then(|t| t.parse::<PostType>().ok());

    let filter = PostFilter {
        post_type,
        title_contains: (!search.is_empty()).then(|| search.to_string()),
        ..PostFilter::default()
    }
    .page(page, ADMIN_PAGE_SIZE);

    let posts = state.posts().list_posts(&filter).await.map_err(server_error)?;
    let total = state.posts().count_posts(&filter).await.map_err(server_error)?;

    let mut rows = Vec::with_capacity(posts.len());
    for post in &posts {
        rows.push(list_row(&POSTS, post.id, record_params(post).map_err(server_error)?));
    }

    let mut query_suffix = String::new();
    if !search.is_empty() {
        query_suffix.push_str(&format!("&q={}", url_encode(search)));
    }
    if let Some(t) = post_type {
        query_suffix.push_str(&format!("&postType={t}"));
    }

    let mut context = tera::Context::new();
    context.insert("search", search);
    context.insert("post_type", &post_type.map(PostType::as_str));
    context.insert("query_suffix", &query_suffix);

    Ok(render_list(&state, &session, &POSTS, rows, page, total, context).await)
}

fn url_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// GET /resources/posts/new
async fn new_form(State(state): State<AppState>, session: Session) -> Result<Response, Response> {
    require_operator(&state, &session).await?;

    // Blank structured fields render as empty textareas.
    let blank = Pipeline::for_action(&POSTS, Action::Edit).run(Params::new());
    Ok(render_form(&state, &session, &POSTS, None, &blank, &[], StatusCode::OK).await)
}

/// Run a submission through the pipeline and validation.
///
/// Returns the processed parameters alongside the draft or the errors.
async fn validate(
    state: &AppState,
    action: Action,
    pairs: Vec<(String, String)>,
) -> Result<(Params, Result<PostDraft, Vec<String>>), Response> {
    let processed = Pipeline::for_action(&POSTS, action).run(params_from_form(pairs));

    let input: PostInput = match serde_json::from_value(Value::Object(processed.clone())) {
        Ok(input) => input,
        Err(e) => return Ok((processed, Err(vec![format!("Invalid submission: {e}")]))),
    };

    let mut draft = match input.into_draft() {
        Ok(draft) => draft,
        Err(errors) => return Ok((processed, Err(errors))),
    };

    if let Some(sub_id) = draft.sub_category_id {
        let found = state
            .sub_categories()
            .find_sub_category(sub_id)
            .await
            .map_err(server_error)?;
        match found {
            Some(sub) if draft.category.is_none() => draft.category = Some(sub.category),
            Some(sub) if draft.category != Some(sub.category) => {
                return Ok((
                    processed,
                    Err(vec!["Sub-category belongs to a different category.".to_string()]),
                ));
            }
            Some(_) => {}
            None => {
                return Ok((processed, Err(vec!["Sub-category does not exist.".to_string()])));
            }
        }
    }

    Ok((processed, Ok(draft)))
}

/// POST /resources/posts/new
async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, Response> {
    require_operator(&state, &session).await?;

    let submitted = params_from_form(pairs.clone());
    if !check_token(&session, &submitted).await.map_err(server_error)? {
        let processed = Pipeline::for_action(&POSTS, Action::Create).run(submitted);
        return Ok(render_rejected(
            &state,
            &session,
            &POSTS,
            None,
            processed,
            &[EXPIRED_FORM.to_string()],
        )
        .await);
    }

    let (processed, outcome) = validate(&state, Action::Create, pairs).await?;
    let draft = match outcome {
        Ok(draft) => draft,
        Err(errors) => {
            return Ok(render_rejected(&state, &session, &POSTS, None, processed, &errors).await);
        }
    };

    let post = state.post_service().create(&draft).await.map_err(server_error)?;
    Ok(redirect_to_record(&state, &POSTS, post.id))
}

/// GET /resources/posts/{id}
async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, Response> {
    require_operator(&state, &session).await?;

    let Some(post) = state.posts().find_post(id).await.map_err(server_error)? else {
        return Ok(render_missing(&POSTS));
    };
    let stored = record_params(&post).map_err(server_error)?;
    Ok(render_show(&state, &session, &POSTS, id, stored).await)
}

/// GET /resources/posts/{id}/edit
async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, Response> {
    require_operator(&state, &session).await?;

    let Some(post) = state.posts().find_post(id).await.map_err(server_error)? else {
        return Ok(render_missing(&POSTS));
    };
    let stored = record_params(&post).map_err(server_error)?;
    let shown = Pipeline::for_action(&POSTS, Action::Edit).run(stored);
    Ok(render_form(&state, &session, &POSTS, Some(id), &shown, &[], StatusCode::OK).await)
}

/// POST /resources/posts/{id}/edit
async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, Response> {
    require_operator(&state, &session).await?;

    let submitted = params_from_form(pairs.clone());
    if !check_token(&session, &submitted).await.map_err(server_error)? {
        let processed = Pipeline::for_action(&POSTS, Action::Update).run(submitted);
        return Ok(render_rejected(
            &state,
            &session,
            &POSTS,
            Some(id),
            processed,
            &[EXPIRED_FORM.to_string()],
        )
        .await);
    }

    let (processed, outcome) = validate(&state, Action::Update, pairs).await?;
    let draft = match outcome {
        Ok(draft) => draft,
        Err(errors) => {
            return Ok(
                render_rejected(&state, &session, &POSTS, Some(id), processed, &errors).await,
            );
        }
    };

    match state.post_service().update(id, &draft).await.map_err(server_error)? {
        Some(post) => Ok(redirect_to_record(&state, &POSTS, post.id)),
        None => Ok(render_missing(&POSTS)),
    }
}

/// POST /resources/posts/{id}/delete
async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, Response> {
    require_operator(&state, &session).await?;

    if !check_token(&session, &params_from_form(pairs)).await.map_err(server_error)? {
        return Ok((StatusCode::FORBIDDEN, EXPIRED_FORM).into_response());
    }

    if !state.post_service().delete(id).await.map_err(server_error)? {
        return Ok(render_missing(&POSTS));
    }
    Ok(Redirect::to(&resource_path(&state, &POSTS)).into_response())
}

/// Create the posts admin router (mounted under the admin root).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/resources/posts", get(list))
        .route("/resources/posts/new", get(new_form).post(create))
        .route("/resources/posts/{id}", get(show))
        .route("/resources/posts/{id}/edit", get(edit_form).post(update))
        .route("/resources/posts/{id}/delete", post(delete))
}
