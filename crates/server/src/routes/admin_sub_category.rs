//! Admin pages for sub-categories.

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
use crate::content::SlugConflict;
use crate::form::{Action, Params, Pipeline, SUB_CATEGORIES, params_from_form};
use crate::models::{SubCategory, SubCategoryDraft, SubCategoryInput};
use crate::state::AppState;

const SLUG_TAKEN: &str = "Slug already used in this category.";

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    page: Option<String>,
}

/// GET /resources/sub-categories
async fn list(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListParams>,
) -> Result<Response, Response> {
    require_operator(&state, &session).await?;

    let page = page_number(params.page.as_deref());
    let all = state
        .sub_categories()
        .list_sub_categories(None)
        .await
        .map_err(server_error)?;
    let total = i64::try_from(all.len()).map_err(|e| server_error(e.into()))?;

    let skip = usize::try_from((page - 1) * ADMIN_PAGE_SIZE).unwrap_or(usize::MAX);
    let take = usize::try_from(ADMIN_PAGE_SIZE).unwrap_or(usize::MAX);
    let mut rows = Vec::new();
    for sub in all.iter().skip(skip).take(take) {
        rows.push(list_row(
            &SUB_CATEGORIES,
            sub.id,
            record_params(sub).map_err(server_error)?,
        ));
    }

    Ok(render_list(
        &state,
        &session,
        &SUB_CATEGORIES,
        rows,
        page,
        total,
        tera::Context::new(),
    )
    .await)
}

/// GET /resources/sub-categories/new
async fn new_form(State(state): State<AppState>, session: Session) -> Result<Response, Response> {
    require_operator(&state, &session).await?;
    Ok(render_form(
        &state,
        &session,
        &SUB_CATEGORIES,
        None,
        &Params::new(),
        &[],
        StatusCode::OK,
    )
    .await)
}

fn validate(processed: &Params) -> Result<SubCategoryDraft, Vec<String>> {
    let input: SubCategoryInput = serde_json::from_value(Value::Object(processed.clone()))
        .map_err(|e| vec![format!("Invalid submission: {e}")])?;
    input.into_draft()
}

/// Store outcome: the saved record, or form errors for a taken slug.
fn conflict_as_form_error<T>(
    result: anyhow::Result<T>,
) -> Result<Result<T, Vec<String>>, Response> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(e) if SlugConflict::is_in(&e) => Ok(Err(vec![SLUG_TAKEN.to_string()])),
        Err(e) => Err(server_error(e)),
    }
}

/// POST /resources/sub-categories/new
async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, Response> {
    require_operator(&state, &session).await?;

    let submitted = params_from_form(pairs);
    let token_ok = check_token(&session, &submitted).await.map_err(server_error)?;
    let processed = Pipeline::for_action(&SUB_CATEGORIES, Action::Create).run(submitted);
    if !token_ok {
        return Ok(render_rejected(
            &state,
            &session,
            &SUB_CATEGORIES,
            None,
            processed,
            &[EXPIRED_FORM.to_string()],
        )
        .await);
    }

    let draft = match validate(&processed) {
        Ok(draft) => draft,
        Err(errors) => {
            return Ok(
                render_rejected(&state, &session, &SUB_CATEGORIES, None, processed, &errors)
                    .await,
            );
        }
    };

    let saved: Result<SubCategory, _> =
        conflict_as_form_error(state.sub_categories().insert_sub_category(&draft).await)?;
    match saved {
        Ok(sub) => {
            tracing::info!(id = %sub.id, slug = %sub.slug, "sub-category created");
            Ok(redirect_to_record(&state, &SUB_CATEGORIES, sub.id))
        }
        Err(errors) => Ok(render_rejected(
            &state,
            &session,
            &SUB_CATEGORIES,
            None,
            processed,
            &errors,
        )
        .await),
    }
}

async fn load(state: &AppState, id: Uuid) -> Result<Option<SubCategory>, Response> {
    state
        .sub_categories()
        .find_sub_category(id)
        .await
        .map_err(server_error)
}

/// GET /resources/sub-categories/{id}
async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, Response> {
    require_operator(&state, &session).await?;

    let Some(sub) = load(&state, id).await? else {
        return Ok(render_missing(&SUB_CATEGORIES));
    };
    let stored = record_params(&sub).map_err(server_error)?;
    Ok(render_show(&state, &session, &SUB_CATEGORIES, id, stored).await)
}

/// GET /resources/sub-categories/{id}/edit
async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Response, Response> {
    require_operator(&state, &session).await?;

    let Some(sub) = load(&state, id).await? else {
        return Ok(render_missing(&SUB_CATEGORIES));
    };
    let stored = record_params(&sub).map_err(server_error)?;
    let shown = Pipeline::for_action(&SUB_CATEGORIES, Action::Edit).run(stored);
    Ok(render_form(&state, &session, &SUB_CATEGORIES, Some(id), &shown, &[], StatusCode::OK).await)
}

/// POST /resources/sub-categories/{id}/edit
async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, Response> {
    require_operator(&state, &session).await?;

    let submitted = params_from_form(pairs);
    let token_ok = check_token(&session, &submitted).await.map_err(server_error)?;
    let processed = Pipeline::for_action(&SUB_CATEGORIES, Action::Update).run(submitted);
    if !token_ok {
        return Ok(render_rejected(
            &state,
            &session,
            &SUB_CATEGORIES,
            Some(id),
            processed,
            &[EXPIRED_FORM.to_string()],
        )
        .await);
    }

    let draft = match validate(&processed) {
        Ok(draft) => draft,
        Err(errors) => {
            return Ok(render_rejected(
                &state,
                &session,
                &SUB_CATEGORIES,
                Some(id),
                processed,
                &errors,
            )
            .await);
        }
    };

    let saved =
        conflict_as_form_error(state.sub_categories().update_sub_category(id, &draft).await)?;
    match saved {
        Ok(Some(sub)) => Ok(redirect_to_record(&state, &SUB_CATEGORIES, sub.id)),
        Ok(None) => Ok(render_missing(&SUB_CATEGORIES)),
        Err(errors) => Ok(render_rejected(
            &state,
            &session,
            &SUB_CATEGORIES,
            Some(id),
            processed,
            &errors,
        )
        .await),
    }
}

/// POST /resources/sub-categories/{id}/delete
///
/// Posts filed under the sub-category keep their category and lose the
/// sub-category reference.
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

    let deleted = state
        .sub_categories()
        .delete_sub_category(id)
        .await
        .map_err(server_error)?;
    if !deleted {
        return Ok(render_missing(&SUB_CATEGORIES));
    }
    Ok(Redirect::to(&resource_path(&state, &SUB_CATEGORIES)).into_response())
}

/// Create the sub-category admin router (mounted under the admin root).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/resources/sub-categories", get(list))
        .route("/resources/sub-categories/new", get(new_form).post(create))
        .route("/resources/sub-categories/{id}", get(show))
        .route("/resources/sub-categories/{id}/edit", get(edit_form).post(update))
        .route("/resources/sub-categories/{id}/delete", post(delete))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_reads_processed_params() {
        let mut params = Params::new();
        params.insert("category".into(), json!("Banking"));
        params.insert("name".into(), json!("IBPS PO"));
        params.insert("slug".into(), Value::Null);
        params.insert("_token".into(), json!("abc"));

        let draft = validate(&params).unwrap();
        assert_eq!(draft.slug, "ibps-po");
    }

    #[test]
    fn conflicts_become_form_errors() {
        let conflict: anyhow::Result<()> = Err(SlugConflict {
            slug: "ibps-po".into(),
        }
        .into());
        let outcome = conflict_as_form_error(conflict).ok().unwrap();
        assert_eq!(outcome.unwrap_err(), vec![SLUG_TAKEN.to_string()]);

        let other: anyhow::Result<()> = Err(anyhow::anyhow!("connection reset"));
        assert!(conflict_as_form_error(other).is_err());
    }
}
