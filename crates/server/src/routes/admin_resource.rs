//! Rendering shared by the admin resource pages (list, form, show).

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Serialize;
use serde_json::Value;
use tower_sessions::Session;
use uuid::Uuid;

use super::helpers::{html_escape, render_admin_with_status, server_error};
use crate::form::resource::display_value;
use crate::form::{
    Action, CSRF_FIELD, FieldView, Params, Pipeline, PropertyKind, Resource, generate_csrf_token,
    verify_csrf_token,
};
use crate::models::SubCategory;
use crate::state::AppState;

/// Rows per admin list page.
pub const ADMIN_PAGE_SIZE: i64 = 25;

/// Message shown when a submitted CSRF token is missing or stale.
pub const EXPIRED_FORM: &str = "This form has expired. Please submit it again.";

#[derive(Debug, Serialize)]
struct ResourceView {
    id: &'static str,
    label: &'static str,
}

impl From<&Resource> for ResourceView {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id,
            label: resource.label,
        }
    }
}

#[derive(Debug, Serialize)]
struct Column {
    name: &'static str,
    label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Row {
    id: Uuid,
    cells: Vec<String>,
}

/// Base path of a resource's pages.
pub fn resource_path(state: &AppState, resource: &Resource) -> String {
    format!("{}/resources/{}", state.admin().root, resource.id)
}

/// `303 See Other` to a record's show page.
pub fn redirect_to_record(state: &AppState, resource: &Resource, id: Uuid) -> Response {
    Redirect::to(&format!("{}/{id}", resource_path(state, resource))).into_response()
}

/// Serialise a stored record into parameters.
pub fn record_params<T: Serialize>(record: &T) -> Result<Params> {
    match serde_json::to_value(record).context("failed to serialize record")? {
        Value::Object(params) => Ok(params),
        other => anyhow::bail!("record serialized to {other}, expected an object"),
    }
}

/// Verify and consume the `_token` carried by a submission.
pub async fn check_token(session: &Session, params: &Params) -> Result<bool> {
    let submitted = params
        .get(CSRF_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default();
    verify_csrf_token(session, submitted).await
}

/// List row for a stored record.
pub fn list_row(resource: &Resource, id: Uuid, stored: Params) -> Row {
    let shown = Pipeline::for_action(resource, Action::Show).run(stored);
    let cells = resource
        .list_properties()
        .map(|p| shown.get(p.name).map(display_value).unwrap_or_default())
        .collect();
    Row { id, cells }
}

/// Render the list page.
pub async fn render_list(
    state: &AppState,
    session: &Session,
    resource: &Resource,
    rows: Vec<Row>,
    page: i64,
    total: i64,
    mut context: tera::Context,
) -> Response {
    let columns: Vec<Column> = resource
        .list_properties()
        .map(|p| Column {
            name: p.name,
            label: p.label,
        })
        .collect();
    let pages = ((total + ADMIN_PAGE_SIZE - 1) / ADMIN_PAGE_SIZE).max(1);

    context.insert("resource", &ResourceView::from(resource));
    context.insert("colspan", &(columns.len() + 1));
    context.insert("columns", &columns);
    context.insert("rows", &rows);
    context.insert("page", &page);
    context.insert("pages", &pages);
    if !context.contains_key("query_suffix") {
        context.insert("query_suffix", "");
    }

    render_admin_with_status(state, session, StatusCode::OK, "admin/list.html", context).await
}

/// Render the create/edit form.
///
/// `params` are in edit shape (structured fields as text, dates as
/// `YYYY-MM-DD`).
pub async fn render_form(
    state: &AppState,
    session: &Session,
    resource: &Resource,
    record_id: Option<Uuid>,
    params: &Params,
    errors: &[String],
    status: StatusCode,
) -> Response {
    let token = match generate_csrf_token(session).await {
        Ok(token) => token,
        Err(e) => return server_error(e),
    };

    let sub_categories = match reference_options(state, resource).await {
        Ok(subs) => subs,
        Err(e) => return server_error(e),
    };

    let base = resource_path(state, resource);
    let form_action = match record_id {
        Some(id) => format!("{base}/{id}/edit"),
        None => format!("{base}/new"),
    };

    let mut context = tera::Context::new();
    context.insert("resource", &ResourceView::from(resource));
    context.insert("record_id", &record_id);
    context.insert("form_action", &form_action);
    context.insert("fields", &resource.fields(params, &sub_categories));
    context.insert("errors", errors);
    context.insert("csrf_token", &token);

    render_admin_with_status(state, session, status, "admin/form.html", context).await
}

/// Re-render a rejected submission with its values and errors.
///
/// `processed` is the submission after the create/update pipeline.
pub async fn render_rejected(
    state: &AppState,
    session: &Session,
    resource: &Resource,
    record_id: Option<Uuid>,
    processed: Params,
    errors: &[String],
) -> Response {
    let shown = Pipeline::for_action(resource, Action::Edit).run(processed);
    render_form(
        state,
        session,
        resource,
        record_id,
        &shown,
        errors,
        StatusCode::UNPROCESSABLE_ENTITY,
    )
    .await
}

/// Render a record's detail page from its stored parameters.
pub async fn render_show(
    state: &AppState,
    session: &Session,
    resource: &Resource,
    id: Uuid,
    stored: Params,
) -> Response {
    let token = match generate_csrf_token(session).await {
        Ok(token) => token,
        Err(e) => return server_error(e),
    };
    let sub_categories = match reference_options(state, resource).await {
        Ok(subs) => subs,
        Err(e) => return server_error(e),
    };

    let heading = stored
        .get(resource.title_property)
        .map(display_value)
        .unwrap_or_default();
    let shown = Pipeline::for_action(resource, Action::Show).run(stored);
    let fields: Vec<FieldView> = resource
        .fields(&shown, &sub_categories)
        .into_iter()
        .map(|mut field| {
            if let Some(selected) = field.options.iter().find(|o| o.selected) {
                field.value = selected.label.clone();
            }
            field
        })
        .collect();

    let mut context = tera::Context::new();
    context.insert("resource", &ResourceView::from(resource));
    context.insert("record_id", &id);
    context.insert("heading", &heading);
    context.insert("fields", &fields);
    context.insert("delete_token", &token);

    render_admin_with_status(state, session, StatusCode::OK, "admin/show.html", context).await
}

/// 404 page for a missing record.
pub fn render_missing(resource: &Resource) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(format!(
            "<h1>Not found</h1><p>No such record in {}.</p>",
            html_escape(resource.label)
        )),
    )
        .into_response()
}

/// Sub-categories for the reference select, when the resource has one.
async fn reference_options(state: &AppState, resource: &Resource) -> Result<Vec<SubCategory>> {
    let needed = resource
        .properties
        .iter()
        .any(|p| p.kind == PropertyKind::SubCategory);
    if needed {
        state.sub_categories().list_sub_categories(None).await
    } else {
        Ok(Vec::new())
    }
}

/// Page number from a query string value; anything invalid is page 1.
pub fn page_number(raw: Option<&str>) -> i64 {
    raw.and_then(|p| p.trim().parse::<i64>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}
