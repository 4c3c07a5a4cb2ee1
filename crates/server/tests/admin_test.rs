#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Admin console tests: login, post and sub-category forms.

mod common;

use axum::http::StatusCode;

use common::{TestApp, body_json, body_text, location};
use ezvacancy_test_utils::{assert, login_form, sub_category_form, test_post};

#[tokio::test]
async fn console_requires_login() {
    let app = TestApp::new().await;

    for path in ["/admin", "/admin/resources/posts", "/admin/resources/sub-categories/new"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), "/admin/login");
    }
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let app = TestApp::new().await;
    let (cookies, token) = app.page_token("/admin/login", "").await;

    let response = app
        .post_form(
            "/admin/login",
            login_form(common::ADMIN_EMAIL, "wrong", &token),
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert::contains(&body_text(response).await, "Invalid email or password.");
}

#[tokio::test]
async fn login_without_token_is_rejected() {
    let app = TestApp::new().await;
    let response = app
        .post_form(
            "/admin/login",
            login_form(common::ADMIN_EMAIL, common::ADMIN_PASSWORD, "forged"),
            "",
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dashboard_counts_posts() {
    let app = TestApp::new().await;
    let cookies = app.login().await;

    let response = app.get_with_cookies("/admin", &cookies).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert::contains(&html, "Dashboard");
    assert::contains(&html, "Answer key");
}

#[tokio::test]
async fn create_post_through_form() {
    let app = TestApp::new().await;
    let cookies = app.login().await;
    let (cookies, token) = app.page_token("/admin/resources/posts/new", &cookies).await;

    let post = test_post("job", "SSC CGL 2024")
        .posted_on("2025-01-12")
        .with_rows(
            "importantDates",
            &[("Apply start", "2025-01-01"), ("Last date", "2025-01-31")],
        );
    let response = app
        .post_form("/admin/resources/posts/new", post.form_body(&token), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/admin/resources/posts/"));
    assert_eq!(app.store.post_count().await, 1);

    let body = body_json(app.get("/api/jobs/ssc-cgl-2024").await).await;
    assert_eq!(body["postDate"], "2025-01-12T00:00:00Z");
    assert_eq!(
        serde_json::to_string(&body["importantDates"]).unwrap(),
        r#"{"Apply start":"2025-01-01","Last date":"2025-01-31"}"#
    );

    let show = app.get_with_cookies(&location(&response), &cookies).await;
    assert_eq!(show.status(), StatusCode::OK);
    assert::contains(&body_text(show).await, "SSC CGL 2024");
}

#[tokio::test]
async fn invalid_post_is_redisplayed() {
    let app = TestApp::new().await;
    let cookies = app.login().await;
    let (cookies, token) = app.page_token("/admin/resources/posts/new", &cookies).await;

    let post = test_post("job", "SSC CGL 2024")
        .without("organization")
        .with("applyUrl", "ftp://ssc.gov.in");
    let response = app
        .post_form("/admin/resources/posts/new", post.form_body(&token), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = body_text(response).await;
    assert::contains(&html, "Organization is required for jobs.");
    assert::contains(&html, "Apply URL must be a valid http(s) URL.");
    assert::contains(&html, "SSC CGL 2024");
    assert_eq!(app.store.post_count().await, 0);
}

#[tokio::test]
async fn stale_token_keeps_submission() {
    let app = TestApp::new().await;
    let cookies = app.login().await;

    let post = test_post("result", "CGL Tier 1 Result");
    let response = app
        .post_form("/admin/resources/posts/new", post.form_body("stale"), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let html = body_text(response).await;
    assert::contains(&html, "This form has expired.");
    assert::contains(&html, "CGL Tier 1 Result");
    assert_eq!(app.store.post_count().await, 0);
}

#[tokio::test]
async fn edit_and_delete_post() {
    let app = TestApp::new().await;
    let cookies = app.login().await;
    let (cookies, token) = app.page_token("/admin/resources/posts/new", &cookies).await;

    let response = app
        .post_form(
            "/admin/resources/posts/new",
            test_post("job", "SSC CGL 2024").form_body(&token),
            &cookies,
        )
        .await;
    let record = location(&response);

    // The edit form resubmits the stored slug alongside the other fields.
    let (cookies, token) = app.page_token(&format!("{record}/edit"), &cookies).await;
    let edited = test_post("job", "SSC CGL 2024")
        .with("applyUrl", "https://ssc.gov.in/apply")
        .with("slug", "ssc-cgl-2024");
    let response = app
        .post_form(&format!("{record}/edit"), edited.form_body(&token), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body = body_json(app.get("/api/jobs/ssc-cgl-2024").await).await;
    assert_eq!(body["applyUrl"], "https://ssc.gov.in/apply");

    let (cookies, token) = app.page_token(&format!("{record}/edit"), &cookies).await;
    let edited = test_post("job", "SSC CGL 2024 (Revised)").with("slug", "ssc-cgl-2024");
    let response = app
        .post_form(&format!("{record}/edit"), edited.form_body(&token), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body = body_json(app.get("/api/jobs/ssc-cgl-2024-revised").await).await;
    assert_eq!(body["title"], "SSC CGL 2024 (Revised)");
    let response = app.get("/api/jobs/ssc-cgl-2024").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let (cookies, token) = app.page_token(&record, &cookies).await;
    let response = app
        .post_form(
            &format!("{record}/delete"),
            format!("_token={token}"),
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/resources/posts");
    assert_eq!(app.store.post_count().await, 0);

    let response = app.get_with_cookies(&record, &cookies).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sub_category_slug_unique_per_category() {
    let app = TestApp::new().await;
    let cookies = app.login().await;

    let (cookies, token) = app
        .page_token("/admin/resources/sub-categories/new", &cookies)
        .await;
    let response = app
        .post_form(
            "/admin/resources/sub-categories/new",
            sub_category_form("Banking", "IBPS PO", "", &token),
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let (cookies, token) = app
        .page_token("/admin/resources/sub-categories/new", &cookies)
        .await;
    let response = app
        .post_form(
            "/admin/resources/sub-categories/new",
            sub_category_form("Banking", "IBPS P.O.", "ibps-po", &token),
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert::contains(&body_text(response).await, "Slug already used in this category.");

    let (cookies, token) = app
        .page_token("/admin/resources/sub-categories/new", &cookies)
        .await;
    let response = app
        .post_form(
            "/admin/resources/sub-categories/new",
            sub_category_form("SSC", "IBPS PO", "ibps-po", &token),
            &cookies,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let subs = body_json(app.get("/api/subcategories/banking").await).await;
    assert_eq!(subs.as_array().unwrap().len(), 1);
    assert_eq!(subs[0]["slug"], "ibps-po");
}

#[tokio::test]
async fn logout_ends_session() {
    let app = TestApp::new().await;
    let cookies = app.login().await;
    let (cookies, token) = app.page_token("/admin", &cookies).await;

    let response = app
        .post_form("/admin/logout", format!("_token={token}"), &cookies)
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin/login");

    let response = app.get_with_cookies("/admin", &cookies).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
