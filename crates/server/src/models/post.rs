//! Post model and persistence.
//!
//! A post is one listing on the site: a job notification, admit card,
//! result, answer key or syllabus. All kinds share the `posts` table and are
//! told apart by `post_type`.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::category::{Category, Scope, UnknownVariant};
use crate::content::structured_text::FieldMap;
use crate::db::escape_like;

/// Columns selected for a full [`Post`] row.
const POST_COLUMNS: &str = "id, post_type, title, organization, category, scope, sub_category_id, \
     post_date, last_date, apply_url, notice_url, download_url, result_url, short_information, \
     how_to_apply, important_dates, application_fee, age_limit, vacancy_details, useful_links, \
     slug, created_at, updated_at";

/// Default page size for listings.
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 100;

/// Kind of posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "post_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PostType {
    /// Recruitment notification. Older records called this `notification`.
    #[serde(alias = "notification")]
    Job,
    AdmitCard,
    #[serde(rename = "result")]
    #[sqlx(rename = "result")]
    ExamResult,
    AnswerKey,
    Syllabus,
}

impl PostType {
    pub const ALL: [PostType; 5] = [
        PostType::Job,
        PostType::AdmitCard,
        PostType::ExamResult,
        PostType::AnswerKey,
        PostType::Syllabus,
    ];

    /// Stored value, e.g. `admit-card`.
    pub fn as_str(self) -> &'static str {
        match self {
            PostType::Job => "job",
            PostType::AdmitCard => "admit-card",
            PostType::ExamResult => "result",
            PostType::AnswerKey => "answer-key",
            PostType::Syllabus => "syllabus",
        }
    }

    /// Collection segment under `/api`, e.g. `admit-cards`.
    pub fn plural(self) -> &'static str {
        match self {
            PostType::Job => "jobs",
            PostType::AdmitCard => "admit-cards",
            PostType::ExamResult => "results",
            PostType::AnswerKey => "answer-keys",
            PostType::Syllabus => "syllabuses",
        }
    }

    /// Human-readable singular name.
    pub fn label(self) -> &'static str {
        match self {
            PostType::Job => "Job",
            PostType::AdmitCard => "Admit card",
            PostType::ExamResult => "Result",
            PostType::AnswerKey => "Answer key",
            PostType::Syllabus => "Syllabus",
        }
    }

    /// Whether the organization is joined to the title when deriving a slug.
    pub fn slug_includes_organization(self) -> bool {
        matches!(self, PostType::AdmitCard | PostType::ExamResult)
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        if needle == "notification" {
            return Ok(PostType::Job);
        }
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| UnknownVariant {
                kind: "post type",
                value: s.to_string(),
            })
    }
}

/// Post record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    pub post_type: PostType,

    /// Post title; the exam name for admit cards, results and the like.
    pub title: String,

    pub organization: Option<String>,

    pub category: Option<Category>,

    pub scope: Option<Scope>,

    pub sub_category_id: Option<Uuid>,

    /// Publication date shown on the site; listings sort on it.
    pub post_date: DateTime<Utc>,

    /// Closing date for applications.
    pub last_date: Option<DateTime<Utc>>,

    pub apply_url: Option<String>,
    pub notice_url: Option<String>,
    pub download_url: Option<String>,
    pub result_url: Option<String>,

    pub short_information: Option<String>,
    pub how_to_apply: Option<String>,

    #[sqlx(json)]
    pub important_dates: FieldMap,
    #[sqlx(json)]
    pub application_fee: FieldMap,
    #[sqlx(json)]
    pub age_limit: FieldMap,
    #[sqlx(json)]
    pub vacancy_details: FieldMap,
    #[sqlx(json)]
    pub useful_links: FieldMap,

    /// URL identifier, unique across all posts.
    pub slug: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated post contents, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub post_type: PostType,
    pub title: String,
    pub organization: Option<String>,
    pub category: Option<Category>,
    pub scope: Option<Scope>,
    pub sub_category_id: Option<Uuid>,
    /// None keeps the stored date (or "now" for new posts).
    pub post_date: Option<DateTime<Utc>>,
    pub last_date: Option<DateTime<Utc>>,
    pub apply_url: Option<String>,
    pub notice_url: Option<String>,
    pub download_url: Option<String>,
    pub result_url: Option<String>,
    pub short_information: Option<String>,
    pub how_to_apply: Option<String>,
    pub important_dates: FieldMap,
    pub application_fee: FieldMap,
    pub age_limit: FieldMap,
    pub vacancy_details: FieldMap,
    pub useful_links: FieldMap,
    /// Explicit slug requested by the editor; still made unique.
    pub slug: Option<String>,
}

impl PostDraft {
    /// A draft with only the required fields set.
    pub fn new(post_type: PostType, title: impl Into<String>) -> Self {
        Self {
            post_type,
            title: title.into(),
            organization: None,
            category: None,
            scope: None,
            sub_category_id: None,
            post_date: None,
            last_date: None,
            apply_url: None,
            notice_url: None,
            download_url: None,
            result_url: None,
            short_information: None,
            how_to_apply: None,
            important_dates: FieldMap::new(),
            application_fee: FieldMap::new(),
            age_limit: FieldMap::new(),
            vacancy_details: FieldMap::new(),
            useful_links: FieldMap::new(),
            slug: None,
        }
    }
}

/// Loosely typed post submission, as produced by the admin form pipeline.
///
/// Every field is optional here; [`PostInput::into_draft`] applies the
/// per-type rules and reports every problem at once.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostInput {
    pub post_type: Option<String>,
    pub title: Option<String>,
    pub organization: Option<String>,
    pub category: Option<String>,
    pub scope: Option<String>,
    pub sub_category_id: Option<String>,
    pub post_date: Option<String>,
    pub last_date: Option<String>,
    pub apply_url: Option<String>,
    pub notice_url: Option<String>,
    pub download_url: Option<String>,
    pub result_url: Option<String>,
    pub short_information: Option<String>,
    pub how_to_apply: Option<String>,
    pub important_dates: Option<FieldMap>,
    pub application_fee: Option<FieldMap>,
    pub age_limit: Option<FieldMap>,
    pub vacancy_details: Option<FieldMap>,
    pub useful_links: Option<FieldMap>,
    pub slug: Option<String>,
}

impl PostInput {
    /// Validate the submission into a [`PostDraft`].
    pub fn into_draft(self) -> Result<PostDraft, Vec<String>> {
        let mut errors = Vec::new();

        let post_type = match non_blank(self.post_type) {
            None => {
                errors.push("Post type is required.".to_string());
                None
            }
            Some(raw) => match raw.parse::<PostType>() {
                Ok(t) => Some(t),
                Err(_) => {
                    errors.push(format!("Invalid post type: {raw}."));
                    None
                }
            },
        };

        let title = non_blank(self.title);
        if title.is_none() {
            errors.push("Title is required.".to_string());
        }

        let organization = non_blank(self.organization);

        let category = match non_blank(self.category) {
            None => None,
            Some(raw) => match raw.parse::<Category>() {
                Ok(c) => Some(c),
                Err(_) => {
                    errors.push(format!("Invalid category: {raw}."));
                    None
                }
            },
        };

        let scope = match non_blank(self.scope) {
            None => None,
            Some(raw) => match Scope::ALL.into_iter().find(|s| s.as_str() == raw) {
                Some(s) => Some(s),
                None => {
                    errors.push(format!("Invalid scope: {raw}."));
                    None
                }
            },
        };

        let sub_category_id = match non_blank(self.sub_category_id) {
            None => None,
            Some(raw) => match Uuid::parse_str(&raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.push("Invalid sub-category.".to_string());
                    None
                }
            },
        };

        let post_date = parse_timestamp(self.post_date, "Post date", &mut errors);
        let last_date = parse_timestamp(self.last_date, "Last date", &mut errors);

        let apply_url = checked_url(self.apply_url, "Apply URL", &mut errors);
        let notice_url = checked_url(self.notice_url, "Notice URL", &mut errors);
        let download_url = checked_url(self.download_url, "Download URL", &mut errors);
        let result_url = checked_url(self.result_url, "Result URL", &mut errors);

        let short_information = non_blank(self.short_information);

        if let Some(post_type) = post_type {
            match post_type {
                PostType::Job => {
                    if organization.is_none() {
                        errors.push("Organization is required for jobs.".to_string());
                    }
                    if category.is_none() && not_reported(&errors, "Invalid category") {
                        errors.push("Category is required for jobs.".to_string());
                    }
                }
                PostType::AdmitCard | PostType::AnswerKey => {
                    if download_url.is_none() && not_reported(&errors, "Download URL") {
                        errors.push(format!(
                            "Download URL is required for {}s.",
                            post_type.label().to_lowercase()
                        ));
                    }
                }
                PostType::ExamResult => {
                    if result_url.is_none() && not_reported(&errors, "Result URL") {
                        errors.push("Result URL is required for results.".to_string());
                    }
                }
                PostType::Syllabus => {
                    if organization.is_none() {
                        errors.push("Organization is required for syllabuses.".to_string());
                    }
                    if short_information.is_none() {
                        errors.push("Syllabus details are required.".to_string());
                    }
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let (Some(post_type), Some(title)) = (post_type, title) else {
            return Err(vec!["Post type and title are required.".to_string()]);
        };

        Ok(PostDraft {
            post_type,
            title,
            organization,
            category,
            scope,
            sub_category_id,
            post_date,
            last_date,
            apply_url,
            notice_url,
            download_url,
            result_url,
            short_information,
            how_to_apply: non_blank(self.how_to_apply),
            important_dates: self.important_dates.unwrap_or_default(),
            application_fee: self.application_fee.unwrap_or_default(),
            age_limit: self.age_limit.unwrap_or_default(),
            vacancy_details: self.vacancy_details.unwrap_or_default(),
            useful_links: self.useful_links.unwrap_or_default(),
            slug: non_blank(self.slug),
        })
    }
}

/// True when no error starting with `prefix` has been recorded.
fn not_reported(errors: &[String], prefix: &str) -> bool {
    !errors.iter().any(|e| e.starts_with(prefix))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_timestamp(
    value: Option<String>,
    field: &str,
    errors: &mut Vec<String>,
) -> Option<DateTime<Utc>> {
    let raw = non_blank(value)?;
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(_) => {
            errors.push(format!("{field} must be a valid date."));
            None
        }
    }
}

fn checked_url(value: Option<String>, field: &str, errors: &mut Vec<String>) -> Option<String> {
    let raw = non_blank(value)?;
    match url::Url::parse(&raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(raw),
        _ => {
            errors.push(format!("{field} must be a valid http(s) URL."));
            None
        }
    }
}

/// Listing criteria shared by the public API and the admin console.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFilter {
    pub post_type: Option<PostType>,
    pub category: Option<Category>,
    pub sub_category_id: Option<Uuid>,
    /// Case-insensitive title substring.
    pub title_contains: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            post_type: None,
            category: None,
            sub_category_id: None,
            title_contains: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl PostFilter {
    pub fn of_type(post_type: PostType) -> Self {
        Self {
            post_type: Some(post_type),
            ..Self::default()
        }
    }

    pub fn in_category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    /// Set the page window from a 1-based page number.
    pub fn page(mut self, page: i64, limit: i64) -> Self {
        self.limit = limit.clamp(1, MAX_LIMIT);
        self.offset = (page.max(1) - 1).saturating_mul(self.limit);
        self
    }

    fn push_conditions(&self, query: &mut QueryBuilder<'_, Postgres>) {
        if let Some(post_type) = self.post_type {
            query.push(" AND post_type = ").push_bind(post_type);
        }
        if let Some(category) = self.category {
            query.push(" AND category = ").push_bind(category);
        }
        if let Some(sub_category_id) = self.sub_category_id {
            query.push(" AND sub_category_id = ").push_bind(sub_category_id);
        }
        if let Some(needle) = &self.title_contains {
            query
                .push(" AND title ILIKE ")
                .push_bind(format!("%{}%", escape_like(needle)))
                .push(" ESCAPE '\\'");
        }
    }
}

impl Post {
    /// Find a post by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch post by id")?;

        Ok(post)
    }

    /// Find a post by slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1");
        let post = sqlx::query_as::<_, Post>(&sql)
            .bind(slug)
            .fetch_optional(pool)
            .await
            .context("failed to fetch post by slug")?;

        Ok(post)
    }

    /// Whether another post already uses `slug`.
    pub async fn slug_exists(pool: &PgPool, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM posts WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(pool)
        .await
        .context("failed to check slug uniqueness")?;

        Ok(exists)
    }

    /// List posts matching `filter`, newest post date first.
    pub async fn list(pool: &PgPool, filter: &PostFilter) -> Result<Vec<Self>> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE TRUE"
        ));
        filter.push_conditions(&mut query);
        query
            .push(" ORDER BY post_date DESC, created_at DESC LIMIT ")
            .push_bind(filter.limit)
            .push(" OFFSET ")
            .push_bind(filter.offset);

        let posts = query
            .build_query_as::<Post>()
            .fetch_all(pool)
            .await
            .context("failed to list posts")?;

        Ok(posts)
    }

    /// Count posts matching `filter`, ignoring its page window.
    pub async fn count(pool: &PgPool, filter: &PostFilter) -> Result<i64> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts WHERE TRUE");
        filter.push_conditions(&mut query);

        let total = query
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
            .context("failed to count posts")?;

        Ok(total)
    }

    /// Number of posts per type.
    pub async fn count_by_type(pool: &PgPool) -> Result<Vec<(PostType, i64)>> {
        let counts = sqlx::query_as::<_, (PostType, i64)>(
            "SELECT post_type, COUNT(*) FROM posts GROUP BY post_type",
        )
        .fetch_all(pool)
        .await
        .context("failed to count posts by type")?;

        Ok(counts)
    }

    /// Insert a post under the given id and slug.
    ///
    /// A slug collision surfaces as a unique violation on `posts_slug_key`.
    pub async fn insert(pool: &PgPool, id: Uuid, slug: &str, draft: &PostDraft) -> Result<Self> {
        let sql = format!(
            r#"
            INSERT INTO posts (
                id, post_type, title, organization, category, scope, sub_category_id,
                post_date, last_date, apply_url, notice_url, download_url, result_url,
                short_information, how_to_apply, important_dates, application_fee,
                age_limit, vacancy_details, useful_links, slug
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, COALESCE($8, now()), $9, $10, $11, $12, $13,
                $14, $15, $16::json, $17::json, $18::json, $19::json, $20::json, $21
            )
            RETURNING {POST_COLUMNS}
            "#
        );

        let post = bind_draft(sqlx::query_as::<_, Post>(&sql).bind(id), draft)?
            .bind(slug)
            .fetch_one(pool)
            .await
            .context("failed to insert post")?;

        Ok(post)
    }

    /// Overwrite a post's contents and slug. Returns None if it does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        slug: &str,
        draft: &PostDraft,
    ) -> Result<Option<Self>> {
        let sql = format!(
            r#"
            UPDATE posts SET
                post_type = $2, title = $3, organization = $4, category = $5, scope = $6,
                sub_category_id = $7, post_date = COALESCE($8, post_date), last_date = $9,
                apply_url = $10, notice_url = $11, download_url = $12, result_url = $13,
                short_information = $14, how_to_apply = $15, important_dates = $16::json,
                application_fee = $17::json, age_limit = $18::json,
                vacancy_details = $19::json, useful_links = $20::json, slug = $21,
                updated_at = now()
            WHERE id = $1
            RETURNING {POST_COLUMNS}
            "#
        );

        let post = bind_draft(sqlx::query_as::<_, Post>(&sql).bind(id), draft)?
            .bind(slug)
            .fetch_optional(pool)
            .await
            .context("failed to update post")?;

        Ok(post)
    }

    /// Delete a post.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete post")?;

        Ok(result.rows_affected() > 0)
    }
}

type PostQuery<'q> =
    sqlx::query::QueryAs<'q, Postgres, Post, <Postgres as sqlx::Database>::Arguments<'q>>;

/// Bind draft columns `$2..=$20` in table order.
fn bind_draft<'q>(query: PostQuery<'q>, draft: &'q PostDraft) -> Result<PostQuery<'q>> {
    Ok(query
        .bind(draft.post_type)
        .bind(&draft.title)
        .bind(&draft.organization)
        .bind(draft.category)
        .bind(draft.scope)
        .bind(draft.sub_category_id)
        .bind(draft.post_date)
        .bind(draft.last_date)
        .bind(&draft.apply_url)
        .bind(&draft.notice_url)
        .bind(&draft.download_url)
        .bind(&draft.result_url)
        .bind(&draft.short_information)
        .bind(&draft.how_to_apply)
        .bind(json_text(&draft.important_dates)?)
        .bind(json_text(&draft.application_fee)?)
        .bind(json_text(&draft.age_limit)?)
        .bind(json_text(&draft.vacancy_details)?)
        .bind(json_text(&draft.useful_links)?))
}

/// Serialise a structured field for a `$n::json` parameter.
///
/// Sent as text so Postgres keeps the key order.
fn json_text(map: &FieldMap) -> Result<String> {
    serde_json::to_string(map).context("failed to serialize structured field")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn job_input() -> PostInput {
        PostInput {
            post_type: Some("job".into()),
            title: Some("  SSC CGL 2024 ".into()),
            organization: Some("Staff Selection Commission".into()),
            category: Some("SSC".into()),
            ..PostInput::default()
        }
    }

    #[test]
    fn post_type_round_trip() {
        for t in PostType::ALL {
            assert_eq!(t.as_str().parse::<PostType>().unwrap(), t);
            assert_eq!(serde_json::to_value(t).unwrap(), t.as_str());
        }
    }

    #[test]
    fn post_type_accepts_legacy_notification() {
        assert_eq!("notification".parse::<PostType>().unwrap(), PostType::Job);
        let parsed: PostType = serde_json::from_value(serde_json::json!("notification")).unwrap();
        assert_eq!(parsed, PostType::Job);
    }

    #[test]
    fn post_type_unknown_fails() {
        assert!("circular".parse::<PostType>().is_err());
    }

    #[test]
    fn valid_job_becomes_draft() {
        let draft = job_input().into_draft().unwrap();
        assert_eq!(draft.post_type, PostType::Job);
        assert_eq!(draft.title, "SSC CGL 2024");
        assert_eq!(draft.category, Some(Category::Ssc));
        assert!(draft.important_dates.is_empty());
        assert_eq!(draft.slug, None);
    }

    #[test]
    fn missing_title_and_type_reported_together() {
        let errors = PostInput::default().into_draft().unwrap_err();
        assert!(errors.contains(&"Post type is required.".to_string()));
        assert!(errors.contains(&"Title is required.".to_string()));
    }

    #[test]
    fn invalid_category_is_a_validation_error() {
        let input = PostInput {
            category: Some("Defence".into()),
            ..job_input()
        };
        let errors = input.into_draft().unwrap_err();
        assert_eq!(errors, vec!["Invalid category: Defence.".to_string()]);
    }

    #[test]
    fn job_requires_organization_and_category() {
        let input = PostInput {
            organization: None,
            category: Some("  ".into()),
            ..job_input()
        };
        let errors = input.into_draft().unwrap_err();
        assert!(errors.contains(&"Organization is required for jobs.".to_string()));
        assert!(errors.contains(&"Category is required for jobs.".to_string()));
    }

    #[test]
    fn admit_card_requires_download_url() {
        let input = PostInput {
            post_type: Some("admit-card".into()),
            title: Some("SSC GD Admit Card".into()),
            ..PostInput::default()
        };
        let errors = input.into_draft().unwrap_err();
        assert_eq!(errors, vec!["Download URL is required for admit cards.".to_string()]);
    }

    #[test]
    fn result_requires_result_url() {
        let input = PostInput {
            post_type: Some("result".into()),
            title: Some("RRB NTPC Result".into()),
            result_url: Some("https://rrb.gov.in/result.pdf".into()),
            ..PostInput::default()
        };
        assert!(input.into_draft().is_ok());

        let input = PostInput {
            post_type: Some("result".into()),
            title: Some("RRB NTPC Result".into()),
            ..PostInput::default()
        };
        assert_eq!(
            input.into_draft().unwrap_err(),
            vec!["Result URL is required for results.".to_string()]
        );
    }

    #[test]
    fn urls_must_be_http() {
        let input = PostInput {
            apply_url: Some("javascript:alert(1)".into()),
            notice_url: Some("not a url".into()),
            ..job_input()
        };
        let errors = input.into_draft().unwrap_err();
        assert!(errors.contains(&"Apply URL must be a valid http(s) URL.".to_string()));
        assert!(errors.contains(&"Notice URL must be a valid http(s) URL.".to_string()));
    }

    #[test]
    fn dates_must_be_rfc3339() {
        let input = PostInput {
            post_date: Some("2025-01-12T00:00:00Z".into()),
            last_date: Some("12 Jan".into()),
            ..job_input()
        };
        assert_eq!(
            input.into_draft().unwrap_err(),
            vec!["Last date must be a valid date.".to_string()]
        );
    }

    #[test]
    fn syllabus_requires_details() {
        let input = PostInput {
            post_type: Some("syllabus".into()),
            title: Some("SSC CHSL Syllabus".into()),
            organization: Some("SSC".into()),
            ..PostInput::default()
        };
        assert_eq!(
            input.into_draft().unwrap_err(),
            vec!["Syllabus details are required.".to_string()]
        );
    }

    #[test]
    fn explicit_slug_is_kept_for_the_generator() {
        let input = PostInput {
            slug: Some(" custom-slug ".into()),
            ..job_input()
        };
        assert_eq!(input.into_draft().unwrap().slug.as_deref(), Some("custom-slug"));
    }

    #[test]
    fn filter_paging() {
        let filter = PostFilter::of_type(PostType::Job).page(3, 10);
        assert_eq!((filter.limit, filter.offset), (10, 20));

        let clamped = PostFilter::default().page(0, 10_000);
        assert_eq!((clamped.limit, clamped.offset), (MAX_LIMIT, 0));
    }

    #[test]
    fn far_page_saturates_offset() {
        let filter = PostFilter::default().page(i64::MAX, 20);
        assert_eq!((filter.limit, filter.offset), (20, i64::MAX));
    }

    #[test]
    fn organization_joins_slug_for_admit_cards_and_results() {
        let joined: Vec<PostType> = PostType::ALL
            .into_iter()
            .filter(|t| t.slug_includes_organization())
            .collect();
        assert_eq!(joined, vec![PostType::AdmitCard, PostType::ExamResult]);
    }

    #[test]
    fn post_serializes_camel_case() {
        let now = Utc::now();
        let post = Post {
            id: Uuid::now_v7(),
            post_type: PostType::AdmitCard,
            title: "SSC GD Admit Card".into(),
            organization: None,
            category: Some(Category::Ssc),
            scope: None,
            sub_category_id: None,
            post_date: now,
            last_date: None,
            apply_url: None,
            notice_url: None,
            download_url: Some("https://ssc.gov.in/a.pdf".into()),
            result_url: None,
            short_information: None,
            how_to_apply: None,
            important_dates: [("Exam".to_string(), "1 Feb".to_string())].into_iter().collect(),
            application_fee: FieldMap::new(),
            age_limit: FieldMap::new(),
            vacancy_details: FieldMap::new(),
            useful_links: FieldMap::new(),
            slug: "ssc-gd-admit-card".into(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["postType"], "admit-card");
        assert_eq!(json["downloadUrl"], "https://ssc.gov.in/a.pdf");
        assert_eq!(json["importantDates"]["Exam"], "1 Feb");
        assert!(json.get("postDate").is_some());
    }
}
