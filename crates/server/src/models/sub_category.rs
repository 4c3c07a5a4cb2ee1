//! Sub-category model.
//!
//! Sub-categories refine a [`Category`] (e.g. "CGL" under SSC). Slugs are
//! unique within their category.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::category::Category;
use crate::content::slug::slugify;

/// Sub-category record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    pub id: Uuid,
    pub category: Category,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating or renaming a sub-category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCategoryDraft {
    pub category: Category,
    pub name: String,
    pub slug: String,
}

/// Sub-category form submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubCategoryInput {
    pub category: Option<String>,
    pub name: Option<String>,
    pub slug: Option<String>,
}

impl SubCategoryInput {
    /// Validate, deriving the slug from the name when none is given.
    pub fn into_draft(self) -> Result<SubCategoryDraft, Vec<String>> {
        let mut errors = Vec::new();

        let category = match self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            None => {
                errors.push("Category is required.".to_string());
                None
            }
            Some(raw) => match raw.parse::<Category>() {
                Ok(c) => Some(c),
                Err(_) => {
                    errors.push(format!("Invalid category: {raw}."));
                    None
                }
            },
        };

        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if name.is_none() {
            errors.push("Name is required.".to_string());
        }

        let source = self
            .slug
            .filter(|s| !s.trim().is_empty())
            .or_else(|| name.clone())
            .unwrap_or_default();
        let slug = slugify(&source);
        if slug.is_empty() && name.is_some() {
            errors.push("Slug must contain letters or digits.".to_string());
        }

        match (category, name) {
            (Some(category), Some(name)) if errors.is_empty() => Ok(SubCategoryDraft {
                category,
                name,
                slug,
            }),
            _ => Err(errors),
        }
    }
}

impl SubCategory {
    /// Find a sub-category by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>> {
        let sub = sqlx::query_as::<_, SubCategory>("SELECT * FROM sub_category WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .context("failed to fetch sub-category by id")?;

        Ok(sub)
    }

    /// List all sub-categories, grouped by category.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let subs = sqlx::query_as::<_, SubCategory>(
            "SELECT * FROM sub_category ORDER BY category, name",
        )
        .fetch_all(pool)
        .await
        .context("failed to list sub-categories")?;

        Ok(subs)
    }

    /// List the sub-categories of one category.
    pub async fn list_by_category(pool: &PgPool, category: Category) -> Result<Vec<Self>> {
        let subs = sqlx::query_as::<_, SubCategory>(
            "SELECT * FROM sub_category WHERE category = $1 ORDER BY name",
        )
        .bind(category)
        .fetch_all(pool)
        .await
        .context("failed to list sub-categories by category")?;

        Ok(subs)
    }

    /// Create a sub-category.
    ///
    /// A duplicate slug within the category surfaces as a unique violation
    /// on `sub_category_category_slug_key`.
    pub async fn create(pool: &PgPool, draft: &SubCategoryDraft) -> Result<Self> {
        let sub = sqlx::query_as::<_, SubCategory>(
            "INSERT INTO sub_category (id, category, name, slug) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(draft.category)
        .bind(&draft.name)
        .bind(&draft.slug)
        .fetch_one(pool)
        .await
        .context("failed to create sub-category")?;

        Ok(sub)
    }

    /// Update a sub-category.
    pub async fn update(pool: &PgPool, id: Uuid, draft: &SubCategoryDraft) -> Result<Option<Self>> {
        let sub = sqlx::query_as::<_, SubCategory>(
            "UPDATE sub_category SET category = $1, name = $2, slug = $3 WHERE id = $4 RETURNING *",
        )
        .bind(draft.category)
        .bind(&draft.name)
        .bind(&draft.slug)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to update sub-category")?;

        Ok(sub)
    }

    /// Delete a sub-category. Posts referencing it are detached.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sub_category WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .context("failed to delete sub-category")?;

        Ok(result.rows_affected() > 0)
    }
}
