//! Storage seam for posts and sub-categories.
//!
//! Handlers and services talk to these traits; [`PgStore`] is the production
//! backend and [`super::MemoryStore`] backs router tests.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::slug::SlugIndex;
use crate::db::is_unique_violation;
use crate::models::{
    Category, Post, PostDraft, PostFilter, PostType, SubCategory, SubCategoryDraft,
};

/// Unique index guarding post slugs.
pub const POST_SLUG_CONSTRAINT: &str = "posts_slug_key";

/// Unique index guarding sub-category slugs within a category.
pub const SUB_CATEGORY_SLUG_CONSTRAINT: &str = "sub_category_category_slug_key";

/// A write lost a slug race: another record already holds `slug`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("slug {slug:?} is already in use")]
pub struct SlugConflict {
    pub slug: String,
}

impl SlugConflict {
    /// Whether `err` carries a [`SlugConflict`] anywhere in its chain.
    pub fn is_in(err: &anyhow::Error) -> bool {
        err.chain().any(|cause| cause.is::<SlugConflict>())
    }
}

/// Post persistence.
#[async_trait]
pub trait PostStore: SlugIndex {
    /// Write a new post. Fails with [`SlugConflict`] if the slug is taken.
    async fn insert_post(&self, id: Uuid, slug: &str, draft: &PostDraft) -> Result<Post>;

    /// Overwrite an existing post. Fails with [`SlugConflict`] if the slug is
    /// taken by another post.
    async fn update_post(&self, id: Uuid, slug: &str, draft: &PostDraft) -> Result<Option<Post>>;

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>>;

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// Posts matching `filter`, newest `post_date` first.
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>>;

    async fn count_posts(&self, filter: &PostFilter) -> Result<i64>;

    async fn count_by_type(&self) -> Result<Vec<(PostType, i64)>>;

    async fn delete_post(&self, id: Uuid) -> Result<bool>;
}

/// Sub-category persistence.
#[async_trait]
pub trait SubCategoryStore: Send + Sync {
    async fn find_sub_category(&self, id: Uuid) -> Result<Option<SubCategory>>;

    /// All sub-categories, or those of one category.
    async fn list_sub_categories(&self, category: Option<Category>) -> Result<Vec<SubCategory>>;

    /// Fails with [`SlugConflict`] if the slug is taken within the category.
    async fn insert_sub_category(&self, draft: &SubCategoryDraft) -> Result<SubCategory>;

    async fn update_sub_category(
        &self,
        id: Uuid,
        draft: &SubCategoryDraft,
    ) -> Result<Option<SubCategory>>;

    async fn delete_sub_category(&self, id: Uuid) -> Result<bool>;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Replace a unique violation on `constraint` with a [`SlugConflict`].
fn map_conflict(err: anyhow::Error, constraint: &str, slug: &str) -> anyhow::Error {
    if is_unique_violation(&err, constraint) {
        anyhow::Error::new(SlugConflict {
            slug: slug.to_string(),
        })
    } else {
        err
    }
}

#[async_trait]
impl SlugIndex for PgStore {
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        Post::slug_exists(&self.pool, slug, exclude).await
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn insert_post(&self, id: Uuid, slug: &str, draft: &PostDraft) -> Result<Post> {
        Post::insert(&self.pool, id, slug, draft)
            .await
            .map_err(|e| map_conflict(e, POST_SLUG_CONSTRAINT, slug))
    }

    async fn update_post(&self, id: Uuid, slug: &str, draft: &PostDraft) -> Result<Option<Post>> {
        Post::update(&self.pool, id, slug, draft)
            .await
            .map_err(|e| map_conflict(e, POST_SLUG_CONSTRAINT, slug))
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        Post::find_by_id(&self.pool, id).await
    }

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        Post::find_by_slug(&self.pool, slug).await
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        Post::list(&self.pool, filter).await
    }

    async fn count_posts(&self, filter: &PostFilter) -> Result<i64> {
        Post::count(&self.pool, filter).await
    }

    async fn count_by_type(&self) -> Result<Vec<(PostType, i64)>> {
        Post::count_by_type(&self.pool).await
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        Post::delete(&self.pool, id).await
    }
}

#[async_trait]
impl SubCategoryStore for PgStore {
    async fn find_sub_category(&self, id: Uuid) -> Result<Option<SubCategory>> {
        SubCategory::find_by_id(&self.pool, id).await
    }

    async fn list_sub_categories(&self, category: Option<Category>) -> Result<Vec<SubCategory>> {
        match category {
            Some(category) => SubCategory::list_by_category(&self.pool, category).await,
            None => SubCategory::list(&self.pool).await,
        }
    }

    async fn insert_sub_category(&self, draft: &SubCategoryDraft) -> Result<SubCategory> {
        SubCategory::create(&self.pool, draft)
            .await
            .map_err(|e| map_conflict(e, SUB_CATEGORY_SLUG_CONSTRAINT, &draft.slug))
    }

    async fn update_sub_category(
        &self,
        id: Uuid,
        draft: &SubCategoryDraft,
    ) -> Result<Option<SubCategory>> {
        SubCategory::update(&self.pool, id, draft)
            .await
            .map_err(|e| map_conflict(e, SUB_CATEGORY_SLUG_CONSTRAINT, &draft.slug))
    }

    async fn delete_sub_category(&self, id: Uuid) -> Result<bool> {
        SubCategory::delete(&self.pool, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_detected_through_context() {
        let err = anyhow::Error::new(SlugConflict {
            slug: "ssc-cgl-2024".into(),
        })
        .context("failed to create post");
        assert!(SlugConflict::is_in(&err));
        assert!(!SlugConflict::is_in(&anyhow::anyhow!("connection reset")));
    }

    #[test]
    fn other_errors_pass_through_map_conflict() {
        let err = map_conflict(anyhow::anyhow!("timeout"), POST_SLUG_CONSTRAINT, "x");
        assert!(!SlugConflict::is_in(&err));
        assert_eq!(err.to_string(), "timeout");
    }
}
