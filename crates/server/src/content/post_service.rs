//! Post service.
//!
//! Owns slug assignment: every create and update goes through here so the
//! slug rules hold regardless of which route saved the post.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::{info, warn};
use uuid::Uuid;

use super::slug::{base_slug, next_free, slugify};
use super::store::{PostStore, SlugConflict};
use crate::models::{Post, PostDraft};

/// Write attempts before a slug race is reported as a failure.
pub const MAX_SLUG_ATTEMPTS: u32 = 5;

/// Service for post writes with slug management.
#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    /// Create a post, assigning it a unique slug.
    pub async fn create(&self, draft: &PostDraft) -> Result<Post> {
        let id = Uuid::now_v7();
        let base = requested_slug(draft).unwrap_or_else(|| derived_slug(draft));
        let store = &self.store;

        let post = self
            .write_with_unique_slug(&base, None, |slug| async move {
                store.insert_post(id, &slug, draft).await
            })
            .await?;

        info!(post_id = %post.id, post_type = %post.post_type, slug = %post.slug, "post created");
        Ok(post)
    }

    /// Update a post. Returns None if it does not exist.
    ///
    /// The slug is recomputed only when its source fields changed, a
    /// different slug was requested, or the post has none. A requested slug
    /// equal to the stored one (as the edit form resubmits it) is not an
    /// override.
    pub async fn update(&self, id: Uuid, draft: &PostDraft) -> Result<Option<Post>> {
        let Some(existing) = self.store.find_post(id).await? else {
            return Ok(None);
        };

        let store = &self.store;
        let requested = requested_slug(draft).filter(|slug| *slug != existing.slug);
        let post = if requested.is_none() && keeps_slug(&existing, draft) {
            store.update_post(id, &existing.slug, draft).await?
        } else {
            let base = requested.unwrap_or_else(|| derived_slug(draft));
            self.write_with_unique_slug(&base, Some(id), |slug| async move {
                store.update_post(id, &slug, draft).await
            })
            .await?
        };

        if let Some(post) = &post {
            info!(post_id = %post.id, slug = %post.slug, "post updated");
        }
        Ok(post)
    }

    /// Delete a post.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let deleted = self.store.delete_post(id).await?;
        if deleted {
            info!(post_id = %id, "post deleted");
        }
        Ok(deleted)
    }

    /// Find a free slug and write, retrying when the write loses a race.
    async fn write_with_unique_slug<T, F, Fut>(
        &self,
        base: &str,
        exclude: Option<Uuid>,
        write: F,
    ) -> Result<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut start = 1;
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let (slug, n) = next_free(self.store.as_ref(), base, start, exclude).await?;
            match write(slug.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if SlugConflict::is_in(&e) => {
                    warn!(slug = %slug, attempt, "slug taken at write time, retrying");
                    start = n + 1;
                }
                Err(e) => return Err(e),
            }
        }

        bail!("could not assign a unique slug for {base:?} after {MAX_SLUG_ATTEMPTS} attempts")
    }
}

/// Whether an update leaves the slug's source fields untouched.
fn keeps_slug(existing: &Post, draft: &PostDraft) -> bool {
    !existing.slug.is_empty()
        && existing.title == draft.title
        && (!draft.post_type.slug_includes_organization()
            || existing.organization == draft.organization)
}

/// Normalised slug the operator typed, if any.
fn requested_slug(draft: &PostDraft) -> Option<String> {
    draft
        .slug
        .as_deref()
        .map(slugify)
        .filter(|slug| !slug.is_empty())
}

/// Slug derived from the title, joined with the organization for the types
/// that carry it, falling back to the post type when that normalises to
/// nothing.
fn derived_slug(draft: &PostDraft) -> String {
    let organization = draft
        .organization
        .as_deref()
        .filter(|_| draft.post_type.slug_includes_organization());
    let base = base_slug(&draft.title, organization);
    if base.is_empty() {
        draft.post_type.as_str().to_string()
    } else {
        base
    }
}
