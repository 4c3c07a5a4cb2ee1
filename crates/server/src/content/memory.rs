//! In-process store.
//!
//! Mirrors [`super::PgStore`] semantics (unique slugs, ordering, filters)
//! without a database. Used by router and service tests.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::slug::SlugIndex;
use super::store::{PostStore, SlugConflict, SubCategoryStore};
use crate::models::{
    Category, Post, PostDraft, PostFilter, PostType, SubCategory, SubCategoryDraft,
};

#[derive(Default)]
pub struct MemoryStore {
    posts: RwLock<HashMap<Uuid, Post>>,
    sub_categories: RwLock<HashMap<Uuid, SubCategory>>,
    blind_lookup: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose slug lookup always reports "free", so every collision is
    /// only caught at write time.
    pub fn with_blind_lookup() -> Self {
        Self {
            blind_lookup: true,
            ..Self::default()
        }
    }

    pub async fn post_count(&self) -> usize {
        self.posts.read().await.len()
    }
}

fn build_post(id: Uuid, slug: &str, draft: &PostDraft, previous: Option<&Post>) -> Post {
    let now = Utc::now();
    Post {
        id,
        post_type: draft.post_type,
        title: draft.title.clone(),
        organization: draft.organization.clone(),
        category: draft.category,
        scope: draft.scope,
        sub_category_id: draft.sub_category_id,
        post_date: draft
            .post_date
            .or(previous.map(|p| p.post_date))
            .unwrap_or(now),
        last_date: draft.last_date,
        apply_url: draft.apply_url.clone(),
        notice_url: draft.notice_url.clone(),
        download_url: draft.download_url.clone(),
        result_url: draft.result_url.clone(),
        short_information: draft.short_information.clone(),
        how_to_apply: draft.how_to_apply.clone(),
        important_dates: draft.important_dates.clone(),
        application_fee: draft.application_fee.clone(),
        age_limit: draft.age_limit.clone(),
        vacancy_details: draft.vacancy_details.clone(),
        useful_links: draft.useful_links.clone(),
        slug: slug.to_string(),
        created_at: previous.map_or(now, |p| p.created_at),
        updated_at: now,
    }
}

fn matches(post: &Post, filter: &PostFilter) -> bool {
    filter.post_type.is_none_or(|t| post.post_type == t)
        && filter.category.is_none_or(|c| post.category == Some(c))
        && filter
            .sub_category_id
            .is_none_or(|id| post.sub_category_id == Some(id))
        && filter
            .title_contains
            .as_deref()
            .is_none_or(|needle| post.title.to_lowercase().contains(&needle.to_lowercase()))
}

fn slug_taken(posts: &HashMap<Uuid, Post>, slug: &str, exclude: Option<Uuid>) -> bool {
    posts
        .values()
        .any(|p| p.slug == slug && Some(p.id) != exclude)
}

#[async_trait]
impl SlugIndex for MemoryStore {
    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool> {
        if self.blind_lookup {
            return Ok(false);
        }
        Ok(slug_taken(&*self.posts.read().await, slug, exclude))
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, id: Uuid, slug: &str, draft: &PostDraft) -> Result<Post> {
        let mut posts = self.posts.write().await;
        if slug_taken(&posts, slug, None) {
            return Err(SlugConflict {
                slug: slug.to_string(),
            }
            .into());
        }
        let post = build_post(id, slug, draft, None);
        posts.insert(id, post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, slug: &str, draft: &PostDraft) -> Result<Option<Post>> {
        let mut posts = self.posts.write().await;
        if slug_taken(&posts, slug, Some(id)) {
            return Err(SlugConflict {
                slug: slug.to_string(),
            }
            .into());
        }
        let Some(previous) = posts.get(&id) else {
            return Ok(None);
        };
        let post = build_post(id, slug, draft, Some(previous));
        posts.insert(id, post.clone());
        Ok(Some(post))
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        Ok(self
            .posts
            .read()
            .await
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let posts = self.posts.read().await;
        let mut found: Vec<Post> = posts.values().filter(|p| matches(p, filter)).cloned().collect();
        found.sort_by(|a, b| {
            b.post_date
                .cmp(&a.post_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        let offset = usize::try_from(filter.offset).unwrap_or(0);
        let limit = usize::try_from(filter.limit).unwrap_or(0);
        Ok(found.into_iter().skip(offset).take(limit).collect())
    }

    async fn count_posts(&self, filter: &PostFilter) -> Result<i64> {
        let count = self
            .posts
            .read()
            .await
            .values()
            .filter(|p| matches(p, filter))
            .count();
        Ok(i64::try_from(count)?)
    }

    async fn count_by_type(&self) -> Result<Vec<(PostType, i64)>> {
        let posts = self.posts.read().await;
        let mut counts = Vec::new();
        for post_type in PostType::ALL {
            let n = posts.values().filter(|p| p.post_type == post_type).count();
            if n > 0 {
                counts.push((post_type, i64::try_from(n)?));
            }
        }
        Ok(counts)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl SubCategoryStore for MemoryStore {
    async fn find_sub_category(&self, id: Uuid) -> Result<Option<SubCategory>> {
        Ok(self.sub_categories.read().await.get(&id).cloned())
    }

    async fn list_sub_categories(&self, category: Option<Category>) -> Result<Vec<SubCategory>> {
        let subs = self.sub_categories.read().await;
        let mut found: Vec<SubCategory> = subs
            .values()
            .filter(|s| category.is_none_or(|c| s.category == c))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.category
                .as_str()
                .cmp(b.category.as_str())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(found)
    }

    async fn insert_sub_category(&self, draft: &SubCategoryDraft) -> Result<SubCategory> {
        let mut subs = self.sub_categories.write().await;
        if subs
            .values()
            .any(|s| s.category == draft.category && s.slug == draft.slug)
        {
            return Err(SlugConflict {
                slug: draft.slug.clone(),
            }
            .into());
        }
        let sub = SubCategory {
            id: Uuid::now_v7(),
            category: draft.category,
            name: draft.name.clone(),
            slug: draft.slug.clone(),
            created_at: Utc::now(),
        };
        subs.insert(sub.id, sub.clone());
        Ok(sub)
    }

    async fn update_sub_category(
        &self,
        id: Uuid,
        draft: &SubCategoryDraft,
    ) -> Result<Option<SubCategory>> {
        let mut subs = self.sub_categories.write().await;
        if subs
            .values()
            .any(|s| s.id != id && s.category == draft.category && s.slug == draft.slug)
        {
            return Err(SlugConflict {
                slug: draft.slug.clone(),
            }
            .into());
        }
        let Some(sub) = subs.get_mut(&id) else {
            return Ok(None);
        };
        sub.category = draft.category;
        sub.name = draft.name.clone();
        sub.slug = draft.slug.clone();
        Ok(Some(sub.clone()))
    }

    async fn delete_sub_category(&self, id: Uuid) -> Result<bool> {
        let removed = self.sub_categories.write().await.remove(&id).is_some();
        if removed {
            for post in self.posts.write().await.values_mut() {
                if post.sub_category_id == Some(id) {
                    post.sub_category_id = None;
                }
            }
        }
        Ok(removed)
    }
}
