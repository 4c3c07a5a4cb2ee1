//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::content::{PgStore, PostService, PostStore, SubCategoryStore};
use crate::db;
use crate::theme::ThemeEngine;

/// Admin console settings.
#[derive(Debug, Clone)]
pub struct AdminSettings {
    /// Mount path, e.g. `/admin`.
    pub root: String,
    pub email: String,
    pub password: String,
}

impl AdminSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.admin_root.clone(),
            email: config.admin_email.clone(),
            password: config.admin_password.clone(),
        }
    }
}

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL pool; None when running on an in-memory store.
    db: Option<PgPool>,

    posts: Arc<dyn PostStore>,

    sub_categories: Arc<dyn SubCategoryStore>,

    post_service: PostService,

    theme: Arc<ThemeEngine>,

    admin: AdminSettings,
}

impl AppState {
    /// Connect to PostgreSQL, apply migrations and load templates.
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = db::create_pool(config).await?;
        db::run_migrations(&pool).await?;
        info!("database migrations applied");

        let theme = ThemeEngine::new(&config.templates_dir)
            .context("failed to load admin templates")?;

        Ok(Self::with_store(
            Arc::new(PgStore::new(pool.clone())),
            theme,
            AdminSettings::from_config(config),
            Some(pool),
        ))
    }

    /// Build state over any store implementing both storage traits.
    pub fn with_store<S>(
        store: Arc<S>,
        theme: ThemeEngine,
        admin: AdminSettings,
        db: Option<PgPool>,
    ) -> Self
    where
        S: PostStore + SubCategoryStore + 'static,
    {
        let posts: Arc<dyn PostStore> = store.clone();
        let sub_categories: Arc<dyn SubCategoryStore> = store;

        Self {
            inner: Arc::new(AppStateInner {
                db,
                post_service: PostService::new(posts.clone()),
                posts,
                sub_categories,
                theme: Arc::new(theme),
                admin,
            }),
        }
    }

    pub fn posts(&self) -> &Arc<dyn PostStore> {
        &self.inner.posts
    }

    pub fn sub_categories(&self) -> &Arc<dyn SubCategoryStore> {
        &self.inner.sub_categories
    }

    pub fn post_service(&self) -> &PostService {
        &self.inner.post_service
    }

    pub fn theme(&self) -> &Arc<ThemeEngine> {
        &self.inner.theme
    }

    pub fn admin(&self) -> &AdminSettings {
        &self.inner.admin
    }

    /// Check PostgreSQL health. Always true without a database.
    pub async fn postgres_healthy(&self) -> bool {
        match &self.inner.db {
            Some(pool) => db::check_health(pool).await,
            None => true,
        }
    }
}
