//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Minimum accepted length of `SESSION_SECRET`, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Deployment environment, from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "dev" | "development" => Ok(Self::Development),
            "prod" | "production" => Ok(Self::Production),
            other => bail!("APP_ENV must be 'development' or 'production', got {other:?}"),
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 8080).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Redis connection URL for the session store. When None, sessions are
    /// kept in process memory.
    pub redis_url: Option<String>,

    /// CORS allowed origins (comma-separated, `ALLOWED_ORIGINS` also read,
    /// default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Secret the session cookie signing key is derived from.
    pub session_secret: String,

    /// Operator email for the admin console.
    pub admin_email: String,

    /// Operator password for the admin console.
    pub admin_password: String,

    /// Path the admin console is mounted under (default: /admin).
    pub admin_root: String,

    /// Deployment environment (default: development).
    pub environment: Environment,

    /// Cookie SameSite policy: "strict", "lax", or "none".
    ///
    /// Defaults to "none" in production (the public site and the API live on
    /// different origins) and "lax" otherwise.
    pub cookie_same_site: String,

    /// Directory holding the admin console templates (default: ./templates).
    pub templates_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let redis_url = env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty());

        let cors_allowed_origins = allowed_origins(
            env::var("CORS_ALLOWED_ORIGINS").ok(),
            env::var("ALLOWED_ORIGINS").ok(),
        );

        let session_secret =
            env::var("SESSION_SECRET").context("SESSION_SECRET environment variable is required")?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            bail!("SESSION_SECRET must be at least {MIN_SESSION_SECRET_LEN} bytes long");
        }

        let admin_email =
            env::var("ADMIN_EMAIL").context("ADMIN_EMAIL environment variable is required")?;
        let admin_password = env::var("ADMIN_PASSWORD")
            .context("ADMIN_PASSWORD environment variable is required")?;
        if admin_email.trim().is_empty() || admin_password.is_empty() {
            bail!("ADMIN_EMAIL and ADMIN_PASSWORD must not be empty");
        }

        let admin_root =
            normalize_mount_path(&env::var("ADMIN_ROOT").unwrap_or_else(|_| "/admin".to_string()))?;

        let environment = Environment::parse(&env::var("APP_ENV").unwrap_or_default())?;

        let cookie_same_site = env::var("COOKIE_SAME_SITE")
            .map(|v| v.to_lowercase())
            .unwrap_or_else(|_| {
                if environment.is_production() {
                    "none".to_string()
                } else {
                    "lax".to_string()
                }
            });

        let templates_dir = env::var("TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./templates"));

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            redis_url,
            cors_allowed_origins,
            session_secret,
            admin_email: admin_email.trim().to_string(),
            admin_password,
            admin_root,
            environment,
            cookie_same_site,
            templates_dir,
        })
    }
}

/// Split a comma-separated list, dropping blanks.
/// Origin list from `CORS_ALLOWED_ORIGINS`, else the older `ALLOWED_ORIGINS`
/// name, else `*`.
fn allowed_origins(primary: Option<String>, alias: Option<String>) -> Vec<String> {
    [primary, alias]
        .into_iter()
        .flatten()
        .map(|v| parse_list(&v))
        .find(|origins| !origins.is_empty())
        .unwrap_or_else(|| vec!["*".to_string()])
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Normalise a router mount path: leading slash, no trailing slash, not root.
pub fn normalize_mount_path(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("ADMIN_ROOT must not be the site root");
    }
    if trimmed.contains(['{', '}', '*', ' ']) {
        bail!("ADMIN_ROOT must be a plain path, got {raw:?}");
    }
    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{trimmed}"))
    }
}
