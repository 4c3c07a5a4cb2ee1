//! Session management.
//!
//! Sessions are stored in Redis when `REDIS_URL` is set and in process
//! memory otherwise. Cookies are signed with a key derived from
//! `SESSION_SECRET`.

use anyhow::{Context, Result};
use axum::Router;
use fred::prelude::*;
use sha2::{Digest, Sha512};
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, SessionStore};
use tower_sessions_redis_store::RedisStore;
use tracing::info;

use crate::config::Config;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ezgovtjob-session";

/// Session lifetime since last activity.
pub const SESSION_EXPIRY_DAYS: i64 = 7;

/// Redis connections reserved for sessions.
const REDIS_POOL_SIZE: usize = 2;

/// Wrap `router` in the session layer chosen by `config`.
pub async fn attach(router: Router, config: &Config) -> Result<Router> {
    match &config.redis_url {
        Some(redis_url) => {
            let redis_config = fred::prelude::Config::from_url(redis_url)
                .context("failed to parse Redis URL")?;
            let pool = Builder::from_config(redis_config)
                .build_pool(REDIS_POOL_SIZE)
                .context("failed to create Redis pool")?;
            pool.init()
                .await
                .context("failed to connect to Redis for sessions")?;

            info!("sessions stored in Redis");
            Ok(with_store(router, RedisStore::new(pool), config))
        }
        None => {
            info!("REDIS_URL not set, sessions stored in memory");
            Ok(with_store(router, MemoryStore::default(), config))
        }
    }
}

/// Apply a session layer backed by `store`.
pub fn with_store<S>(router: Router, store: S, config: &Config) -> Router
where
    S: SessionStore + Clone,
{
    let same_site = parse_same_site(&config.cookie_same_site);
    // Browsers drop SameSite=None cookies that are not Secure.
    let secure = config.environment.is_production() || same_site == SameSite::None;

    let layer = SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_http_only(true)
        .with_secure(secure)
        .with_same_site(same_site)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_EXPIRY_DAYS)))
        .with_signed(signing_key(&config.session_secret));

    router.layer(layer)
}

/// Cookie signing key: SHA-512 of the secret (exactly the 64 bytes `Key`
/// requires).
fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

fn parse_same_site(value: &str) -> SameSite {
    match value.trim().to_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_site_values() {
        assert_eq!(parse_same_site("Strict"), SameSite::Strict);
        assert_eq!(parse_same_site("none"), SameSite::None);
        assert_eq!(parse_same_site("lax"), SameSite::Lax);
        assert_eq!(parse_same_site("bogus"), SameSite::Lax);
    }

    #[test]
    fn signing_key_is_deterministic() {
        let a = signing_key("0123456789abcdef0123456789abcdef");
        let b = signing_key("0123456789abcdef0123456789abcdef");
        let c = signing_key("fedcba9876543210fedcba9876543210");
        assert_eq!(a.master(), b.master());
        assert_ne!(a.master(), c.master());
    }
}
