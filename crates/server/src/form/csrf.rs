//! CSRF tokens for admin forms.
//!
//! Tokens live in the session, are single-use and expire after an hour.

use anyhow::{Context, Result};
use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tower_sessions::Session;

/// Form field carrying the token.
pub const CSRF_FIELD: &str = "_token";

const CSRF_SESSION_KEY: &str = "csrf_tokens";

/// Outstanding tokens kept per session; older ones are dropped.
const MAX_TOKENS: usize = 10;

const TOKEN_VALIDITY_SECS: i64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IssuedToken {
    token: String,
    issued_at: i64,
}

impl IssuedToken {
    fn is_live(&self, now: i64) -> bool {
        now - self.issued_at <= TOKEN_VALIDITY_SECS
    }
}

async fn load_tokens(session: &Session) -> Result<Vec<IssuedToken>> {
    let tokens = session
        .get::<Vec<IssuedToken>>(CSRF_SESSION_KEY)
        .await
        .context("failed to read CSRF tokens")?;
    Ok(tokens.unwrap_or_default())
}

/// Issue a token and remember it in the session.
pub async fn generate_csrf_token(session: &Session) -> Result<String> {
    let mut random_bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut random_bytes);
    let issued_at = Utc::now().timestamp();

    let mut hasher = Sha256::new();
    hasher.update(random_bytes);
    hasher.update(issued_at.to_le_bytes());
    let token = hex::encode(hasher.finalize());

    let mut tokens = load_tokens(session).await?;
    tokens.push(IssuedToken {
        token: token.clone(),
        issued_at,
    });
    if tokens.len() > MAX_TOKENS {
        let excess = tokens.len() - MAX_TOKENS;
        tokens.drain(..excess);
    }

    session
        .insert(CSRF_SESSION_KEY, tokens)
        .await
        .context("failed to store CSRF token")?;

    Ok(token)
}

/// Check a submitted token and consume it.
///
/// Returns false for unknown, expired or empty tokens.
pub async fn verify_csrf_token(session: &Session, submitted: &str) -> Result<bool> {
    if submitted.is_empty() {
        return Ok(false);
    }

    let mut tokens = load_tokens(session).await?;
    let now = Utc::now().timestamp();

    let found = tokens.iter().position(|issued| {
        issued.is_live(now) && bool::from(issued.token.as_bytes().ct_eq(submitted.as_bytes()))
    });

    let Some(index) = found else {
        return Ok(false);
    };

    tokens.remove(index);
    tokens.retain(|issued| issued.is_live(now));
    session
        .insert(CSRF_SESSION_KEY, tokens)
        .await
        .context("failed to update CSRF tokens")?;

    Ok(true)
}
