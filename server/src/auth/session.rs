//! Session Validation
//!
//! Cookie-based browser authentication backed by the sessions table. The
//! cookie value is an opaque random token; only its SHA256 hash is stored.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use super::error::AuthResult;
use super::token::now_epoch_ms;
use crate::db::{self, Session, User};

/// Name of the browser session cookie.
pub const SESSION_COOKIE: &str = "gatehouse_session";

/// Generate an opaque session token (32 random bytes, hex-encoded).
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA256-hash a session token for storage and lookup.
pub fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Resolve the session cookie to a live session and its user.
///
/// Returns `Ok(None)` when no cookie is present, the session is unknown or
/// expired, or the user row has vanished: the request proceeds anonymous
/// and route handlers decide whether identity is required.
pub async fn resolve_session(
    pool: &PgPool,
    headers: &HeaderMap,
) -> AuthResult<Option<(Session, User)>> {
    let jar = CookieJar::from_headers(headers);
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    let token_hash = hash_session_token(cookie.value());
    let Some(session) = db::find_session_by_token_hash(pool, &token_hash).await? else {
        return Ok(None);
    };

    let Some(user) = db::find_user_by_id(pool, session.user_id).await? else {
        return Ok(None);
    };

    // First-touch stamp for rows that predate the epoch column, so the
    // user's next key issuance has a stored baseline to overwrite. Two
    // concurrent stampings can race; last write wins, and the stamp only
    // ever happens once per user lifetime.
    let user = if user.key_epoch.is_none() {
        let stamped = now_epoch_ms();
        db::set_key_epoch(pool, user.id, stamped).await?;
        User {
            key_epoch: Some(stamped),
            ..user
        }
    } else {
        user
    };

    Ok(Some((session, user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_tokens_are_unique() {
        let token1 = generate_session_token();
        let token2 = generate_session_token();

        assert_ne!(token1, token2);
        assert_eq!(token1.len(), 64);
    }

    #[test]
    fn test_hash_is_deterministic_and_hex() {
        let hash1 = hash_session_token("some-token");
        let hash2 = hash_session_token("some-token");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert!(hash1.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hash_session_token("other-token"), hash1);
    }
}
