//! Authentication HTTP Handlers

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::error::{AuthError, AuthResult};
use super::gateway::{CurrentUser, Identity};
use super::keys::encode_api_key;
use super::password::{hash_password, verify_password};
use super::session::{generate_session_token, hash_session_token, SESSION_COOKIE};
use super::token::now_epoch_ms;
use crate::api::{AppState, Envelope};
use crate::db;
use crate::permissions::role_names_for_user;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username (3-32 characters).
    #[validate(length(min = 3, max = 32))]
    pub name: String,
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Password (8-128 characters).
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// API key payload returned by issuing endpoints.
#[derive(Debug, Serialize)]
pub struct TokenData {
    /// The bearer API key.
    pub token: String,
}

/// Current-user profile.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    /// User ID.
    pub id: Uuid,
    /// Username.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Avatar URL (if set).
    pub avatar_url: Option<String>,
    /// Names of the roles assigned to the user.
    pub roles: Vec<String>,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
    /// Last profile update time.
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Extract User-Agent from headers (sanitized and truncated to 512 chars for
/// DB storage).
fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(|s| {
            s.chars()
                .filter(|c| !c.is_control() || c.is_whitespace())
                .take(512)
                .collect()
        })
}

/// Issue a fresh API key for a user.
///
/// The new epoch is persisted before the encoded token is returned, so a
/// caller can never hold a token whose epoch is not yet the stored value.
/// Issuing also revokes every previously issued key: there is at most one
/// valid key per user at any time.
async fn issue_api_key(state: &AppState, user_id: Uuid) -> AuthResult<String> {
    let epoch_ms = now_epoch_ms();
    db::set_key_epoch(&state.db, user_id, epoch_ms).await?;

    encode_api_key(user_id, epoch_ms, &state.config.api_key_secret)
        .map_err(|e| AuthError::Internal(format!("API key encoding failed: {e}")))
}

/// Build the session cookie for a freshly created session.
fn session_cookie(token: String, ttl_seconds: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl_seconds))
        .build()
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a new user and issue their first API key.
///
/// POST /auth/register
#[tracing::instrument(skip(state, body), fields(name = %body.name))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AuthResult<Json<Envelope<TokenData>>> {
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    if db::name_or_email_exists(&state.db, &body.name, &body.email).await? {
        return Err(AuthError::UserAlreadyExists);
    }

    let password_hash = hash_password(&body.password)?;
    let user = db::create_user(&state.db, &body.name, &body.email, &password_hash).await?;

    let token = issue_api_key(&state, user.id).await?;

    Ok(Envelope::ok(TokenData { token }))
}

/// Login with email/password.
///
/// Creates a browser session (cookie) and issues a fresh API key; any key
/// issued earlier stops validating from this moment.
///
/// POST /auth/login
#[tracing::instrument(skip(state, headers, jar, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> AuthResult<(CookieJar, Json<Envelope<TokenData>>)> {
    let user = db::find_user_by_email(&state.db, &body.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let password_hash = user
        .password_hash
        .as_ref()
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&body.password, password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    // Session for the browser
    let session_token = generate_session_token();
    let token_hash = hash_session_token(&session_token);
    let expires_at = Utc::now() + Duration::seconds(state.config.session_ttl_seconds);
    let user_agent = extract_user_agent(&headers);

    db::create_session(
        &state.db,
        user.id,
        &token_hash,
        expires_at,
        Some(&addr.ip().to_string()),
        user_agent.as_deref(),
    )
    .await?;

    // Fresh API key (epoch persisted before the token leaves the server)
    let token = issue_api_key(&state, user.id).await?;

    let jar = jar.add(session_cookie(session_token, state.config.session_ttl_seconds));

    Ok((jar, Envelope::ok(TokenData { token })))
}

/// Rotate the caller's API key.
///
/// Works from either auth path; the previous key is revoked by the epoch
/// overwrite.
///
/// POST /auth/token
pub async fn rotate_token(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AuthResult<Json<Envelope<TokenData>>> {
    let token = issue_api_key(&state, user.id).await?;

    Ok(Envelope::ok(TokenData { token }))
}

/// Logout: delete the session row (if any) and clear the cookie.
///
/// POST /auth/logout
pub async fn logout(
    State(state): State<AppState>,
    identity: Identity,
    jar: CookieJar,
) -> AuthResult<(CookieJar, Json<Envelope<()>>)> {
    if let Some(session) = identity.session {
        db::delete_session(&state.db, session.id).await?;
    }

    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"));

    Ok((jar, Envelope::ok(())))
}

/// Current user's profile with role names.
///
/// GET /auth/me
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AuthResult<Json<Envelope<UserProfile>>> {
    let roles = role_names_for_user(&state.db, user.id).await?;

    Ok(Envelope::ok(UserProfile {
        id: user.id,
        name: user.name,
        email: user.email,
        avatar_url: user.avatar_url,
        roles,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }))
}
