//! Database Queries
//!
//! Runtime queries (no compile-time `DATABASE_URL` required).
//!
//! All query functions include error context logging to aid debugging.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use super::models::{Session, User};

/// Log and return a database error with context.
///
/// This helper ensures all database errors are logged with relevant context
/// before being propagated, making production debugging easier.
macro_rules! db_error {
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
}

// ============================================================================
// User Queries
// ============================================================================

/// Find user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_id", user_id = %id))
}

/// Find user by email.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_user_by_email", email = %email))
}

/// Check whether a user already exists with the given name or email.
pub async fn name_or_email_exists(pool: &PgPool, name: &str, email: &str) -> sqlx::Result<bool> {
    let result: (bool,) =
        sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE name = $1 OR email = $2)")
            .bind(name)
            .bind(email)
            .fetch_one(pool)
            .await
            .map_err(db_error!("name_or_email_exists", name = %name))?;

    Ok(result.0)
}

/// List all users.
pub async fn list_users(pool: &PgPool) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at ASC")
        .fetch_all(pool)
        .await
        .map_err(|e| {
            error!(query = "list_users", error = %e, "Database query failed");
            e
        })
}

/// Create a new local user.
pub async fn create_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> sqlx::Result<User> {
    sqlx::query_as::<_, User>(
        r"
        INSERT INTO users (name, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING *
        ",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(db_error!("create_user", email = %email))
}

/// Update a user's profile fields. Absent fields are left untouched.
///
/// Returns `None` if no user row matches the id.
pub async fn update_user_profile(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    email: Option<&str>,
    avatar_url: Option<&str>,
) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r"
        UPDATE users
        SET name = COALESCE($2, name),
            email = COALESCE($3, email),
            avatar_url = COALESCE($4, avatar_url),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        ",
    )
    .bind(id)
    .bind(name)
    .bind(email)
    .bind(avatar_url)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_user_profile", user_id = %id))
}

/// Overwrite a user's bearer-key epoch.
///
/// Called at every key issuance (revoking all previously issued keys) and
/// by the validators' first-touch stamping of legacy rows where the epoch
/// is still NULL.
pub async fn set_key_epoch(pool: &PgPool, user_id: Uuid, epoch_ms: i64) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET key_epoch = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(epoch_ms)
        .execute(pool)
        .await
        .map_err(db_error!("set_key_epoch", user_id = %user_id))?;

    Ok(())
}

// ============================================================================
// Session Queries
// ============================================================================

/// Create a session row for a logged-in user.
pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
    ip_address: Option<&str>,
    user_agent: Option<&str>,
) -> sqlx::Result<Session> {
    sqlx::query_as::<_, Session>(
        r"
        INSERT INTO sessions (user_id, token_hash, expires_at, ip_address, user_agent)
        VALUES ($1, $2, $3, $4::inet, $5)
        RETURNING id, user_id, token_hash, expires_at, host(ip_address) as ip_address, user_agent, created_at
        ",
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .bind(ip_address)
    .bind(user_agent)
    .fetch_one(pool)
    .await
    .map_err(db_error!("create_session", user_id = %user_id))
}

/// Find a live (non-expired) session by token hash.
pub async fn find_session_by_token_hash(
    pool: &PgPool,
    token_hash: &str,
) -> sqlx::Result<Option<Session>> {
    sqlx::query_as::<_, Session>(
        r"
        SELECT id, user_id, token_hash, expires_at, host(ip_address) as ip_address, user_agent, created_at
        FROM sessions
        WHERE token_hash = $1 AND expires_at > NOW()
        ",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        error!(query = "find_session_by_token_hash", error = %e, "Database query failed");
        e
    })
}

/// Delete a session by id (logout).
pub async fn delete_session(pool: &PgPool, session_id: Uuid) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(session_id)
        .execute(pool)
        .await
        .map_err(db_error!("delete_session", session_id = %session_id))?;

    Ok(())
}
