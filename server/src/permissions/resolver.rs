//! Permission resolution logic.
//!
//! Every call re-reads the current assignment state, so a role or
//! permission change takes effect on the very next authorization check:
//! there is no cache and no invalidation to get wrong.

use sqlx::PgPool;
use uuid::Uuid;

/// Role ids assigned to a user.
async fn role_ids_for_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Uuid>> {
    let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT role_id FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Check whether `user_id` holds a permission matching `(resource, action)`.
///
/// "No permission" is a `false` return, never an error; only store failures
/// propagate. Callers must treat a store failure as "cannot authorize",
/// not as a grant.
pub async fn has_permission(
    pool: &PgPool,
    user_id: Uuid,
    resource: &str,
    action: &str,
) -> sqlx::Result<bool> {
    let role_ids = role_ids_for_user(pool, user_id).await?;
    if role_ids.is_empty() {
        // No roles means no permissions; skips a join against an empty set.
        return Ok(false);
    }

    let result: (bool,) = sqlx::query_as(
        r"
        SELECT EXISTS(
            SELECT 1
            FROM permissions p
            INNER JOIN role_permissions rp ON rp.permission_id = p.id
            WHERE rp.role_id = ANY($1)
              AND p.resource = $2
              AND p.action = $3
        )
        ",
    )
    .bind(&role_ids)
    .bind(resource)
    .bind(action)
    .fetch_one(pool)
    .await?;

    Ok(result.0)
}

/// Distinct permission ids reachable through a user's roles.
///
/// Same two-hop join as [`has_permission`], collecting ids instead of a
/// boolean; the menu builder filters visible items against this set.
pub async fn permission_ids_for_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Uuid>> {
    let role_ids = role_ids_for_user(pool, user_id).await?;
    if role_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT DISTINCT permission_id FROM role_permissions WHERE role_id = ANY($1)",
    )
    .bind(&role_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Names of the roles assigned to a user, for profile display.
pub async fn role_names_for_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r"
        SELECT r.name
        FROM user_roles ur
        INNER JOIN roles r ON ur.role_id = r.id
        WHERE ur.user_id = $1
        ORDER BY r.name ASC
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(name,)| name).collect())
}
