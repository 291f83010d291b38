//! Database queries for the role/permission catalog.
//!
//! Provides async functions for managing:
//! - Roles and permissions
//! - User-to-role assignments
//! - Role-to-permission assignments

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{Permission, Role, RolePermission, UserRole};

// ============================================================================
// Role Queries
// ============================================================================

/// List all roles.
pub async fn list_roles(pool: &PgPool) -> sqlx::Result<Vec<Role>> {
    sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY name ASC")
        .fetch_all(pool)
        .await
}

/// Create a role.
pub async fn create_role(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
) -> sqlx::Result<Role> {
    sqlx::query_as::<_, Role>(
        r"
        INSERT INTO roles (name, description)
        VALUES ($1, $2)
        RETURNING *
        ",
    )
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

/// Delete a role by id.
///
/// Returns `true` if a role was deleted, `false` if none matched.
pub async fn delete_role(pool: &PgPool, role_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM roles WHERE id = $1")
        .bind(role_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Permission Queries
// ============================================================================

/// List all permissions.
pub async fn list_permissions(pool: &PgPool) -> sqlx::Result<Vec<Permission>> {
    sqlx::query_as::<_, Permission>("SELECT * FROM permissions ORDER BY resource ASC, action ASC")
        .fetch_all(pool)
        .await
}

/// Create a permission for a `(resource, action)` pair.
pub async fn create_permission(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    resource: &str,
    action: &str,
) -> sqlx::Result<Permission> {
    sqlx::query_as::<_, Permission>(
        r"
        INSERT INTO permissions (name, description, resource, action)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        ",
    )
    .bind(name)
    .bind(description)
    .bind(resource)
    .bind(action)
    .fetch_one(pool)
    .await
}

// ============================================================================
// Assignment Queries
// ============================================================================

/// Assign a role to a user.
pub async fn assign_user_role(
    pool: &PgPool,
    user_id: Uuid,
    role_id: Uuid,
) -> sqlx::Result<UserRole> {
    sqlx::query_as::<_, UserRole>(
        r"
        INSERT INTO user_roles (user_id, role_id)
        VALUES ($1, $2)
        RETURNING *
        ",
    )
    .bind(user_id)
    .bind(role_id)
    .fetch_one(pool)
    .await
}

/// Remove a role from a user.
///
/// Returns `true` if an assignment was removed.
pub async fn remove_user_role(pool: &PgPool, user_id: Uuid, role_id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
        .bind(user_id)
        .bind(role_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Link a permission to a role.
pub async fn grant_role_permission(
    pool: &PgPool,
    role_id: Uuid,
    permission_id: Uuid,
) -> sqlx::Result<RolePermission> {
    sqlx::query_as::<_, RolePermission>(
        r"
        INSERT INTO role_permissions (role_id, permission_id)
        VALUES ($1, $2)
        RETURNING *
        ",
    )
    .bind(role_id)
    .bind(permission_id)
    .fetch_one(pool)
    .await
}

/// Unlink a permission from a role.
///
/// Returns `true` if a link was removed.
pub async fn revoke_role_permission(
    pool: &PgPool,
    role_id: Uuid,
    permission_id: Uuid,
) -> sqlx::Result<bool> {
    let result =
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2")
            .bind(role_id)
            .bind(permission_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}
