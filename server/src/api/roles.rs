//! Role and Permission Catalog Handlers
//!
//! Every mutation gates through the permission resolver; a failed check
//! answers the 403 envelope.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{require_permission, ApiError, ApiResult, AppState, Envelope};
use crate::auth::CurrentUser;
use crate::db::{Permission, Role, RolePermission, UserRole};
use crate::permissions;

/// Create-role request.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Create-permission request.
#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    pub name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
}

/// User-role assignment request.
#[derive(Debug, Deserialize)]
pub struct UserRoleRequest {
    pub user_id: Uuid,
    pub role_id: Uuid,
}

/// Role-permission assignment request.
#[derive(Debug, Deserialize)]
pub struct RolePermissionRequest {
    pub role_id: Uuid,
    pub permission_id: Uuid,
}

// ============================================================================
// Roles
// ============================================================================

/// GET /api/roles
pub async fn list_roles(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Envelope<Vec<Role>>>> {
    require_permission(&state.db, user.id, "role", "read").await?;

    Ok(Envelope::ok(permissions::list_roles(&state.db).await?))
}

/// POST /api/roles
pub async fn create_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateRoleRequest>,
) -> ApiResult<Json<Envelope<Role>>> {
    require_permission(&state.db, user.id, "role", "create").await?;

    if body.name.is_empty() {
        return Err(ApiError::BadRequest("Role name is required".to_string()));
    }

    let role =
        permissions::create_role(&state.db, &body.name, body.description.as_deref()).await?;

    Ok(Envelope::ok(role))
}

/// DELETE /api/roles/{id}
pub async fn delete_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(role_id): Path<Uuid>,
) -> ApiResult<Json<Envelope<()>>> {
    require_permission(&state.db, user.id, "role", "delete").await?;

    if !permissions::delete_role(&state.db, role_id).await? {
        return Err(ApiError::NotFound("Role not found".to_string()));
    }

    Ok(Envelope::ok(()))
}

// ============================================================================
// Permissions
// ============================================================================

/// GET /api/permissions
pub async fn list_permissions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Envelope<Vec<Permission>>>> {
    require_permission(&state.db, user.id, "permission", "read").await?;

    Ok(Envelope::ok(permissions::list_permissions(&state.db).await?))
}

/// POST /api/permissions
pub async fn create_permission(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreatePermissionRequest>,
) -> ApiResult<Json<Envelope<Permission>>> {
    require_permission(&state.db, user.id, "permission", "create").await?;

    if body.name.is_empty() || body.resource.is_empty() || body.action.is_empty() {
        return Err(ApiError::BadRequest(
            "Name, resource and action are required".to_string(),
        ));
    }

    let permission = permissions::create_permission(
        &state.db,
        &body.name,
        body.description.as_deref(),
        &body.resource,
        &body.action,
    )
    .await?;

    Ok(Envelope::ok(permission))
}

// ============================================================================
// Assignments
// ============================================================================

/// POST /api/user-roles
pub async fn assign_user_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UserRoleRequest>,
) -> ApiResult<Json<Envelope<UserRole>>> {
    require_permission(&state.db, user.id, "userRole", "create").await?;

    let assignment =
        permissions::assign_user_role(&state.db, body.user_id, body.role_id).await?;

    Ok(Envelope::ok(assignment))
}

/// DELETE /api/user-roles
pub async fn remove_user_role(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<UserRoleRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    require_permission(&state.db, user.id, "userRole", "delete").await?;

    if !permissions::remove_user_role(&state.db, body.user_id, body.role_id).await? {
        return Err(ApiError::NotFound("Assignment not found".to_string()));
    }

    Ok(Envelope::ok(()))
}

/// POST /api/role-permissions
pub async fn grant_role_permission(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<RolePermissionRequest>,
) -> ApiResult<Json<Envelope<RolePermission>>> {
    require_permission(&state.db, user.id, "rolePermission", "create").await?;

    let grant =
        permissions::grant_role_permission(&state.db, body.role_id, body.permission_id).await?;

    Ok(Envelope::ok(grant))
}

/// DELETE /api/role-permissions
pub async fn revoke_role_permission(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<RolePermissionRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    require_permission(&state.db, user.id, "rolePermission", "delete").await?;

    if !permissions::revoke_role_permission(&state.db, body.role_id, body.permission_id).await? {
        return Err(ApiError::NotFound("Assignment not found".to_string()));
    }

    Ok(Envelope::ok(()))
}
