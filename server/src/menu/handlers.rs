//! Menu HTTP Handlers

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::queries::{create_menu_item, link_menu_permission, visible_menu_items};
use super::tree::{build_menu_tree, MenuNode};
use crate::api::{require_permission, ApiError, ApiResult, AppState, Envelope};
use crate::auth::CurrentUser;
use crate::db::{MenuItem, MenuPermission};
use crate::permissions::permission_ids_for_user;

/// Create-menu-item request.
#[derive(Debug, Deserialize)]
pub struct CreateMenuItemRequest {
    pub name: String,
    pub path: String,
    pub icon: Option<String>,
    pub parent_id: Option<Uuid>,
    /// Sibling sort key; defaults to 0.
    #[serde(default, rename = "order")]
    pub position: i32,
}

/// Link a permission to a menu item.
#[derive(Debug, Deserialize)]
pub struct CreateMenuPermissionRequest {
    pub menu_item_id: Uuid,
    pub permission_id: Uuid,
}

/// Permission-filtered menu tree for the caller.
///
/// GET /api/menus
pub async fn list_menu(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Envelope<Vec<MenuNode>>>> {
    let permission_ids = permission_ids_for_user(&state.db, user.id).await?;
    let items = visible_menu_items(&state.db, &permission_ids).await?;

    Ok(Envelope::ok(build_menu_tree(items)))
}

/// Create a menu item.
///
/// POST /api/menus
pub async fn create_item(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateMenuItemRequest>,
) -> ApiResult<Json<Envelope<MenuItem>>> {
    require_permission(&state.db, user.id, "menu", "create").await?;

    if body.name.is_empty() || body.path.is_empty() {
        return Err(ApiError::BadRequest(
            "Menu name and path are required".to_string(),
        ));
    }

    let item = create_menu_item(
        &state.db,
        &body.name,
        &body.path,
        body.icon.as_deref(),
        body.parent_id,
        body.position,
    )
    .await?;

    Ok(Envelope::ok(item))
}

/// Make a menu item visible to holders of a permission.
///
/// POST /api/menu-permissions
pub async fn create_permission_link(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateMenuPermissionRequest>,
) -> ApiResult<Json<Envelope<MenuPermission>>> {
    require_permission(&state.db, user.id, "menuPermission", "create").await?;

    let link = link_menu_permission(&state.db, body.menu_item_id, body.permission_id).await?;

    Ok(Envelope::ok(link))
}
