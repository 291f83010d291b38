//! Database queries for menu items and their permission links.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{MenuItem, MenuPermission};

/// Menu items visible through the given permission ids.
///
/// Left join against the permission links; an item linked to several of the
/// caller's permissions comes back once (`DISTINCT` collapses the rows).
pub async fn visible_menu_items(
    pool: &PgPool,
    permission_ids: &[Uuid],
) -> sqlx::Result<Vec<MenuItem>> {
    if permission_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, MenuItem>(
        r"
        SELECT DISTINCT mi.id, mi.name, mi.path, mi.icon, mi.parent_id, mi.position,
                        mi.created_at, mi.updated_at
        FROM menu_items mi
        LEFT JOIN menu_permissions mp ON mp.menu_item_id = mi.id
        WHERE mp.permission_id = ANY($1)
        ",
    )
    .bind(permission_ids)
    .fetch_all(pool)
    .await
}

/// Create a menu item.
pub async fn create_menu_item(
    pool: &PgPool,
    name: &str,
    path: &str,
    icon: Option<&str>,
    parent_id: Option<Uuid>,
    position: i32,
) -> sqlx::Result<MenuItem> {
    sqlx::query_as::<_, MenuItem>(
        r"
        INSERT INTO menu_items (name, path, icon, parent_id, position)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        ",
    )
    .bind(name)
    .bind(path)
    .bind(icon)
    .bind(parent_id)
    .bind(position)
    .fetch_one(pool)
    .await
}

/// Link a permission to a menu item.
pub async fn link_menu_permission(
    pool: &PgPool,
    menu_item_id: Uuid,
    permission_id: Uuid,
) -> sqlx::Result<MenuPermission> {
    sqlx::query_as::<_, MenuPermission>(
        r"
        INSERT INTO menu_permissions (menu_item_id, permission_id)
        VALUES ($1, $2)
        RETURNING *
        ",
    )
    .bind(menu_item_id)
    .bind(permission_id)
    .fetch_one(pool)
    .await
}
