//! Database Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User model.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    pub avatar_url: Option<String>,
    pub password_hash: Option<String>,
    /// Bearer-key generation epoch in integer milliseconds since the Unix
    /// epoch. NULL until a key has been issued (or first-touch stamped).
    /// A bearer token is valid iff its embedded epoch equals this value.
    pub key_epoch: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session model for cookie-based browser auth.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    /// Session ID.
    pub id: Uuid,
    /// User this session belongs to.
    pub user_id: Uuid,
    /// SHA256 hash of the opaque session token.
    pub token_hash: String,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
    /// IP address of the client (stored as string for simplicity).
    pub ip_address: Option<String>,
    /// User agent of the client.
    pub user_agent: Option<String>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
}

/// Role model: a named bundle of permissions assignable to users.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Permission model: an atomic capability keyed by `(resource, action)`.
///
/// Resources and actions are opaque strings compared for equality.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Permission {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User-to-role assignment.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserRole {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Role-to-permission assignment.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RolePermission {
    pub id: Uuid,
    pub role_id: Uuid,
    pub permission_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Navigation menu item. A tree node: `parent_id` points at another item,
/// or is NULL (or dangling) for a root.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: Uuid,
    pub name: String,
    pub path: String,
    pub icon: Option<String>,
    pub parent_id: Option<Uuid>,
    /// Sibling sort key, ascending.
    #[serde(rename = "order")]
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Menu-item-to-permission assignment. An item is visible to a user only
/// if at least one of its linked permissions is held by that user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MenuPermission {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub permission_id: Uuid,
    pub created_at: DateTime<Utc>,
}
