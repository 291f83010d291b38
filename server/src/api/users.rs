//! User Catalog Handlers

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require_permission, ApiError, ApiResult, AppState, Envelope};
use crate::auth::CurrentUser;
use crate::db::{self, User};

/// Safe-to-expose user fields. Never includes the password hash or the
/// key epoch.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Update-user request. Absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// List all users.
///
/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Envelope<Vec<UserSummary>>>> {
    require_permission(&state.db, user.id, "user", "read").await?;

    let users = db::list_users(&state.db).await?;

    Ok(Envelope::ok(
        users.into_iter().map(UserSummary::from).collect(),
    ))
}

/// Fetch a single user: self, or anyone with `user:read`.
///
/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Envelope<UserSummary>>> {
    if current.id != user_id {
        require_permission(&state.db, current.id, "user", "read").await?;
    }

    let user = db::find_user_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Envelope::ok(UserSummary::from(user)))
}

/// Update a user's profile: self, or anyone with `user:update`.
///
/// PATCH /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<Json<Envelope<UserSummary>>> {
    if current.id != user_id {
        require_permission(&state.db, current.id, "user", "update").await?;
    }

    let user = db::update_user_profile(
        &state.db,
        user_id,
        body.name.as_deref(),
        body.email.as_deref(),
        body.avatar_url.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Envelope::ok(UserSummary::from(user)))
}
