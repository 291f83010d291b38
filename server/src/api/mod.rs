//! API Router and Application State
//!
//! Central routing configuration and shared state.

mod response;
mod roles;
mod users;

use std::sync::Arc;

use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::{auth, config::Config, menu, permissions::has_permission};

pub use response::{ApiError, ApiResult, Envelope};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Server configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Gate a privileged operation on the permission resolver's verdict.
///
/// A store failure propagates as an error (500) rather than a grant.
pub async fn require_permission(
    pool: &PgPool,
    user_id: Uuid,
    resource: &str,
    action: &str,
) -> Result<(), ApiError> {
    if has_permission(pool, user_id, resource, action).await? {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user).patch(users::update_user))
        .route("/roles", get(roles::list_roles).post(roles::create_role))
        .route("/roles/{id}", delete(roles::delete_role))
        .route(
            "/permissions",
            get(roles::list_permissions).post(roles::create_permission),
        )
        .route(
            "/user-roles",
            post(roles::assign_user_role).delete(roles::remove_user_role),
        )
        .route(
            "/role-permissions",
            post(roles::grant_role_permission).delete(roles::revoke_role_permission),
        )
        .route("/menus", get(menu::list_menu).post(menu::create_item))
        .route("/menu-permissions", post(menu::create_permission_link));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Auth routes (register/login stay reachable anonymous)
        .nest("/auth", auth::router())
        // Catalog routes; handlers enforce identity and permissions
        .nest("/api", api_routes)
        // Gateway resolves identity for every route, rejecting nothing
        // except a failed bearer-token validation
        .layer(from_fn_with_state(state.clone(), auth::auth_gateway))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint.
async fn health_check(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
