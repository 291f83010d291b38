//! Authentication Service
//!
//! Dual-mode authentication: long-lived bearer API keys revoked by epoch
//! rotation, and cookie-backed browser sessions, plus the handlers that
//! issue both.

mod error;
mod gateway;
mod handlers;
pub mod keys;
mod password;
mod session;
pub mod token;

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::AppState;

pub use error::{AuthError, AuthResult};
pub use gateway::{auth_gateway, CurrentUser, Identity};
pub use session::SESSION_COOKIE;

/// Create authentication router.
///
/// Public routes (no identity required):
/// - POST /register - Create a user and issue the first API key
/// - POST /login - Password login: session cookie + fresh API key
///
/// Protected routes (identity required, enforced by the extractors):
/// - POST /logout - Delete the session, clear the cookie
/// - POST /token - Rotate the API key (revokes all earlier keys)
/// - GET /me - Current user profile with role names
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/token", post(handlers::rotate_token))
        .route("/me", get(handlers::get_profile))
}
