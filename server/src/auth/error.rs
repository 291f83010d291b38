//! Authentication Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication error types.
///
/// The three bearer-key failure causes (undecodable token, unknown user,
/// revoked epoch) all surface as `InvalidApiKey`: responses never reveal
/// which sub-check failed. The causes are distinguished in logs only.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bearer token failed to decode, resolved no user, or carries a
    /// stale epoch.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Route requires identity and the request is anonymous.
    #[error("Unauthorized")]
    Unauthorized,

    /// Invalid credentials (wrong email/password).
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// User already exists (registration).
    #[error("Username or email already exists")]
    UserAlreadyExists,

    /// Validation error.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Password hashing error.
    #[error("Password processing failed")]
    PasswordHash,

    /// Database error.
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    /// Internal server error.
    #[error("Internal server error")]
    Internal(String),
}

/// Error body for auth-layer failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidApiKey | Self::Unauthorized | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::UserAlreadyExists | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::PasswordHash | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Internal detail stays out of the body.
        let message = match &self {
            Self::PasswordHash | Self::Database(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(ErrorResponse { error: message });

        (status, body).into_response()
    }
}

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_api_key_body_shape() {
        let body = ErrorResponse {
            error: AuthError::InvalidApiKey.to_string(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":"Invalid API key"}"#
        );
    }

    #[test]
    fn test_internal_detail_not_disclosed() {
        let response = AuthError::Internal("secret wiring detail".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::InvalidApiKey.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::UserAlreadyExists.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
