//! API Response Envelope and Error Types
//!
//! Domain endpoints answer a uniform `{code, msg, data}` envelope: `code` 0
//! on success, the HTTP status on failure with `data` null.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Uniform response envelope.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    /// 0 on success, HTTP status on failure.
    pub code: i32,
    /// Human-readable outcome.
    pub msg: String,
    /// Payload; null on failure.
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    /// Wrap a successful payload.
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            code: 0,
            msg: "success".to_string(),
            data: Some(data),
        })
    }
}

/// Domain API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller is authenticated but lacks the required permission. Safe to
    /// state plainly: the caller already proved identity.
    #[error("Forbidden")]
    Forbidden,

    /// Malformed or incomplete request body.
    #[error("{0}")]
    BadRequest(String),

    /// Target row does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Database error. Detail stays in the logs, out of the body.
    #[error("Internal server error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(Envelope::<()> {
            code: i32::from(status.as_u16()),
            msg: self.to_string(),
            data: None,
        });

        (status, body).into_response()
    }
}

/// Result type for domain API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let Json(envelope) = Envelope::ok(serde_json::json!({"token": "abc"}));

        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"code":0,"msg":"success","data":{"token":"abc"}}"#
        );
    }

    #[test]
    fn test_forbidden_envelope_shape() {
        let envelope = Envelope::<()> {
            code: 403,
            msg: ApiError::Forbidden.to_string(),
            data: None,
        };

        assert_eq!(
            serde_json::to_string(&envelope).unwrap(),
            r#"{"code":403,"msg":"Forbidden","data":null}"#
        );
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Database(sqlx::Error::PoolClosed)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_database_detail_not_disclosed() {
        assert_eq!(
            ApiError::Database(sqlx::Error::PoolClosed).to_string(),
            "Internal server error"
        );
    }
}
