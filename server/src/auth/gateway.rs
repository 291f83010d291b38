//! Auth Gateway Middleware
//!
//! Per-request authentication dispatch: an ordered chain of strategies,
//! bearer API key first, session cookie second; first success wins. The
//! resolved identity rides request extensions (request-scoped state, never
//! process-global), and downstream handlers opt in via the [`CurrentUser`]
//! or [`Identity`] extractors.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::error::AuthError;
use super::session::resolve_session;
use super::token::validate_api_key;
use crate::api::AppState;
use crate::db::{Session, User};

/// Request-scoped identity resolved by the gateway.
#[derive(Debug, Clone)]
pub struct Identity {
    /// The authenticated user.
    pub user: User,
    /// Present only on the session path; bearer-key auth is stateless.
    pub session: Option<Session>,
}

/// Extract the bearer token, if the Authorization header carries one.
///
/// `None` means the token path does not apply and the next strategy runs;
/// it is not a failure.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Bearer-key strategy.
///
/// Once the `Bearer ` prefix is present the outcome is terminal: a failed
/// validation answers 401 and never falls through to session auth.
async fn try_api_key(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Identity>, AuthError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };

    let user = validate_api_key(&state.db, token, &state.config.api_key_secret).await?;

    Ok(Some(Identity {
        user,
        session: None,
    }))
}

/// Session-cookie strategy. A miss is never terminal: the request simply
/// stays anonymous.
async fn try_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Identity>, AuthError> {
    Ok(resolve_session(&state.db, headers)
        .await?
        .map(|(session, user)| Identity {
            user,
            session: Some(session),
        }))
}

/// Gateway middleware applied to the whole router.
///
/// Requests matching no strategy continue anonymous; routes that require
/// identity reject through the extractors below. The gateway itself never
/// rejects anonymity, keeping registration and login reachable.
pub async fn auth_gateway(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let headers = request.headers().clone();

    let identity = match try_api_key(&state, &headers).await? {
        Some(identity) => Some(identity),
        None => try_session(&state, &headers).await?,
    };

    if let Some(identity) = identity {
        request.extensions_mut().insert(identity);
    }

    Ok(next.run(request).await)
}

/// Extractor for the full identity (user plus optional session).
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(AuthError::Unauthorized)
    }
}

/// Extractor for the authenticated user in handlers.
///
/// Rejects with 401 when the gateway resolved no identity:
///
/// ```ignore
/// async fn protected_handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .map(|identity| Self(identity.user.clone()))
            .ok_or(AuthError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_no_header_falls_through() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_non_bearer_scheme_falls_through() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_bearer_prefix_commits_to_token_path() {
        let headers = headers_with_auth("Bearer abc123");
        assert_eq!(bearer_token(&headers), Some("abc123"));
    }

    #[test]
    fn test_prefix_match_is_case_sensitive_and_spaced() {
        assert_eq!(bearer_token(&headers_with_auth("bearer abc")), None);
        assert_eq!(bearer_token(&headers_with_auth("Bearerabc")), None);
    }
}
