//! JSON error responses and the shared session guard.

use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::auth::{permissions_for, AuthError, Permissions, Role};
use crate::context::AppContext;

use super::cookie::token_from_headers;

/// Error body returned by every failing handler.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        Self {
            error: err.to_string(),
            code: err.status_code(),
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn auth_error(err: AuthError) -> ApiError {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::UNAUTHORIZED);
    (status, Json(ErrorResponse::from(err)))
}

pub fn not_found(detail: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: detail.to_string(),
            code: 404,
        }),
    )
}

/// Authenticated request identity: who is acting, as what.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    pub username: String,
    pub role: Role,
}

impl RequestIdentity {
    pub fn permissions(&self) -> Permissions {
        permissions_for(self.role)
    }
}

/// Validates the session cookie and returns the request identity.
///
/// Missing, malformed, unknown and expired tokens all produce the same
/// Unauthenticated error; the response must not reveal which it was.
pub fn require_session(ctx: &AppContext, headers: &HeaderMap) -> Result<RequestIdentity, ApiError> {
    let token = token_from_headers(headers).ok_or_else(|| auth_error(AuthError::Unauthenticated))?;

    let mut sessions = ctx.sessions();
    let session = sessions
        .validate(token)
        .ok_or_else(|| auth_error(AuthError::Unauthenticated))?;

    Ok(RequestIdentity {
        username: session.username.clone(),
        role: session.role,
    })
}

/// Fails with Forbidden (and no side effects) unless `allowed` holds.
pub fn require_capability(allowed: bool) -> Result<(), ApiError> {
    if allowed {
        Ok(())
    } else {
        Err(auth_error(AuthError::Forbidden))
    }
}
