//! # Auth Errors
//!
//! Error taxonomy for the web ingress. Authentication and authorization
//! failures are terminal for a request: no partial mutation, distinct
//! status codes to the caller.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Login rejected. Generic on purpose: unknown-user and wrong-password
    /// are indistinguishable to the caller.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No usable session token. Covers missing, malformed, unknown and
    /// expired tokens alike; callers must not be able to tell them apart.
    #[error("Authentication required")]
    Unauthenticated,

    /// Valid session, but the role lacks the required capability.
    #[error("Insufficient permissions")]
    Forbidden,

    /// A required form field was absent from the request.
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}

impl AuthError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingField(_) => 400,
            AuthError::InvalidCredentials => 401,
            AuthError::Unauthenticated => 401,
            AuthError::Forbidden => 403,
        }
    }
}
