//! Service error types.
//!
//! Domain failures surfaced to API clients. Both variants are terminal and are
//! never retried internally.

use thiserror::Error;

/// Failure returned by the token service or the facility store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Bad credentials, or a missing, malformed, forged or expired token.
    #[error("{0}")]
    Unauthorized(String),

    /// The requested facility does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A token could not be signed. Not expected with an HMAC key.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Credentials presented to the login endpoint did not match.
    pub fn bad_credentials() -> Self {
        Self::Unauthorized("Incorrect username or password".to_string())
    }

    /// A bearer token failed verification.
    pub fn invalid_token() -> Self {
        Self::Unauthorized("Could not validate credentials".to_string())
    }

    /// No bearer token was presented.
    pub fn not_authenticated() -> Self {
        Self::Unauthorized("Not authenticated".to_string())
    }

    /// No facility has the requested identifier.
    pub fn facility_not_found() -> Self {
        Self::NotFound("Facility not found".to_string())
    }
}
