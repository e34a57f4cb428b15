//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::Unauthorized`] → 401
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::RateLimited`] → 429
/// - [`ServiceError::EncryptionFailure`] → 500
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request body or query failed validation.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No authenticated user accompanied the request.
    #[error("unauthorized")]
    Unauthorized,

    /// The item does not exist or is not owned by the requesting user.
    #[error("not found: {0}")]
    NotFound(String),

    /// The client exhausted its request budget for the current window.
    #[error("rate limited")]
    RateLimited,

    /// A stored secret could not be sealed or opened.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Unauthorized => 401,
            ServiceError::NotFound(_) => 404,
            ServiceError::RateLimited => 429,
            ServiceError::EncryptionFailure(_) => 500,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Unauthorized => "unauthorized",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::RateLimited => "rate_limited",
            ServiceError::EncryptionFailure(_) => "encryption_failure",
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// Caller-facing message. Server-side failures collapse to a fixed string.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::BadRequest(msg) | ServiceError::NotFound(msg) => msg.clone(),
            ServiceError::Unauthorized => "Unauthorized".into(),
            ServiceError::RateLimited => {
                "Too many requests from this IP, please try again later".into()
            }
            ServiceError::EncryptionFailure(_) => "secret unreadable".into(),
            ServiceError::Internal(_) => "Internal server error".into(),
        }
    }
}
