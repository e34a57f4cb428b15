//! Authenticated-user extractor.
//!
//! Identity is established upstream (session, OAuth, or token provider) and
//! forwarded as a trusted header. This extractor only reads it.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use common::ServiceError;

use super::{error::ApiError, state::AppState};

/// Id of the user making the request. Rejects with 401 when absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        parts
            .headers
            .get(&state.user_header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| AuthUser(s.to_owned()))
            .ok_or(ApiError(ServiceError::Unauthorized))
    }
}
