//! Mapping of internal errors onto HTTP responses.
//!
//! Callers only ever see [`ServiceError::public_message`]; cipher and storage
//! detail is logged here and dropped from the response.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{protocol::ErrorResponse, ServiceError};
use tracing::{error, warn};

use crate::items::{ItemError, StoreError};

/// Error returned from handlers and extractors.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse::new(self.0.code(), self.0.public_message());
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl From<ItemError> for ApiError {
    fn from(e: ItemError) -> Self {
        let inner = match e {
            ItemError::Validation(v) => ServiceError::BadRequest(v.to_string()),
            ItemError::Store(StoreError::NotFound) => {
                ServiceError::NotFound("Item not found".into())
            }
            ItemError::Store(e @ StoreError::InconsistentSecret(_)) => {
                error!(error = %e, "stored secret columns are inconsistent");
                ServiceError::Internal(e.to_string())
            }
            ItemError::Cipher(e) => {
                warn!(error = %e, "secret cipher operation failed");
                ServiceError::EncryptionFailure(e.to_string())
            }
        };
        Self(inner)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ServiceError::BadRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ServiceError::BadRequest(rejection.body_text()))
    }
}
