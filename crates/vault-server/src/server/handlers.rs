//! Axum request handlers for all service endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use common::protocol::{
    CreateItemRequest, DashboardStats, ErrorResponse, HealthResponse, ItemResponse, ItemType,
    ListItemsQuery, MessageResponse, SecretResponse, UpdateItemRequest,
};
use common::ServiceError;
use uuid::Uuid;

use super::{auth::AuthUser, error::ApiError, state::AppState};
use crate::items::ItemFilter;

/// `GET /api/items` — the user's items, newest first, without secrets.
///
/// `type` filters by item type when it is `SUBSCRIPTION` or `ACCOUNT`;
/// `search` matches names case-insensitively.
pub async fn list_items(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    query: Result<Query<ListItemsQuery>, QueryRejection>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let Query(query) = query?;
    let filter = ItemFilter {
        item_type: query.item_type.as_deref().and_then(ItemType::from_query),
        search: query.search,
    };
    Ok(Json(state.items.list(&user, &filter).await))
}

/// `GET /api/items/stats/dashboard` — monthly total and upcoming billings.
pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Json<DashboardStats> {
    Json(state.items.dashboard(&user).await)
}

/// `GET /api/items/:id` — one item, without secrets.
pub async fn get_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.items.get(&user, id).await?))
}

/// `GET /api/items/:id/secret` — the decrypted password.
///
/// Returns `{"password": null}` when the item has no secret.
pub async fn get_secret(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SecretResponse>, ApiError> {
    let id = parse_id(&id)?;
    let password = state.items.reveal_secret(&user, id).await?;
    Ok(Json(SecretResponse { password }))
}

/// `POST /api/items` — create an item, sealing its password.
pub async fn create_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<CreateItemRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let Json(req) = body?;
    let item = state.items.create(&user, req).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `PATCH /api/items/:id` — partial update.
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<UpdateItemRequest>, JsonRejection>,
) -> Result<Json<ItemResponse>, ApiError> {
    let id = parse_id(&id)?;
    let Json(req) = body?;
    Ok(Json(state.items.update(&user, id, req).await?))
}

/// `DELETE /api/items/:id`.
pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.items.delete(&user, id).await?;
    Ok(Json(MessageResponse {
        message: "Item deleted successfully".into(),
    }))
}

/// `GET /health` — liveness check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "Route not found");
    (StatusCode::NOT_FOUND, Json(err))
}

/// A malformed id can never match a stored item, so it is a 404 like any
/// other unknown id.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError(ServiceError::NotFound("Item not found".into())))
}
