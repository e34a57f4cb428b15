//! Shared application state injected into every Axum handler.

use axum::http::HeaderName;

use crate::items::ItemService;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-backed) so that Axum can clone the
/// state for each request without copying expensive data.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Item lifecycle, including the secret cipher.
    pub items: ItemService,
    /// Header carrying the authenticated user id.
    pub user_header: HeaderName,
}

impl AppState {
    /// Create a new [`AppState`] from the item service and identity header.
    pub fn new(items: ItemService, user_header: HeaderName) -> Self {
        Self { items, user_header }
    }
}
