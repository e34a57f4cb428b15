//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Resolve the requesting user from the trusted identity header.
//! - Inject shared application state (`AppState`) into handlers.
//! - Map item, storage, and cipher errors onto non-leaking JSON responses.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
