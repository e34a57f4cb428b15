//! Vault items: storage, validation, and the CRUD lifecycle.
//!
//! # Secret handling
//!
//! - Create/update seal a non-empty password with [`crate::crypto::SecretCipher`]
//!   before the record is written; an empty password stores (or leaves) no secret.
//! - List and detail reads return [`common::protocol::ItemResponse`], which has
//!   no secret fields.
//! - Only [`ItemService::reveal_secret`] loads the sealed columns and opens them.

pub mod record;
pub mod service;
pub mod store;
pub mod validate;

pub use service::{ItemError, ItemService};
pub use store::{ItemFilter, ItemStore, StoreError};
