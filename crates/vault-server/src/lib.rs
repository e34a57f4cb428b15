//! `vault-svc` — personal vault REST service.
//!
//! Users store subscriptions and accounts, each with an optional password
//! sealed under AES-256-GCM. Passwords are encrypted on write, never included
//! in list or detail responses, and decrypted only on the dedicated secret
//! endpoint.

pub mod config;
pub mod crypto;
pub mod items;
pub mod server;
pub mod telemetry;
