//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No secrets or key material** in any span attribute or log field: no
//!   plaintext passwords, no sealed columns, no `ENCRYPTION_KEY`.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`).

pub mod init;

pub use init::init_telemetry;
