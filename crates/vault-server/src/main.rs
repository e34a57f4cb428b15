//! `vault-svc` — service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (tracing + optional OTLP).
//! 3. Decode the encryption key and build the [`SecretCipher`].
//! 4. Build the Axum router and start the HTTP server.
//!
//! `vault-server --generate-key` prints a fresh `ENCRYPTION_KEY` and exits.

use std::time::Duration;

use anyhow::Result;
use tracing::info;

use vault_server::config::Config;
use vault_server::crypto::{generate_key, SecretCipher};
use vault_server::items::{ItemService, ItemStore};
use vault_server::server::{
    self,
    middleware::{HttpPolicy, RateLimit},
    state::AppState,
};
use vault_server::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().skip(1).any(|a| a == "--generate-key") {
        println!("{}", generate_key());
        return Ok(());
    }

    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        "vault-svc starting"
    );

    // -----------------------------------------------------------------------
    // 3. Secret cipher
    // -----------------------------------------------------------------------
    let cipher = {
        let key = cfg.encryption_key()?;
        SecretCipher::new(&key)
    };

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let items = ItemService::new(ItemStore::new(), cipher);
    let state = AppState::new(items, cfg.user_header()?);
    let policy = HttpPolicy {
        request_timeout: Duration::from_secs(cfg.request_timeout_secs),
        allowed_origins: cfg.allowed_origins()?,
        rate_limit: RateLimit {
            max_requests: cfg.rate_limit_max_requests,
            window: Duration::from_secs(cfg.rate_limit_window_secs),
        },
    };
    let router = server::router::build(state, &policy)?;

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
