//! Configuration loading and validation for the vault service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use axum::http::{HeaderName, HeaderValue};
use serde::Deserialize;

use crate::crypto::EncryptionKey;

/// Validated vault service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base64-encoded 32-byte key used to seal item secrets. **Required.**
    #[serde(default)]
    pub encryption_key: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin of the web front end, added to the CORS allow-list.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    /// Header carrying the authenticated user id, set by the upstream proxy.
    #[serde(default = "default_user_header")]
    pub user_header_name: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Requests allowed per client in each rate-limit window.
    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,

    /// Length of the rate-limit window in seconds.
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,

    /// OTLP endpoint for span export. Export is disabled when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    3001
}
fn default_frontend_url() -> String {
    "http://localhost:5173".into()
}
fn default_user_header() -> String {
    "X-User-Id".into()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_rate_limit_max_requests() -> u32 {
    100
}
fn default_rate_limit_window() -> u64 {
    15 * 60
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Decode the configured encryption key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing or does not decode to 32 bytes.
    pub fn encryption_key(&self) -> Result<EncryptionKey> {
        EncryptionKey::from_base64(Some(&self.encryption_key)).context("ENCRYPTION_KEY is invalid")
    }

    /// The user header as a typed [`HeaderName`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configured name is not a valid header name.
    pub fn user_header(&self) -> Result<HeaderName> {
        HeaderName::from_bytes(self.user_header_name.trim().as_bytes())
            .context("USER_HEADER_NAME is not a valid HTTP header name")
    }

    /// Origins allowed by CORS: the configured front end plus local dev servers.
    ///
    /// # Errors
    ///
    /// Returns an error if `FRONTEND_URL` is not a valid header value.
    pub fn allowed_origins(&self) -> Result<Vec<HeaderValue>> {
        let mut origins = vec![HeaderValue::from_str(self.frontend_url.trim_end_matches('/'))
            .context("FRONTEND_URL is not a valid origin")?];
        for dev in [
            "http://localhost:5173",
            "http://127.0.0.1:5173",
            "http://localhost:5174",
            "http://127.0.0.1:5174",
        ] {
            let value = HeaderValue::from_static(dev);
            if !origins.contains(&value) {
                origins.push(value);
            }
        }
        Ok(origins)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        self.encryption_key()?;
        self.user_header()?;
        self.allowed_origins()?;

        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        if self.rate_limit_max_requests == 0 {
            anyhow::bail!("RATE_LIMIT_MAX_REQUESTS must be > 0");
        }
        if self.rate_limit_window_secs == 0 {
            anyhow::bail!("RATE_LIMIT_WINDOW_SECS must be > 0");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            if endpoint.trim().is_empty() {
                anyhow::bail!("OTEL_EXPORTER_OTLP_ENDPOINT must not be empty when set");
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("encryption_key", &"[REDACTED]")
            .field("port", &self.port)
            .field("frontend_url", &self.frontend_url)
            .field("user_header_name", &self.user_header_name)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("log_level", &self.log_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_key;

    fn valid() -> Config {
        Config {
            encryption_key: generate_key(),
            port: default_port(),
            frontend_url: default_frontend_url(),
            user_header_name: default_user_header(),
            request_timeout_secs: default_request_timeout(),
            rate_limit_max_requests: default_rate_limit_max_requests(),
            rate_limit_window_secs: default_rate_limit_window(),
            otel_exporter_otlp_endpoint: None,
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_port(), 3001);
        assert_eq!(default_frontend_url(), "http://localhost:5173");
        assert_eq!(default_user_header(), "X-User-Id");
        assert_eq!(default_request_timeout(), 30);
        assert_eq!(default_rate_limit_max_requests(), 100);
        assert_eq!(default_rate_limit_window(), 900);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_rejects_zero_rate_limit() {
        let cfg = Config {
            rate_limit_max_requests: 0,
            ..valid()
        };
        assert!(cfg.validate().is_err());
        let cfg = Config {
            rate_limit_window_secs: 0,
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_key() {
        let cfg = Config {
            encryption_key: String::new(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_short_key() {
        let cfg = Config {
            encryption_key: "c2hvcnQ=".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let cfg = Config {
            request_timeout_secs: 0,
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_header_name() {
        let cfg = Config {
            user_header_name: "not a header".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn allowed_origins_deduplicates_frontend() {
        let origins = valid().allowed_origins().unwrap();
        assert_eq!(origins.len(), 4);

        let cfg = Config {
            frontend_url: "https://vault.example.com/".into(),
            ..valid()
        };
        let origins = cfg.allowed_origins().unwrap();
        assert_eq!(origins.len(), 5);
        assert_eq!(origins[0], "https://vault.example.com");
    }

    #[test]
    fn debug_redacts_key() {
        let cfg = valid();
        let printed = format!("{cfg:?}");
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains(&cfg.encryption_key));
    }
}
