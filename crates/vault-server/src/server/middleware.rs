//! Axum middleware layers applied to the router.
//!
//! Includes request tracing, timeout enforcement, per-client rate limiting,
//! response compression, security headers, and CORS.

use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};

use axum::{
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use common::ServiceError;
use tower_governor::{
    key_extractor::{KeyExtractor, SmartIpKeyExtractor},
    GovernorError,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

use super::error::ApiError;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default request budget per client and window.
pub const RATE_LIMIT_MAX_REQUESTS: u32 = 100;

/// Default rate-limit window (15 minutes).
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Headers added to every response unless a handler already set them.
pub const SECURITY_HEADERS: [(&str, &str); 8] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("referrer-policy", "no-referrer"),
    ("x-dns-prefetch-control", "off"),
    ("x-permitted-cross-domain-policies", "none"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "cross-origin"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
];

/// Per-client request budget.
///
/// Enforced as a token bucket: a client may burst up to `max_requests`, and
/// one request is refilled every `window / max_requests`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimit {
    /// Time to refill a single request.
    pub fn replenish_period(&self) -> Duration {
        self.window / self.max_requests.max(1)
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            max_requests: RATE_LIMIT_MAX_REQUESTS,
            window: RATE_LIMIT_WINDOW,
        }
    }
}

/// Per-deployment HTTP settings for the middleware stack.
#[derive(Debug, Clone)]
pub struct HttpPolicy {
    pub request_timeout: Duration,
    /// Origins allowed to make credentialed cross-origin requests.
    pub allowed_origins: Vec<HeaderValue>,
    pub rate_limit: RateLimit,
}

impl Default for HttpPolicy {
    fn default() -> Self {
        Self {
            request_timeout: REQUEST_TIMEOUT,
            allowed_origins: vec![HeaderValue::from_static("http://localhost:5173")],
            rate_limit: RateLimit::default(),
        }
    }
}

/// CORS for the browser front end.
///
/// Credentials are allowed, so methods and headers are listed explicitly
/// rather than wildcarded.
pub fn cors(policy: &HttpPolicy, user_header: HeaderName) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(policy.allowed_origins.iter().cloned()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, user_header])
        .allow_credentials(true)
}

/// One layer per entry of [`SECURITY_HEADERS`].
pub fn security_headers() -> Vec<SetResponseHeaderLayer<HeaderValue>> {
    SECURITY_HEADERS
        .iter()
        .map(|&(name, value)| {
            SetResponseHeaderLayer::if_not_present(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            )
        })
        .collect()
}

/// Rate-limit key: the client address.
///
/// The service runs behind a reverse proxy, so `X-Forwarded-For`,
/// `X-Real-Ip` and `Forwarded` are trusted before the peer address.
/// Requests with no resolvable address share a single bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        Ok(SmartIpKeyExtractor
            .extract(req)
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)))
    }
}

/// Rewrite the limiter's plain-text 429 into the standard error body,
/// keeping its `retry-after` / `x-ratelimit-*` headers.
pub async fn rate_limit_body(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }
    let (parts, _) = response.into_parts();
    let mut limited = ApiError(ServiceError::RateLimited).into_response();
    for (name, value) in &parts.headers {
        if name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH {
            continue;
        }
        limited.headers_mut().insert(name.clone(), value.clone());
    }
    limited
}
