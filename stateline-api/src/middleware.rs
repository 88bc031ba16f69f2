//! Rate Limiting Middleware
//!
//! Per-IP request throttling in front of the query path, protecting the
//! store from floods. Limits are enforced with a token-bucket quota per
//! client IP; limited callers get 429 with a Retry-After header.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{clock::DefaultClock, Quota, RateLimiter};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// Type alias for the rate limiter we use.
type DirectRateLimiter =
    RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, DefaultClock>;

// ============================================================================
// RATE LIMIT STATE
// ============================================================================

/// State for rate limiting middleware.
#[derive(Clone)]
pub struct RateLimitState {
    /// API configuration
    config: Arc<ApiConfig>,
    /// Per-IP rate limiters - uses DashMap for lock-free concurrent access
    limiters: Arc<DashMap<IpAddr, Arc<DirectRateLimiter>>>,
}

impl RateLimitState {
    /// Create new rate limit state from API configuration.
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config: Arc::new(config),
            limiters: Arc::new(DashMap::new()),
        }
    }

    /// Get or create a rate limiter for the given client IP.
    ///
    /// DashMap's entry API handles the get-or-insert atomically.
    fn get_or_create_limiter(&self, ip: IpAddr) -> Arc<DirectRateLimiter> {
        self.limiters
            .entry(ip)
            .or_insert_with(|| {
                let quota = Quota::per_minute(
                    NonZeroU32::new(self.config.rate_limit_per_minute).unwrap_or(NonZeroU32::MIN),
                )
                .allow_burst(
                    NonZeroU32::new(self.config.rate_limit_burst).unwrap_or(NonZeroU32::MIN),
                );

                Arc::new(RateLimiter::direct(quota))
            })
            .clone()
    }
}

/// Error type for rate limit middleware.
pub struct RateLimitError {
    /// Seconds until rate limit resets
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        use axum::http::HeaderValue;

        let error = ApiError::too_many_requests(Some(self.retry_after));
        let status = StatusCode::TOO_MANY_REQUESTS;

        let mut response = (status, axum::Json(error)).into_response();
        let headers = response.headers_mut();
        headers.insert(
            axum::http::header::HeaderName::from_static("retry-after"),
            HeaderValue::from_str(&self.retry_after.to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("60")),
        );

        response
    }
}

// ============================================================================
// CLIENT IP EXTRACTION
// ============================================================================

/// Extract client IP from request, considering proxy headers.
fn extract_client_ip(request: &Request, fallback: Option<SocketAddr>) -> IpAddr {
    // Check X-Forwarded-For header first (for proxied requests)
    if let Some(forwarded_for) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
    {
        // X-Forwarded-For can contain multiple IPs, take the first one
        if let Some(first_ip) = forwarded_for.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse() {
                return ip;
            }
        }
    }

    // Check X-Real-IP header
    if let Some(real_ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
    {
        if let Ok(ip) = real_ip.trim().parse() {
            return ip;
        }
    }

    // Fall back to the connection address; loopback when the router was
    // built without connect-info (in-process tests)
    fallback
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

// ============================================================================
// RATE LIMITING MIDDLEWARE
// ============================================================================

/// Rate limiting middleware.
///
/// Enforces a per-IP quota (default 120 req/min with a burst of 30). When
/// rate limited, returns 429 Too Many Requests with a Retry-After header.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, RateLimitError> {
    use axum::http::HeaderValue;

    // Skip if rate limiting is disabled
    if !state.config.rate_limit_enabled {
        return Ok(next.run(request).await);
    }

    let ip = extract_client_ip(&request, connect_info.map(|ConnectInfo(addr)| addr));
    let limiter = state.get_or_create_limiter(ip);

    match limiter.check() {
        Ok(_) => {
            // Request allowed - add informational headers to the response
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            headers.insert(
                axum::http::header::HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from_str(&state.config.rate_limit_per_minute.to_string())
                    .unwrap_or_else(|_| HeaderValue::from_static("120")),
            );

            Ok(response)
        }
        Err(not_until) => {
            let retry_after = not_until
                .wait_time_from(governor::clock::Clock::now(&DefaultClock::default()))
                .as_secs()
                .max(1); // Minimum 1 second

            Err(RateLimitError { retry_after })
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
