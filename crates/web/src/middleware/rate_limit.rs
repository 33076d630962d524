//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Sign-in and sign-up submissions are limited per client IP
//! (`auth_rate_limiter`, ~10/min) to slow down credential stuffing and
//! scripted registrations.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

// =============================================================================
// Client IP Key Extractor
// =============================================================================

/// Single-address proxy headers consulted after `CF-Connecting-IP` and
/// `X-Forwarded-For`.
const PROXY_IP_HEADERS: [&str; 2] = ["x-real-ip", "fly-client-ip"];

/// Key extractor that identifies the client by IP address.
///
/// Proxy headers are only read when `trust_proxy_headers` is set, since any
/// client can send them. Otherwise the key is the peer address of the TCP
/// connection.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    trust_proxy_headers: bool,
}

impl ClientIpKeyExtractor {
    /// Create an extractor; `trust_proxy_headers` only when a proxy in front
    /// of the server overwrites the client IP headers.
    #[must_use]
    pub const fn new(trust_proxy_headers: bool) -> Self {
        Self {
            trust_proxy_headers,
        }
    }
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let from_proxy = if self.trust_proxy_headers {
            proxy_client_ip(req)
        } else {
            None
        };

        from_proxy
            .or_else(|| peer_ip(req))
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Client IP as reported by a reverse proxy.
fn proxy_client_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    let headers = req.headers();

    let header_ip = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    // X-Forwarded-For lists the original client first
    let forwarded_for = || {
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    };

    header_ip("cf-connecting-ip")
        .or_else(forwarded_for)
        .or_else(|| PROXY_IP_HEADERS.iter().find_map(|name| header_ip(name)))
}

/// Peer address of the TCP connection.
fn peer_ip<T>(req: &Request<T>) -> Option<IpAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

// =============================================================================
// Rate Limiter Configuration
// =============================================================================

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Configuration: 1 request every 6 seconds (replenish), burst of 5.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter(trust_proxy_headers: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(trust_proxy_headers))
        .per_second(6) // Replenish 1 token every 6 seconds (~10/minute)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}
