//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Unauthenticated account endpoints (register, login, OTP, password reset)
//! share one strict per-IP limiter; everything else is unlimited.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor that prefers proxy headers and falls back to the peer
/// address from `ConnectInfo`.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();

        // X-Forwarded-For: first IP in the chain
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(ip);
        }

        // Direct connection
        if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
            return Ok(addr.ip());
        }

        Err(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the rate limiter for account endpoints: ~10 requests per minute
/// per IP (1 token every 6 seconds, burst of 5). This slows brute force on
/// login and OTP guessing.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(6)` and `burst_size(5)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_governor::key_extractor::KeyExtractor;

    fn request_with_header(name: &str, value: &str) -> Request<()> {
        Request::builder()
            .uri("/")
            .header(name, value)
            .body(())
            .expect("valid request")
    }

    #[test]
    fn test_forwarded_for_takes_first_ip() {
        let req = request_with_header("x-forwarded-for", "203.0.113.7, 10.0.0.1");
        let key = ClientIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key.to_string(), "203.0.113.7");
    }

    #[test]
    fn test_real_ip_fallback() {
        let req = request_with_header("x-real-ip", "198.51.100.4");
        let key = ClientIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key.to_string(), "198.51.100.4");
    }

    #[test]
    fn test_connect_info_fallback() {
        let mut req = Request::builder().uri("/").body(()).expect("valid request");
        let addr: SocketAddr = "192.0.2.9:55555".parse().expect("valid addr");
        req.extensions_mut().insert(ConnectInfo(addr));
        let key = ClientIpKeyExtractor.extract(&req).expect("key");
        assert_eq!(key.to_string(), "192.0.2.9");
    }

    #[test]
    fn test_no_source_is_an_error() {
        let req = Request::builder().uri("/").body(()).expect("valid request");
        assert!(ClientIpKeyExtractor.extract(&req).is_err());
    }
}
