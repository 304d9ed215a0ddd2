/// API route handlers
///
/// Public routes (contact form, analytics beacon, health) sit next to the
/// auth entry points and the guarded admin handlers. Guards run as router
/// layers in `crate::app`; handlers read the resolved [`Session`] from
/// request extensions.
///
/// [`Session`]: leadline_shared::auth::guard::Session

use axum::http::HeaderMap;
use std::net::SocketAddr;

pub mod analytics;
pub mod auth;
pub mod contact;
pub mod dashboard;
pub mod health;
pub mod leads;
pub mod users;

/// Derives the throttle key for a request
///
/// Prefers the first hop in `X-Forwarded-For` (set by the reverse proxy),
/// falling back to the socket peer address. The key is treated as an opaque
/// string everywhere; nothing parses it back into an address.
pub fn client_key(headers: &HeaderMap, peer: SocketAddr) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    peer.ip().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "192.0.2.10:45678".parse().unwrap()
    }

    #[test]
    fn test_client_key_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );

        assert_eq!(client_key(&headers, peer()), "203.0.113.7");
    }

    #[test]
    fn test_client_key_falls_back_to_peer() {
        assert_eq!(client_key(&HeaderMap::new(), peer()), "192.0.2.10");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("  "));
        assert_eq!(client_key(&headers, peer()), "192.0.2.10");
    }
}
