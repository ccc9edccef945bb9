//! Middleware and access-control helpers.

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::IntoResponse;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Proxy header consulted before falling back to the peer address.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Log incoming requests and their response status.
pub async fn logging_middleware(req: Request<Body>, next: Next) -> impl IntoResponse {
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    tracing::info!("{} {} -> {}", method, uri, response.status());
    response
}

/// The caller's address as used for access control: the `X-Forwarded-For`
/// value when a proxy supplied one, otherwise the peer address.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| peer.ip().to_string())
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn forwarded_header_wins_over_peer_address() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("10.0.0.7"));
        let peer = "192.168.1.5:9999".parse().unwrap();

        assert_eq!(client_ip(&headers, peer), "10.0.0.7");
    }

    #[test]
    fn peer_address_is_the_fallback() {
        let headers = HeaderMap::new();
        let peer = "192.168.1.5:9999".parse().unwrap();

        assert_eq!(client_ip(&headers, peer), "192.168.1.5");
    }
}
