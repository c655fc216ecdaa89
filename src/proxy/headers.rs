//! Outgoing header construction.
//!
//! # Responsibilities
//! - Copy inbound headers per the configured policy
//! - Strip hop-by-hop headers in both directions
//! - Override `Host` with the destination authority
//!
//! # Design Decisions
//! - The inbound header map is never mutated; a fresh map is built
//! - `Host` always reflects the destination, whatever the client sent

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::config::schema::HeaderPolicy;

/// Connection-scoped headers that must not cross the proxy.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// Headers the allowlist policy forwards.
fn is_allowlisted(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "content-type"
            | "authorization"
            | "user-agent"
            | "accept"
            | "accept-encoding"
            | "content-length"
    )
}

/// Build the header map for the outbound request.
pub fn build_outgoing_headers(
    policy: HeaderPolicy,
    inbound: &HeaderMap,
    destination: &Url,
) -> HeaderMap {
    let mut outgoing = HeaderMap::new();

    for (name, value) in inbound {
        let forward = match policy {
            HeaderPolicy::ForwardAll => !is_hop_by_hop(name) && name != header::HOST,
            HeaderPolicy::Allowlist => is_allowlisted(name),
        };
        if forward {
            outgoing.append(name.clone(), value.clone());
        }
    }

    if let Some(host) = host_value(destination) {
        outgoing.insert(header::HOST, host);
    }

    outgoing
}

/// Strip hop-by-hop headers from a response header map.
pub fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for (name, value) in headers {
        if !is_hop_by_hop(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

/// `Host` header value for a destination URL, including any non-default port.
pub fn host_value(destination: &Url) -> Option<HeaderValue> {
    let host = destination.host_str()?;
    let value = match destination.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    HeaderValue::from_str(&value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("gateway.local"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc"),
        );
        headers.insert("x-custom", HeaderValue::from_static("kept-or-not"));
        headers
    }

    #[test]
    fn test_forward_all_strips_hop_by_hop_and_overrides_host() {
        let destination = Url::parse("https://api.example.com/v1").unwrap();
        let out = build_outgoing_headers(HeaderPolicy::ForwardAll, &inbound(), &destination);

        assert_eq!(out.get(header::HOST).unwrap(), "api.example.com");
        assert!(out.get(header::CONNECTION).is_none());
        assert_eq!(out.get("x-custom").unwrap(), "kept-or-not");
        assert_eq!(out.get(header::CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_allowlist_forwards_only_known_headers() {
        let destination = Url::parse("https://api.example.com/v1").unwrap();
        let out = build_outgoing_headers(HeaderPolicy::Allowlist, &inbound(), &destination);

        assert!(out.get("x-custom").is_none());
        assert!(out.get(header::CONNECTION).is_none());
        assert_eq!(out.get(header::AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(out.get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(out.get(header::HOST).unwrap(), "api.example.com");
    }

    #[test]
    fn test_host_value_keeps_non_default_port() {
        let explicit = Url::parse("http://127.0.0.1:3000/x").unwrap();
        assert_eq!(host_value(&explicit).unwrap(), "127.0.0.1:3000");

        let default = Url::parse("https://api.example.com:443/x").unwrap();
        assert_eq!(host_value(&default).unwrap(), "api.example.com");
    }

    #[test]
    fn test_multi_value_headers_survive_the_copy() {
        let mut headers = HeaderMap::new();
        headers.append(header::ACCEPT, HeaderValue::from_static("text/html"));
        headers.append(header::ACCEPT, HeaderValue::from_static("application/json"));
        let destination = Url::parse("https://api.example.com").unwrap();

        let out = build_outgoing_headers(HeaderPolicy::ForwardAll, &headers, &destination);
        assert_eq!(out.get_all(header::ACCEPT).iter().count(), 2);
    }
}
