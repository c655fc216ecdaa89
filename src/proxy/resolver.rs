//! Destination resolution.
//!
//! # Responsibilities
//! - Map an inbound request path to a fully-qualified destination URL
//! - Preserve the query string untouched
//!
//! # Design Decisions
//! - Resolvers are pure and synchronous; they never look at the body
//! - No caching: the destination is recomputed per request

use axum::http::request::Parts;
use thiserror::Error;
use url::Url;

/// Error computing a destination URL.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid destination URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Maps an inbound request to the URL it is forwarded to.
pub trait DestinationResolver: Send + Sync {
    fn resolve(&self, parts: &Parts) -> Result<Url, ResolveError>;
}

/// Forwards to the backend API, keeping the inbound path verbatim.
///
/// The path prefix is not stripped because the backend serves under it.
pub struct UpstreamResolver {
    base: String,
}

impl UpstreamResolver {
    pub fn new(base_url: &str) -> Self {
        Self {
            base: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl DestinationResolver for UpstreamResolver {
    fn resolve(&self, parts: &Parts) -> Result<Url, ResolveError> {
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        Ok(Url::parse(&format!("{}{}", self.base, path_and_query))?)
    }
}

/// Strips a leading path prefix once and appends the remainder to a target.
///
/// Non-matching paths pass through unchanged; keeping them off this resolver
/// is the router's job.
pub struct PrefixResolver {
    prefix: String,
    target: String,
}

impl PrefixResolver {
    pub fn new(prefix: &str, target: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            target: target.trim_end_matches('/').to_string(),
        }
    }
}

impl DestinationResolver for PrefixResolver {
    fn resolve(&self, parts: &Parts) -> Result<Url, ResolveError> {
        let path = parts.uri.path();
        let remainder = match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        };

        let mut destination = format!("{}{}", self.target, remainder);
        if let Some(query) = parts.uri.query() {
            destination.push('?');
            destination.push_str(query);
        }
        Ok(Url::parse(&destination)?)
    }
}
