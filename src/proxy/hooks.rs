//! Request and response transform hooks.
//!
//! # Design Decisions
//! - Hooks are first-class strategy objects injected into the handler;
//!   the handler owns when they run, the hook owns what happens
//! - Response hooks only stage cookie changes; the relayed body is always
//!   the exact bytes the destination sent
//! - A hook failure never blocks the primary response

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum_extra::extract::cookie::{Cookie, CookieJar};

/// Rewrites the outbound request before dispatch.
pub trait RequestTransform: Send + Sync {
    /// Rewrite outgoing headers. Runs after the policy copy, so values set
    /// here cannot be overridden by the client.
    fn rewrite_headers(&self, headers: &mut HeaderMap) {
        let _ = headers;
    }

    /// Rewrite a buffered request body. Streamed bodies never visit the
    /// hook.
    fn rewrite_body(&self, body: Bytes) -> Bytes {
        body
    }
}

/// Observes destination responses and stages cookie changes.
pub trait ResponseTransform: Send + Sync {
    /// Whether `on_response` should run for this request path and status.
    fn interested(&self, path: &str, status: StatusCode) -> bool;

    /// Observe the buffered response body. The same bytes are relayed to
    /// the client afterwards.
    fn on_response(&self, ctx: &mut TransformContext<'_>, status: StatusCode, body: &[u8]);
}

enum CookieOp {
    Set(Cookie<'static>),
    Remove(Cookie<'static>),
}

/// What a response hook sees: the original request URI and a place to
/// stage cookie changes.
pub struct TransformContext<'a> {
    uri: &'a Uri,
    ops: Vec<CookieOp>,
}

impl<'a> TransformContext<'a> {
    pub fn new(uri: &'a Uri) -> Self {
        Self {
            uri,
            ops: Vec::new(),
        }
    }

    /// The URI of the original client request.
    pub fn uri(&self) -> &Uri {
        self.uri
    }

    /// Path of the original client request.
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Stage a cookie to be set on the client.
    pub fn set_cookie(&mut self, cookie: Cookie<'static>) {
        self.ops.push(CookieOp::Set(cookie));
    }

    /// Stage a cookie removal.
    pub fn remove_cookie(&mut self, cookie: Cookie<'static>) {
        self.ops.push(CookieOp::Remove(cookie));
    }

    /// Fold the staged changes into the response jar.
    pub fn apply(self, jar: CookieJar) -> CookieJar {
        self.ops.into_iter().fold(jar, |jar, op| match op {
            CookieOp::Set(cookie) => jar.add(cookie),
            CookieOp::Remove(cookie) => jar.remove(cookie),
        })
    }
}

/// Stamps the tenant domain onto every forwarded request.
///
/// The header is inserted after the policy copy, so a client-supplied value
/// is always replaced.
pub struct TenantHeaderInjector {
    header: HeaderName,
    domain: HeaderValue,
}

impl TenantHeaderInjector {
    pub fn new(header: &str, domain: &str) -> Result<Self, axum::http::Error> {
        Ok(Self {
            header: HeaderName::from_bytes(header.as_bytes())?,
            domain: HeaderValue::from_str(domain)?,
        })
    }
}

impl RequestTransform for TenantHeaderInjector {
    fn rewrite_headers(&self, headers: &mut HeaderMap) {
        headers.insert(self.header.clone(), self.domain.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_injector_replaces_client_value() {
        let injector = TenantHeaderInjector::new("x-tenant-domain", "acme.example.com").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-tenant-domain", HeaderValue::from_static("evil.example"));

        injector.rewrite_headers(&mut headers);

        assert_eq!(headers.get("x-tenant-domain").unwrap(), "acme.example.com");
        assert_eq!(headers.get_all("x-tenant-domain").iter().count(), 1);
    }

    #[test]
    fn test_staged_ops_apply_in_order() {
        let uri: Uri = "/api/accounts/login/".parse().unwrap();
        let mut ctx = TransformContext::new(&uri);
        ctx.set_cookie(Cookie::build(("a", "1")).path("/").build());
        ctx.remove_cookie(Cookie::build(("b", "")).path("/").build());

        let jar = ctx.apply(CookieJar::new());
        assert_eq!(jar.get("a").unwrap().value(), "1");
        assert!(jar.get("b").is_none());
    }
}
