//! Request identity.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Stamp it onto the request before any handler runs
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The ID is gateway-issued; a client-supplied value is overwritten

use std::fmt;
use std::task::{Context, Poll};

use axum::http::{HeaderName, HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

/// Header the gateway-issued request ID travels in.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// A gateway-issued request identifier.
#[derive(Debug, Clone)]
pub struct RequestId(String);

impl RequestId {
    fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn header_value(&self) -> HeaderValue {
        HeaderValue::from_str(&self.0).expect("UUID is a valid header value")
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read the request ID off a stamped request.
pub trait RequestIdExt {
    fn request_id(&self) -> Option<&RequestId>;
}

impl<B> RequestIdExt for Request<B> {
    fn request_id(&self) -> Option<&RequestId> {
        self.extensions().get::<RequestId>()
    }
}

/// Stamps every request with a fresh ID, in both the header map and the
/// request extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let id = RequestId::new();
        request.headers_mut().insert(X_REQUEST_ID, id.header_value());
        request.extensions_mut().insert(id);
        self.inner.call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_layer_overwrites_client_supplied_id() {
        let service = RequestIdLayer.layer(tower::service_fn(|req: Request<()>| async move {
            let header = req
                .headers()
                .get(X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let extension = req.request_id().map(|id| id.as_str().to_owned());
            Ok::<_, std::convert::Infallible>((header, extension))
        }));

        let request = Request::builder()
            .header("x-request-id", "spoofed")
            .body(())
            .unwrap();
        let (header, extension) = service.oneshot(request).await.unwrap();

        let header = header.unwrap();
        assert_eq!(Some(header.clone()), extension);
        assert_ne!(header, "spoofed");
        assert_eq!(header.len(), 36);
    }
}
