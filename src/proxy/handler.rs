//! The proxy request handler.
//!
//! # Data Flow
//! ```text
//! (parts, body, jar)
//!     → resolve destination URL
//!     → build outgoing headers (policy, Host override, request id)
//!     → attach body (stream or buffer)
//!     → request transform (trusted headers, body rewrite)
//!     → outbound client dispatch
//!     → network failure: 500 with the cause chain, no retry
//!     → response transform interested? buffer body, stage cookies,
//!       relay the identical bytes; otherwise stream straight through
//! ```
//!
//! # Design Decisions
//! - At-most-once delivery: a failed dispatch is reported, never retried
//! - Destination errors and relayed backend errors are distinguishable:
//!   backend statuses pass through verbatim, gateway failures are 500s

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, request::Parts, HeaderMap, Method, StatusCode};
use axum::response::Response;
use axum_extra::extract::CookieJar;

use crate::config::schema::{BodyMode, HeaderPolicy, ProxyBehaviorConfig, RedirectMode, TimeoutConfig};
use crate::http::request::X_REQUEST_ID;
use crate::http::response as reply;
use crate::observability::metrics;
use crate::proxy::headers;
use crate::proxy::hooks::{RequestTransform, ResponseTransform, TransformContext};
use crate::proxy::resolver::DestinationResolver;

/// Build the shared outbound client from the configured behavior.
pub fn build_client(
    behavior: &ProxyBehaviorConfig,
    timeouts: &TimeoutConfig,
) -> Result<reqwest::Client, reqwest::Error> {
    let redirect = match behavior.redirect {
        RedirectMode::Follow => reqwest::redirect::Policy::limited(10),
        RedirectMode::Manual => reqwest::redirect::Policy::none(),
    };

    reqwest::Client::builder()
        .redirect(redirect)
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.request_secs))
        .pool_idle_timeout(Duration::from_secs(timeouts.idle_secs))
        .build()
}

/// Forwards one request to the destination its resolver computes.
///
/// Stateless: identical inputs produce equivalent relayed requests, and the
/// only shared machinery is the outbound client's connection pool.
pub struct ProxyHandler {
    resolver: Arc<dyn DestinationResolver>,
    client: reqwest::Client,
    policy: HeaderPolicy,
    body_mode: BodyMode,
    max_buffer_bytes: usize,
    request_transform: Option<Arc<dyn RequestTransform>>,
    response_transform: Option<Arc<dyn ResponseTransform>>,
    destination_label: String,
}

impl ProxyHandler {
    pub fn new(
        resolver: Arc<dyn DestinationResolver>,
        client: reqwest::Client,
        behavior: &ProxyBehaviorConfig,
        destination_label: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            client,
            policy: behavior.header_policy,
            body_mode: behavior.body,
            max_buffer_bytes: behavior.max_buffer_bytes,
            request_transform: None,
            response_transform: None,
            destination_label: destination_label.into(),
        }
    }

    /// Install a request transform.
    pub fn with_request_transform(mut self, transform: Arc<dyn RequestTransform>) -> Self {
        self.request_transform = Some(transform);
        self
    }

    /// Install a response transform.
    pub fn with_response_transform(mut self, transform: Arc<dyn ResponseTransform>) -> Self {
        self.response_transform = Some(transform);
        self
    }

    /// Forward the request and relay the destination's response.
    pub async fn forward(&self, parts: Parts, body: Body, jar: CookieJar) -> (CookieJar, Response) {
        let start = Instant::now();
        let method = parts.method.clone();

        let destination = match self.resolver.resolve(&parts) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(path = %parts.uri.path(), error = %e, "Destination resolution failed");
                metrics::record_request(method.as_str(), 500, &self.destination_label, start);
                return (jar, reply::internal_error(&e));
            }
        };

        let request_id = parts.headers.get(X_REQUEST_ID).cloned();
        let mut outgoing_headers =
            headers::build_outgoing_headers(self.policy, &parts.headers, &destination);
        if let Some(id) = request_id {
            outgoing_headers.insert(X_REQUEST_ID, id);
        }

        let outgoing_body = match self.prepare_body(&method, body, &mut outgoing_headers).await {
            Ok(body) => body,
            Err(response) => {
                metrics::record_request(method.as_str(), 413, &self.destination_label, start);
                return (jar, response);
            }
        };

        if let Some(transform) = &self.request_transform {
            transform.rewrite_headers(&mut outgoing_headers);
        }

        tracing::debug!(
            method = %method,
            destination = %destination,
            "Forwarding request"
        );

        let mut outgoing = self
            .client
            .request(method.clone(), destination.clone())
            .headers(outgoing_headers);
        if let Some(body) = outgoing_body {
            outgoing = outgoing.body(body);
        }

        let upstream = match outgoing.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(destination = %destination, error = %e, "Upstream request failed");
                metrics::record_request(method.as_str(), 500, &self.destination_label, start);
                return (jar, reply::upstream_failure(&e));
            }
        };

        let status = upstream.status();
        metrics::record_request(
            method.as_str(),
            status.as_u16(),
            &self.destination_label,
            start,
        );
        let mut response_headers = headers::strip_hop_by_hop(upstream.headers());

        if let Some(hook) = &self.response_transform {
            if hook.interested(parts.uri.path(), status) {
                return match upstream.bytes().await {
                    Ok(bytes) => {
                        let mut ctx = TransformContext::new(&parts.uri);
                        hook.on_response(&mut ctx, status, &bytes);
                        let jar = ctx.apply(jar);
                        (jar, assemble(status, response_headers, Body::from(bytes)))
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Response body read failed, relaying status only");
                        response_headers.remove(header::CONTENT_LENGTH);
                        (jar, assemble(status, response_headers, Body::empty()))
                    }
                };
            }
        }

        let body = Body::from_stream(upstream.bytes_stream());
        (jar, assemble(status, response_headers, body))
    }

    /// Turn the inbound body into the outbound one per the body mode.
    /// GET and HEAD never carry a body.
    async fn prepare_body(
        &self,
        method: &Method,
        body: Body,
        headers: &mut HeaderMap,
    ) -> Result<Option<reqwest::Body>, Response> {
        if method == Method::GET || method == Method::HEAD {
            return Ok(None);
        }

        match self.body_mode {
            BodyMode::Stream => {
                // the transport re-frames the stream
                headers.remove(header::CONTENT_LENGTH);
                Ok(Some(reqwest::Body::wrap_stream(body.into_data_stream())))
            }
            BodyMode::Buffer => {
                let bytes = match axum::body::to_bytes(body, self.max_buffer_bytes).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::warn!(
                            limit = self.max_buffer_bytes,
                            error = %e,
                            "Request body rejected"
                        );
                        return Err(reply::payload_too_large());
                    }
                };
                let bytes = match &self.request_transform {
                    Some(transform) => transform.rewrite_body(bytes),
                    None => bytes,
                };
                headers.remove(header::CONTENT_LENGTH);
                if bytes.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(reqwest::Body::from(bytes)))
                }
            }
        }
    }
}

fn assemble(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
