//! Error-envelope relay.
//!
//! Envelopes arrive as text whose first line is a JSON header naming the
//! project DSN; the remaining lines are opaque. The relay derives the
//! project id from the header DSN (falling back to the configured one) and
//! forwards the whole envelope to the ingest host.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use url::Url;

use crate::http::response as reply;
use crate::http::server::AppState;

pub const ENVELOPE_CONTENT_TYPE: &str = "application/x-sentry-envelope";

/// Project id embedded in a DSN's path, if any.
pub fn project_id_from_dsn(dsn: &str) -> Option<String> {
    let url = Url::parse(dsn).ok()?;
    let project = url.path().trim_matches('/');
    if project.is_empty() {
        None
    } else {
        Some(project.to_string())
    }
}

/// Ingest URL envelopes for the given project are posted to.
pub fn envelope_url(ingest_base: &str, project_id: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!(
        "{}/api/{}/envelope/",
        ingest_base.trim_end_matches('/'),
        project_id
    ))
}

/// Relay an error envelope to the ingest host.
///
/// `POST /sentry`
pub async fn relay_envelope(State(state): State<AppState>, envelope: String) -> Response {
    let header_line = envelope.split('\n').next().unwrap_or("");
    let dsn = serde_json::from_str::<Value>(header_line)
        .ok()
        .and_then(|h| h.get("dsn").and_then(Value::as_str).map(str::to_owned))
        .or_else(|| {
            let configured = &state.config.relays.sentry.dsn;
            (!configured.is_empty()).then(|| configured.clone())
        });

    let Some(project_id) = dsn.as_deref().and_then(project_id_from_dsn) else {
        tracing::debug!("Envelope carries no usable DSN");
        return (StatusCode::BAD_REQUEST, "Invalid project id or host").into_response();
    };

    let destination = match envelope_url(&state.config.relays.sentry.ingest_base, &project_id) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "Envelope destination invalid");
            return reply::internal_error(&e);
        }
    };

    tracing::debug!(project_id = %project_id, destination = %destination, "Relaying envelope");

    let outcome = state
        .client
        .post(destination)
        .header(header::CONTENT_TYPE, ENVELOPE_CONTENT_TYPE)
        .body(envelope)
        .send()
        .await;

    match outcome {
        Ok(upstream) => {
            let status = upstream.status();
            let body = upstream.text().await.unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Envelope response body unreadable, relaying status only");
                String::new()
            });
            (status, body).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Envelope relay failed");
            reply::upstream_failure(&e)
        }
    }
}
