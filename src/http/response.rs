//! Response construction helpers.
//!
//! # Responsibilities
//! - Map gateway-side failures to HTTP responses
//! - Embed the full error cause chain so callers can see why
//!
//! # Design Decisions
//! - Network failures surface as 500 with the cause chain in the body;
//!   backend error statuses are relayed verbatim elsewhere
//! - Bodies are plain text; these are operator-facing errors

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Join an error with its source chain into one line.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// 500 for a failed outbound request, cause chain included.
pub fn upstream_failure(err: &reqwest::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Upstream request failed: {}", error_chain(err)),
    )
        .into_response()
}

/// 500 for a gateway-side error.
pub fn internal_error(err: &dyn std::error::Error) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, error_chain(err)).into_response()
}

/// 413 for a buffered body over the configured cap.
pub fn payload_too_large() -> Response {
    (
        StatusCode::PAYLOAD_TOO_LARGE,
        "Request body exceeds the buffer limit",
    )
        .into_response()
}

/// 302 with a Location header.
pub fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
        "",
    )
        .into_response()
}
