//! Session endpoints served by the gateway itself.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use serde_json::Value;

use crate::auth::cookies::{removal_cookie, REFRESH_COOKIE};
use crate::http::response as reply;
use crate::http::server::AppState;

/// Exchange the refresh cookie for a new access token.
///
/// `GET /refresh-token`. The browser never sees the refresh token value;
/// it lives in an HTTP-only cookie that only this endpoint reads.
pub async fn refresh_token(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Response) {
    let Some(cookie) = jar.get(REFRESH_COOKIE) else {
        return (
            jar,
            (StatusCode::UNAUTHORIZED, "Refresh token not found").into_response(),
        );
    };
    let refresh = cookie.value().to_string();

    let outcome = state
        .client
        .post(state.refresh_endpoint.clone())
        .json(&serde_json::json!({ "refresh": refresh }))
        .send()
        .await;

    let upstream = match outcome {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "Refresh exchange failed");
            let jar = jar.remove(removal_cookie(REFRESH_COOKIE));
            return (jar, reply::upstream_failure(&e));
        }
    };

    let status = upstream.status();
    let content_type = upstream.headers().get(header::CONTENT_TYPE).cloned();
    let body = upstream.bytes().await.unwrap_or_default();

    if !status.is_success() {
        let jar = jar.remove(removal_cookie(REFRESH_COOKIE));
        let code = serde_json::from_slice::<Value>(&body)
            .ok()
            .and_then(|v| v.get("code").and_then(Value::as_str).map(str::to_owned));
        if code.as_deref() == Some("token_not_valid") {
            tracing::debug!("Refresh token no longer valid, redirecting to login");
            return (jar, reply::found(&state.config.auth.login_path));
        }
        tracing::debug!(status = %status, "Refresh rejected by the backend");
        return (
            jar,
            (StatusCode::UNAUTHORIZED, "Invalid refresh token").into_response(),
        );
    }

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    (jar, response)
}
