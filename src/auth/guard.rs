//! Session guard for protected routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use axum_extra::extract::CookieJar;

use crate::auth::cookies::REFRESH_COOKIE;
use crate::http::response as reply;
use crate::http::server::AppState;

/// Redirect unauthenticated requests under protected prefixes to the login
/// page. Everything else passes through.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();

    if is_protected(&state.config.auth.protected_prefixes, path)
        && jar.get(REFRESH_COOKIE).is_none()
    {
        tracing::debug!(path = %path, "No session cookie, redirecting to login");
        return reply::found(&state.config.auth.login_path);
    }

    next.run(request).await
}

fn is_protected(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| {
        matches!(
            path.strip_prefix(prefix.as_str()),
            Some(rest) if rest.is_empty() || rest.starts_with('/')
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matches_whole_segments_only() {
        let prefixes = vec!["/dashboard".to_string()];
        assert!(is_protected(&prefixes, "/dashboard"));
        assert!(is_protected(&prefixes, "/dashboard/settings"));
        assert!(!is_protected(&prefixes, "/dashboards"));
        assert!(!is_protected(&prefixes, "/api/items"));
    }

    #[test]
    fn test_empty_prefix_list_protects_nothing() {
        assert!(!is_protected(&[], "/dashboard"));
    }
}
