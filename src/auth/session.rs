//! Session-cookie bookkeeping over backend auth responses.

use axum::http::StatusCode;
use serde_json::Value;

use crate::auth::cookies;
use crate::config::schema::AuthConfig;
use crate::proxy::hooks::{ResponseTransform, TransformContext};

/// Turns successful auth responses into client session cookies.
///
/// The relayed body is never altered. Login and refresh responses
/// contribute the `user` and `refresh-token` cookies, the user endpoint
/// refreshes the profile cookie from its whole body, and logout clears
/// both. Anything that is not a JSON payload passes through untouched.
pub struct SessionCookieHook {
    auth_paths: Vec<String>,
    user_path: String,
    logout_path: String,
}

impl SessionCookieHook {
    pub fn new(auth: &AuthConfig) -> Self {
        Self {
            auth_paths: auth.auth_paths.clone(),
            user_path: auth.user_path.clone(),
            logout_path: auth.logout_path.clone(),
        }
    }

    fn stage_user_cookie(&self, ctx: &mut TransformContext<'_>, profile: &Value) {
        if let Ok(json) = serde_json::to_string(profile) {
            ctx.set_cookie(cookies::session_cookie(
                cookies::USER_COOKIE,
                cookies::encode_value(&json),
            ));
        }
    }
}

impl ResponseTransform for SessionCookieHook {
    fn interested(&self, path: &str, status: StatusCode) -> bool {
        status.is_success()
            && (self.logout_path == path || self.auth_paths.iter().any(|p| p == path))
    }

    fn on_response(&self, ctx: &mut TransformContext<'_>, _status: StatusCode, body: &[u8]) {
        if ctx.path() == self.logout_path {
            ctx.remove_cookie(cookies::removal_cookie(cookies::USER_COOKIE));
            ctx.remove_cookie(cookies::removal_cookie(cookies::REFRESH_COOKIE));
            tracing::debug!("Session cookies cleared");
            return;
        }

        let data: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(
                    path = %ctx.path(),
                    error = %e,
                    "Auth response is not JSON, leaving cookies untouched"
                );
                return;
            }
        };

        if ctx.path() == self.user_path {
            self.stage_user_cookie(ctx, &data);
            return;
        }

        if let Some(user) = data.get("user").filter(|user| !user.is_null()) {
            self.stage_user_cookie(ctx, user);
        }
        if let Some(refresh) = data.get("refresh").and_then(Value::as_str) {
            ctx.set_cookie(cookies::session_cookie(
                cookies::REFRESH_COOKIE,
                cookies::encode_value(refresh),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;
    use axum::response::IntoResponse;
    use axum_extra::extract::CookieJar;

    fn hook() -> SessionCookieHook {
        SessionCookieHook::new(&AuthConfig::default())
    }

    fn set_cookie_headers(uri: &str, body: &[u8]) -> Vec<String> {
        let uri: Uri = uri.parse().unwrap();
        let hook = hook();
        let mut ctx = TransformContext::new(&uri);
        hook.on_response(&mut ctx, StatusCode::OK, body);
        let jar = ctx.apply(CookieJar::new());
        let response = (jar, ()).into_response();
        response
            .headers()
            .get_all("set-cookie")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_interested_only_in_successful_auth_paths() {
        let hook = hook();
        assert!(hook.interested("/api/accounts/login/", StatusCode::OK));
        assert!(hook.interested("/api/accounts/logout/", StatusCode::OK));
        assert!(!hook.interested("/api/accounts/login/", StatusCode::UNAUTHORIZED));
        assert!(!hook.interested("/api/items/", StatusCode::OK));
    }

    #[test]
    fn test_login_sets_both_cookies() {
        let body = br#"{"access":"a1","refresh":"tok123","user":{"pk":1,"email":"a@b.c"}}"#;
        let cookies = set_cookie_headers("/api/accounts/login/", body);

        let user = cookies.iter().find(|c| c.starts_with("user=")).unwrap();
        assert!(user.starts_with("user=%7B"));
        assert!(user.contains("HttpOnly"));
        assert!(user.contains("Secure"));
        assert!(user.contains("SameSite=Lax"));
        assert!(user.contains("Max-Age=2592000"));

        let refresh = cookies
            .iter()
            .find(|c| c.starts_with("refresh-token="))
            .unwrap();
        assert!(refresh.starts_with("refresh-token=tok123"));
        assert!(refresh.contains("HttpOnly"));
    }

    #[test]
    fn test_user_endpoint_uses_whole_body() {
        let cookies = set_cookie_headers("/api/accounts/user/", br#"{"pk":7}"#);
        assert_eq!(cookies.len(), 1);
        assert_eq!(
            cookies[0].split(';').next().unwrap(),
            "user=%7B%22pk%22%3A7%7D"
        );
    }

    #[test]
    fn test_logout_clears_both_cookies() {
        let cookies = set_cookie_headers("/api/accounts/logout/", br#"{}"#);
        assert_eq!(cookies.len(), 2);
        for cookie in &cookies {
            assert!(cookie.contains("Max-Age=0"));
        }
    }

    #[test]
    fn test_non_json_body_stages_nothing() {
        let cookies = set_cookie_headers("/api/accounts/login/", b"<html>maintenance</html>");
        assert!(cookies.is_empty());
    }

    #[test]
    fn test_refresh_without_user_field_updates_only_refresh_cookie() {
        let cookies =
            set_cookie_headers("/api/accounts/token/refresh/", br#"{"refresh":"tok456"}"#);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("refresh-token=tok456"));
    }

    #[test]
    fn test_null_user_field_is_ignored() {
        let cookies = set_cookie_headers("/api/accounts/login/", br#"{"user":null}"#);
        assert!(cookies.is_empty());
    }
}
