//! Session cookie construction.

use axum_extra::extract::cookie::{Cookie, SameSite};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Cookie carrying the percent-encoded JSON profile of the signed-in user.
pub const USER_COOKIE: &str = "user";

/// HTTP-only cookie carrying the long-lived refresh token.
pub const REFRESH_COOKIE: &str = "refresh-token";

/// Session cookie lifetime.
const SESSION_TTL: time::Duration = time::Duration::days(30);

/// Characters escaped in cookie values, matching how browsers encode them.
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a cookie value.
pub fn encode_value(raw: &str) -> String {
    utf8_percent_encode(raw, COOKIE_VALUE).to_string()
}

/// Build a session cookie with the attributes every session cookie carries.
pub fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(SESSION_TTL)
        .build()
}

/// Cookie identifying a session cookie for client-side deletion.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_value_escapes_json() {
        assert_eq!(encode_value(r#"{"a":1}"#), "%7B%22a%22%3A1%7D");
        assert_eq!(encode_value("plain-value_1.0"), "plain-value_1.0");
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(USER_COOKIE, encode_value(r#"{"pk":1}"#));
        let rendered = cookie.to_string();

        assert!(rendered.starts_with("user=%7B%22pk%22%3A1%7D"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=2592000"));
    }

    #[test]
    fn test_ttl_is_thirty_days() {
        assert_eq!(SESSION_TTL.whole_seconds(), 2_592_000);
    }
}
