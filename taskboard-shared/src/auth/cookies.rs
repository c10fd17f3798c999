/// Session cookie handling
///
/// The provider's access and refresh tokens are kept in two `HttpOnly`
/// cookies. Only this module knows their names and attributes.

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};

use crate::models::Session;

/// Cookie holding the access token
pub const ACCESS_TOKEN_COOKIE: &str = "tb-access-token";

/// Cookie holding the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "tb-refresh-token";

/// Refresh cookie lifetime (30 days)
const REFRESH_TOKEN_MAX_AGE: i64 = 60 * 60 * 24 * 30;

/// Returns the value of cookie `name` from the request headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Reads only the refresh token (used when the access cookie has expired)
pub fn read_refresh_token(headers: &HeaderMap) -> Option<String> {
    read_cookie(headers, REFRESH_TOKEN_COOKIE)
}

/// Appends `Set-Cookie` headers persisting `session`
pub fn set_session_cookies(headers: &mut HeaderMap, session: &Session, secure: bool) {
    append(
        headers,
        &cookie(ACCESS_TOKEN_COOKIE, &session.access_token, session.expires_in_seconds(), secure),
    );
    append(
        headers,
        &cookie(REFRESH_TOKEN_COOKIE, &session.refresh_token, REFRESH_TOKEN_MAX_AGE, secure),
    );
}

/// Appends `Set-Cookie` headers expiring both session cookies
pub fn clear_session_cookies(headers: &mut HeaderMap, secure: bool) {
    append(headers, &cookie(ACCESS_TOKEN_COOKIE, "", 0, secure));
    append(headers, &cookie(REFRESH_TOKEN_COOKIE, "", 0, secure));
}

fn cookie(name: &str, value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn append(headers: &mut HeaderMap, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            headers.append(SET_COOKIE, value);
        }
        Err(_) => tracing::warn!("Refusing to set cookie with invalid characters"),
    }
}
