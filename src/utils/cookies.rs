use axum::http::HeaderMap;
use axum::http::header::COOKIE;

pub(crate) const AUTH_STATE: &str = "spotify_auth_state";
pub(crate) const ACCESS_TOKEN: &str = "spotify_access_token";
pub(crate) const REFRESH_TOKEN: &str = "spotify_refresh_token";

pub(crate) const AUTH_STATE_MAX_AGE: i64 = 10 * 60;
pub(crate) const REFRESH_TOKEN_MAX_AGE: i64 = 30 * 24 * 60 * 60;

/// `Set-Cookie` attributes shared by every cookie the service writes:
/// `HttpOnly; Path=/; SameSite=Lax`, plus `Secure` in production.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CookiePolicy {
    secure: bool,
}

impl CookiePolicy {
    pub(crate) fn new(secure: bool) -> Self {
        Self { secure }
    }

    pub(crate) fn set(&self, name: &str, value: &str, max_age: i64) -> String {
        let mut cookie =
            format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");

        if self.secure {
            cookie.push_str("; Secure");
        }

        cookie
    }

    pub(crate) fn clear(&self, name: &str) -> String {
        self.set(name, "", 0)
    }
}

pub(crate) fn read(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
