//! Cookie token transport
//!
//! The access token travels in an `HttpOnly` cookie scoped to `Path=/`.
//! Attach and detach produce `Set-Cookie` values; extract reads the
//! `Cookie` request header. An absent cookie is an anonymous request,
//! never an error.

use http::header::COOKIE;
use http::HeaderMap;

use crate::config::JwtConfig;

const SECONDS_PER_DAY: i64 = 86_400;

/// Builds and parses the access-token cookie
#[derive(Debug, Clone)]
pub struct CookieTransport {
    name: String,
    max_age_secs: i64,
}

impl CookieTransport {
    /// Create a transport from the JWT configuration
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            max_age_secs: config.expiration_days * SECONDS_PER_DAY,
        }
    }

    /// Cookie name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Set-Cookie` value carrying the token
    pub fn attach(&self, token: &str) -> String {
        format!(
            "{}={}; HttpOnly; Path=/; Max-Age={}",
            self.name, token, self.max_age_secs
        )
    }

    /// `Set-Cookie` value that deletes the cookie (logout)
    pub fn detach(&self) -> String {
        format!("{}=; HttpOnly; Path=/; Max-Age=0", self.name)
    }

    /// Extract the token value from the request's `Cookie` header
    pub fn extract(&self, headers: &HeaderMap) -> Option<String> {
        let cookies = headers.get(COOKIE)?.to_str().ok()?;
        for cookie in cookies.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                if name == self.name {
                    return Some(value.to_string());
                }
            }
        }
        None
    }
}
