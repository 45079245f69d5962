//! Session cookie construction.

use axum_extra::extract::cookie::{Cookie, SameSite};
use keyward_core::SessionId;
use time::Duration as TimeDuration;

use crate::config::SessionConfig;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session_id";

/// Builds the cookie carrying a freshly issued session identifier.
#[must_use]
pub fn session_cookie(session_id: &SessionId, config: &SessionConfig) -> Cookie<'static> {
    let max_age = i64::try_from(config.session_ttl().as_secs()).unwrap_or(i64::MAX);
    Cookie::build((SESSION_COOKIE, session_id.as_str().to_string()))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Strict)
        .max_age(TimeDuration::seconds(max_age))
        .build()
}

/// Builds a cookie that makes the browser discard its session cookie.
#[must_use]
pub fn cleared_session_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Strict)
        .max_age(TimeDuration::seconds(-1))
        .build()
}
