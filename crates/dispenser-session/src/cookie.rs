//! Session-token cookie that ties repeated visits from one browser together.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

/// Cookie name for the visitor session token.
pub const COUPON_CLAIM_ID: &str = "coupon_claim_id";

/// Cookie Max-Age in seconds (30 days).
pub const SESSION_COOKIE_MAX_AGE: i64 = 60 * 60 * 24 * 30;

/// Set the session-token cookie on the jar.
///
/// ```
/// use axum_extra::extract::cookie::CookieJar;
/// use dispenser_session::cookie::{set_session_cookie, COUPON_CLAIM_ID};
///
/// let jar = set_session_cookie(CookieJar::new(), "token".to_string(), true);
/// let cookie = jar.get(COUPON_CLAIM_ID).unwrap();
/// assert_eq!(cookie.value(), "token");
/// assert_eq!(cookie.path(), Some("/"));
/// assert_eq!(cookie.max_age(), Some(time::Duration::seconds(2592000)));
/// assert!(cookie.http_only().unwrap_or(false));
/// assert!(cookie.secure().unwrap_or(false));
/// ```
pub fn set_session_cookie(jar: CookieJar, token: String, secure: bool) -> CookieJar {
    let cookie = Cookie::build((COUPON_CLAIM_ID, token))
        .path("/")
        .max_age(Duration::seconds(SESSION_COOKIE_MAX_AGE))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Read the session token from the jar, ignoring an empty value.
///
/// ```
/// use axum_extra::extract::cookie::{Cookie, CookieJar};
/// use dispenser_session::cookie::{session_token, COUPON_CLAIM_ID};
///
/// assert_eq!(session_token(&CookieJar::new()), None);
/// let jar = CookieJar::new().add(Cookie::new(COUPON_CLAIM_ID, "abc"));
/// assert_eq!(session_token(&jar).as_deref(), Some("abc"));
/// let jar = CookieJar::new().add(Cookie::new(COUPON_CLAIM_ID, ""));
/// assert_eq!(session_token(&jar), None);
/// ```
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(COUPON_CLAIM_ID)
        .map(|c| c.value().trim())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
