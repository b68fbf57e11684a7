//! Visitor identity extractor: network origin plus session token.

use axum::extract::FromRequestParts;
use axum_extra::extract::cookie::CookieJar;
use http::HeaderMap;
use http::request::Parts;
use std::convert::Infallible;
use uuid::Uuid;

use crate::cookie::session_token;

/// Header carrying the client address chain set by the fronting proxy.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Origin recorded when no forwarded-for address is available. Every such
/// visitor shares this value.
pub const UNKNOWN_ORIGIN: &str = "unknown";

/// The visitor behind a request.
///
/// `is_new_session` is set when the request carried no session cookie and a
/// fresh token was minted; the handler must then attach the cookie to its
/// response so the browser presents it on later visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorIdentity {
    pub ip: String,
    pub session_id: String,
    pub is_new_session: bool,
}

/// First address of the `x-forwarded-for` chain, or [`UNKNOWN_ORIGIN`].
pub fn origin_from_headers(headers: &HeaderMap) -> String {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or(UNKNOWN_ORIGIN)
        .to_owned()
}

impl<S> FromRequestParts<S> for VisitorIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    // axum-core 0.5 defines this as `fn -> impl Future + Send`; read the headers
    // synchronously and return a 'static async block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let ip = origin_from_headers(&parts.headers);
        let existing = session_token(&CookieJar::from_headers(&parts.headers));

        async move {
            let identity = match existing {
                Some(session_id) => Self {
                    ip,
                    session_id,
                    is_new_session: false,
                },
                None => Self {
                    ip,
                    session_id: Uuid::new_v4().to_string(),
                    is_new_session: true,
                },
            };
            Ok(identity)
        }
    }
}
