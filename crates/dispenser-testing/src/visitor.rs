//! Simulated visitors for request-level tests.
//!
//! A browser behind a proxy arrives with an `x-forwarded-for` chain and, after
//! its first claim, a `coupon_claim_id` cookie. `MockVisitor` produces those
//! headers so tests can play several visitors against one router.

use http::{HeaderMap, HeaderName, HeaderValue, header::COOKIE};

use dispenser_session::cookie::COUPON_CLAIM_ID;
use dispenser_session::identity::X_FORWARDED_FOR;

#[derive(Debug, Clone, Default)]
pub struct MockVisitor {
    pub ip: Option<String>,
    pub session_id: Option<String>,
}

impl MockVisitor {
    pub fn new(ip: &str, session_id: &str) -> Self {
        Self {
            ip: Some(ip.to_owned()),
            session_id: Some(session_id.to_owned()),
        }
    }

    /// Visitor whose proxy strips the forwarded-for header and who has no cookie yet.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, session_id: &str) -> Self {
        self.session_id = Some(session_id.to_owned());
        self
    }

    /// Return headers as the proxy and browser would send them.
    pub fn headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(ip) = &self.ip {
            map.insert(
                HeaderName::from_static(X_FORWARDED_FOR),
                HeaderValue::from_str(&format!("{ip}, 10.0.0.1")).unwrap(),
            );
        }
        if let Some(session_id) = &self.session_id {
            map.insert(
                COOKIE,
                HeaderValue::from_str(&format!("{COUPON_CLAIM_ID}={session_id}")).unwrap(),
            );
        }
        map
    }
}
