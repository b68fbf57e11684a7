//! Visitor identity for anonymous coupon claims.
//!
//! Provides the session-token cookie builder and the `VisitorIdentity`
//! extractor (network origin + session token).

pub mod cookie;
pub mod identity;
