use crate::domain::types::UnknownOriginPolicy;

/// Coupons service configuration loaded from environment variables.
#[derive(Debug)]
pub struct CouponsConfig {
    /// Database connection URL (PostgreSQL in production).
    pub database_url: String,
    /// TCP port to listen on (default 3114). Env var: `COUPONS_PORT`.
    pub coupons_port: u16,
    /// Mark the session cookie `Secure` (default true). Env var: `SESSION_COOKIE_SECURE`.
    pub session_cookie_secure: bool,
    /// Cooldown correlation for visitors without a forwarded-for address
    /// (default "shared-bucket"). Env var: `UNKNOWN_ORIGIN_POLICY`.
    pub unknown_origin_policy: UnknownOriginPolicy,
}

impl CouponsConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            coupons_port: std::env::var("COUPONS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3114),
            session_cookie_secure: std::env::var("SESSION_COOKIE_SECURE")
                .ok()
                .map(|v| parse_bool(&v).expect("SESSION_COOKIE_SECURE"))
                .unwrap_or(true),
            unknown_origin_policy: std::env::var("UNKNOWN_ORIGIN_POLICY")
                .ok()
                .map(|v| UnknownOriginPolicy::from_kebab_case(&v).expect("UNKNOWN_ORIGIN_POLICY"))
                .unwrap_or_default(),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
