use chrono::{DateTime, Utc};
use uuid::Uuid;

use dispenser_session::identity::UNKNOWN_ORIGIN;

/// Minimum interval between two successful claims from one identity, in seconds.
pub const COOLDOWN_PERIOD_SECS: i64 = 60 * 60;

/// A dispensable coupon code and its place in the rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub position: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A coupon annotated with the number of claims that reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponSummary {
    pub coupon: Coupon,
    pub claim_count: u64,
}

/// Record of one successful claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub id: Uuid,
    pub ip: String,
    pub session_id: String,
    /// `None` once the referenced coupon has been deleted.
    pub coupon_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// The visitor asking for a coupon: network origin plus session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claimant {
    pub ip: String,
    pub session_id: String,
}

/// How visitors without a forwarded-for address are correlated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownOriginPolicy {
    /// Every visitor with an unknown origin shares one cooldown bucket.
    #[default]
    SharedBucket,
    /// An unknown origin never matches; only the session token counts.
    SessionOnly,
}

impl UnknownOriginPolicy {
    pub fn from_kebab_case(s: &str) -> Option<Self> {
        match s {
            "shared-bucket" => Some(Self::SharedBucket),
            "session-only" => Some(Self::SessionOnly),
            _ => None,
        }
    }
}

/// Fields a previous claim is matched on when checking cooldown.
///
/// A claim matches when its ip equals `ip` (if set) OR its session id equals
/// `session_id`. Sharing a network with a recent claimant is enough to be
/// blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownKey<'a> {
    pub ip: Option<&'a str>,
    pub session_id: &'a str,
}

impl CooldownKey<'_> {
    pub fn matches(&self, claim: &Claim) -> bool {
        self.ip.is_some_and(|ip| claim.ip == ip) || claim.session_id == self.session_id
    }
}

impl Claimant {
    pub fn has_known_origin(&self) -> bool {
        self.ip != UNKNOWN_ORIGIN
    }

    pub fn cooldown_key(&self, policy: UnknownOriginPolicy) -> CooldownKey<'_> {
        let match_ip = self.has_known_origin() || policy == UnknownOriginPolicy::SharedBucket;
        CooldownKey {
            ip: match_ip.then_some(self.ip.as_str()),
            session_id: &self.session_id,
        }
    }
}

/// Seconds left before a claimant whose last claim was at `last_claim_at`
/// may claim again. Zero or negative means the cooldown is over.
pub fn remaining_cooldown_secs(last_claim_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    COOLDOWN_PERIOD_SECS - (now - last_claim_at).num_seconds()
}

/// Split pasted text into coupon codes: one per line, trimmed, blank lines
/// dropped, repeats within the batch dropped (first occurrence wins).
pub fn parse_coupon_lines(text: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if !codes.iter().any(|c| c == line) {
            codes.push(line.to_owned());
        }
    }
    codes
}
