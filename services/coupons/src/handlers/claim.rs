use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use dispenser_session::cookie::set_session_cookie;
use dispenser_session::identity::VisitorIdentity;

use crate::domain::types::Claimant;
use crate::error::CouponsServiceError;
use crate::state::AppState;
use crate::usecase::claim::{ClaimCouponInput, ClaimCouponUseCase};

// ── POST /coupons/claim ──────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ClaimResponse {
    pub coupon: String,
}

/// A freshly minted session cookie is attached whatever the outcome, so the
/// browser keeps one identity across rejected and failed attempts too.
pub async fn claim_coupon(
    State(state): State<AppState>,
    identity: VisitorIdentity,
    jar: CookieJar,
) -> (CookieJar, Result<Json<ClaimResponse>, CouponsServiceError>) {
    let jar = if identity.is_new_session {
        set_session_cookie(
            jar,
            identity.session_id.clone(),
            state.session_cookie_secure,
        )
    } else {
        jar
    };

    let usecase = ClaimCouponUseCase {
        repo: state.coupon_repo(),
        unknown_origin_policy: state.unknown_origin_policy,
    };
    let result = usecase
        .execute(ClaimCouponInput {
            claimant: Claimant {
                ip: identity.ip,
                session_id: identity.session_id,
            },
        })
        .await
        .map(|issued| Json(ClaimResponse {
            coupon: issued.code,
        }));

    (jar, result)
}
