use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::repository::{CouponRepository, RotationTx};
use crate::domain::types::{
    COOLDOWN_PERIOD_SECS, Claim, Claimant, UnknownOriginPolicy, remaining_cooldown_secs,
};
use crate::error::CouponsServiceError;

pub struct ClaimCouponInput {
    pub claimant: Claimant,
}

/// A coupon handed to a claimant.
#[derive(Debug, Clone)]
pub struct IssuedCoupon {
    pub coupon_id: Uuid,
    pub code: String,
}

/// Dispense the next coupon in the rotation, subject to the claimant's cooldown.
pub struct ClaimCouponUseCase<R: CouponRepository> {
    pub repo: R,
    pub unknown_origin_policy: UnknownOriginPolicy,
}

impl<R: CouponRepository> ClaimCouponUseCase<R> {
    pub async fn execute(
        &self,
        input: ClaimCouponInput,
    ) -> Result<IssuedCoupon, CouponsServiceError> {
        let claimant = input.claimant;

        // Everything below runs in one transaction under the rotation lock.
        // An early return drops `tx` and rolls back.
        let mut tx = self.repo.begin_rotation().await?;

        // Read the clock only once the lock is held, so time spent waiting
        // for it is not charged to the claimant.
        let now = Utc::now();
        let boundary = now - Duration::seconds(COOLDOWN_PERIOD_SECS);

        // 1. Cooldown: latest claim from the same ip OR session in the window.
        let key = claimant.cooldown_key(self.unknown_origin_policy);
        if let Some(last) = tx.latest_claim_since(key, boundary).await? {
            let remaining = remaining_cooldown_secs(last.created_at, now);
            if remaining > 0 {
                debug!(remaining_secs = remaining, "claim rejected by cooldown");
                return Err(CouponsServiceError::CooldownActive {
                    remaining_secs: remaining as u64,
                });
            }
        }

        // 2. Lowest active position wins.
        let coupon = tx
            .next_active()
            .await?
            .ok_or(CouponsServiceError::NoCouponsAvailable)?;

        // 3. Move it behind every other coupon and record the claim.
        let next_position = tx.max_position().await?.unwrap_or(0) + 1;
        tx.move_to_position(coupon.id, next_position).await?;
        tx.insert_claim(&Claim {
            id: Uuid::now_v7(),
            ip: claimant.ip,
            session_id: claimant.session_id,
            coupon_id: Some(coupon.id),
            created_at: now,
        })
        .await?;

        tx.commit().await?;

        info!(
            coupon_id = %coupon.id,
            from_position = coupon.position,
            to_position = next_position,
            "coupon issued"
        );
        Ok(IssuedCoupon {
            coupon_id: coupon.id,
            code: coupon.code,
        })
    }
}
