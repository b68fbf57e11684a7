use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::repository::{CouponRepository, RotationTx};
use crate::domain::types::Coupon;
use crate::error::CouponsServiceError;

pub struct SeedCouponsInput {
    pub codes: Vec<String>,
}

/// Append coupons to the back of the rotation, in input order.
pub struct SeedCouponsUseCase<R: CouponRepository> {
    pub repo: R,
}

impl<R: CouponRepository> SeedCouponsUseCase<R> {
    pub async fn execute(
        &self,
        input: SeedCouponsInput,
    ) -> Result<Vec<Coupon>, CouponsServiceError> {
        if input.codes.is_empty() {
            return Err(CouponsServiceError::EmptyCouponList);
        }

        // Same lock as the claim path, so a concurrent claim cannot move a
        // coupon into the range being appended.
        let mut tx = self.repo.begin_rotation().await?;
        let first_position = tx.max_position().await?.unwrap_or(0) + 1;
        let now = Utc::now();

        let mut seeded = Vec::with_capacity(input.codes.len());
        for (position, code) in (first_position..).zip(input.codes) {
            let coupon = Coupon {
                id: Uuid::now_v7(),
                code,
                position,
                is_active: true,
                created_at: now,
            };
            tx.insert_coupon(&coupon).await?;
            seeded.push(coupon);
        }
        tx.commit().await?;

        info!(count = seeded.len(), first_position, "coupons seeded");
        Ok(seeded)
    }
}
