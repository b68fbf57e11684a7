use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::repository::CouponRepository;
use crate::domain::types::{Coupon, CouponSummary};
use crate::error::CouponsServiceError;

// ── ListCoupons ──────────────────────────────────────────────────────────────

pub struct ListCouponsUseCase<R: CouponRepository> {
    pub repo: R,
}

impl<R: CouponRepository> ListCouponsUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<CouponSummary>, CouponsServiceError> {
        self.repo.list_with_claim_counts().await
    }
}

// ── DeleteCoupon ─────────────────────────────────────────────────────────────

pub struct DeleteCouponUseCase<R: CouponRepository> {
    pub repo: R,
}

impl<R: CouponRepository> DeleteCouponUseCase<R> {
    /// Delete a coupon and its oldest claim; returns the deleted coupon.
    ///
    /// Newer claims survive with no coupon and keep anchoring their
    /// claimants' cooldowns.
    ///
    /// Runs outside the rotation lock. A claim or delete racing on the same
    /// coupon only changes which of the two steps finds nothing to remove.
    pub async fn execute(&self, id: Uuid) -> Result<Coupon, CouponsServiceError> {
        let coupon = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(CouponsServiceError::CouponNotFound)?;

        if self.repo.delete_one_claim(id).await? {
            warn!(coupon_id = %id, "deleting coupon that has been claimed");
        }

        if !self.repo.delete(id).await? {
            // Removed concurrently between lookup and delete.
            return Err(CouponsServiceError::CouponNotFound);
        }

        info!(coupon_id = %id, "coupon deleted");
        Ok(coupon)
    }
}

// ── SetCouponActive ──────────────────────────────────────────────────────────

pub struct SetCouponActiveUseCase<R: CouponRepository> {
    pub repo: R,
}

impl<R: CouponRepository> SetCouponActiveUseCase<R> {
    pub async fn execute(&self, id: Uuid, is_active: bool) -> Result<(), CouponsServiceError> {
        if !self.repo.set_active(id, is_active).await? {
            return Err(CouponsServiceError::CouponNotFound);
        }
        info!(coupon_id = %id, is_active, "coupon activation changed");
        Ok(())
    }
}
