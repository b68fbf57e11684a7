#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{Claim, CooldownKey, Coupon, CouponSummary};
use crate::error::CouponsServiceError;

/// An open store transaction holding the rotation lock.
///
/// At most one rotation transaction is open per store at a time, so reads of
/// positions and recent claims cannot go stale before `commit`. Dropping the
/// transaction without committing rolls back every write made through it.
pub trait RotationTx: Send {
    /// Most recent claim matching `key` created at or after `since`.
    async fn latest_claim_since(
        &mut self,
        key: CooldownKey<'_>,
        since: DateTime<Utc>,
    ) -> Result<Option<Claim>, CouponsServiceError>;

    /// Active coupon with the lowest position (ties: oldest, then lowest id).
    async fn next_active(&mut self) -> Result<Option<Coupon>, CouponsServiceError>;

    /// Highest position across all coupons, active or not.
    async fn max_position(&mut self) -> Result<Option<i64>, CouponsServiceError>;

    async fn move_to_position(
        &mut self,
        coupon_id: Uuid,
        position: i64,
    ) -> Result<(), CouponsServiceError>;

    async fn insert_claim(&mut self, claim: &Claim) -> Result<(), CouponsServiceError>;

    async fn insert_coupon(&mut self, coupon: &Coupon) -> Result<(), CouponsServiceError>;

    async fn commit(self) -> Result<(), CouponsServiceError>;
}

/// Repository for coupons and their claims.
pub trait CouponRepository: Send + Sync {
    type Rotation: RotationTx;

    /// Begin a transaction and take the rotation lock.
    async fn begin_rotation(&self) -> Result<Self::Rotation, CouponsServiceError>;

    /// All coupons ordered by position, each with its claim count.
    async fn list_with_claim_counts(&self) -> Result<Vec<CouponSummary>, CouponsServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Coupon>, CouponsServiceError>;

    /// Delete the oldest claim referencing the coupon. Returns `true` if a row
    /// was deleted.
    async fn delete_one_claim(&self, coupon_id: Uuid) -> Result<bool, CouponsServiceError>;

    /// Delete a coupon. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, CouponsServiceError>;

    /// Set the active flag. Returns `true` if the coupon exists.
    async fn set_active(&self, id: Uuid, is_active: bool) -> Result<bool, CouponsServiceError>;
}
