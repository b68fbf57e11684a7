use sea_orm::DatabaseConnection;

use crate::domain::types::UnknownOriginPolicy;
use crate::infra::db::DbCouponRepository;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub session_cookie_secure: bool,
    pub unknown_origin_policy: UnknownOriginPolicy,
}

impl AppState {
    pub fn coupon_repo(&self) -> DbCouponRepository {
        DbCouponRepository {
            db: self.db.clone(),
        }
    }
}
