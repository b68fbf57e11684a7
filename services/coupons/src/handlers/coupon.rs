use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{Coupon, parse_coupon_lines};
use crate::error::CouponsServiceError;
use crate::state::AppState;
use crate::usecase::coupon::{DeleteCouponUseCase, ListCouponsUseCase, SetCouponActiveUseCase};
use crate::usecase::seed::{SeedCouponsInput, SeedCouponsUseCase};

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CouponResponse {
    pub id: Uuid,
    pub code: String,
    pub is_active: bool,
    pub position: i64,
    #[serde(serialize_with = "dispenser_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Coupon> for CouponResponse {
    fn from(coupon: Coupon) -> Self {
        Self {
            id: coupon.id,
            code: coupon.code,
            is_active: coupon.is_active,
            position: coupon.position,
            created_at: coupon.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct CouponListItem {
    #[serde(flatten)]
    pub coupon: CouponResponse,
    pub claim_count: u64,
}

// ── GET /readyz ──────────────────────────────────────────────────────────────

pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    match state.db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

// ── GET /coupons ─────────────────────────────────────────────────────────────

pub async fn list_coupons(
    State(state): State<AppState>,
) -> Result<Json<Vec<CouponListItem>>, CouponsServiceError> {
    let usecase = ListCouponsUseCase {
        repo: state.coupon_repo(),
    };
    let items = usecase
        .execute()
        .await?
        .into_iter()
        .map(|summary| CouponListItem {
            coupon: summary.coupon.into(),
            claim_count: summary.claim_count,
        })
        .collect();
    Ok(Json(items))
}

// ── POST /coupons/seed ───────────────────────────────────────────────────────

/// Either an explicit list or pasted text with one code per line.
#[derive(Deserialize)]
pub struct SeedCouponsRequest {
    pub coupons: Option<Vec<String>>,
    pub text: Option<String>,
}

#[derive(Serialize)]
pub struct SeedCouponsResponse {
    pub count: usize,
}

pub async fn seed_coupons(
    State(state): State<AppState>,
    Json(body): Json<SeedCouponsRequest>,
) -> Result<(StatusCode, Json<SeedCouponsResponse>), CouponsServiceError> {
    let codes = match (body.coupons, body.text) {
        (Some(codes), _) => codes,
        (None, Some(text)) => parse_coupon_lines(&text),
        (None, None) => Vec::new(),
    };

    let usecase = SeedCouponsUseCase {
        repo: state.coupon_repo(),
    };
    let seeded = usecase.execute(SeedCouponsInput { codes }).await?;
    Ok((
        StatusCode::CREATED,
        Json(SeedCouponsResponse {
            count: seeded.len(),
        }),
    ))
}

// ── DELETE /coupons/{id} ─────────────────────────────────────────────────────

pub async fn delete_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CouponResponse>, CouponsServiceError> {
    let usecase = DeleteCouponUseCase {
        repo: state.coupon_repo(),
    };
    let deleted = usecase.execute(id).await?;
    Ok(Json(deleted.into()))
}

// ── PATCH /coupons/{id} ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateCouponRequest {
    pub is_active: bool,
}

pub async fn update_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCouponRequest>,
) -> Result<StatusCode, CouponsServiceError> {
    let usecase = SetCouponActiveUseCase {
        repo: state.coupon_repo(),
    };
    usecase.execute(id, body.is_active).await?;
    Ok(StatusCode::NO_CONTENT)
}
