use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Coupons service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum CouponsServiceError {
    #[error("please wait {} minutes before claiming another coupon", .remaining_secs.div_ceil(60))]
    CooldownActive { remaining_secs: u64 },
    #[error("no coupons available")]
    NoCouponsAvailable,
    #[error("coupon not found")]
    CouponNotFound,
    #[error("empty coupon list")]
    EmptyCouponList,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl CouponsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CooldownActive { .. } => "COOLDOWN_ACTIVE",
            Self::NoCouponsAvailable => "NO_COUPONS_AVAILABLE",
            Self::CouponNotFound => "COUPON_NOT_FOUND",
            Self::EmptyCouponList => "EMPTY_COUPON_LIST",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for CouponsServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::NoCouponsAvailable | Self::CouponNotFound => StatusCode::NOT_FOUND,
            Self::EmptyCouponList => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Only 500s are logged; everything else is an expected business outcome.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::CooldownActive { remaining_secs } = self {
            body["remaining_secs"] = remaining_secs.into();
        }
        (status, axum::Json(body)).into_response()
    }
}
