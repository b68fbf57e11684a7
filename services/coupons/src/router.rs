use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use dispenser_core::health::healthz;
use dispenser_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    claim::claim_coupon,
    coupon::{delete_coupon, list_coupons, readyz, seed_coupons, update_coupon},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Claim
        .route("/coupons/claim", post(claim_coupon))
        // Administration
        .route("/coupons", get(list_coupons))
        .route("/coupons/seed", post(seed_coupons))
        .route("/coupons/{id}", delete(delete_coupon))
        .route("/coupons/{id}", patch(update_coupon))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
