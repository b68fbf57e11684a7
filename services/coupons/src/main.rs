use sea_orm::Database;
use tracing::info;

use dispenser_core::tracing::init_tracing;

use dispenser_coupons::config::CouponsConfig;
use dispenser_coupons::router::build_router;
use dispenser_coupons::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = CouponsConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        session_cookie_secure: config.session_cookie_secure,
        unknown_origin_policy: config.unknown_origin_policy,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.coupons_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!(
        unknown_origin_policy = ?config.unknown_origin_policy,
        "coupons service listening on {addr}"
    );
    axum::serve(listener, router).await.expect("server error");
}
