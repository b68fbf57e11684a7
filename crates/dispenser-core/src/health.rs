use axum::http::StatusCode;

/// Handler for `GET /healthz`: process liveness only.
///
/// Readiness depends on each service's backing store, so services expose
/// their own `/readyz`.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
