use axum::response::IntoResponse;

// Undocumented liveness route.
pub async fn root() -> impl IntoResponse {
    concat!(env!("CARGO_PKG_NAME"), " API")
}
