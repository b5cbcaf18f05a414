mod codes;
mod interactions;
mod redeem;
mod status;

pub use codes::*;
pub use interactions::*;
pub use redeem::*;
pub use status::*;

use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde::Serialize;

use crate::db::AppState;
use crate::middleware::require_service_token;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/codes", post(create_code))
        .route("/redeem", post(redeem_code))
        .route("/status/{user_id}", get(get_status))
        .route("/interactions/register", post(register_submit))
        .route("/interactions/status", post(status_request))
        .layer(middleware::from_fn_with_state(state, require_service_token))
        .route("/health", get(health))
}
