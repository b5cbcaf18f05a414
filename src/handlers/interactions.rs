use axum::extract::State;
use chrono::Utc;
use serde::Deserialize;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::interaction::{self, Reply};

#[derive(Debug, Deserialize)]
pub struct RegisterSubmit {
    pub code: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub user_id: String,
}

/// POST /interactions/register - Registration modal submitted
pub async fn register_submit(
    State(state): State<AppState>,
    Json(body): Json<RegisterSubmit>,
) -> Result<Json<Reply>> {
    let reply = interaction::on_register_submit(
        &state.registry,
        &body.code,
        &body.user_id,
        Utc::now().timestamp(),
    )?;
    Ok(Json(reply))
}

/// POST /interactions/status - "My info" button pressed
pub async fn status_request(
    State(state): State<AppState>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Reply>> {
    let reply =
        interaction::on_status_request(&state.store, &body.user_id, Utc::now().timestamp())?;
    Ok(Json(reply))
}
