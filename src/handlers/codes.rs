use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::models::PlanType;

#[derive(Debug, Deserialize)]
pub struct CreateCodeBody {
    /// Plan tag (7D, 30D, PERM; anything else mints a one-time code)
    pub plan: String,
    /// Administrator capability, checked by the interaction surface
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateCodeResponse {
    pub code: String,
    pub plan: PlanType,
    pub created_at: i64,
}

/// POST /codes - Mint a new license code (admin only)
pub async fn create_code(
    State(state): State<AppState>,
    Json(body): Json<CreateCodeBody>,
) -> Result<(StatusCode, Json<CreateCodeResponse>)> {
    let code = state
        .registry
        .create_code(&body.plan, body.is_admin, Utc::now().timestamp())?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCodeResponse {
            code: code.code,
            plan: code.plan_type,
            created_at: code.created_at,
        }),
    ))
}
