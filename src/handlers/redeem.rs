use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::Json;
use crate::models::PlanLabel;

#[derive(Debug, Deserialize)]
pub struct RedeemBody {
    pub code: String,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub plan_label: PlanLabel,
    pub activated_at: i64,
    /// None = permanent
    pub expires_at: Option<i64>,
}

/// POST /redeem - Consume a code and activate the user's license
pub async fn redeem_code(
    State(state): State<AppState>,
    Json(body): Json<RedeemBody>,
) -> Result<Json<RedeemResponse>> {
    let redemption = state
        .registry
        .redeem(&body.code, &body.user_id, Utc::now().timestamp())?;

    Ok(Json(RedeemResponse {
        plan_label: redemption.plan_label,
        activated_at: redemption.license.activated_at,
        expires_at: redemption.license.expires_at,
    }))
}
