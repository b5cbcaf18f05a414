use axum::extract::State;
use chrono::Utc;

use crate::db::AppState;
use crate::error::Result;
use crate::extractors::{Json, Path};
use crate::models::LicenseStatus;

/// GET /status/{user_id} - Current license classification
pub async fn get_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<LicenseStatus>> {
    let status = state.store.get_status(&user_id, Utc::now().timestamp())?;
    Ok(Json(status))
}
