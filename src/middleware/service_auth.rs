use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::db::AppState;
use crate::util::extract_bearer_token;

/// Require the interaction surface's shared bearer token.
///
/// A no-op when no token is configured.
pub async fn require_service_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(expected) = state.service_token.as_deref() {
        let presented = extract_bearer_token(request.headers()).ok_or(StatusCode::UNAUTHORIZED)?;
        if !bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
            tracing::debug!("Rejected request with invalid service token");
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    Ok(next.run(request).await)
}
