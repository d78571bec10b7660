use axum::response::Json;
use serde::Deserialize;
use serde_json::Value;

use super::utils::token_payload;
use crate::auth;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub token: String,
}

/// POST /auth/refresh - Exchange a token (possibly expired, within the
/// refresh window) for a fresh one with identical scope. The account is
/// re-checked so disabled users cannot refresh their way back in.
pub async fn refresh(Json(payload): Json<RefreshRequest>) -> ApiResult<Value> {
    let claims = auth::decode_for_refresh(&payload.token)?;

    let users = UserService::new().await?;
    let user = users
        .get(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    if !user.is_active || user.trashed_at.is_some() {
        return Err(ApiError::forbidden("Account is disabled"));
    }

    let renewed = claims.renewed();
    let token = auth::generate_jwt(&renewed)?;

    Ok(ApiResponse::success(token_payload(&token, &renewed)))
}
