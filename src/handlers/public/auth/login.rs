use axum::response::Json;
use serde::Deserialize;
use serde_json::Value;

use super::utils::{issue_account_token, reset_session, token_payload};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - Authenticate with email/password and receive an
/// account token. Tenant-scoped tokens are issued later, at tenant
/// selection.
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let users = UserService::new().await?;
    let user = users.authenticate(&payload.email, &payload.password).await?;

    let (token, claims) = issue_account_token(&user)?;
    reset_session(&user).await;

    tracing::info!("User {} signed in", user.id);
    Ok(ApiResponse::success(token_payload(&token, &claims)))
}
