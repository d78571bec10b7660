use axum::response::Json;
use serde::Deserialize;
use serde_json::Value;

use super::utils::{issue_account_token, reset_session, token_payload};
use crate::auth::google;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

/// POST /auth/google - Sign in with a Google ID token. The account is
/// provisioned on first login and linked by email thereafter.
pub async fn login_google(Json(payload): Json<GoogleLoginRequest>) -> ApiResult<Value> {
    let identity = google::verify_id_token(&payload.id_token).await?;

    let users = UserService::new().await?;
    let user = users.ensure_google_user(&identity).await?;

    let (token, claims) = issue_account_token(&user)?;
    reset_session(&user).await;

    tracing::info!("User {} signed in via Google", user.id);
    Ok(ApiResponse::success(token_payload(&token, &claims)))
}
