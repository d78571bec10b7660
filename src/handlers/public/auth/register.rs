use axum::response::Json;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use super::utils::{issue_account_token, reset_session, token_payload};
use crate::config;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// POST /auth/register - Create a platform account and sign it in.
///
/// Disabled in production environments via `allow_registration`; accounts
/// are then provisioned administratively.
pub async fn register(Json(payload): Json<RegisterRequest>) -> ApiResult<Value> {
    if !config::config().security.allow_registration {
        return Err(ApiError::forbidden("Self-registration is disabled"));
    }

    let mut field_errors = HashMap::new();
    if let Err(msg) = validate::email(&payload.email) {
        field_errors.insert("email".to_string(), msg);
    }
    if let Err(msg) = validate::password(&payload.password) {
        field_errors.insert("password".to_string(), msg);
    }
    if payload.name.trim().is_empty() {
        field_errors.insert("name".to_string(), "Name cannot be empty".to_string());
    }
    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Invalid registration input", Some(field_errors)));
    }

    let users = UserService::new().await?;
    let user = users
        .register(&payload.email, payload.name.trim(), &payload.password)
        .await?;

    let (token, claims) = issue_account_token(&user)?;
    reset_session(&user).await;

    Ok(ApiResponse::created(token_payload(&token, &claims)))
}
