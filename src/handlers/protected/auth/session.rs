use axum::{response::Json, Extension};
use serde_json::{json, Value};

use crate::auth::{self, Claims};
use crate::cache::{self, SessionStore};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/whoami - Current user, token scope, and cached session
/// state (selected tenant, onboarding snapshot). Falls back to token claims
/// when the session store has nothing.
pub async fn whoami(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Value> {
    let session = match cache::try_store().await {
        Some(store) => SessionStore::new(store)
            .read(auth_user.user_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to read session for {}: {}", auth_user.user_id, e);
                None
            }),
        None => None,
    };

    let session_value = match session {
        Some(state) => json!({
            "tenant_id": state.tenant_id,
            "tenant": state.tenant_slug,
            "role": state.role,
            "onboarding_step": state.onboarding_step,
            "selected_at": state.selected_at,
        }),
        None => json!({
            "tenant_id": auth_user.tenant_id,
            "tenant": auth_user.tenant,
            "role": if auth_user.has_tenant() { Some(auth_user.role.clone()) } else { None },
            "onboarding_step": Value::Null,
            "selected_at": Value::Null,
        }),
    };

    Ok(ApiResponse::success(json!({
        "id": auth_user.user_id,
        "email": auth_user.email,
        "name": auth_user.name,
        "role": auth_user.role,
        "tenant": auth_user.tenant,
        "tenant_id": auth_user.tenant_id,
        "session": session_value,
    })))
}

/// PUT /api/auth/session/refresh - Re-issue the current token with a fresh
/// expiry, preserving its scope (account or tenant).
pub async fn refresh_session(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Value> {
    let claims = match (&auth_user.tenant, auth_user.tenant_id, &auth_user.database) {
        (Some(slug), Some(tenant_id), Some(database)) => Claims::tenant_scoped(
            auth_user.user_id,
            auth_user.email.clone(),
            auth_user.name.clone(),
            auth_user.role.clone(),
            slug.clone(),
            tenant_id,
            database.clone(),
        ),
        _ => Claims::account(auth_user.user_id, auth_user.email.clone(), auth_user.name.clone()),
    };

    let token = auth::generate_jwt(&claims)?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "token_type": "Bearer",
        "expires_in": claims.exp - claims.iat,
    })))
}

/// DELETE /api/auth/session - Sign out: drop the cached session state. The
/// bearer token itself simply ages out.
pub async fn logout(Extension(auth_user): Extension<AuthUser>) -> ApiResult<()> {
    if let Some(store) = cache::try_store().await {
        let sessions = SessionStore::new(store);
        if let Err(e) = sessions.clear(auth_user.user_id).await {
            tracing::warn!("Failed to clear session for {}: {}", auth_user.user_id, e);
        }
    }

    tracing::info!("User {} signed out", auth_user.user_id);
    Ok(ApiResponse::no_content())
}
