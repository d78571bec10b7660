use axum::{extract::Path, Extension};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use super::tenant_payload;
use crate::auth::{self, Claims};
use crate::cache::{self, SessionState, SessionStore};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::TenantService;

/// POST /api/tenants/:id/select - Select the working tenant.
///
/// Issues a tenant-scoped token and replaces the caller's session state:
/// one tenant is selected at a time, so selecting another tenant simply
/// supersedes the previous selection (earlier tokens age out on their own).
pub async fn tenant_select(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let tenants = TenantService::new().await?;

    let role = tenants.require_member(id, auth_user.user_id).await?;
    let tenant = tenants
        .get_active(id)
        .await?
        .ok_or_else(|| ApiError::forbidden("Tenant is not active or does not exist"))?;

    let claims = Claims::tenant_scoped(
        auth_user.user_id,
        auth_user.email.clone(),
        auth_user.name.clone(),
        role.clone(),
        tenant.slug.clone(),
        tenant.id,
        tenant.database.clone(),
    );
    let token = auth::generate_jwt(&claims)?;

    // Replace the cached session wholesale; best effort
    if let Some(store) = cache::try_store().await {
        let state = SessionState {
            user_id: auth_user.user_id,
            email: auth_user.email.clone(),
            tenant_id: Some(tenant.id),
            tenant_slug: Some(tenant.slug.clone()),
            role: Some(role.clone()),
            onboarding_step: Some(tenant.onboarding_step.clone()),
            selected_at: Some(Utc::now()),
        };
        if let Err(e) = SessionStore::new(store).write(&state).await {
            tracing::warn!("Failed to write session for {}: {}", auth_user.user_id, e);
        }
    }

    tracing::info!("User {} selected tenant {} ({})", auth_user.user_id, tenant.slug, tenant.id);

    Ok(ApiResponse::success(json!({
        "token": token,
        "token_type": "Bearer",
        "expires_in": claims.exp - claims.iat,
        "tenant": tenant_payload(&tenant, Some(&role)),
    })))
}
