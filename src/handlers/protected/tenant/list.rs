use axum::Extension;
use serde_json::Value;

use super::tenant_payload;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::TenantService;

/// GET /api/tenants - Tenants the caller belongs to
pub async fn tenant_list(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Vec<Value>> {
    let tenants = TenantService::new().await?;
    let mine = tenants.list_for_user(auth_user.user_id).await?;

    let mut items = Vec::with_capacity(mine.len());
    for tenant in &mine {
        let role = tenants.membership_role(tenant.id, auth_user.user_id).await?;
        items.push(tenant_payload(tenant, role.as_deref()));
    }

    Ok(ApiResponse::success(items))
}
