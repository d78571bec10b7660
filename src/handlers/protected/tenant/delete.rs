use axum::{extract::Path, Extension};
use serde_json::Value;
use uuid::Uuid;

use super::{require_role, tenant_payload};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::TenantService;

/// DELETE /api/tenants/:id - Soft delete, owner only. The tenant drops out
/// of listings and selection; the business database is retained.
pub async fn tenant_delete(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let tenants = TenantService::new().await?;
    require_role(&tenants, id, auth_user.user_id, true).await?;

    tenants.soft_delete(id).await?;
    tracing::info!("Tenant {} trashed by {}", id, auth_user.user_id);

    Ok(ApiResponse::no_content())
}

/// POST /api/tenants/:id/restore - Undo a soft delete, owner only
pub async fn tenant_restore(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let tenants = TenantService::new().await?;
    let role = require_role(&tenants, id, auth_user.user_id, true).await?;

    let tenant = tenants.restore(id).await?;

    Ok(ApiResponse::success(tenant_payload(&tenant, Some(&role))))
}
