use axum::{extract::Path, Extension};
use serde_json::Value;
use uuid::Uuid;

use super::{require_role, tenant_payload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::TenantService;

/// GET /api/tenants/:id - Tenant details, members only
pub async fn tenant_show(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let tenants = TenantService::new().await?;
    let role = require_role(&tenants, id, auth_user.user_id, false).await?;

    let tenant = tenants
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tenant not found"))?;

    Ok(ApiResponse::success(tenant_payload(&tenant, Some(&role))))
}
