use axum::{extract::Path, response::Json, Extension};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::{require_role, tenant_payload};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{TenantService, UpdateTenant};

#[derive(Debug, Deserialize)]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    pub business_type: Option<String>,
}

/// PATCH /api/tenants/:id - Update display fields, owner only. Slug, tax
/// code, and the provisioned database never change.
pub async fn tenant_update(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTenantRequest>,
) -> ApiResult<Value> {
    let tenants = TenantService::new().await?;
    let role = require_role(&tenants, id, auth_user.user_id, true).await?;

    let tenant = tenants
        .update(
            id,
            UpdateTenant {
                name: payload.name,
                business_type: payload.business_type,
            },
        )
        .await?;

    Ok(ApiResponse::success(tenant_payload(&tenant, Some(&role))))
}
