use axum::{response::Json, Extension};
use serde::Deserialize;
use serde_json::Value;

use super::tenant_payload;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{CreateTenant, TenantService};

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    /// URL-safe identifier, unique across the platform
    pub slug: String,
    /// Company display name
    pub name: String,
    /// Vietnamese enterprise tax code
    pub tax_code: String,
    /// Business classification from the onboarding wizard
    pub business_type: Option<String>,
}

/// POST /api/tenants - Create a tenant: provisions the business database
/// from the template and records the caller as owner. Onboarding starts at
/// the business-profile step.
pub async fn tenant_create(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateTenantRequest>,
) -> ApiResult<Value> {
    let tenants = TenantService::new().await?;

    let tenant = tenants
        .create_tenant(
            auth_user.user_id,
            CreateTenant {
                slug: payload.slug,
                name: payload.name,
                tax_code: payload.tax_code,
                business_type: payload.business_type,
            },
        )
        .await?;

    Ok(ApiResponse::created(tenant_payload(&tenant, Some("owner"))))
}
