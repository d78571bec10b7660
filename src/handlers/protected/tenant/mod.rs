pub mod create;
pub mod delete;
pub mod list;
pub mod onboarding;
pub mod select;
pub mod show;
pub mod update;

pub use create::tenant_create;
pub use delete::{tenant_delete, tenant_restore};
pub use list::tenant_list;
pub use onboarding::{onboarding_complete, onboarding_show};
pub use select::tenant_select;
pub use show::tenant_show;
pub use update::tenant_update;

use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::Tenant;
use crate::error::ApiError;
use crate::services::{TenantError, TenantService};

/// Wire shape for a tenant, with the caller's role when known
pub(crate) fn tenant_payload(tenant: &Tenant, role: Option<&str>) -> Value {
    json!({
        "id": tenant.id,
        "slug": tenant.slug,
        "name": tenant.name,
        "tax_code": tenant.tax_code,
        "business_type": tenant.business_type,
        "onboarding_step": tenant.onboarding_step,
        "is_active": tenant.is_active,
        "trashed": tenant.trashed_at.is_some(),
        "created_at": tenant.created_at,
        "role": role,
    })
}

/// Membership gate shared by the tenant handlers. With `owner_only`, any
/// non-owner member gets a 403.
pub(crate) async fn require_role(
    tenants: &TenantService,
    tenant_id: Uuid,
    user_id: Uuid,
    owner_only: bool,
) -> Result<String, ApiError> {
    let role = tenants
        .require_member(tenant_id, user_id)
        .await
        .map_err(|e| match e {
            TenantError::NotMember => ApiError::not_found("Tenant not found"),
            other => other.into(),
        })?;

    if owner_only && role != "owner" {
        return Err(ApiError::forbidden("Only the tenant owner can do this"));
    }

    Ok(role)
}
