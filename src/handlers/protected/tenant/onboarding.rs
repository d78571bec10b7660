use axum::{extract::Path, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::require_role;
use crate::cache::{self, SessionStore};
use crate::database::models::{OnboardingStep, Tenant};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::TenantService;

fn onboarding_payload(tenant: &Tenant) -> Value {
    let pending = tenant.onboarding();

    let steps: Vec<Value> = OnboardingStep::ALL
        .iter()
        .filter(|step| **step != OnboardingStep::Done)
        .map(|step| {
            json!({
                "step": step.as_str(),
                "completed": *step < pending,
            })
        })
        .collect();

    json!({
        "tenant_id": tenant.id,
        "pending": pending.as_str(),
        "done": pending == OnboardingStep::Done,
        "steps": steps,
    })
}

/// GET /api/tenants/:id/onboarding - Wizard progress, members only
pub async fn onboarding_show(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let tenants = TenantService::new().await?;
    require_role(&tenants, id, auth_user.user_id, false).await?;

    let tenant = tenants
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tenant not found"))?;

    Ok(ApiResponse::success(onboarding_payload(&tenant)))
}

#[derive(Debug, Deserialize)]
pub struct CompleteStepRequest {
    pub step: String,
}

/// PUT /api/tenants/:id/onboarding - Complete an onboarding step.
///
/// Steps are ordered; completing the pending step advances the wizard,
/// repeating a finished step is a no-op, and skipping ahead is rejected.
pub async fn onboarding_complete(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteStepRequest>,
) -> ApiResult<Value> {
    let step = OnboardingStep::parse(&payload.step)
        .filter(|step| *step != OnboardingStep::Done)
        .ok_or_else(|| ApiError::field_error("step", format!("Unknown step '{}'", payload.step)))?;

    let tenants = TenantService::new().await?;
    require_role(&tenants, id, auth_user.user_id, false).await?;

    let tenant = tenants.complete_onboarding_step(id, step).await?;

    // Mirror progress into the caller's session when this tenant is selected
    if let Some(store) = cache::try_store().await {
        let sessions = SessionStore::new(store);
        match sessions.read(auth_user.user_id).await {
            Ok(Some(mut state)) if state.tenant_id == Some(tenant.id) => {
                state.onboarding_step = Some(tenant.onboarding_step.clone());
                if let Err(e) = sessions.write(&state).await {
                    tracing::warn!("Failed to update session for {}: {}", auth_user.user_id, e);
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Failed to read session for {}: {}", auth_user.user_id, e),
        }
    }

    Ok(ApiResponse::success(onboarding_payload(&tenant)))
}
