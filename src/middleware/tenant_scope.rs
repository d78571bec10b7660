use axum::{extract::Request, middleware::Next, response::Response};
use sqlx::PgPool;
use uuid::Uuid;

use super::auth::AuthUser;
use crate::database::manager::DatabaseManager;
use crate::database::models::Tenant;
use crate::error::ApiError;

/// Tenant database pool, injected for tenant-scoped handlers
#[derive(Clone)]
pub struct TenantDb(pub PgPool);

/// Validated tenant context from the registry
#[derive(Clone, Debug)]
pub struct ActiveTenant {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub database: String,
    pub onboarding_step: String,
    /// The caller's role within this tenant, from the tenant token
    pub role: String,
}

impl ActiveTenant {
    pub fn is_owner(&self) -> bool {
        self.role == "owner"
    }
}

/// Middleware for `/api/data` and other tenant-scoped routes. Requires a
/// tenant token, re-validates the tenant against the registry (it may have
/// been trashed or deactivated since the token was issued), and injects
/// [`ActiveTenant`] plus the tenant's database pool.
pub async fn tenant_scope_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("Authentication required before tenant scoping"))?;

    let (tenant_id, database) = match (auth_user.tenant_id, auth_user.database.as_deref()) {
        (Some(id), Some(db)) => (id, db.to_string()),
        _ => {
            return Err(ApiError::forbidden(
                "No tenant selected: obtain a tenant token via POST /api/tenants/:id/select",
            ))
        }
    };

    let main_pool = DatabaseManager::main_pool().await?;

    let tenant = sqlx::query_as::<_, Tenant>(
        "SELECT id, slug, name, tax_code, business_type, database, onboarding_step, \
                is_active, created_at, updated_at, trashed_at, deleted_at \
         FROM tenants \
         WHERE id = $1 AND is_active = true AND trashed_at IS NULL AND deleted_at IS NULL",
    )
    .bind(tenant_id)
    .fetch_optional(&main_pool)
    .await
    .map_err(|e| {
        tracing::error!("Database error validating tenant: {}", e);
        ApiError::internal_server_error("Failed to validate tenant")
    })?
    .ok_or_else(|| {
        tracing::warn!("Tenant validation failed: tenant {} not found or inactive", tenant_id);
        ApiError::forbidden("Tenant is not active or does not exist")
    })?;

    // The token's database must still match the registry row
    if tenant.database != database {
        tracing::warn!(
            "Tenant token database mismatch for {}: token={}, registry={}",
            tenant_id,
            database,
            tenant.database
        );
        return Err(ApiError::unauthorized("Tenant token is stale, select the tenant again"));
    }

    let tenant_pool = DatabaseManager::tenant_pool(&tenant.database).await.map_err(|e| {
        tracing::error!("Failed to get database pool for tenant '{}': {}", tenant.database, e);
        ApiError::from(e)
    })?;

    tracing::debug!("Tenant scope validated: {} ({})", tenant.slug, tenant.database);

    let active = ActiveTenant {
        id: tenant.id,
        slug: tenant.slug,
        name: tenant.name,
        database: tenant.database,
        onboarding_step: tenant.onboarding_step,
        role: auth_user.role.clone(),
    };

    request.extensions_mut().insert(active);
    request.extensions_mut().insert(TenantDb(tenant_pool));

    Ok(next.run(request).await)
}
