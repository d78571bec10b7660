use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{OnboardingStep, Tenant, TenantMember};
use crate::error::ApiError;
use crate::validate;

#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error("Tenant already exists: {0}")]
    AlreadyExists(String),
    #[error("Tenant not found")]
    NotFound,
    #[error("Invalid tenant name: {0}")]
    InvalidName(String),
    #[error("Invalid tax code: {0}")]
    InvalidTaxCode(String),
    #[error("User is not a member of this tenant")]
    NotMember,
    #[error("Onboarding step '{requested}' cannot be completed while '{pending}' is pending")]
    StepOutOfOrder { requested: String, pending: String },
}

impl From<TenantError> for ApiError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::AlreadyExists(slug) => {
                ApiError::conflict(format!("Tenant '{}' already exists", slug))
            }
            TenantError::NotFound => ApiError::not_found("Tenant not found"),
            TenantError::InvalidName(msg) => ApiError::field_error("slug", msg),
            TenantError::InvalidTaxCode(msg) => ApiError::field_error("tax_code", msg),
            TenantError::NotMember => ApiError::forbidden("You are not a member of this tenant"),
            TenantError::StepOutOfOrder { requested, pending } => ApiError::conflict(format!(
                "Cannot complete step '{}' while '{}' is pending",
                requested, pending
            )),
            TenantError::DatabaseManager(e) => e.into(),
            TenantError::Database(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateTenant {
    pub slug: String,
    pub name: String,
    pub tax_code: String,
    pub business_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub business_type: Option<String>,
}

const TENANT_COLUMNS: &str = "id, slug, name, tax_code, business_type, database, \
                              onboarding_step, is_active, created_at, updated_at, \
                              trashed_at, deleted_at";

/// Tenant registry management and database provisioning
pub struct TenantService {
    main_pool: PgPool,
}

impl TenantService {
    pub async fn new() -> Result<Self, TenantError> {
        Ok(Self {
            main_pool: DatabaseManager::main_pool().await?,
        })
    }

    pub fn with_pool(main_pool: PgPool) -> Self {
        Self { main_pool }
    }

    /// Create a new tenant: validate, provision the business database from
    /// the template, register it, and record the creator as owner.
    pub async fn create_tenant(
        &self,
        owner_id: Uuid,
        input: CreateTenant,
    ) -> Result<Tenant, TenantError> {
        validate::tenant_slug(&input.slug).map_err(TenantError::InvalidName)?;
        validate::tax_code(&input.tax_code).map_err(TenantError::InvalidTaxCode)?;

        // (a) Hash tenant slug to database name
        let tenant_db = Self::database_name_for(&input.slug);
        let template_db = config::config().database.template_db_name.clone();

        if self.slug_taken(&input.slug).await? {
            return Err(TenantError::AlreadyExists(input.slug));
        }

        // (b) Clone template database to new tenant database
        DatabaseManager::clone_database(&template_db, &tenant_db).await?;

        // (c) Insert registry row + owner membership
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "INSERT INTO tenants (slug, name, tax_code, business_type, database, onboarding_step) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {TENANT_COLUMNS}"
        ))
        .bind(&input.slug)
        .bind(&input.name)
        .bind(&input.tax_code)
        .bind(&input.business_type)
        .bind(&tenant_db)
        .bind(OnboardingStep::BusinessProfile.as_str())
        .fetch_one(&self.main_pool)
        .await?;

        sqlx::query("INSERT INTO tenant_members (tenant_id, user_id, role) VALUES ($1, $2, 'owner')")
            .bind(tenant.id)
            .bind(owner_id)
            .execute(&self.main_pool)
            .await?;

        tracing::info!(
            "Provisioned tenant {} ({}) into database {}",
            tenant.slug,
            tenant.id,
            tenant.database
        );

        Ok(tenant)
    }

    /// Hash tenant slug to a consistent database name
    fn database_name_for(slug: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(slug.as_bytes());
        let hash = format!("{:x}", hasher.finalize());

        // First 16 characters keep the name well under Postgres limits
        format!("tenant_{}", &hash[..16])
    }

    async fn slug_taken(&self, slug: &str) -> Result<bool, TenantError> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tenants WHERE slug = $1 AND deleted_at IS NULL")
                .bind(slug)
                .fetch_one(&self.main_pool)
                .await?;

        Ok(count.0 > 0)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Tenant>, TenantError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.main_pool)
        .await?;

        Ok(tenant)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Tenant>, TenantError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE slug = $1 AND deleted_at IS NULL"
        ))
        .bind(slug)
        .fetch_optional(&self.main_pool)
        .await?;

        Ok(tenant)
    }

    /// Tenant by id, only if live (not trashed, not deleted, active)
    pub async fn get_active(&self, id: Uuid) -> Result<Option<Tenant>, TenantError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants \
             WHERE id = $1 AND is_active = true AND trashed_at IS NULL AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.main_pool)
        .await?;

        Ok(tenant)
    }

    /// Tenants the user belongs to, most recently created first
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Tenant>, TenantError> {
        let tenants = sqlx::query_as::<_, Tenant>(
            "SELECT t.id, t.slug, t.name, t.tax_code, t.business_type, t.database, \
                    t.onboarding_step, t.is_active, t.created_at, t.updated_at, \
                    t.trashed_at, t.deleted_at \
             FROM tenants t \
             JOIN tenant_members m ON m.tenant_id = t.id \
             WHERE m.user_id = $1 AND t.trashed_at IS NULL AND t.deleted_at IS NULL \
             ORDER BY t.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.main_pool)
        .await?;

        Ok(tenants)
    }

    /// The user's role in the tenant, if any
    pub async fn membership_role(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<String>, TenantError> {
        let member = sqlx::query_as::<_, TenantMember>(
            "SELECT tenant_id, user_id, role, created_at \
             FROM tenant_members WHERE tenant_id = $1 AND user_id = $2",
        )
        .bind(tenant_id)
        .bind(user_id)
        .fetch_optional(&self.main_pool)
        .await?;

        Ok(member.map(|m| m.role))
    }

    /// The user's role, or `NotMember`
    pub async fn require_member(&self, tenant_id: Uuid, user_id: Uuid) -> Result<String, TenantError> {
        self.membership_role(tenant_id, user_id)
            .await?
            .ok_or(TenantError::NotMember)
    }

    pub async fn update(&self, id: Uuid, input: UpdateTenant) -> Result<Tenant, TenantError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "UPDATE tenants SET \
                name = COALESCE($2, name), \
                business_type = COALESCE($3, business_type), \
                updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {TENANT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.business_type)
        .fetch_optional(&self.main_pool)
        .await?;

        tenant.ok_or(TenantError::NotFound)
    }

    /// Soft delete: the tenant disappears from listings and selection; the
    /// business database is kept.
    pub async fn soft_delete(&self, id: Uuid) -> Result<Tenant, TenantError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "UPDATE tenants SET trashed_at = now(), updated_at = now() \
             WHERE id = $1 AND trashed_at IS NULL AND deleted_at IS NULL \
             RETURNING {TENANT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.main_pool)
        .await?;

        tenant.ok_or(TenantError::NotFound)
    }

    pub async fn restore(&self, id: Uuid) -> Result<Tenant, TenantError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "UPDATE tenants SET trashed_at = NULL, updated_at = now() \
             WHERE id = $1 AND trashed_at IS NOT NULL AND deleted_at IS NULL \
             RETURNING {TENANT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.main_pool)
        .await?;

        tenant.ok_or(TenantError::NotFound)
    }

    /// Complete an onboarding step. Steps are strictly ordered: completing
    /// the pending step advances the wizard; completing an earlier step is
    /// an idempotent no-op; completing a later step is rejected.
    pub async fn complete_onboarding_step(
        &self,
        tenant_id: Uuid,
        step: OnboardingStep,
    ) -> Result<Tenant, TenantError> {
        let tenant = self.get(tenant_id).await?.ok_or(TenantError::NotFound)?;
        let pending = tenant.onboarding();

        if step < pending || pending == OnboardingStep::Done {
            // Already completed earlier; repeating is allowed and changes nothing
            return Ok(tenant);
        }

        if step > pending {
            return Err(TenantError::StepOutOfOrder {
                requested: step.as_str().to_string(),
                pending: pending.as_str().to_string(),
            });
        }

        let next = step.next().unwrap_or(OnboardingStep::Done);

        let updated = sqlx::query_as::<_, Tenant>(&format!(
            "UPDATE tenants SET onboarding_step = $2, updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {TENANT_COLUMNS}"
        ))
        .bind(tenant_id)
        .bind(next.as_str())
        .fetch_optional(&self.main_pool)
        .await?;

        updated.ok_or(TenantError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_name_is_stable_and_valid() {
        let a = TenantService::database_name_for("cong-ty-abc");
        let b = TenantService::database_name_for("cong-ty-abc");
        let c = TenantService::database_name_for("cong-ty-xyz");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("tenant_"));
        assert_eq!(a.len(), "tenant_".len() + 16);
        assert!(a.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_'));
    }
}
