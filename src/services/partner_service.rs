use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Partner;
use crate::error::ApiError;
use crate::services::Page;
use crate::validate;

#[derive(Debug, thiserror::Error)]
pub enum PartnerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Partner already exists: {0}")]
    AlreadyExists(String),
    #[error("Partner not found")]
    NotFound,
    #[error("Invalid partner code: {0}")]
    InvalidCode(String),
    #[error("Invalid partner kind: {0}")]
    InvalidKind(String),
    #[error("Invalid tax code: {0}")]
    InvalidTaxCode(String),
}

impl From<PartnerError> for ApiError {
    fn from(err: PartnerError) -> Self {
        match err {
            PartnerError::AlreadyExists(code) => {
                ApiError::conflict(format!("Partner '{}' already exists", code))
            }
            PartnerError::NotFound => ApiError::not_found("Partner not found"),
            PartnerError::InvalidCode(msg) => ApiError::field_error("code", msg),
            PartnerError::InvalidKind(kind) => ApiError::field_error(
                "kind",
                format!("Partner kind must be one of customer, supplier, both (got '{}')", kind),
            ),
            PartnerError::InvalidTaxCode(msg) => ApiError::field_error("tax_code", msg),
            PartnerError::Database(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPartner {
    pub code: String,
    pub name: String,
    pub kind: String,
    pub tax_code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePartner {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub tax_code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

const PARTNER_COLUMNS: &str = "id, code, name, kind, tax_code, email, phone, address, \
                               created_at, updated_at, trashed_at, deleted_at";

/// Customer/supplier directory for one tenant
pub struct PartnerService {
    pool: PgPool,
}

impl PartnerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn check_kind(kind: &str) -> Result<(), PartnerError> {
        if Partner::KINDS.contains(&kind) {
            Ok(())
        } else {
            Err(PartnerError::InvalidKind(kind.to_string()))
        }
    }

    /// Live partners, `search` matches code or name
    pub async fn list(
        &self,
        search: Option<&str>,
        kind: Option<&str>,
        page: Page,
    ) -> Result<Vec<Partner>, PartnerError> {
        if let Some(kind) = kind {
            Self::check_kind(kind)?;
        }

        let pattern = search.map(|s| format!("%{}%", s));

        let partners = sqlx::query_as::<_, Partner>(&format!(
            "SELECT {PARTNER_COLUMNS} FROM partners \
             WHERE trashed_at IS NULL AND deleted_at IS NULL \
               AND ($1::text IS NULL OR code ILIKE $1 OR name ILIKE $1) \
               AND ($2::text IS NULL OR kind = $2 OR kind = 'both') \
             ORDER BY code \
             LIMIT $3 OFFSET $4"
        ))
        .bind(&pattern)
        .bind(kind)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(partners)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Partner>, PartnerError> {
        let partner = sqlx::query_as::<_, Partner>(&format!(
            "SELECT {PARTNER_COLUMNS} FROM partners WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(partner)
    }

    pub async fn create(&self, input: NewPartner) -> Result<Partner, PartnerError> {
        validate::entity_code(&input.code).map_err(PartnerError::InvalidCode)?;
        Self::check_kind(&input.kind)?;
        if let Some(ref tax_code) = input.tax_code {
            validate::tax_code(tax_code).map_err(PartnerError::InvalidTaxCode)?;
        }

        let existing: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM partners WHERE code = $1 AND deleted_at IS NULL")
                .bind(&input.code)
                .fetch_one(&self.pool)
                .await?;

        if existing.0 > 0 {
            return Err(PartnerError::AlreadyExists(input.code));
        }

        let partner = sqlx::query_as::<_, Partner>(&format!(
            "INSERT INTO partners (code, name, kind, tax_code, email, phone, address) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {PARTNER_COLUMNS}"
        ))
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.kind)
        .bind(&input.tax_code)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(partner)
    }

    /// Patch display fields. The code is immutable after creation.
    pub async fn update(&self, id: Uuid, input: UpdatePartner) -> Result<Partner, PartnerError> {
        if let Some(ref kind) = input.kind {
            Self::check_kind(kind)?;
        }
        if let Some(ref tax_code) = input.tax_code {
            validate::tax_code(tax_code).map_err(PartnerError::InvalidTaxCode)?;
        }

        let partner = sqlx::query_as::<_, Partner>(&format!(
            "UPDATE partners SET \
                name = COALESCE($2, name), \
                kind = COALESCE($3, kind), \
                tax_code = COALESCE($4, tax_code), \
                email = COALESCE($5, email), \
                phone = COALESCE($6, phone), \
                address = COALESCE($7, address), \
                updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {PARTNER_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.kind)
        .bind(&input.tax_code)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_optional(&self.pool)
        .await?;

        partner.ok_or(PartnerError::NotFound)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<Partner, PartnerError> {
        let partner = sqlx::query_as::<_, Partner>(&format!(
            "UPDATE partners SET trashed_at = now(), updated_at = now() \
             WHERE id = $1 AND trashed_at IS NULL AND deleted_at IS NULL \
             RETURNING {PARTNER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        partner.ok_or(PartnerError::NotFound)
    }

    pub async fn restore(&self, id: Uuid) -> Result<Partner, PartnerError> {
        let partner = sqlx::query_as::<_, Partner>(&format!(
            "UPDATE partners SET trashed_at = NULL, updated_at = now() \
             WHERE id = $1 AND trashed_at IS NOT NULL AND deleted_at IS NULL \
             RETURNING {PARTNER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        partner.ok_or(PartnerError::NotFound)
    }
}
