use serde::Serialize;
use sqlx::PgPool;

use crate::chart::{parent_code, AccountKind, CatalogAccount};
use crate::database::models::Account;
use crate::error::ApiError;
use crate::services::Page;
use crate::validate;

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Account already exists: {0}")]
    AlreadyExists(String),
    #[error("Account not found: {0}")]
    NotFound(String),
    #[error("Invalid account code: {0}")]
    InvalidCode(String),
    #[error("Invalid account kind: {0}")]
    InvalidKind(String),
    #[error("Parent account {parent} does not exist for {code}")]
    MissingParent { code: String, parent: String },
    #[error("Account {0} is part of the standard chart and cannot be deleted")]
    SystemAccount(String),
    #[error("Account {0} has opening balance lines and cannot be deleted")]
    AccountInUse(String),
}

impl From<ChartError> for ApiError {
    fn from(err: ChartError) -> Self {
        match err {
            ChartError::AlreadyExists(code) => {
                ApiError::conflict(format!("Account '{}' already exists", code))
            }
            ChartError::NotFound(code) => ApiError::not_found(format!("Account '{}' not found", code)),
            ChartError::InvalidCode(msg) => ApiError::field_error("code", msg),
            ChartError::InvalidKind(kind) => {
                ApiError::field_error("kind", format!("Unknown account kind '{}'", kind))
            }
            ChartError::MissingParent { code, parent } => ApiError::field_error(
                "code",
                format!("Parent account '{}' must exist before '{}'", parent, code),
            ),
            ChartError::SystemAccount(code) => ApiError::conflict(format!(
                "Account '{}' is part of the standard chart and cannot be deleted",
                code
            )),
            ChartError::AccountInUse(code) => ApiError::conflict(format!(
                "Account '{}' is referenced by opening balance lines",
                code
            )),
            ChartError::Database(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub code: String,
    pub name: String,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
}

const ACCOUNT_COLUMNS: &str = "id, code, name, kind, parent_code, is_system, \
                               created_at, updated_at, trashed_at, deleted_at";

/// Chart-of-accounts operations against one tenant's business database
pub struct ChartService {
    pool: PgPool,
}

impl ChartService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Live accounts, ordered by code. `search` matches a code prefix or a
    /// name fragment.
    pub async fn list(&self, search: Option<&str>, page: Page) -> Result<Vec<Account>, ChartError> {
        let accounts = match search {
            Some(term) => {
                sqlx::query_as::<_, Account>(&format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts \
                     WHERE trashed_at IS NULL AND deleted_at IS NULL \
                       AND (code LIKE $1 OR name ILIKE $2) \
                     ORDER BY code \
                     LIMIT $3 OFFSET $4"
                ))
                .bind(format!("{}%", term))
                .bind(format!("%{}%", term))
                .bind(page.limit)
                .bind(page.offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Account>(&format!(
                    "SELECT {ACCOUNT_COLUMNS} FROM accounts \
                     WHERE trashed_at IS NULL AND deleted_at IS NULL \
                     ORDER BY code \
                     LIMIT $1 OFFSET $2"
                ))
                .bind(page.limit)
                .bind(page.offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(accounts)
    }

    pub async fn get_by_code(&self, code: &str) -> Result<Option<Account>, ChartError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE code = $1 AND deleted_at IS NULL"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn create(&self, input: NewAccount) -> Result<Account, ChartError> {
        validate::account_code(&input.code).map_err(ChartError::InvalidCode)?;

        let kind = match &input.kind {
            Some(s) => AccountKind::parse(s).ok_or_else(|| ChartError::InvalidKind(s.clone()))?,
            None => AccountKind::from_code(&input.code)
                .ok_or_else(|| ChartError::InvalidCode(input.code.clone()))?,
        };

        if self.get_by_code(&input.code).await?.is_some() {
            return Err(ChartError::AlreadyExists(input.code));
        }

        // Sub-accounts must attach to an existing parent
        let parent = parent_code(&input.code).map(str::to_string);
        if let Some(ref parent) = parent {
            if self.get_by_code(parent).await?.is_none() {
                return Err(ChartError::MissingParent {
                    code: input.code,
                    parent: parent.clone(),
                });
            }
        }

        let account = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (code, name, kind, parent_code, is_system) \
             VALUES ($1, $2, $3, $4, false) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(&input.code)
        .bind(&input.name)
        .bind(kind.as_str())
        .bind(&parent)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }

    /// Rename an account. Standard-catalog rows accept a name change only;
    /// custom rows may also change kind.
    pub async fn update(
        &self,
        code: &str,
        name: Option<&str>,
        kind: Option<&str>,
    ) -> Result<Account, ChartError> {
        let account = self
            .get_by_code(code)
            .await?
            .ok_or_else(|| ChartError::NotFound(code.to_string()))?;

        let kind = match kind {
            Some(s) if account.is_system => {
                // Kind of a standard account is fixed by the circular
                if s != account.kind {
                    return Err(ChartError::InvalidKind(s.to_string()));
                }
                None
            }
            Some(s) => {
                AccountKind::parse(s).ok_or_else(|| ChartError::InvalidKind(s.to_string()))?;
                Some(s.to_string())
            }
            None => None,
        };

        let updated = sqlx::query_as::<_, Account>(&format!(
            "UPDATE accounts SET \
                name = COALESCE($2, name), \
                kind = COALESCE($3, kind), \
                updated_at = now() \
             WHERE code = $1 AND deleted_at IS NULL \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(code)
        .bind(name)
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| ChartError::NotFound(code.to_string()))
    }

    pub async fn soft_delete(&self, code: &str) -> Result<Account, ChartError> {
        let account = self
            .get_by_code(code)
            .await?
            .ok_or_else(|| ChartError::NotFound(code.to_string()))?;

        if account.is_system {
            return Err(ChartError::SystemAccount(code.to_string()));
        }

        let referenced: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM opening_balance_lines WHERE account_code = $1",
        )
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        if referenced.0 > 0 {
            return Err(ChartError::AccountInUse(code.to_string()));
        }

        let trashed = sqlx::query_as::<_, Account>(&format!(
            "UPDATE accounts SET trashed_at = now(), updated_at = now() \
             WHERE code = $1 AND trashed_at IS NULL AND deleted_at IS NULL \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        trashed.ok_or_else(|| ChartError::NotFound(code.to_string()))
    }

    pub async fn restore(&self, code: &str) -> Result<Account, ChartError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "UPDATE accounts SET trashed_at = NULL, updated_at = now() \
             WHERE code = $1 AND trashed_at IS NOT NULL AND deleted_at IS NULL \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        account.ok_or_else(|| ChartError::NotFound(code.to_string()))
    }

    /// Import a catalog in one transaction, skipping codes that already
    /// exist so re-import is idempotent. Entries are inserted in code order
    /// so parents land before their sub-accounts.
    pub async fn import_catalog(
        &self,
        catalog: &[CatalogAccount],
    ) -> Result<ImportSummary, ChartError> {
        let mut entries = Vec::with_capacity(catalog.len());
        for entry in catalog {
            validate::account_code(&entry.code).map_err(ChartError::InvalidCode)?;
            let kind = entry
                .resolved_kind()
                .ok_or_else(|| ChartError::InvalidCode(entry.code.clone()))?;
            entries.push((entry, kind));
        }
        entries.sort_by(|a, b| a.0.code.cmp(&b.0.code));

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0usize;
        let mut skipped = 0usize;

        for (entry, kind) in entries {
            let result = sqlx::query(
                "INSERT INTO accounts (code, name, kind, parent_code, is_system) \
                 VALUES ($1, $2, $3, $4, true) \
                 ON CONFLICT (code) DO NOTHING",
            )
            .bind(&entry.code)
            .bind(&entry.name)
            .bind(kind.as_str())
            .bind(parent_code(&entry.code))
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                inserted += 1;
            } else {
                skipped += 1;
            }
        }

        tx.commit().await?;

        tracing::info!("Imported chart catalog: {} inserted, {} skipped", inserted, skipped);
        Ok(ImportSummary { inserted, skipped })
    }
}
