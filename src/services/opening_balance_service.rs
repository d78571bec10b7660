use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::models::{OpeningBalanceLine, OpeningBalancePeriod};
use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Opening balance period not found")]
    PeriodNotFound,
    #[error("A draft opening balance period already exists")]
    DraftExists,
    #[error("Period is locked and cannot be changed")]
    PeriodLocked,
    #[error("Account not found: {0}")]
    AccountNotFound(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Line not found for account {0}")]
    LineNotFound(String),
    #[error("Period does not balance: debit {debit} vs credit {credit}")]
    Unbalanced { debit: Decimal, credit: Decimal },
}

impl From<BalanceError> for ApiError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::PeriodNotFound => ApiError::not_found("Opening balance period not found"),
            BalanceError::DraftExists => {
                ApiError::conflict("A draft opening balance period already exists")
            }
            BalanceError::PeriodLocked => {
                ApiError::conflict("Period is locked and cannot be changed")
            }
            BalanceError::AccountNotFound(code) => {
                ApiError::field_error("account_code", format!("Account '{}' not found", code))
            }
            BalanceError::InvalidAmount(msg) => ApiError::validation_error(msg, None),
            BalanceError::LineNotFound(code) => {
                ApiError::not_found(format!("No opening balance line for account '{}'", code))
            }
            BalanceError::Unbalanced { debit, credit } => ApiError::conflict(format!(
                "Total debit {} does not equal total credit {}",
                debit, credit
            )),
            BalanceError::Database(e) => e.into(),
        }
    }
}

/// A balance line joined with its account name for listings
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LineWithAccount {
    pub id: Uuid,
    pub period_id: Uuid,
    pub account_code: String,
    pub account_name: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodTotals {
    pub debit: Decimal,
    pub credit: Decimal,
}

impl PeriodTotals {
    pub fn balanced(&self) -> bool {
        self.debit == self.credit
    }
}

const PERIOD_COLUMNS: &str =
    "id, fiscal_year, start_date, status, locked_at, created_at, updated_at";
const LINE_COLUMNS: &str =
    "id, period_id, account_code, debit, credit, created_at, updated_at";

/// Opening-balance entry against one tenant's business database
pub struct OpeningBalanceService {
    pool: PgPool,
}

impl OpeningBalanceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a draft period. Only one draft may exist at a time.
    pub async fn create_period(
        &self,
        fiscal_year: i32,
        start_date: NaiveDate,
    ) -> Result<OpeningBalancePeriod, BalanceError> {
        let drafts: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM opening_balance_periods WHERE status = $1")
                .bind(OpeningBalancePeriod::STATUS_DRAFT)
                .fetch_one(&self.pool)
                .await?;

        if drafts.0 > 0 {
            return Err(BalanceError::DraftExists);
        }

        let period = sqlx::query_as::<_, OpeningBalancePeriod>(&format!(
            "INSERT INTO opening_balance_periods (fiscal_year, start_date, status) \
             VALUES ($1, $2, $3) \
             RETURNING {PERIOD_COLUMNS}"
        ))
        .bind(fiscal_year)
        .bind(start_date)
        .bind(OpeningBalancePeriod::STATUS_DRAFT)
        .fetch_one(&self.pool)
        .await?;

        Ok(period)
    }

    pub async fn list_periods(&self) -> Result<Vec<OpeningBalancePeriod>, BalanceError> {
        let periods = sqlx::query_as::<_, OpeningBalancePeriod>(&format!(
            "SELECT {PERIOD_COLUMNS} FROM opening_balance_periods ORDER BY fiscal_year DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(periods)
    }

    pub async fn get_period(&self, id: Uuid) -> Result<OpeningBalancePeriod, BalanceError> {
        let period = sqlx::query_as::<_, OpeningBalancePeriod>(&format!(
            "SELECT {PERIOD_COLUMNS} FROM opening_balance_periods WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        period.ok_or(BalanceError::PeriodNotFound)
    }

    /// Validate a debit/credit pair: non-negative, exactly one side non-zero
    fn check_amounts(debit: Decimal, credit: Decimal) -> Result<(), BalanceError> {
        if debit.is_sign_negative() || credit.is_sign_negative() {
            return Err(BalanceError::InvalidAmount(
                "Amounts cannot be negative".to_string(),
            ));
        }
        if !debit.is_zero() && !credit.is_zero() {
            return Err(BalanceError::InvalidAmount(
                "A line cannot carry both a debit and a credit amount".to_string(),
            ));
        }
        if debit.is_zero() && credit.is_zero() {
            return Err(BalanceError::InvalidAmount(
                "A line must carry a debit or a credit amount".to_string(),
            ));
        }
        Ok(())
    }

    /// Insert or replace the line for an account within a draft period
    pub async fn upsert_line(
        &self,
        period_id: Uuid,
        account_code: &str,
        debit: Decimal,
        credit: Decimal,
    ) -> Result<OpeningBalanceLine, BalanceError> {
        Self::check_amounts(debit, credit)?;

        let period = self.get_period(period_id).await?;
        if period.is_locked() {
            return Err(BalanceError::PeriodLocked);
        }

        let account: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM accounts \
             WHERE code = $1 AND trashed_at IS NULL AND deleted_at IS NULL",
        )
        .bind(account_code)
        .fetch_one(&self.pool)
        .await?;

        if account.0 == 0 {
            return Err(BalanceError::AccountNotFound(account_code.to_string()));
        }

        let line = sqlx::query_as::<_, OpeningBalanceLine>(&format!(
            "INSERT INTO opening_balance_lines (period_id, account_code, debit, credit) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (period_id, account_code) \
             DO UPDATE SET debit = EXCLUDED.debit, credit = EXCLUDED.credit, updated_at = now() \
             RETURNING {LINE_COLUMNS}"
        ))
        .bind(period_id)
        .bind(account_code)
        .bind(debit)
        .bind(credit)
        .fetch_one(&self.pool)
        .await?;

        Ok(line)
    }

    pub async fn delete_line(&self, period_id: Uuid, account_code: &str) -> Result<(), BalanceError> {
        let period = self.get_period(period_id).await?;
        if period.is_locked() {
            return Err(BalanceError::PeriodLocked);
        }

        let result = sqlx::query(
            "DELETE FROM opening_balance_lines WHERE period_id = $1 AND account_code = $2",
        )
        .bind(period_id)
        .bind(account_code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(BalanceError::LineNotFound(account_code.to_string()));
        }

        Ok(())
    }

    pub async fn list_lines(&self, period_id: Uuid) -> Result<Vec<LineWithAccount>, BalanceError> {
        // Ensure a 404 for an unknown period rather than an empty list
        self.get_period(period_id).await?;

        let lines = sqlx::query_as::<_, LineWithAccount>(
            "SELECT l.id, l.period_id, l.account_code, a.name AS account_name, \
                    l.debit, l.credit, l.updated_at \
             FROM opening_balance_lines l \
             JOIN accounts a ON a.code = l.account_code \
             WHERE l.period_id = $1 \
             ORDER BY l.account_code",
        )
        .bind(period_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    pub async fn totals(&self, period_id: Uuid) -> Result<PeriodTotals, BalanceError> {
        self.get_period(period_id).await?;

        let (debit, credit): (Option<Decimal>, Option<Decimal>) = sqlx::query_as(
            "SELECT SUM(debit), SUM(credit) FROM opening_balance_lines WHERE period_id = $1",
        )
        .bind(period_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(PeriodTotals {
            debit: debit.unwrap_or_default(),
            credit: credit.unwrap_or_default(),
        })
    }

    /// Lock a balanced draft period. Locking is terminal: no line on a
    /// locked period can be changed or removed.
    pub async fn lock_period(&self, period_id: Uuid) -> Result<OpeningBalancePeriod, BalanceError> {
        let period = self.get_period(period_id).await?;
        if period.is_locked() {
            return Err(BalanceError::PeriodLocked);
        }

        let totals = self.totals(period_id).await?;
        if !totals.balanced() {
            return Err(BalanceError::Unbalanced {
                debit: totals.debit,
                credit: totals.credit,
            });
        }

        let locked = sqlx::query_as::<_, OpeningBalancePeriod>(&format!(
            "UPDATE opening_balance_periods \
             SET status = $2, locked_at = now(), updated_at = now() \
             WHERE id = $1 AND status = $3 \
             RETURNING {PERIOD_COLUMNS}"
        ))
        .bind(period_id)
        .bind(OpeningBalancePeriod::STATUS_LOCKED)
        .bind(OpeningBalancePeriod::STATUS_DRAFT)
        .fetch_optional(&self.pool)
        .await?;

        locked.ok_or(BalanceError::PeriodLocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn amounts_require_exactly_one_side() {
        assert!(OpeningBalanceService::check_amounts(dec("100"), dec("0")).is_ok());
        assert!(OpeningBalanceService::check_amounts(dec("0"), dec("250.50")).is_ok());
        assert!(OpeningBalanceService::check_amounts(dec("1"), dec("1")).is_err());
        assert!(OpeningBalanceService::check_amounts(dec("0"), dec("0")).is_err());
        assert!(OpeningBalanceService::check_amounts(dec("-5"), dec("0")).is_err());
    }

    #[test]
    fn totals_balance_check() {
        let balanced = PeriodTotals { debit: dec("1000.00"), credit: dec("1000.00") };
        let unbalanced = PeriodTotals { debit: dec("1000.00"), credit: dec("999.99") };
        assert!(balanced.balanced());
        assert!(!unbalanced.balanced());
    }
}
