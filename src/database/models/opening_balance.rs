use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An opening-balance entry period. At most one `draft` period exists per
/// tenant; locking is terminal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OpeningBalancePeriod {
    pub id: Uuid,
    pub fiscal_year: i32,
    pub start_date: NaiveDate,
    pub status: String,
    pub locked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OpeningBalancePeriod {
    pub const STATUS_DRAFT: &'static str = "draft";
    pub const STATUS_LOCKED: &'static str = "locked";

    pub fn is_locked(&self) -> bool {
        self.status == Self::STATUS_LOCKED
    }
}

/// One account's opening balance within a period. Exactly one of
/// debit/credit is non-zero; a repost for the same account replaces the row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OpeningBalanceLine {
    pub id: Uuid,
    pub period_id: Uuid,
    pub account_code: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
