use axum::{
    extract::Path,
    response::Json,
    Extension,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::{OpeningBalanceLine, OpeningBalancePeriod};
use crate::middleware::{ApiResponse, ApiResult, TenantDb};
use crate::services::{LineWithAccount, OpeningBalanceService};

/// GET /api/data/opening-balances - All periods, newest fiscal year first
pub async fn period_list(
    Extension(TenantDb(pool)): Extension<TenantDb>,
) -> ApiResult<Vec<OpeningBalancePeriod>> {
    let service = OpeningBalanceService::new(pool);
    Ok(ApiResponse::success(service.list_periods().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreatePeriodRequest {
    pub fiscal_year: i32,
    pub start_date: NaiveDate,
}

/// POST /api/data/opening-balances - Open a draft period. 409 when a draft
/// already exists.
pub async fn period_create(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Json(payload): Json<CreatePeriodRequest>,
) -> ApiResult<OpeningBalancePeriod> {
    let service = OpeningBalanceService::new(pool);
    let period = service
        .create_period(payload.fiscal_year, payload.start_date)
        .await?;

    Ok(ApiResponse::created(period))
}

/// GET /api/data/opening-balances/:id - Period with its running totals
pub async fn period_show(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    let service = OpeningBalanceService::new(pool);
    let period = service.get_period(id).await?;
    let totals = service.totals(id).await?;

    Ok(ApiResponse::success(json!({
        "period": period,
        "totals": totals,
        "balanced": totals.balanced(),
    })))
}

/// POST /api/data/opening-balances/:id/lock - Lock a balanced draft period.
/// Terminal: a locked period accepts no further line changes.
pub async fn period_lock(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(id): Path<Uuid>,
) -> ApiResult<OpeningBalancePeriod> {
    let service = OpeningBalanceService::new(pool);
    let period = service.lock_period(id).await?;

    tracing::info!("Opening balance period {} locked", id);
    Ok(ApiResponse::success(period))
}

/// GET /api/data/opening-balances/:id/lines - Lines with account names
pub async fn line_list(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<LineWithAccount>> {
    let service = OpeningBalanceService::new(pool);
    Ok(ApiResponse::success(service.list_lines(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpsertLineRequest {
    pub account_code: String,
    #[serde(default)]
    pub debit: Decimal,
    #[serde(default)]
    pub credit: Decimal,
}

/// PUT /api/data/opening-balances/:id/lines - Post one account's opening
/// balance. Reposting the same account replaces its line.
pub async fn line_upsert(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpsertLineRequest>,
) -> ApiResult<OpeningBalanceLine> {
    let service = OpeningBalanceService::new(pool);
    let line = service
        .upsert_line(id, &payload.account_code, payload.debit, payload.credit)
        .await?;

    Ok(ApiResponse::success(line))
}

/// DELETE /api/data/opening-balances/:id/lines/:code
pub async fn line_delete(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path((id, code)): Path<(Uuid, String)>,
) -> ApiResult<()> {
    let service = OpeningBalanceService::new(pool);
    service.delete_line(id, &code).await?;

    Ok(ApiResponse::no_content())
}
