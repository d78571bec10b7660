use std::time::Duration;

use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use serde::Deserialize;

use crate::cache::{self, TenantCache};
use crate::chart;
use crate::config;
use crate::database::models::Account;
use crate::error::ApiError;
use crate::middleware::{ActiveTenant, ApiResponse, ApiResult, TenantDb};
use crate::services::{ChartService, ImportSummary, NewAccount, Page};

const ACCOUNTS_CACHE_KEY: &str = "accounts:all";

#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

async fn tenant_cache(tenant: &ActiveTenant) -> Option<TenantCache> {
    cache::try_store()
        .await
        .map(|store| TenantCache::new(store, tenant.id))
}

/// GET /api/data/accounts - Chart of accounts, ordered by code. The
/// unfiltered first page is served from the tenant cache when possible.
pub async fn account_list(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Extension(tenant): Extension<ActiveTenant>,
    Query(query): Query<ListAccountsQuery>,
) -> ApiResult<Vec<Account>> {
    let unfiltered = query.search.is_none() && query.limit.is_none() && query.offset.is_none();

    if unfiltered {
        if let Some(cache) = tenant_cache(&tenant).await {
            match cache.get(ACCOUNTS_CACHE_KEY).await {
                Ok(Some(cached)) => {
                    if let Ok(accounts) = serde_json::from_str::<Vec<Account>>(&cached) {
                        return Ok(ApiResponse::success(accounts));
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("Account cache read failed: {}", e),
            }
        }
    }

    let service = ChartService::new(pool);
    let accounts = service
        .list(query.search.as_deref(), Page::new(query.limit, query.offset))
        .await?;

    if unfiltered {
        if let Some(cache) = tenant_cache(&tenant).await {
            let ttl = Duration::from_secs(config::config().cache.default_ttl_secs);
            if let Ok(payload) = serde_json::to_string(&accounts) {
                if let Err(e) = cache.set(ACCOUNTS_CACHE_KEY, &payload, Some(ttl)).await {
                    tracing::warn!("Account cache write failed: {}", e);
                }
            }
        }
    }

    Ok(ApiResponse::success(accounts))
}

/// GET /api/data/accounts/:code
pub async fn account_get(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(code): Path<String>,
) -> ApiResult<Account> {
    let service = ChartService::new(pool);
    let account = service
        .get_by_code(&code)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Account '{}' not found", code)))?;

    Ok(ApiResponse::success(account))
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub code: String,
    pub name: String,
    pub kind: Option<String>,
}

/// POST /api/data/accounts - Add a custom account under an existing parent
pub async fn account_create(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Extension(tenant): Extension<ActiveTenant>,
    Json(payload): Json<CreateAccountRequest>,
) -> ApiResult<Account> {
    let service = ChartService::new(pool);
    let account = service
        .create(NewAccount {
            code: payload.code,
            name: payload.name,
            kind: payload.kind,
        })
        .await?;

    invalidate_accounts(&tenant).await;
    Ok(ApiResponse::created(account))
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    pub kind: Option<String>,
}

/// PATCH /api/data/accounts/:code - Rename; custom accounts may change kind
pub async fn account_update(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Extension(tenant): Extension<ActiveTenant>,
    Path(code): Path<String>,
    Json(payload): Json<UpdateAccountRequest>,
) -> ApiResult<Account> {
    let service = ChartService::new(pool);
    let account = service
        .update(&code, payload.name.as_deref(), payload.kind.as_deref())
        .await?;

    invalidate_accounts(&tenant).await;
    Ok(ApiResponse::success(account))
}

/// DELETE /api/data/accounts/:code - Soft delete a custom, unreferenced account
pub async fn account_delete(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Extension(tenant): Extension<ActiveTenant>,
    Path(code): Path<String>,
) -> ApiResult<()> {
    let service = ChartService::new(pool);
    service.soft_delete(&code).await?;

    invalidate_accounts(&tenant).await;
    Ok(ApiResponse::no_content())
}

/// POST /api/data/accounts/:code/restore
pub async fn account_restore(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Extension(tenant): Extension<ActiveTenant>,
    Path(code): Path<String>,
) -> ApiResult<Account> {
    let service = ChartService::new(pool);
    let account = service.restore(&code).await?;

    invalidate_accounts(&tenant).await;
    Ok(ApiResponse::success(account))
}

/// POST /api/data/accounts/import - Seed the standard TT-133 catalog.
/// Idempotent: codes that already exist are skipped.
pub async fn account_import(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Extension(tenant): Extension<ActiveTenant>,
) -> ApiResult<ImportSummary> {
    let service = ChartService::new(pool);
    let summary = service.import_catalog(&chart::builtin_catalog()).await?;

    // Bulk change: drop every cached value for the tenant
    if let Some(cache) = tenant_cache(&tenant).await {
        if let Err(e) = cache.invalidate_all().await {
            tracing::warn!("Tenant cache invalidation failed: {}", e);
        }
    }

    Ok(ApiResponse::success(summary))
}

async fn invalidate_accounts(tenant: &ActiveTenant) {
    if let Some(cache) = tenant_cache(tenant).await {
        if let Err(e) = cache.delete(ACCOUNTS_CACHE_KEY).await {
            tracing::warn!("Account cache invalidation failed: {}", e);
        }
    }
}
