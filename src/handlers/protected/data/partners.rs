use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::Partner;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, TenantDb};
use crate::services::{NewPartner, Page, PartnerService, UpdatePartner};

#[derive(Debug, Deserialize)]
pub struct ListPartnersQuery {
    pub search: Option<String>,
    /// Filter to customers or suppliers; partners marked `both` match either
    pub kind: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/data/partners
pub async fn partner_list(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Query(query): Query<ListPartnersQuery>,
) -> ApiResult<Vec<Partner>> {
    let service = PartnerService::new(pool);
    let partners = service
        .list(
            query.search.as_deref(),
            query.kind.as_deref(),
            Page::new(query.limit, query.offset),
        )
        .await?;

    Ok(ApiResponse::success(partners))
}

/// GET /api/data/partners/:id
pub async fn partner_get(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(id): Path<Uuid>,
) -> ApiResult<Partner> {
    let service = PartnerService::new(pool);
    let partner = service
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Partner not found"))?;

    Ok(ApiResponse::success(partner))
}

#[derive(Debug, Deserialize)]
pub struct CreatePartnerRequest {
    pub code: String,
    pub name: String,
    pub kind: String,
    pub tax_code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// POST /api/data/partners
pub async fn partner_create(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Json(payload): Json<CreatePartnerRequest>,
) -> ApiResult<Partner> {
    let service = PartnerService::new(pool);
    let partner = service
        .create(NewPartner {
            code: payload.code,
            name: payload.name,
            kind: payload.kind,
            tax_code: payload.tax_code,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
        })
        .await?;

    Ok(ApiResponse::created(partner))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePartnerRequest {
    /// Present only to reject attempts to change it
    pub code: Option<String>,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub tax_code: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// PATCH /api/data/partners/:id - Codes are immutable after creation
pub async fn partner_update(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePartnerRequest>,
) -> ApiResult<Partner> {
    if payload.code.is_some() {
        return Err(ApiError::field_error("code", "Partner code cannot be changed"));
    }

    let service = PartnerService::new(pool);
    let partner = service
        .update(
            id,
            UpdatePartner {
                name: payload.name,
                kind: payload.kind,
                tax_code: payload.tax_code,
                email: payload.email,
                phone: payload.phone,
                address: payload.address,
            },
        )
        .await?;

    Ok(ApiResponse::success(partner))
}

/// DELETE /api/data/partners/:id
pub async fn partner_delete(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let service = PartnerService::new(pool);
    service.soft_delete(id).await?;

    Ok(ApiResponse::no_content())
}

/// POST /api/data/partners/:id/restore
pub async fn partner_restore(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(id): Path<Uuid>,
) -> ApiResult<Partner> {
    let service = PartnerService::new(pool);
    Ok(ApiResponse::success(service.restore(id).await?))
}
