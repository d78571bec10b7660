use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::Product;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, TenantDb};
use crate::services::{NewProduct, Page, ProductService, UpdateProduct};

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/data/products
pub async fn product_list(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Query(query): Query<ListProductsQuery>,
) -> ApiResult<Vec<Product>> {
    let service = ProductService::new(pool);
    let products = service
        .list(query.search.as_deref(), Page::new(query.limit, query.offset))
        .await?;

    Ok(ApiResponse::success(products))
}

/// GET /api/data/products/:id
pub async fn product_get(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(id): Path<Uuid>,
) -> ApiResult<Product> {
    let service = ProductService::new(pool);
    let product = service
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok(ApiResponse::success(product))
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub code: String,
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub sell_price: Decimal,
    #[serde(default)]
    pub cost_price: Decimal,
    #[serde(default)]
    pub track_inventory: bool,
}

/// POST /api/data/products
pub async fn product_create(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Json(payload): Json<CreateProductRequest>,
) -> ApiResult<Product> {
    let service = ProductService::new(pool);
    let product = service
        .create(NewProduct {
            code: payload.code,
            name: payload.name,
            unit: payload.unit,
            sell_price: payload.sell_price,
            cost_price: payload.cost_price,
            track_inventory: payload.track_inventory,
        })
        .await?;

    Ok(ApiResponse::created(product))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    /// Present only to reject attempts to change it
    pub code: Option<String>,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub sell_price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub track_inventory: Option<bool>,
}

/// PATCH /api/data/products/:id - Codes are immutable after creation
pub async fn product_update(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> ApiResult<Product> {
    if payload.code.is_some() {
        return Err(ApiError::field_error("code", "Product code cannot be changed"));
    }

    let service = ProductService::new(pool);
    let product = service
        .update(
            id,
            UpdateProduct {
                name: payload.name,
                unit: payload.unit,
                sell_price: payload.sell_price,
                cost_price: payload.cost_price,
                track_inventory: payload.track_inventory,
            },
        )
        .await?;

    Ok(ApiResponse::success(product))
}

/// DELETE /api/data/products/:id
pub async fn product_delete(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let service = ProductService::new(pool);
    service.soft_delete(id).await?;

    Ok(ApiResponse::no_content())
}

/// POST /api/data/products/:id/restore
pub async fn product_restore(
    Extension(TenantDb(pool)): Extension<TenantDb>,
    Path(id): Path<Uuid>,
) -> ApiResult<Product> {
    let service = ProductService::new(pool);
    Ok(ApiResponse::success(service.restore(id).await?))
}
