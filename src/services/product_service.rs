use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Product;
use crate::error::ApiError;
use crate::services::Page;
use crate::validate;

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Product already exists: {0}")]
    AlreadyExists(String),
    #[error("Product not found")]
    NotFound,
    #[error("Invalid product code: {0}")]
    InvalidCode(String),
    #[error("Invalid price: {0}")]
    InvalidPrice(String),
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::AlreadyExists(code) => {
                ApiError::conflict(format!("Product '{}' already exists", code))
            }
            ProductError::NotFound => ApiError::not_found("Product not found"),
            ProductError::InvalidCode(msg) => ApiError::field_error("code", msg),
            ProductError::InvalidPrice(msg) => ApiError::validation_error(msg, None),
            ProductError::Database(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub unit: String,
    pub sell_price: Decimal,
    pub cost_price: Decimal,
    pub track_inventory: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub sell_price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub track_inventory: Option<bool>,
}

const PRODUCT_COLUMNS: &str = "id, code, name, unit, sell_price, cost_price, track_inventory, \
                               created_at, updated_at, trashed_at, deleted_at";

/// Product/service catalog for one tenant
pub struct ProductService {
    pool: PgPool,
}

impl ProductService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn check_price(label: &str, price: Decimal) -> Result<(), ProductError> {
        if price.is_sign_negative() {
            return Err(ProductError::InvalidPrice(format!(
                "{} cannot be negative",
                label
            )));
        }
        Ok(())
    }

    pub async fn list(&self, search: Option<&str>, page: Page) -> Result<Vec<Product>, ProductError> {
        let pattern = search.map(|s| format!("%{}%", s));

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE trashed_at IS NULL AND deleted_at IS NULL \
               AND ($1::text IS NULL OR code ILIKE $1 OR name ILIKE $1) \
             ORDER BY code \
             LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Product>, ProductError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    pub async fn create(&self, input: NewProduct) -> Result<Product, ProductError> {
        validate::entity_code(&input.code).map_err(ProductError::InvalidCode)?;
        Self::check_price("Selling price", input.sell_price)?;
        Self::check_price("Cost price", input.cost_price)?;

        let existing: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM products WHERE code = $1 AND deleted_at IS NULL")
                .bind(&input.code)
                .fetch_one(&self.pool)
                .await?;

        if existing.0 > 0 {
            return Err(ProductError::AlreadyExists(input.code));
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (code, name, unit, sell_price, cost_price, track_inventory) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.unit)
        .bind(input.sell_price)
        .bind(input.cost_price)
        .bind(input.track_inventory)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Patch display fields and prices. The code is immutable after creation.
    pub async fn update(&self, id: Uuid, input: UpdateProduct) -> Result<Product, ProductError> {
        if let Some(price) = input.sell_price {
            Self::check_price("Selling price", price)?;
        }
        if let Some(price) = input.cost_price {
            Self::check_price("Cost price", price)?;
        }

        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET \
                name = COALESCE($2, name), \
                unit = COALESCE($3, unit), \
                sell_price = COALESCE($4, sell_price), \
                cost_price = COALESCE($5, cost_price), \
                track_inventory = COALESCE($6, track_inventory), \
                updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.unit)
        .bind(input.sell_price)
        .bind(input.cost_price)
        .bind(input.track_inventory)
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or(ProductError::NotFound)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<Product, ProductError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET trashed_at = now(), updated_at = now() \
             WHERE id = $1 AND trashed_at IS NULL AND deleted_at IS NULL \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or(ProductError::NotFound)
    }

    pub async fn restore(&self, id: Uuid) -> Result<Product, ProductError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET trashed_at = NULL, updated_at = now() \
             WHERE id = $1 AND trashed_at IS NOT NULL AND deleted_at IS NULL \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or(ProductError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_must_be_non_negative() {
        assert!(ProductService::check_price("Selling price", Decimal::ZERO).is_ok());
        assert!(ProductService::check_price("Selling price", "150000".parse().unwrap()).is_ok());
        assert!(ProductService::check_price("Cost price", "-1".parse().unwrap()).is_err());
    }
}
