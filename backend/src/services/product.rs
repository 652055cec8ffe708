//! Product catalogue service

use shared::{validate_new_product, validate_product_changes};
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{Product, ProductRow, PRODUCT_COLUMNS};

/// Service for creating and maintaining products
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductInput {
    pub sku_code: Option<String>,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub reorder_level: Option<f64>,
}

/// Input for updating a product; the SKU code cannot change
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub reorder_level: Option<f64>,
}

/// Map a unique-constraint violation onto a duplicate entry error
fn unique_violation(field: &str) -> impl Fn(sqlx::Error) -> AppError + '_ {
    move |err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::DuplicateEntry(field.to_string())
        }
        _ => AppError::DatabaseError(err),
    }
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        let product = validate_new_product(
            input.sku_code.as_deref(),
            input.name.as_deref(),
            input.unit.as_deref(),
            input.reorder_level,
        )?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (sku_code, name, unit, reorder_level)
            VALUES ($1, $2, $3, $4)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&product.sku_code)
        .bind(&product.name)
        .bind(&product.unit)
        .bind(product.reorder_level)
        .fetch_one(&self.db)
        .await
        .map_err(unique_violation("skuCode"))?;

        tracing::info!(product_id = row.id, sku_code = %row.sku_code, "Product created");
        Ok(row.into())
    }

    /// List products ordered by id
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a product by id
    pub async fn get_product(&self, product_id: i64) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// Update the mutable fields of a product
    pub async fn update_product(
        &self,
        product_id: i64,
        input: UpdateProductInput,
    ) -> AppResult<Product> {
        let changes = validate_product_changes(
            input.name.as_deref(),
            input.unit.as_deref(),
            input.reorder_level,
        )?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = COALESCE($1, name),
                unit = COALESCE($2, unit),
                reorder_level = COALESCE($3, reorder_level),
                updated_at = NOW()
            WHERE id = $4
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&changes.name)
        .bind(&changes.unit)
        .bind(changes.reorder_level)
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }
}
