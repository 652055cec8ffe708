//! HTTP handlers for product endpoints

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use shared::parse_positive_int;

use crate::error::{AppError, AppResult};
use crate::models::Product;
use crate::services::product::{CreateProductInput, UpdateProductInput};
use crate::services::product_import::ImportResult;
use crate::services::{ProductImportService, ProductService};
use crate::AppState;

fn product_id(raw: &str) -> AppResult<i64> {
    parse_positive_int(raw).ok_or_else(|| AppError::validation("id", "id must be a positive integer"))
}

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let Json(input) = payload?;
    let service = ProductService::new(state.db);
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// List products
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db);
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Get a product by id
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get_product(product_id(&id)?).await?;
    Ok(Json(product))
}

/// Update a product's name, unit or reorder level
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProductInput>, JsonRejection>,
) -> AppResult<Json<Product>> {
    let id = product_id(&id)?;
    let Json(input) = payload?;
    let service = ProductService::new(state.db);
    let product = service.update_product(id, input).await?;
    Ok(Json(product))
}

/// Import products from the multipart field `file`
pub async fn import_products(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<ImportResult>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation("file", e.body_text()))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::validation("file", e.body_text()))?;
            upload = Some(bytes);
            break;
        }
    }

    let upload = upload
        .ok_or_else(|| AppError::validation("file", "CSV file is required (field name: file)"))?;

    let service = ProductImportService::new(state.db);
    let result = service.import_csv(&upload).await?;
    Ok(Json(result))
}
